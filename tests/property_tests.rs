//! Property-based tests for logx using proptest

use logx::prelude::*;
use logx::{mask, REDACTED};
use proptest::prelude::*;
use std::sync::Arc;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Trace),
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::Panic),
        Just(LogLevel::Fatal),
    ]
}

fn field_map() -> impl Strategy<Value = Fields> {
    prop::collection::hash_map("[a-z]{1,6}", any::<i64>().prop_map(FieldValue::Int), 0..6)
}

fn buffered_logger(level: LogLevel) -> (Logger, BufferSink) {
    let sink = BufferSink::new();
    let logger = Logger::builder()
        .min_level(level)
        .output(sink.clone())
        .policy(Arc::new(RedactionPolicy::new()))
        .build();
    (logger, sink)
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Test that LogLevel string conversions roundtrip correctly
    #[test]
    fn test_log_level_str_roundtrip(level in any_level(), use_lower in any::<bool>()) {
        let as_str = if use_lower {
            level.to_str().to_lowercase()
        } else {
            level.to_str().to_string()
        };
        let parsed: LogLevel = as_str.parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// Test that LogLevel ordering follows the ordinal
    #[test]
    fn test_log_level_ordering(level1 in any_level(), level2 in any_level()) {
        let val1 = level1 as u8;
        let val2 = level2 as u8;

        prop_assert_eq!(level1 <= level2, val1 <= val2);
        prop_assert_eq!(level1 < level2, val1 < val2);
    }

    /// A call is written iff its level is at or above the minimum
    #[test]
    fn test_level_gate(min in any_level(), level in any_level()) {
        prop_assume!(level != LogLevel::Panic && level != LogLevel::Fatal);
        let (logger, sink) = buffered_logger(min);

        logger.log(level, "gated");

        prop_assert_eq!(sink.lines().len(), usize::from(level >= min));
    }
}

// ============================================================================
// Derivation Tests
// ============================================================================

proptest! {
    /// L.with_fields(A).with_fields(B) equals L's fields, then A, then B
    #[test]
    fn test_with_fields_merge(base in field_map(), a in field_map(), b in field_map()) {
        let (logger, _) = buffered_logger(LogLevel::Info);
        let root = logger.with_fields(base.clone());

        let derived = root.with_fields(a.clone()).with_fields(b.clone());

        let mut expected = base;
        expected.extend(a);
        expected.extend(b);
        prop_assert_eq!(derived.fields(), &expected);
    }
}

// ============================================================================
// Redaction Tests
// ============================================================================

proptest! {
    /// Credit-card-shaped digits never survive message redaction
    #[test]
    fn test_message_credit_card_redacted(
        groups in prop::collection::vec("[0-9]{4}", 4),
        sep in prop_oneof![Just(""), Just(" "), Just("-")],
        prefix in "[a-z ]{0,10}",
    ) {
        let card = groups.join(sep);
        let message = format!("{}: {} end", prefix.trim(), card);
        let (logger, sink) = buffered_logger(LogLevel::Info);

        logger.info(message);

        let line = sink.contents_string();
        prop_assert!(!line.contains(&card));
        prop_assert!(line.contains(REDACTED));
    }

    /// SSN-shaped sequences never survive message redaction
    #[test]
    fn test_message_ssn_redacted(a in "[0-9]{3}", b in "[0-9]{2}", c in "[0-9]{4}") {
        let ssn = format!("{}-{}-{}", a, b, c);
        let (logger, sink) = buffered_logger(LogLevel::Info);

        logger.info(format!("ssn is {} ok", ssn));

        let line = sink.contents_string();
        prop_assert!(!line.contains(&ssn));
        prop_assert!(line.contains("ssn is [REDACTED] ok"));
    }

    /// Email addresses never survive message redaction
    #[test]
    fn test_message_email_redacted(
        user in "[a-z][a-z0-9._]{0,10}",
        domain in "[a-z]{1,10}",
        tld in "[a-z]{2,4}",
    ) {
        let email = format!("{}@{}.{}", user, domain, tld);
        let (logger, sink) = buffered_logger(LogLevel::Info);

        logger.info(format!("contact {} please", email));

        let line = sink.contents_string();
        prop_assert!(!line.contains(&email));
        prop_assert!(line.contains(REDACTED));
    }

    /// Listed keys are redacted whatever their case or value type
    #[test]
    fn test_sensitive_key_any_case(
        key in prop_oneof![Just("password"), Just("token"), Just("api_key"), Just("ssn")],
        upper_mask in prop::collection::vec(any::<bool>(), 8),
        value in prop_oneof![
            any::<i64>().prop_map(FieldValue::Int),
            any::<bool>().prop_map(FieldValue::Bool),
            "[a-z]{0,12}".prop_map(FieldValue::String),
        ],
    ) {
        let key: String = key
            .chars()
            .zip(upper_mask.iter().cycle())
            .map(|(c, upper)| if *upper { c.to_ascii_uppercase() } else { c })
            .collect();
        let policy = RedactionPolicy::new();

        let mut fields = Fields::new();
        fields.insert(key.clone(), value);
        let redacted = policy.snapshot().redact_fields(fields);

        prop_assert_eq!(&redacted[&key], &FieldValue::from(REDACTED));
    }

    /// Secret values are masked even with redaction switched off
    #[test]
    fn test_secret_always_masked(secret in "[a-zA-Z0-9]{6,20}", plain in "[a-z]{1,10}") {
        let (logger, sink) = buffered_logger(LogLevel::Info);
        let raw = logger.with_redaction(false);

        let mut fields = Fields::new();
        fields.insert("s".into(), SecretValue::text(secret.clone()).into());
        fields.insert("p".into(), FieldValue::String(plain.clone()));
        raw.log_with_fields(LogLevel::Info, "m", fields);

        let line = sink.contents_string();
        let quoted_secret = format!("\"{}\"", secret);
        let plain_pair = format!("\"p\":\"{}\"", plain);
        prop_assert!(!line.contains(&quoted_secret));
        prop_assert!(line.contains(&plain_pair));
    }

    /// mask never leaves a listed key unmasked at any depth
    #[test]
    fn test_mask_nested_depth(depth in 0usize..5, value in "[a-z]{1,8}") {
        let mut data = Fields::new();
        data.insert("email".into(), FieldValue::String(value.clone()));
        for _ in 0..depth {
            let mut outer = Fields::new();
            outer.insert("inner".into(), FieldValue::Map(data));
            data = outer;
        }

        let masked = mask(&data, ["EMAIL"]);

        let mut current = &masked;
        for _ in 0..depth {
            match &current["inner"] {
                FieldValue::Map(map) => current = map,
                other => prop_assert!(false, "unexpected value {:?}", other),
            }
        }
        prop_assert_eq!(&current["email"], &FieldValue::from(REDACTED));
    }
}

// ============================================================================
// Encoder Tests
// ============================================================================

proptest! {
    /// Encoding is deterministic and always decodes back to the same entry
    #[test]
    fn test_json_encode_decode(level in any_level(), message in ".*", fields in field_map()) {
        let entry = Entry::new(level, message).with_fields(fields);
        let encoder = JsonEncoder::new();

        let first = encoder.encode(&entry).unwrap();
        let second = encoder.encode(&entry).unwrap();
        prop_assert_eq!(&first, &second);

        let decoded = encoder.decode(&first).unwrap();
        prop_assert_eq!(decoded, entry);
    }

    /// Console lines never panic and stay on one line for plain messages
    #[test]
    fn test_console_encoder_no_panic(level in any_level(), message in "[^\r\n]*") {
        let entry = Entry::new(level, message);
        let line = ConsoleEncoder::new().format_line(&entry).unwrap();
        prop_assert!(!line.contains('\n'));
    }
}
