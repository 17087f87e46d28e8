//! Call-site capture
//!
//! Logging methods are `#[track_caller]`, so `Location::caller()` taken at the
//! top of the public entry point already names the application call site.
//! The location is then handed to a [`CallerSource`], which decides how to
//! render it.

use std::panic::Location;

/// Renders the call site of a log call
pub trait CallerSource: Send + Sync {
    fn caller(&self, location: &'static Location<'static>) -> Option<String>;
}

/// `file:line` of the application call site
#[derive(Debug, Default, Clone, Copy)]
pub struct LocationCaller;

impl CallerSource for LocationCaller {
    fn caller(&self, location: &'static Location<'static>) -> Option<String> {
        Some(format!("{}:{}", location.file(), location.line()))
    }
}

/// Always reports the same string
#[derive(Debug, Clone)]
pub struct FixedCaller(pub String);

impl FixedCaller {
    pub fn new(caller: impl Into<String>) -> Self {
        Self(caller.into())
    }
}

impl CallerSource for FixedCaller {
    fn caller(&self, _location: &'static Location<'static>) -> Option<String> {
        Some(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn capture() -> Option<String> {
        LocationCaller.caller(Location::caller())
    }

    #[test]
    fn test_location_caller_reports_call_site() {
        let expected_line = line!() + 1;
        let caller = capture().unwrap();
        assert_eq!(caller, format!("{}:{}", file!(), expected_line));
    }

    #[test]
    fn test_fixed_caller() {
        let source = FixedCaller::new("main.rs:1");
        assert_eq!(source.caller(Location::caller()).as_deref(), Some("main.rs:1"));
    }
}
