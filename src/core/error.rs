//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Encoder failed to turn an entry into bytes
    #[error("Encode error ({encoder}): {message}")]
    EncodeError { encoder: String, message: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File hook error with path
    #[error("File hook error for '{path}': {message}")]
    FileHookError { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Sink write failure
    #[error("Sink write failed: {0}")]
    WriteError(String),

    /// Outbound HTTP failure
    #[error("HTTP error for {endpoint}: {message}")]
    HttpError { endpoint: String, message: String },

    /// Background dispatcher queue is full
    #[error("Dispatch queue full for {hook}: {capacity} requests buffered")]
    QueueFull { hook: String, capacity: usize },

    /// A hook panicked while handling an entry
    #[error("Hook #{index} ({name}) panicked: {message}")]
    HookPanic {
        index: usize,
        name: String,
        message: String,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an encode error
    pub fn encode(encoder: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::EncodeError {
            encoder: encoder.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file hook error
    pub fn file_hook(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileHookError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a sink write error
    pub fn write<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriteError(msg.into())
    }

    /// Create an HTTP error
    pub fn http(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::HttpError {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a queue full error
    pub fn queue_full(hook: impl Into<String>, capacity: usize) -> Self {
        LoggerError::QueueFull {
            hook: hook.into(),
            capacity,
        }
    }

    /// Create a hook panic error
    pub fn hook_panic(index: usize, name: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::HookPanic {
            index,
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Prefix used when this error is reported on the diagnostic channel
    pub fn severity_tag(&self) -> &'static str {
        match self {
            LoggerError::HookPanic { .. } => "[LOGGER CRITICAL]",
            LoggerError::QueueFull { .. } => "[LOGGER WARNING]",
            _ => "[LOGGER ERROR]",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::queue_full("datadog", 1000);
        assert!(matches!(err, LoggerError::QueueFull { .. }));

        let err = LoggerError::config("FileSink", "Invalid path");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::file_hook("/var/log/app.log", "Permission denied");
        assert!(matches!(err, LoggerError::FileHookError { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::queue_full("datadog", 1000);
        assert_eq!(
            err.to_string(),
            "Dispatch queue full for datadog: 1000 requests buffered"
        );

        let err = LoggerError::file_rotation("/var/log/app.log", "Disk full");
        assert_eq!(
            err.to_string(),
            "File rotation failed for '/var/log/app.log': Disk full"
        );

        let err = LoggerError::encode("json", "Invalid field type");
        assert_eq!(err.to_string(), "Encode error (json): Invalid field type");

        let err = LoggerError::hook_panic(2, "http", "boom");
        assert_eq!(err.to_string(), "Hook #2 (http) panicked: boom");
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("writing log file", "cannot write to file", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("writing log file"));
        assert!(err.to_string().contains("cannot write to file"));
    }

    #[test]
    fn test_severity_tag() {
        assert_eq!(
            LoggerError::hook_panic(0, "h", "m").severity_tag(),
            "[LOGGER CRITICAL]"
        );
        assert_eq!(LoggerError::queue_full("h", 1).severity_tag(), "[LOGGER WARNING]");
        assert_eq!(LoggerError::other("x").severity_tag(), "[LOGGER ERROR]");
    }
}
