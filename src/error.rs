use std::fmt;

/// Result type for Junction operations
pub type Result<T> = std::result::Result<T, JunctionError>;

/// Main error type for the Junction library
#[derive(Debug, Clone, PartialEq)]
pub enum JunctionError {
    /// Invalid dimensions for operations
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid parameter value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// IO errors (file operations)
    IoError(String),

    /// Serialization/deserialization errors
    SerializationError(String),

    /// Action code outside the signal action set
    InvalidAction {
        action: usize,
        max_actions: usize,
    },

    /// Configuration that cannot produce a consistent run
    InvalidConfig(String),
}

impl fmt::Display for JunctionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JunctionError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            JunctionError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            JunctionError::IoError(msg) => write!(f, "IO error: {}", msg),
            JunctionError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            JunctionError::InvalidAction { action, max_actions } => {
                write!(f, "Invalid action {}: must be less than {}", action, max_actions)
            }
            JunctionError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for JunctionError {}

impl From<std::io::Error> for JunctionError {
    fn from(err: std::io::Error) -> Self {
        JunctionError::IoError(err.to_string())
    }
}

impl From<bincode::Error> for JunctionError {
    fn from(err: bincode::Error) -> Self {
        JunctionError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for JunctionError {
    fn from(err: serde_json::Error) -> Self {
        JunctionError::SerializationError(err.to_string())
    }
}

// Helper functions for common error patterns
impl JunctionError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        JunctionError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        JunctionError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = JunctionError::invalid_parameter("gamma", "must be within [0, 1]");
        assert_eq!(err.to_string(), "Invalid parameter 'gamma': must be within [0, 1]");

        let err = JunctionError::InvalidAction { action: 7, max_actions: 4 };
        assert_eq!(err.to_string(), "Invalid action 7: must be less than 4");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: JunctionError = io.into();
        assert!(matches!(err, JunctionError::IoError(_)));
    }
}
