//! Error types for the terminal core

use std::fmt;

/// Errors that can occur inside the terminal core
///
/// Most user-facing failures (unknown commands, bad `cd` targets, wrong
/// unlock codes) are rendered as inline output and never surface here.
/// These variants cover storage, decoding and configuration failures.
#[derive(Debug)]
pub enum FolioError {
    /// IO error
    IoError(std::io::Error),

    /// JSON serialization/deserialization error
    SerializationError(serde_json::Error),

    /// YAML configuration error
    ConfigError(serde_yaml::Error),

    /// Storage backend refused a read or write
    StorageError(String),

    /// Obfuscated payload could not be decoded
    DecodeError(String),

    /// Sync message was malformed
    InvalidMessage(String),

    /// Sync transport is gone
    ChannelClosed,
}

impl fmt::Display for FolioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FolioError::IoError(err) => write!(f, "IO error: {}", err),
            FolioError::SerializationError(err) => write!(f, "Serialization error: {}", err),
            FolioError::ConfigError(err) => write!(f, "Config error: {}", err),
            FolioError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            FolioError::DecodeError(msg) => write!(f, "Decode error: {}", msg),
            FolioError::InvalidMessage(msg) => write!(f, "Invalid message: {}", msg),
            FolioError::ChannelClosed => write!(f, "Sync channel closed"),
        }
    }
}

impl std::error::Error for FolioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FolioError::IoError(err) => Some(err),
            FolioError::SerializationError(err) => Some(err),
            FolioError::ConfigError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FolioError {
    fn from(err: std::io::Error) -> Self {
        FolioError::IoError(err)
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(err: serde_json::Error) -> Self {
        FolioError::SerializationError(err)
    }
}

impl From<serde_yaml::Error> for FolioError {
    fn from(err: serde_yaml::Error) -> Self {
        FolioError::ConfigError(err)
    }
}

/// Result type for terminal core operations
pub type Result<T> = std::result::Result<T, FolioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            FolioError::StorageError("quota".to_string()).to_string(),
            "Storage error: quota"
        );
        assert_eq!(FolioError::ChannelClosed.to_string(), "Sync channel closed");
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: FolioError = err.into();
        assert!(matches!(err, FolioError::SerializationError(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
