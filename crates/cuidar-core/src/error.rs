//! Error types for the Cuidar client.

use thiserror::Error;

/// A shared error type for the Cuidar workspace.
///
/// Provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone)]
pub enum CuidarError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// The auth API rejected a request (expired refresh token, bad status).
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Transport-level failure talking to the auth API
    #[error("Network error: {0}")]
    Network(String),

    /// A value could not be parsed into its domain type
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CuidarError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Check if this error came from the auth API, either as a rejection
    /// or as a transport failure.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Network(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for CuidarError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CuidarError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CuidarError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for CuidarError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<version_migrate::MigrationError> for CuidarError {
    fn from(err: version_migrate::MigrationError) -> Self {
        use version_migrate::MigrationError;

        match err {
            MigrationError::DeserializationError(_) | MigrationError::SerializationError(_) => {
                Self::Serialization {
                    format: "migration".to_string(),
                    message: err.to_string(),
                }
            }
            _ => Self::Migration(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for CuidarError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::Auth(format!("auth API responded with {}: {}", status, err))
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// A type alias for `Result<T, CuidarError>`.
pub type Result<T> = std::result::Result<T, CuidarError>;
