//! Error types for the Chemviz client.

use thiserror::Error;

/// A shared error type for the entire Chemviz client.
///
/// Every failing operation is converted into one of these variants at the
/// point of the failing call. The controller then turns it into a single
/// user-visible status message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChemVizError {
    /// Bad credentials, or the verification call itself failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Local pre-submission check failed (no network call was made)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Any failed call against the backend (history, summary, delete, report, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// Upload call failure, carrying the server-provided message when present
    #[error("Upload failed: {message}")]
    Upload {
        message: String,
        /// Columns the backend reported as missing from the dataset
        missing: Vec<String>,
    },

    /// An operation that needs a session was called without one
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChemVizError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an Auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates an Upload error without a missing-column list
    pub fn upload(message: impl Into<String>) -> Self {
        Self::Upload {
            message: message.into(),
            missing: Vec::new(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

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

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is an Auth error
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a Network error
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Check if this is an Upload error
    pub fn is_upload(&self) -> bool {
        matches!(self, Self::Upload { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Text shown to the user for an upload failure.
    ///
    /// Appends the missing column list when the backend reported one.
    pub fn upload_message(&self) -> Option<String> {
        match self {
            Self::Upload { message, missing } if missing.is_empty() => Some(message.clone()),
            Self::Upload { message, missing } => {
                Some(format!("{}\nMissing Columns: {}", message, missing.join(", ")))
            }
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ChemVizError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ChemVizError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ChemVizError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ChemVizError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ChemVizError>`.
pub type Result<T> = std::result::Result<T, ChemVizError>;
