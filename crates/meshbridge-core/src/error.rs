//! Shared error type across meshbridge crates.

use thiserror::Error;

/// Stable error codes, used in log fields and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Inbound bytes are not a usable envelope.
    MalformedEnvelope,
    /// Topic does not belong to any bridged namespace.
    UnknownNamespace,
    /// Wrong key or corrupt ciphertext.
    DecryptionFailure,
    /// Re-encryption for a destination failed.
    EncryptionFailure,
    /// Bus refused or dropped an outbound publish.
    PublishFailure,
    /// Key material could not be decoded.
    InvalidKey,
    /// Configuration rejected at load time.
    BadConfig,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in log fields and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MalformedEnvelope => "MALFORMED_ENVELOPE",
            ErrorCode::UnknownNamespace => "UNKNOWN_NAMESPACE",
            ErrorCode::DecryptionFailure => "DECRYPTION_FAILURE",
            ErrorCode::EncryptionFailure => "ENCRYPTION_FAILURE",
            ErrorCode::PublishFailure => "PUBLISH_FAILURE",
            ErrorCode::InvalidKey => "INVALID_KEY",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MeshBridgeError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Clone, Error)]
pub enum MeshBridgeError {
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
    #[error("unknown namespace for topic: {0}")]
    UnknownNamespace(String),
    #[error("decryption failed: {0}")]
    DecryptionFailure(String),
    #[error("encryption failed: {0}")]
    EncryptionFailure(String),
    #[error("publish failed: {0}")]
    PublishFailure(String),
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl MeshBridgeError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MeshBridgeError::MalformedEnvelope(_) => ErrorCode::MalformedEnvelope,
            MeshBridgeError::UnknownNamespace(_) => ErrorCode::UnknownNamespace,
            MeshBridgeError::DecryptionFailure(_) => ErrorCode::DecryptionFailure,
            MeshBridgeError::EncryptionFailure(_) => ErrorCode::EncryptionFailure,
            MeshBridgeError::PublishFailure(_) => ErrorCode::PublishFailure,
            MeshBridgeError::InvalidKey(_) => ErrorCode::InvalidKey,
            MeshBridgeError::BadConfig(_) => ErrorCode::BadConfig,
            MeshBridgeError::Internal(_) => ErrorCode::Internal,
        }
    }
}
