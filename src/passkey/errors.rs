//! Passkey error types
//!
//! This module defines the error taxonomy for passkey storage, credential
//! provider interaction and the passkey lifecycle.

use thiserror::Error;

/// Failures raised by a [`DocumentStorage`](crate::passkey::DocumentStorage) backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failure
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    /// Storage key contains characters the backend cannot map
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Failures surfaced by a credential provider
///
/// These are propagated to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The user dismissed the prompt
    #[error("The operation was cancelled by the user")]
    Cancelled,

    /// The user did not answer within the configured timeout (milliseconds)
    #[error("The operation timed out after {0} ms")]
    TimedOut(u32),

    /// The assertion could not be verified or had an unexpected shape
    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    /// None of the allowed credentials is held by the authenticator
    #[error("No matching credential is available on this authenticator")]
    UnknownCredential,

    /// Any other authenticator-side failure
    #[error("Authenticator error: {0}")]
    Authenticator(String),
}

/// Errors that can occur during passkey lifecycle operations
#[derive(Debug, Error)]
pub enum PasskeyError {
    /// The provider returned no credential or an unusable one
    #[error("Passkey creation failed: {0}")]
    CredentialCreation(String),

    /// No stored record matches the requested raw id
    #[error("Passkey not found: {0}")]
    NotFound(String),

    /// The stored passkey list cannot be decoded
    #[error("Corrupt passkey store: {0}")]
    CorruptStore(String),

    /// A hex string could not be decoded
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The storage backend failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Failure reported by the credential provider
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl PasskeyError {
    /// Whether this error came from the user declining or ignoring the prompt
    #[must_use]
    pub fn is_user_abort(&self) -> bool {
        matches!(
            self,
            PasskeyError::Provider(ProviderError::Cancelled | ProviderError::TimedOut(_))
        )
    }
}
