//! Passkey lifecycle
//!
//! This module creates passkeys through a credential provider, persists their
//! identity records in a document storage, and re-acquires a stored passkey
//! by raw id for use as a smart-account signer.

mod authenticator;
pub mod crypto;
pub mod encoding;
mod errors;
mod provider;
mod service;
mod settings;
mod storage;
mod store;
mod types;

pub use authenticator::{SoftwareAuthenticator, UserPresence, AUTHENTICATOR_KEYS_KEY};
pub use errors::{PasskeyError, ProviderError, StorageError};
pub use provider::CredentialProvider;
pub use service::PasskeyManager;
pub use settings::PasskeySettings;
pub use storage::{DocumentStorage, FileStorage, MemoryStorage};
pub use store::{PasskeyStore, DEFAULT_STORAGE_KEY};
pub use types::*;
