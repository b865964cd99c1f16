#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the safe-passkeys library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod account;
pub mod passkey;
pub mod settings;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use account::{execute_usdc_transfer, select_passkey_signer, AccountError};
pub use passkey::{
    CredentialProvider, DocumentStorage, FileStorage, MemoryStorage, Passkey, PasskeyError,
    PasskeyItem, PasskeyManager, SoftwareAuthenticator,
};
pub use settings::AppSettings;
