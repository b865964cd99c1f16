//! Unified testing utilities for safe-passkeys
//!
//! Test doubles for the injected capabilities and pre-built test data,
//! available to unit tests and, with the `testing` feature, to the
//! integration tests.
//!
//! ## Organization
//!
//! - [`fixtures`] - Pre-built test data (passkeys, records, settings, managers)
//! - [`mock`] - Scripted credential provider and recording smart-account SDK
//!
//! ## Usage
//!
//! Requires the `testing` feature outside of unit tests.
//!
//! ```rust,ignore
//! use safe_passkeys::testing::{fixtures::TestFixtures, mock::MockBehavior};
//!
//! async fn test_cancelled_prompt() {
//!     let manager = TestFixtures::manager_with(MockBehavior::Cancel);
//!     assert!(manager.create_passkey().await.is_err());
//! }
//! ```

pub mod fixtures;
pub mod mock;

pub use fixtures::TestFixtures;
pub use mock::{MockBehavior, MockCredentialProvider, MockSafeAccountFactory};

/// Common test constants
pub mod constants {
    /// Raw id of the sample passkey record
    pub const TEST_RAW_ID: &str = "0a0b0c";

    /// Public key of the sample passkey record
    pub const TEST_PUBLIC_KEY: &str = "04aabbcc";

    /// Origin used for the software authenticator in tests
    pub const TEST_ORIGIN: &str = "http://localhost";

    /// Smart account address used as transfer recipient
    pub const TEST_SAFE_ADDRESS: &str = "0x00000000000000000000000000000000000000a1";

    /// Sepolia paymaster address
    pub const TEST_PAYMASTER_ADDRESS: &str = "0x0000000000000039cd5e8aE05257CE51C473ddd1";

    /// Sepolia paymaster endpoint
    pub const TEST_PAYMASTER_URL: &str = "https://api.pimlico.io/v2/sepolia/rpc";
}
