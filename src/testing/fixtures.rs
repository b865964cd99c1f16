//! Test fixtures providing pre-built test objects

use crate::account::{AccountSettings, PaymasterSettings, TransferSettings};
use crate::passkey::{MemoryStorage, Passkey, PasskeyItem, PasskeyManager, PasskeySettings};

use super::constants::{TEST_PAYMASTER_ADDRESS, TEST_PAYMASTER_URL, TEST_PUBLIC_KEY, TEST_RAW_ID};
use super::mock::{MockBehavior, MockCredentialProvider};

/// Manager over the mock provider and in-memory storage
pub type TestManager = PasskeyManager<MockCredentialProvider, MemoryStorage>;

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// Passkey settings with the defaults
    #[must_use]
    pub fn passkey_settings() -> PasskeySettings {
        PasskeySettings::default()
    }

    /// Manager whose provider approves every request
    #[must_use]
    pub fn manager() -> TestManager {
        Self::manager_with(MockBehavior::Approve)
    }

    /// Manager whose provider answers with `behavior`
    #[must_use]
    pub fn manager_with(behavior: MockBehavior) -> TestManager {
        PasskeyManager::new(
            MockCredentialProvider::with_behavior(behavior),
            MemoryStorage::new(),
            Self::passkey_settings(),
        )
    }

    /// Sample stored record
    #[must_use]
    pub fn passkey_item() -> PasskeyItem {
        PasskeyItem::new(TEST_RAW_ID, TEST_PUBLIC_KEY)
    }

    /// Binary passkey matching [`passkey_item`](Self::passkey_item)
    #[must_use]
    pub fn passkey() -> Passkey {
        Passkey {
            raw_id: vec![0x0a, 0x0b, 0x0c],
            public_key: vec![0x04, 0xaa, 0xbb, 0xcc],
        }
    }

    /// Account settings with a sponsoring paymaster
    #[must_use]
    pub fn sponsored_account_settings() -> AccountSettings {
        AccountSettings {
            paymaster: Some(PaymasterSettings {
                is_sponsored: true,
                paymaster_address: TEST_PAYMASTER_ADDRESS.to_string(),
                paymaster_url: TEST_PAYMASTER_URL.to_string(),
            }),
            ..AccountSettings::default()
        }
    }

    /// Default USDC transfer settings
    #[must_use]
    pub fn transfer_settings() -> TransferSettings {
        TransferSettings::default()
    }
}
