//! External smart-account SDK contract
//!
//! The account-abstraction SDK owns address derivation, user-operation
//! construction, signing, and bundler/paymaster submission. This crate only
//! supplies its initialization parameters and reads back results through the
//! traits below.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::account::settings::{AccountSettings, PaymasterSettings};
use crate::passkey::{Passkey, PasskeyError};

/// Errors raised by the smart-account integration
#[derive(Debug, Error)]
pub enum AccountError {
    /// An address is not a 20-byte `0x` hex string
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// The SDK reported a failure
    #[error("Smart account SDK error: {0}")]
    Sdk(String),

    /// Re-acquiring the passkey signer failed
    #[error(transparent)]
    Passkey(#[from] PasskeyError),
}

/// Owner/threshold configuration of the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountOptions {
    pub owners: Vec<String>,
    pub threshold: u32,
}

/// SDK initialization parameters
#[derive(Debug, Clone)]
pub struct SafeAccountConfig {
    pub provider: String,
    pub rpc_url: String,
    pub bundler_url: String,
    pub paymaster_options: Option<PaymasterSettings>,
    pub signer: Passkey,
    pub options: AccountOptions,
}

impl SafeAccountConfig {
    /// Build a configuration from settings, with or without the sponsoring paymaster
    #[must_use]
    pub fn from_settings(settings: &AccountSettings, signer: Passkey, sponsored: bool) -> Self {
        Self {
            provider: settings.rpc_url.clone(),
            rpc_url: settings.rpc_url.clone(),
            bundler_url: settings.bundler_url.clone(),
            paymaster_options: if sponsored {
                settings.paymaster.clone()
            } else {
                None
            },
            signer,
            options: AccountOptions {
                owners: settings.owners.clone(),
                threshold: settings.threshold,
            },
        }
    }
}

/// A single call in a transaction batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaTransaction {
    pub to: String,
    pub data: String,  // 0x-prefixed call data
    pub value: String, // Decimal wei
}

/// An initialized smart account
#[async_trait]
pub trait SmartAccount: Send + Sync {
    /// SDK-owned operation type produced by `create_transaction`
    type Operation: Send + Sync + std::fmt::Debug;

    /// Counterfactual or deployed account address
    ///
    /// # Errors
    /// Returns `AccountError::Sdk` on SDK failure.
    async fn get_address(&self) -> Result<String, AccountError>;

    /// Whether the account contract is deployed
    ///
    /// # Errors
    /// Returns `AccountError::Sdk` on SDK failure.
    async fn is_deployed(&self) -> Result<bool, AccountError>;

    /// Build an operation executing `transactions` as one batch
    ///
    /// # Errors
    /// Returns `AccountError::Sdk` on SDK failure.
    async fn create_transaction(
        &self,
        transactions: Vec<MetaTransaction>,
    ) -> Result<Self::Operation, AccountError>;

    /// Sign an operation with the configured passkey signer
    ///
    /// # Errors
    /// Returns `AccountError::Sdk` on SDK failure or signing refusal.
    async fn sign_safe_operation(
        &self,
        operation: Self::Operation,
    ) -> Result<Self::Operation, AccountError>;

    /// Submit a signed operation; returns the user operation hash
    ///
    /// # Errors
    /// Returns `AccountError::Sdk` on SDK or bundler failure.
    async fn execute_transaction(&self, operation: Self::Operation)
        -> Result<String, AccountError>;
}

/// Initializes smart accounts
#[async_trait]
pub trait SmartAccountFactory: Send + Sync {
    type Account: SmartAccount;

    /// Initialize an account for `config.signer`
    ///
    /// # Errors
    /// Returns `AccountError::Sdk` if initialization fails.
    async fn init(&self, config: SafeAccountConfig) -> Result<Self::Account, AccountError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> Passkey {
        Passkey {
            raw_id: vec![1, 2],
            public_key: vec![3, 4],
        }
    }

    #[test]
    fn test_config_without_paymaster() {
        let settings = AccountSettings {
            paymaster: Some(PaymasterSettings {
                is_sponsored: true,
                paymaster_address: "0x0000000000000039cd5e8aE05257CE51C473ddd1".to_string(),
                paymaster_url: "https://api.pimlico.io/v2/sepolia/rpc".to_string(),
            }),
            ..AccountSettings::default()
        };

        let config = SafeAccountConfig::from_settings(&settings, signer(), false);
        assert!(config.paymaster_options.is_none());
        assert_eq!(config.provider, settings.rpc_url);
        assert_eq!(config.options.threshold, 1);
        assert!(config.options.owners.is_empty());

        let sponsored = SafeAccountConfig::from_settings(&settings, signer(), true);
        assert_eq!(sponsored.paymaster_options, settings.paymaster);
    }
}
