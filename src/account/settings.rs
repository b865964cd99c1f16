//! Smart-account settings
//!
//! Endpoints and parameters handed to the external account-abstraction SDK.

use serde::{Deserialize, Serialize};

/// Sponsoring paymaster options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymasterSettings {
    #[serde(default = "default_true")]
    pub is_sponsored: bool,
    pub paymaster_address: String,
    pub paymaster_url: String,
}

fn default_true() -> bool {
    true
}

/// Settings for initializing the smart-account SDK
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSettings {
    pub rpc_url: String,
    pub bundler_url: String,
    /// Network name used in explorer links
    pub chain_name: String,
    /// Additional owners besides the passkey signer
    pub owners: Vec<String>,
    pub threshold: u32,
    pub paymaster: Option<PaymasterSettings>,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            rpc_url: "https://ethereum-sepolia-rpc.publicnode.com".to_string(),
            bundler_url: "https://api.pimlico.io/v2/sepolia/rpc".to_string(),
            chain_name: "sepolia".to_string(),
            owners: Vec::new(),
            threshold: 1,
            paymaster: None,
        }
    }
}

/// Settings for the sponsored USDC transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferSettings {
    pub usdc_token_address: String,
    /// Amount in token base units (USDC has 6 decimals)
    pub amount: u64,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            // Circle USDC on Sepolia
            usdc_token_address: "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238".to_string(),
            amount: 100_000, // 0.1 USDC
        }
    }
}
