//! Passkey settings
//!
//! This module defines settings for passkey creation, retrieval and storage.

use serde::{Deserialize, Serialize};

use crate::passkey::store::DEFAULT_STORAGE_KEY;

/// Settings for passkey lifecycle operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasskeySettings {
    /// Relying party display name
    pub rp_name: String,
    /// Relying party id; the provider's origin domain is used when unset
    pub rp_id: Option<String>,
    /// Display label and name of the credential's user entity
    pub user_label: String,
    /// Provider-side timeout in milliseconds
    pub timeout_ms: u32,
    /// Length of each random challenge in bytes
    pub challenge_length: usize,
    /// User verification requirement for assertions
    pub user_verification: String,
    /// Attestation conveyance preference for creation
    pub attestation: String,
    /// Storage key of the passkey list
    pub storage_key: String,
    /// Directory used by the file storage backend
    pub storage_dir: String,
}

impl Default for PasskeySettings {
    fn default() -> Self {
        Self {
            rp_name: "Safe SmartAccount".to_string(),
            rp_id: None,
            user_label: "Safe Owner".to_string(),
            timeout_ms: 60_000,
            challenge_length: 32,
            user_verification: "required".to_string(),
            attestation: "none".to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            storage_dir: ".passkeys".to_string(),
        }
    }
}
