// Centralized logging for passkey and smart-account events
use log::{debug, info};

use crate::passkey::encoding::buffer_to_string;
use crate::passkey::Passkey;

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log a freshly created passkey
    pub fn log_passkey_created(passkey: &Passkey) {
        info!("🔑 Passkey created: {}", buffer_to_string(&passkey.raw_id));
        debug!(
            "Passkey public key ({} bytes): {}",
            passkey.public_key.len(),
            buffer_to_string(&passkey.public_key)
        );
    }

    /// Log a passkey record written to the store
    pub fn log_passkey_stored(raw_id: &[u8]) {
        info!("💾 Stored passkey {}", buffer_to_string(raw_id));
    }

    /// Log a passkey re-acquired through an assertion
    pub fn log_passkey_selected(raw_id: &str) {
        info!("✅ Passkey {raw_id} verified by the authenticator");
    }

    /// Log the account controlled by the selected passkey
    pub fn log_account_summary(address: &str, is_deployed: bool) {
        info!(
            "🏦 Safe account {address} (deployed: {})",
            if is_deployed { "yes" } else { "no" }
        );
    }

    /// Log a submitted user operation with its explorer link
    pub fn log_user_operation_submitted(user_operation_hash: &str, explorer_url: &str) {
        info!("🚀 User operation submitted: {user_operation_hash}");
        info!("🔍 Track it at {explorer_url}");
    }
}
