//! Passkey signer selection

use crate::account::sdk::{AccountError, SafeAccountConfig, SmartAccount, SmartAccountFactory};
use crate::account::settings::AccountSettings;
use crate::passkey::{CredentialProvider, DocumentStorage, Passkey, PasskeyManager};
use crate::utils::logging::LoggingHelper;

/// A passkey selected as signer together with its account state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedAccount {
    pub passkey: Passkey,
    pub address: String,
    pub is_deployed: bool,
}

/// Re-acquire the passkey `raw_id` and resolve the account it controls
///
/// The account is initialized without a paymaster; only address and
/// deployment status are read.
///
/// # Errors
/// Returns `AccountError::Passkey` if the passkey cannot be re-acquired and
/// `AccountError::Sdk` if the SDK fails.
pub async fn select_passkey_signer<P, S, F>(
    manager: &PasskeyManager<P, S>,
    factory: &F,
    settings: &AccountSettings,
    raw_id: &str,
) -> Result<SelectedAccount, AccountError>
where
    P: CredentialProvider,
    S: DocumentStorage,
    F: SmartAccountFactory,
{
    log::info!("Selected passkey signer: {raw_id}");
    let passkey = manager.get_passkey_by_raw_id(raw_id).await?;

    let account = factory
        .init(SafeAccountConfig::from_settings(settings, passkey.clone(), false))
        .await?;

    let address = account.get_address().await?;
    let is_deployed = account.is_deployed().await?;
    LoggingHelper::log_account_summary(&address, is_deployed);

    Ok(SelectedAccount {
        passkey,
        address,
        is_deployed,
    })
}
