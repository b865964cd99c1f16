//! Sponsored USDC transfer through the smart account

use once_cell::sync::Lazy;
use regex::Regex;

use crate::account::sdk::{
    AccountError, MetaTransaction, SafeAccountConfig, SmartAccount, SmartAccountFactory,
};
use crate::account::settings::{AccountSettings, TransferSettings};
use crate::passkey::Passkey;
use crate::utils::logging::LoggingHelper;

/// Function selector of `transfer(address,uint256)`
const ERC20_TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

static ADDRESS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("address pattern is valid"));

/// Result of a submitted transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub user_operation_hash: String,
    pub explorer_url: String,
}

/// Check that `address` is a `0x`-prefixed 20-byte hex string
///
/// # Errors
/// Returns `AccountError::InvalidAddress` otherwise.
pub fn validate_address(address: &str) -> Result<(), AccountError> {
    if ADDRESS_PATTERN.is_match(address) {
        Ok(())
    } else {
        Err(AccountError::InvalidAddress(address.to_string()))
    }
}

/// ABI-encode an ERC-20 `transfer(to, value)` call
///
/// # Errors
/// Returns `AccountError::InvalidAddress` if `to` is not a valid address.
pub fn generate_transfer_call_data(to: &str, value: u128) -> Result<String, AccountError> {
    validate_address(to)?;
    let address = hex::decode(&to[2..]).map_err(|_| AccountError::InvalidAddress(to.to_string()))?;

    let mut data = Vec::with_capacity(4 + 32 + 32);
    data.extend_from_slice(&ERC20_TRANSFER_SELECTOR);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(&address);
    data.extend_from_slice(&[0u8; 16]);
    data.extend_from_slice(&value.to_be_bytes());

    Ok(format!("0x{}", hex::encode(data)))
}

/// Explorer link for a user operation
#[must_use]
pub fn user_operation_explorer_url(user_operation_hash: &str, chain_name: &str) -> String {
    format!("https://jiffyscan.xyz/userOpHash/{user_operation_hash}?network={chain_name}")
}

/// Transfer USDC from the smart account back to itself, sponsored by the paymaster
///
/// # Errors
/// Returns `AccountError::InvalidAddress` for malformed addresses and
/// `AccountError::Sdk` if any SDK step fails.
pub async fn execute_usdc_transfer<F: SmartAccountFactory>(
    factory: &F,
    account: &AccountSettings,
    transfer: &TransferSettings,
    signer: Passkey,
    safe_address: &str,
) -> Result<TransferReceipt, AccountError> {
    validate_address(&transfer.usdc_token_address)?;
    let data = generate_transfer_call_data(safe_address, u128::from(transfer.amount))?;

    let safe_account = factory
        .init(SafeAccountConfig::from_settings(account, signer, true))
        .await?;

    let transfer_usdc = MetaTransaction {
        to: transfer.usdc_token_address.clone(),
        data,
        value: "0".to_string(),
    };

    let operation = safe_account.create_transaction(vec![transfer_usdc]).await?;
    let signed_operation = safe_account.sign_safe_operation(operation).await?;
    log::debug!("Signed safe operation: {signed_operation:?}");

    let user_operation_hash = safe_account.execute_transaction(signed_operation).await?;
    let explorer_url = user_operation_explorer_url(&user_operation_hash, &account.chain_name);
    LoggingHelper::log_user_operation_submitted(&user_operation_hash, &explorer_url);

    Ok(TransferReceipt {
        user_operation_hash,
        explorer_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_call_data_layout() {
        let data =
            generate_transfer_call_data("0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238", 100_000)
                .unwrap();

        assert_eq!(data.len(), 2 + 2 * (4 + 32 + 32));
        assert!(data.starts_with("0xa9059cbb"));
        assert_eq!(
            &data[10..74],
            "0000000000000000000000001c7d4b196cb0c7b01d743fbc6116a902379c7238"
        );
        assert_eq!(
            &data[74..],
            "00000000000000000000000000000000000000000000000000000000000186a0"
        );
    }

    #[test]
    fn test_invalid_addresses() {
        for address in [
            "",
            "0x",
            "1c7D4B196Cb0C7B01d743Fbc6116a902379C7238",
            "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C723",
            "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C72388",
            "0xZZ7D4B196Cb0C7B01d743Fbc6116a902379C7238",
        ] {
            assert!(
                matches!(
                    generate_transfer_call_data(address, 1),
                    Err(AccountError::InvalidAddress(_))
                ),
                "{address:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_explorer_url() {
        assert_eq!(
            user_operation_explorer_url("0xabc", "sepolia"),
            "https://jiffyscan.xyz/userOpHash/0xabc?network=sepolia"
        );
    }
}
