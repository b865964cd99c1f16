//! Smart-account integration
//!
//! This module hands a selected passkey to the external account-abstraction
//! SDK: resolving the account it controls and executing a sponsored USDC
//! transfer.

mod sdk;
mod settings;
mod signer;
mod transfer;

pub use sdk::{
    AccountError, AccountOptions, MetaTransaction, SafeAccountConfig, SmartAccount,
    SmartAccountFactory,
};
pub use settings::{AccountSettings, PaymasterSettings, TransferSettings};
pub use signer::{select_passkey_signer, SelectedAccount};
pub use transfer::{
    execute_usdc_transfer, generate_transfer_call_data, user_operation_explorer_url,
    validate_address, TransferReceipt,
};
