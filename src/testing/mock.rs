//! Mock objects and fake implementations for testing
//!
//! This module provides a scripted credential provider and a recording
//! smart-account SDK for isolated testing of the passkey lifecycle and the
//! account flows.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::account::{
    AccountError, MetaTransaction, SafeAccountConfig, SmartAccount, SmartAccountFactory,
};
use crate::passkey::crypto::sha256;
use crate::passkey::{
    AuthenticatorAssertionResponse, AuthenticatorAttestationResponse, AuthenticatorResponse,
    CreationOptions, CredentialProvider, ProviderError, PublicKeyCredential, RequestOptions,
    COSE_ALG_ES256, PUBLIC_KEY_CREDENTIAL_TYPE,
};

/// Scripted answer of the mock credential provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockBehavior {
    /// Complete normally
    #[default]
    Approve,
    /// Create succeeds but the public key is not exposed
    OmitPublicKey,
    /// Complete without a credential
    ReturnNothing,
    /// Return an assertion from `create` and an attestation from `get`
    WrongResponseKind,
    /// Assert a credential other than the one requested
    AssertOtherCredential,
    /// The user dismisses the prompt
    Cancel,
    /// The prompt times out
    TimeOut,
}

#[derive(Default)]
struct MockProviderState {
    created: u8,
    create_calls: usize,
    get_calls: usize,
    last_creation: Option<CreationOptions>,
    last_request: Option<RequestOptions>,
}

/// Credential provider double with deterministic credentials
///
/// The n-th created credential has raw id `[n; 16]` and public key
/// [`MockCredentialProvider::public_key_for`]`(n)`.
#[derive(Default)]
pub struct MockCredentialProvider {
    behavior: Mutex<MockBehavior>,
    state: Mutex<MockProviderState>,
}

impl MockCredentialProvider {
    /// Provider approving every request
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider answering with `behavior`
    #[must_use]
    pub fn with_behavior(behavior: MockBehavior) -> Self {
        let provider = Self::default();
        provider.set_behavior(behavior);
        provider
    }

    /// Change the scripted answer
    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.lock().unwrap_or_else(PoisonError::into_inner) = behavior;
    }

    /// Public key reported for the n-th created credential
    #[must_use]
    pub fn public_key_for(n: u8) -> Vec<u8> {
        let mut key = vec![0x04];
        key.extend_from_slice(&[n.wrapping_add(0x80); 64]);
        key
    }

    /// Options passed to the latest `create` call
    #[must_use]
    pub fn last_creation_options(&self) -> Option<CreationOptions> {
        self.state().last_creation.clone()
    }

    /// Options passed to the latest `get` call
    #[must_use]
    pub fn last_request_options(&self) -> Option<RequestOptions> {
        self.state().last_request.clone()
    }

    /// Number of `create` calls
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.state().create_calls
    }

    /// Number of `get` calls
    #[must_use]
    pub fn get_calls(&self) -> usize {
        self.state().get_calls
    }

    fn behavior(&self) -> MockBehavior {
        *self.behavior.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockProviderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn assertion() -> AuthenticatorResponse {
        AuthenticatorResponse::Assertion(AuthenticatorAssertionResponse {
            client_data_json: br#"{"type":"webauthn.get"}"#.to_vec(),
            authenticator_data: vec![0u8; 37],
            signature: vec![0x30, 0x00],
            user_handle: None,
        })
    }
}

#[async_trait]
impl CredentialProvider for MockCredentialProvider {
    async fn create(
        &self,
        options: &CreationOptions,
    ) -> Result<Option<PublicKeyCredential>, ProviderError> {
        let behavior = self.behavior();
        let mut state = self.state();
        state.create_calls += 1;
        state.last_creation = Some(options.clone());

        match behavior {
            MockBehavior::Cancel => return Err(ProviderError::Cancelled),
            MockBehavior::TimeOut => return Err(ProviderError::TimedOut(options.timeout)),
            MockBehavior::ReturnNothing => return Ok(None),
            _ => {}
        }

        state.created = state.created.wrapping_add(1);
        let n = state.created;

        let response = if behavior == MockBehavior::WrongResponseKind {
            Self::assertion()
        } else {
            AuthenticatorResponse::Attestation(AuthenticatorAttestationResponse {
                client_data_json: br#"{"type":"webauthn.create"}"#.to_vec(),
                attestation_object: Vec::new(),
                public_key: (behavior != MockBehavior::OmitPublicKey)
                    .then(|| Self::public_key_for(n)),
                public_key_algorithm: COSE_ALG_ES256,
            })
        };

        Ok(Some(PublicKeyCredential {
            raw_id: vec![n; 16],
            r#type: PUBLIC_KEY_CREDENTIAL_TYPE.to_string(),
            response,
        }))
    }

    async fn get(
        &self,
        options: &RequestOptions,
    ) -> Result<Option<PublicKeyCredential>, ProviderError> {
        let behavior = self.behavior();
        let mut state = self.state();
        state.get_calls += 1;
        state.last_request = Some(options.clone());

        match behavior {
            MockBehavior::Cancel => return Err(ProviderError::Cancelled),
            MockBehavior::TimeOut => return Err(ProviderError::TimedOut(options.timeout)),
            MockBehavior::ReturnNothing => return Ok(None),
            _ => {}
        }

        let requested = options
            .allow_credentials
            .first()
            .ok_or(ProviderError::UnknownCredential)?;

        let raw_id = if behavior == MockBehavior::AssertOtherCredential {
            requested.id.iter().map(|b| b ^ 0xff).collect()
        } else {
            requested.id.clone()
        };

        let response = if behavior == MockBehavior::WrongResponseKind {
            AuthenticatorResponse::Attestation(AuthenticatorAttestationResponse {
                client_data_json: Vec::new(),
                attestation_object: Vec::new(),
                public_key: None,
                public_key_algorithm: COSE_ALG_ES256,
            })
        } else {
            Self::assertion()
        };

        Ok(Some(PublicKeyCredential {
            raw_id,
            r#type: PUBLIC_KEY_CREDENTIAL_TYPE.to_string(),
            response,
        }))
    }
}

/// Operation built by [`MockSafeAccount`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockSafeOperation {
    pub transactions: Vec<MetaTransaction>,
    pub signed: bool,
}

/// Everything the mock SDK has been asked to do
#[derive(Debug, Default)]
pub struct MockLedger {
    pub initialized: Vec<SafeAccountConfig>,
    pub executed: Vec<MockSafeOperation>,
}

/// Smart-account SDK double recording initializations and executions
#[derive(Clone, Default)]
pub struct MockSafeAccountFactory {
    ledger: Arc<Mutex<MockLedger>>,
    deployed: bool,
    fail_execution: bool,
}

impl MockSafeAccountFactory {
    /// Factory whose accounts report as not yet deployed
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deployment status reported by accounts
    #[must_use]
    pub fn deployed(mut self, deployed: bool) -> Self {
        self.deployed = deployed;
        self
    }

    /// Make `execute_transaction` fail like a rejecting bundler
    #[must_use]
    pub fn failing_execution(mut self) -> Self {
        self.fail_execution = true;
        self
    }

    /// Address the mock derives for a passkey public key
    #[must_use]
    pub fn address_for(public_key: &[u8]) -> String {
        format!("0x{}", hex::encode(&sha256(public_key)[..20]))
    }

    /// Configurations passed to `init`
    #[must_use]
    pub fn initialized(&self) -> Vec<SafeAccountConfig> {
        self.ledger().initialized.clone()
    }

    /// Operations submitted through `execute_transaction`
    #[must_use]
    pub fn executed(&self) -> Vec<MockSafeOperation> {
        self.ledger().executed.clone()
    }

    fn ledger(&self) -> std::sync::MutexGuard<'_, MockLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SmartAccountFactory for MockSafeAccountFactory {
    type Account = MockSafeAccount;

    async fn init(&self, config: SafeAccountConfig) -> Result<MockSafeAccount, AccountError> {
        let address = Self::address_for(&config.signer.public_key);
        self.ledger().initialized.push(config);
        Ok(MockSafeAccount {
            address,
            deployed: self.deployed,
            fail_execution: self.fail_execution,
            ledger: Arc::clone(&self.ledger),
        })
    }
}

/// Account produced by [`MockSafeAccountFactory`]
pub struct MockSafeAccount {
    address: String,
    deployed: bool,
    fail_execution: bool,
    ledger: Arc<Mutex<MockLedger>>,
}

#[async_trait]
impl SmartAccount for MockSafeAccount {
    type Operation = MockSafeOperation;

    async fn get_address(&self) -> Result<String, AccountError> {
        Ok(self.address.clone())
    }

    async fn is_deployed(&self) -> Result<bool, AccountError> {
        Ok(self.deployed)
    }

    async fn create_transaction(
        &self,
        transactions: Vec<MetaTransaction>,
    ) -> Result<MockSafeOperation, AccountError> {
        if transactions.is_empty() {
            return Err(AccountError::Sdk("empty transaction batch".to_string()));
        }
        Ok(MockSafeOperation {
            transactions,
            signed: false,
        })
    }

    async fn sign_safe_operation(
        &self,
        mut operation: MockSafeOperation,
    ) -> Result<MockSafeOperation, AccountError> {
        operation.signed = true;
        Ok(operation)
    }

    async fn execute_transaction(
        &self,
        operation: MockSafeOperation,
    ) -> Result<String, AccountError> {
        if self.fail_execution {
            return Err(AccountError::Sdk("bundler rejected the user operation".to_string()));
        }
        if !operation.signed {
            return Err(AccountError::Sdk("operation is not signed".to_string()));
        }

        let encoded = serde_json::to_vec(&operation.transactions)
            .map_err(|e| AccountError::Sdk(e.to_string()))?;
        let hash = format!("0x{}", hex::encode(sha256(&encoded)));

        self.ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .executed
            .push(operation);
        Ok(hash)
    }
}
