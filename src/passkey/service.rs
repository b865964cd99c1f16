//! Passkey lifecycle service
//!
//! Bridges the credential provider's binary credentials and the store's
//! hex-encoded records: create, store, list and re-acquire passkeys.

use crate::passkey::crypto::generate_random_bytes;
use crate::passkey::encoding::{buffer_to_string, hex_string_to_bytes};
use crate::passkey::errors::{PasskeyError, ProviderError};
use crate::passkey::provider::CredentialProvider;
use crate::passkey::settings::PasskeySettings;
use crate::passkey::storage::DocumentStorage;
use crate::passkey::store::PasskeyStore;
use crate::passkey::types::{
    AuthenticatorResponse, CreationOptions, Passkey, PasskeyItem, PublicKeyCredential,
    PublicKeyCredentialDescriptor, PublicKeyCredentialParameters, RelyingParty, RequestOptions,
    UserEntity, COSE_ALG_ES256, PUBLIC_KEY_CREDENTIAL_TYPE,
};
use crate::utils::logging::LoggingHelper;

/// Passkey lifecycle manager
pub struct PasskeyManager<P, S> {
    provider: P,
    store: PasskeyStore<S>,
    settings: PasskeySettings,
}

impl<P: CredentialProvider, S: DocumentStorage> PasskeyManager<P, S> {
    /// Create a manager storing its list under `settings.storage_key`
    pub fn new(provider: P, storage: S, settings: PasskeySettings) -> Self {
        let store = PasskeyStore::with_key(storage, settings.storage_key.clone());
        Self {
            provider,
            store,
            settings,
        }
    }

    /// The underlying record store
    pub fn store(&self) -> &PasskeyStore<S> {
        &self.store
    }

    /// The credential provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Request a new ES256 credential from the provider
    ///
    /// The result is not persisted; pass it to [`store_passkey`](Self::store_passkey).
    ///
    /// # Errors
    /// Returns `PasskeyError::CredentialCreation` if the provider returns no
    /// credential or one without public key material, and
    /// `PasskeyError::Provider` for provider failures.
    pub async fn create_passkey(&self) -> Result<Passkey, PasskeyError> {
        let options = self.creation_options();
        log::debug!(
            "Requesting passkey creation for relying party '{}'",
            options.rp.name
        );

        let credential = self
            .provider
            .create(&options)
            .await?
            .ok_or_else(|| {
                PasskeyError::CredentialCreation("No credential was returned.".to_string())
            })?;

        let passkey = Self::passkey_from_attestation(credential)?;
        LoggingHelper::log_passkey_created(&passkey);
        Ok(passkey)
    }

    /// Persist a passkey's identity record
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn store_passkey(&self, passkey: &Passkey) -> Result<(), PasskeyError> {
        let record = PasskeyItem {
            raw_id: buffer_to_string(&passkey.raw_id),
            public_key: buffer_to_string(&passkey.public_key),
        };
        self.store.append(record)?;
        LoggingHelper::log_passkey_stored(&passkey.raw_id);
        Ok(())
    }

    /// List the stored passkey records
    ///
    /// # Errors
    /// Returns `PasskeyError::CorruptStore` or `PasskeyError::Storage` from the store.
    pub fn load_passkeys(&self) -> Result<Vec<PasskeyItem>, PasskeyError> {
        self.store.load()
    }

    /// Re-acquire a stored passkey through a user-verified assertion
    ///
    /// The returned passkey combines the raw id reported by the provider with
    /// the public key recorded at creation time.
    ///
    /// # Errors
    /// - `PasskeyError::Encoding` if `raw_id` is not hex
    /// - `PasskeyError::Provider` if the user cancels, the prompt times out,
    ///   or the assertion is missing or malformed
    /// - `PasskeyError::NotFound` if no stored record matches `raw_id`
    pub async fn get_passkey_by_raw_id(&self, raw_id: &str) -> Result<Passkey, PasskeyError> {
        let requested_id = hex_string_to_bytes(raw_id)?;
        let options = self.request_options(requested_id.clone());

        let credential = self.provider.get(&options).await?.ok_or_else(|| {
            ProviderError::VerificationFailed("No credential was returned.".to_string())
        })?;
        Self::check_assertion(&credential, &requested_id)?;

        // Records are keyed by lowercase hex
        let canonical_id = buffer_to_string(&requested_id);
        let record = self.store.find_by_id(&canonical_id)?;
        let public_key = hex_string_to_bytes(&record.public_key)?;

        LoggingHelper::log_passkey_selected(&canonical_id);
        Ok(Passkey {
            raw_id: credential.raw_id,
            public_key,
        })
    }

    /// Delete every stored passkey record
    ///
    /// # Errors
    /// Returns `PasskeyError::Storage` if the list cannot be removed.
    pub fn clear_passkeys(&self) -> Result<(), PasskeyError> {
        self.store.clear()
    }

    fn creation_options(&self) -> CreationOptions {
        let label = &self.settings.user_label;
        CreationOptions {
            rp: RelyingParty {
                id: self.settings.rp_id.clone(),
                name: self.settings.rp_name.clone(),
            },
            user: UserEntity {
                id: generate_random_bytes(32),
                name: label.clone(),
                display_name: label.clone(),
            },
            challenge: generate_random_bytes(self.settings.challenge_length),
            pub_key_cred_params: vec![PublicKeyCredentialParameters::es256()],
            timeout: self.settings.timeout_ms,
            attestation: self.settings.attestation.clone(),
        }
    }

    fn request_options(&self, raw_id: Vec<u8>) -> RequestOptions {
        RequestOptions {
            allow_credentials: vec![PublicKeyCredentialDescriptor::public_key(raw_id)],
            challenge: generate_random_bytes(self.settings.challenge_length),
            timeout: self.settings.timeout_ms,
            user_verification: self.settings.user_verification.clone(),
        }
    }

    fn passkey_from_attestation(credential: PublicKeyCredential) -> Result<Passkey, PasskeyError> {
        if credential.r#type != PUBLIC_KEY_CREDENTIAL_TYPE {
            return Err(PasskeyError::CredentialCreation(format!(
                "Unexpected credential type '{}'",
                credential.r#type
            )));
        }

        let AuthenticatorResponse::Attestation(attestation) = credential.response else {
            return Err(PasskeyError::CredentialCreation(
                "Provider returned an assertion instead of an attestation".to_string(),
            ));
        };

        if attestation.public_key_algorithm != COSE_ALG_ES256 {
            return Err(PasskeyError::CredentialCreation(format!(
                "Unsupported public key algorithm {}",
                attestation.public_key_algorithm
            )));
        }

        let public_key = attestation
            .public_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                PasskeyError::CredentialCreation(
                    "Provider did not expose the credential public key".to_string(),
                )
            })?;

        if credential.raw_id.is_empty() {
            return Err(PasskeyError::CredentialCreation(
                "Credential has an empty raw id".to_string(),
            ));
        }

        Ok(Passkey {
            raw_id: credential.raw_id,
            public_key,
        })
    }

    fn check_assertion(
        credential: &PublicKeyCredential,
        requested_id: &[u8],
    ) -> Result<(), ProviderError> {
        if credential.r#type != PUBLIC_KEY_CREDENTIAL_TYPE {
            return Err(ProviderError::VerificationFailed(format!(
                "Unexpected credential type '{}'",
                credential.r#type
            )));
        }

        if !matches!(credential.response, AuthenticatorResponse::Assertion(_)) {
            return Err(ProviderError::VerificationFailed(
                "Provider returned an attestation instead of an assertion".to_string(),
            ));
        }

        if credential.raw_id != requested_id {
            return Err(ProviderError::VerificationFailed(
                "Provider asserted a credential that was not requested".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passkey::storage::MemoryStorage;
    use crate::passkey::store::DEFAULT_STORAGE_KEY;
    use crate::testing::mock::{MockBehavior, MockCredentialProvider};

    fn manager(
        provider: MockCredentialProvider,
    ) -> PasskeyManager<MockCredentialProvider, MemoryStorage> {
        PasskeyManager::new(provider, MemoryStorage::new(), PasskeySettings::default())
    }

    #[tokio::test]
    async fn test_create_uses_configured_options() {
        let manager = manager(MockCredentialProvider::new());
        manager.create_passkey().await.unwrap();

        let options = manager.provider().last_creation_options().unwrap();
        assert_eq!(options.rp.name, "Safe SmartAccount");
        assert_eq!(options.user.display_name, "Safe Owner");
        assert_eq!(options.user.name, "Safe Owner");
        assert_eq!(options.user.id.len(), 32);
        assert_eq!(options.challenge.len(), 32);
        assert_eq!(options.pub_key_cred_params.len(), 1);
        assert_eq!(options.pub_key_cred_params[0].alg, -7);
        assert_eq!(options.pub_key_cred_params[0].r#type, "public-key");
        assert_eq!(options.timeout, 60_000);
        assert_eq!(options.attestation, "none");
    }

    #[tokio::test]
    async fn test_challenges_are_fresh() {
        let manager = manager(MockCredentialProvider::new());
        manager.create_passkey().await.unwrap();
        let first = manager.provider().last_creation_options().unwrap().challenge;
        manager.create_passkey().await.unwrap();
        let second = manager.provider().last_creation_options().unwrap().challenge;
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_create_does_not_touch_store() {
        let manager = manager(MockCredentialProvider::new());
        manager.create_passkey().await.unwrap();
        assert!(manager.load_passkeys().unwrap().is_empty());
        let document = manager.store().storage().load(DEFAULT_STORAGE_KEY).unwrap();
        assert_eq!(document, None);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_credential() {
        let provider = MockCredentialProvider::with_behavior(MockBehavior::ReturnNothing);
        let manager = manager(provider);
        let err = manager.create_passkey().await.unwrap_err();
        assert!(matches!(err, PasskeyError::CredentialCreation(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_wrong_response_kind() {
        let provider = MockCredentialProvider::with_behavior(MockBehavior::WrongResponseKind);
        let manager = manager(provider);
        let err = manager.create_passkey().await.unwrap_err();
        assert!(matches!(err, PasskeyError::CredentialCreation(_)));
    }

    #[tokio::test]
    async fn test_store_encodes_hex() {
        let manager = manager(MockCredentialProvider::new());
        let passkey = Passkey {
            raw_id: vec![0xab, 0x12],
            public_key: vec![0xcd, 0x34],
        };
        manager.store_passkey(&passkey).unwrap();

        assert_eq!(
            manager.load_passkeys().unwrap(),
            vec![PasskeyItem::new("ab12", "cd34")]
        );
    }

    #[tokio::test]
    async fn test_get_requests_single_credential_with_verification() {
        let manager = manager(MockCredentialProvider::new());
        let passkey = manager.create_passkey().await.unwrap();
        manager.store_passkey(&passkey).unwrap();

        let raw_id = buffer_to_string(&passkey.raw_id);
        let selected = manager.get_passkey_by_raw_id(&raw_id).await.unwrap();
        assert_eq!(selected, passkey);

        let options = manager.provider().last_request_options().unwrap();
        assert_eq!(options.allow_credentials.len(), 1);
        assert_eq!(options.allow_credentials[0].id, passkey.raw_id);
        assert_eq!(options.allow_credentials[0].r#type, "public-key");
        assert_eq!(options.user_verification, "required");
        assert_eq!(options.challenge.len(), 32);
    }

    #[tokio::test]
    async fn test_get_rejects_invalid_hex_before_prompting() {
        let manager = manager(MockCredentialProvider::new());
        let err = manager.get_passkey_by_raw_id("not-hex").await.unwrap_err();
        assert!(matches!(err, PasskeyError::Encoding(_)));
        assert_eq!(manager.provider().get_calls(), 0);
    }

    #[tokio::test]
    async fn test_get_rejects_unrequested_credential() {
        let provider = MockCredentialProvider::new();
        let manager = manager(provider);
        let passkey = manager.create_passkey().await.unwrap();
        manager.store_passkey(&passkey).unwrap();
        manager.provider().set_behavior(MockBehavior::AssertOtherCredential);

        let err = manager
            .get_passkey_by_raw_id(&buffer_to_string(&passkey.raw_id))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PasskeyError::Provider(ProviderError::VerificationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_get_accepts_uppercase_raw_id() {
        let manager = manager(MockCredentialProvider::new());
        let passkey = Passkey {
            raw_id: vec![0x0a, 0x0b, 0x0c],
            public_key: vec![0x04, 0xaa],
        };
        manager.store_passkey(&passkey).unwrap();

        let selected = manager.get_passkey_by_raw_id("0A0B0C").await.unwrap();
        assert_eq!(selected, passkey);
        assert_eq!(manager.provider().get_calls(), 1);
    }

    #[tokio::test]
    async fn test_get_rejects_record_with_invalid_public_key() {
        let manager = manager(MockCredentialProvider::new());
        manager
            .store()
            .append(PasskeyItem::new("0a0b0c", "not-hex"))
            .unwrap();

        let err = manager.get_passkey_by_raw_id("0a0b0c").await.unwrap_err();
        assert!(matches!(err, PasskeyError::Encoding(_)));
        assert_eq!(manager.provider().get_calls(), 1);
    }

    #[tokio::test]
    async fn test_clear_passkeys() {
        let manager = manager(MockCredentialProvider::new());
        let passkey = manager.create_passkey().await.unwrap();
        manager.store_passkey(&passkey).unwrap();
        manager.clear_passkeys().unwrap();
        assert!(manager.load_passkeys().unwrap().is_empty());
    }
}
