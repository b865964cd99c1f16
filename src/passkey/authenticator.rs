//! Software credential provider
//!
//! An in-process authenticator holding ECDSA P-256 keys generated with
//! `ring`. Keys are kept as PKCS#8 documents in a [`DocumentStorage`], so a
//! file-backed authenticator survives restarts. The user's answer to the
//! prompt is simulated by a [`UserPresence`] policy.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_ASN1_SIGNING};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::passkey::crypto::{
    assertion_signed_data, generate_random_bytes, p256_point_to_spki, sha256,
};
use crate::passkey::encoding::buffer_to_string;
use crate::passkey::errors::ProviderError;
use crate::passkey::provider::CredentialProvider;
use crate::passkey::storage::DocumentStorage;
use crate::passkey::types::{
    AuthenticatorAssertionResponse, AuthenticatorAttestationResponse, AuthenticatorResponse,
    CreationOptions, PublicKeyCredential, RequestOptions, COSE_ALG_ES256,
    PUBLIC_KEY_CREDENTIAL_TYPE,
};

/// Storage key of the authenticator's key document
pub const AUTHENTICATOR_KEYS_KEY: &str = "software_authenticator_keys";

/// Authenticator data flags: user present | user verified
const FLAGS_UP_UV: u8 = 0x01 | 0x04;

/// Simulated answer of the user to an authenticator prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserPresence {
    #[default]
    Approve,
    Cancel,
    TimeOut,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct StoredKey {
    rp_id: String,
    user_id: String, // hex
    pkcs8: String,   // hex
}

/// `ring`-backed credential provider
pub struct SoftwareAuthenticator<S> {
    storage: S,
    origin: String,
    rp_id: String,
    presence: RwLock<UserPresence>,
    rng: SystemRandom,
    write_lock: Mutex<()>,
}

impl<S: DocumentStorage> SoftwareAuthenticator<S> {
    /// Create an authenticator acting for `origin`
    ///
    /// # Errors
    /// Returns `ProviderError::Authenticator` if the origin is not a URL with
    /// a host, or uses plain HTTP anywhere but localhost.
    pub fn new(storage: S, origin: &str) -> Result<Self, ProviderError> {
        let url = Url::parse(origin)
            .map_err(|e| ProviderError::Authenticator(format!("Invalid origin '{origin}': {e}")))?;
        let host = url
            .host_str()
            .ok_or_else(|| ProviderError::Authenticator(format!("Origin '{origin}' has no host")))?
            .to_string();

        if url.scheme() != "https" && !(url.scheme() == "http" && host == "localhost") {
            return Err(ProviderError::Authenticator(
                "Origin must be https:// except for localhost".to_string(),
            ));
        }

        Ok(Self {
            storage,
            origin: url.origin().ascii_serialization(),
            rp_id: host,
            presence: RwLock::new(UserPresence::default()),
            rng: SystemRandom::new(),
            write_lock: Mutex::new(()),
        })
    }

    /// Set how the simulated user answers the next prompts
    pub fn set_user_presence(&self, presence: UserPresence) {
        *self.presence.write().unwrap_or_else(PoisonError::into_inner) = presence;
    }

    /// Origin reported in client data
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Number of credentials held
    ///
    /// # Errors
    /// Returns `ProviderError::Authenticator` if the key document cannot be read.
    pub fn credential_count(&self) -> Result<usize, ProviderError> {
        Ok(self.load_keys()?.len())
    }

    fn check_presence(&self, timeout_ms: u32) -> Result<(), ProviderError> {
        let presence = *self.presence.read().unwrap_or_else(PoisonError::into_inner);
        match presence {
            UserPresence::Approve => Ok(()),
            UserPresence::Cancel => Err(ProviderError::Cancelled),
            UserPresence::TimeOut => Err(ProviderError::TimedOut(timeout_ms)),
        }
    }

    fn load_keys(&self) -> Result<BTreeMap<String, StoredKey>, ProviderError> {
        let document = self
            .storage
            .load(AUTHENTICATOR_KEYS_KEY)
            .map_err(|e| ProviderError::Authenticator(e.to_string()))?;

        match document {
            None => Ok(BTreeMap::new()),
            Some(document) => serde_json::from_str(&document).map_err(|e| {
                ProviderError::Authenticator(format!("Key document cannot be decoded: {e}"))
            }),
        }
    }

    fn insert_key(&self, credential_id: &[u8], key: StoredKey) -> Result<(), ProviderError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut keys = self.load_keys()?;
        keys.insert(buffer_to_string(credential_id), key);

        let document = serde_json::to_string(&keys)
            .map_err(|e| ProviderError::Authenticator(e.to_string()))?;
        self.storage
            .save(AUTHENTICATOR_KEYS_KEY, &document)
            .map_err(|e| ProviderError::Authenticator(e.to_string()))
    }

    fn client_data_json(&self, ceremony: &str, challenge: &[u8]) -> Vec<u8> {
        serde_json::json!({
            "type": ceremony,
            "challenge": URL_SAFE_NO_PAD.encode(challenge),
            "origin": self.origin,
            "crossOrigin": false,
        })
        .to_string()
        .into_bytes()
    }

    fn key_pair(&self, pkcs8_hex: &str) -> Result<EcdsaKeyPair, ProviderError> {
        let pkcs8 = hex::decode(pkcs8_hex)
            .map_err(|_| ProviderError::Authenticator("Stored key is not hex".to_string()))?;
        EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &pkcs8, &self.rng)
            .map_err(|e| ProviderError::Authenticator(format!("Stored key is invalid: {e}")))
    }
}

#[async_trait]
impl<S: DocumentStorage> CredentialProvider for SoftwareAuthenticator<S> {
    async fn create(
        &self,
        options: &CreationOptions,
    ) -> Result<Option<PublicKeyCredential>, ProviderError> {
        self.check_presence(options.timeout)?;

        let supports_es256 = options
            .pub_key_cred_params
            .iter()
            .any(|param| param.alg == COSE_ALG_ES256 && param.r#type == PUBLIC_KEY_CREDENTIAL_TYPE);
        if !supports_es256 {
            return Err(ProviderError::Authenticator(
                "None of the requested algorithms is supported".to_string(),
            ));
        }

        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &self.rng)
            .map_err(|_| ProviderError::Authenticator("Key generation failed".to_string()))?;
        let pkcs8_hex = hex::encode(pkcs8.as_ref());
        let key_pair = self.key_pair(&pkcs8_hex)?;
        let public_key = p256_point_to_spki(key_pair.public_key().as_ref());

        let credential_id = generate_random_bytes(32);
        let rp_id = options.rp.id.clone().unwrap_or_else(|| self.rp_id.clone());
        self.insert_key(
            &credential_id,
            StoredKey {
                rp_id,
                user_id: buffer_to_string(&options.user.id),
                pkcs8: pkcs8_hex,
            },
        )?;
        log::debug!(
            "Software authenticator created credential {}",
            buffer_to_string(&credential_id)
        );

        Ok(Some(PublicKeyCredential {
            raw_id: credential_id,
            r#type: PUBLIC_KEY_CREDENTIAL_TYPE.to_string(),
            response: AuthenticatorResponse::Attestation(AuthenticatorAttestationResponse {
                client_data_json: self.client_data_json("webauthn.create", &options.challenge),
                attestation_object: Vec::new(), // "none" attestation is not encoded
                public_key: Some(public_key),
                public_key_algorithm: COSE_ALG_ES256,
            }),
        }))
    }

    async fn get(
        &self,
        options: &RequestOptions,
    ) -> Result<Option<PublicKeyCredential>, ProviderError> {
        let keys = self.load_keys()?;
        let (credential_id, stored) = options
            .allow_credentials
            .iter()
            .find_map(|descriptor| {
                keys.get(&buffer_to_string(&descriptor.id))
                    .map(|stored| (descriptor.id.clone(), stored))
            })
            .ok_or(ProviderError::UnknownCredential)?;

        self.check_presence(options.timeout)?;

        let mut authenticator_data = sha256(stored.rp_id.as_bytes());
        authenticator_data.push(FLAGS_UP_UV);
        authenticator_data.extend_from_slice(&0u32.to_be_bytes()); // no signature counter

        let client_data_json = self.client_data_json("webauthn.get", &options.challenge);
        let signed_data = assertion_signed_data(&authenticator_data, &client_data_json);
        let signature = self
            .key_pair(&stored.pkcs8)?
            .sign(&self.rng, &signed_data)
            .map_err(|_| ProviderError::Authenticator("Signing failed".to_string()))?;

        let user_handle = hex::decode(&stored.user_id).ok();

        Ok(Some(PublicKeyCredential {
            raw_id: credential_id,
            r#type: PUBLIC_KEY_CREDENTIAL_TYPE.to_string(),
            response: AuthenticatorResponse::Assertion(AuthenticatorAssertionResponse {
                client_data_json,
                authenticator_data,
                signature: signature.as_ref().to_vec(),
                user_handle,
            }),
        }))
    }
}
