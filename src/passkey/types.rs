//! Passkey data types
//!
//! This module defines the stored passkey record, the in-memory passkey handed
//! to the smart-account SDK, and the request/response structures exchanged
//! with a credential provider.

use serde::{Deserialize, Serialize};

use crate::passkey::encoding::base64url;

/// Credential type string used by every public-key credential
pub const PUBLIC_KEY_CREDENTIAL_TYPE: &str = "public-key";

/// COSE algorithm identifier for ECDSA w/ SHA-256 (RFC 8152 §8.1)
pub const COSE_ALG_ES256: i32 = -7;

/// Stored passkey identity record
///
/// Both fields are lowercase hex encodings of the raw binary values.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PasskeyItem {
    pub raw_id: String,
    pub public_key: String,
}

impl PasskeyItem {
    /// Create a new `PasskeyItem`
    pub fn new(raw_id: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            raw_id: raw_id.into(),
            public_key: public_key.into(),
        }
    }
}

/// A passkey usable as smart-account signer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Passkey {
    pub raw_id: Vec<u8>,
    pub public_key: Vec<u8>, // SubjectPublicKeyInfo DER
}

/// Relying party information
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RelyingParty {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>, // Defaults to the caller's origin domain when absent
    pub name: String,
}

/// User entity
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UserEntity {
    #[serde(with = "base64url")]
    pub id: Vec<u8>,
    pub name: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// Public key credential parameters
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PublicKeyCredentialParameters {
    #[serde(rename = "type")]
    pub r#type: String, // Always "public-key"
    pub alg: i32,
}

impl PublicKeyCredentialParameters {
    /// ES256 (ECDSA P-256 with SHA-256)
    #[must_use]
    pub fn es256() -> Self {
        Self {
            r#type: PUBLIC_KEY_CREDENTIAL_TYPE.to_string(),
            alg: COSE_ALG_ES256,
        }
    }
}

/// Public key credential descriptor
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PublicKeyCredentialDescriptor {
    #[serde(rename = "type")]
    pub r#type: String, // Always "public-key"
    #[serde(with = "base64url")]
    pub id: Vec<u8>,
}

impl PublicKeyCredentialDescriptor {
    /// Descriptor for a single public-key credential id
    #[must_use]
    pub fn public_key(id: Vec<u8>) -> Self {
        Self {
            r#type: PUBLIC_KEY_CREDENTIAL_TYPE.to_string(),
            id,
        }
    }
}

/// Options for creating a new credential
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CreationOptions {
    pub rp: RelyingParty,
    pub user: UserEntity,
    #[serde(with = "base64url")]
    pub challenge: Vec<u8>,
    #[serde(rename = "pubKeyCredParams")]
    pub pub_key_cred_params: Vec<PublicKeyCredentialParameters>,
    pub timeout: u32,        // Milliseconds
    pub attestation: String, // "none", "indirect", "direct"
}

/// Options for asserting an existing credential
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RequestOptions {
    #[serde(rename = "allowCredentials")]
    pub allow_credentials: Vec<PublicKeyCredentialDescriptor>,
    #[serde(with = "base64url")]
    pub challenge: Vec<u8>,
    pub timeout: u32, // Milliseconds
    #[serde(rename = "userVerification")]
    pub user_verification: String, // "required", "preferred", "discouraged"
}

/// Authenticator attestation response returned by `create`
#[derive(Clone, Debug)]
pub struct AuthenticatorAttestationResponse {
    pub client_data_json: Vec<u8>,
    pub attestation_object: Vec<u8>,
    pub public_key: Option<Vec<u8>>, // `getPublicKey()`; absent when the provider cannot expose it
    pub public_key_algorithm: i32,
}

/// Authenticator assertion response returned by `get`
#[derive(Clone, Debug)]
pub struct AuthenticatorAssertionResponse {
    pub client_data_json: Vec<u8>,
    pub authenticator_data: Vec<u8>,
    pub signature: Vec<u8>,
    pub user_handle: Option<Vec<u8>>,
}

/// Response carried by a public-key credential
#[derive(Clone, Debug)]
pub enum AuthenticatorResponse {
    Attestation(AuthenticatorAttestationResponse),
    Assertion(AuthenticatorAssertionResponse),
}

/// Credential returned by a provider
#[derive(Clone, Debug)]
pub struct PublicKeyCredential {
    pub raw_id: Vec<u8>,
    pub r#type: String,
    pub response: AuthenticatorResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_uses_camel_case_keys() {
        let item = PasskeyItem::new("ab12", "cd34");
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"rawId":"ab12","publicKey":"cd34"}"#);

        let parsed: PasskeyItem = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, item);
    }

    #[test]
    fn test_request_options_json_shape() {
        let options = RequestOptions {
            allow_credentials: vec![PublicKeyCredentialDescriptor::public_key(vec![0xab, 0x12])],
            challenge: vec![0u8; 4],
            timeout: 60_000,
            user_verification: "required".to_string(),
        };

        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(value["allowCredentials"][0]["type"], "public-key");
        assert_eq!(value["allowCredentials"][0]["id"], "qxI");
        assert_eq!(value["challenge"], "AAAAAA");
        assert_eq!(value["userVerification"], "required");
    }

    #[test]
    fn test_creation_options_omit_missing_rp_id() {
        let options = CreationOptions {
            rp: RelyingParty {
                id: None,
                name: "Safe SmartAccount".to_string(),
            },
            user: UserEntity {
                id: vec![1, 2, 3],
                name: "Safe Owner".to_string(),
                display_name: "Safe Owner".to_string(),
            },
            challenge: vec![9; 32],
            pub_key_cred_params: vec![PublicKeyCredentialParameters::es256()],
            timeout: 60_000,
            attestation: "none".to_string(),
        };

        let value = serde_json::to_value(&options).unwrap();
        assert!(value["rp"].get("id").is_none());
        assert_eq!(value["pubKeyCredParams"][0]["alg"], -7);
        assert_eq!(value["user"]["displayName"], "Safe Owner");
    }
}
