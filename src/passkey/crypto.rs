//! Passkey cryptography operations
//!
//! Challenge generation, P-256 public key encoding and ES256 assertion
//! verification.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use ring::digest;
use ring::signature;

use crate::passkey::errors::ProviderError;

/// DER prefix of a SubjectPublicKeyInfo holding an uncompressed P-256 point
/// (id-ecPublicKey, prime256v1, BIT STRING of 66 bytes).
const P256_SPKI_PREFIX: [u8; 26] = [
    0x30, 0x59, 0x30, 0x13, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01, 0x06, 0x08,
    0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07, 0x03, 0x42, 0x00,
];

/// Length of an uncompressed SEC1 P-256 point
const P256_POINT_LEN: usize = 65;

/// Generate `length` bytes of secure random data
#[must_use]
pub fn generate_random_bytes(length: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; length];
    rand::rng().fill_bytes(&mut bytes);
    bytes
}

/// Wrap an uncompressed P-256 point into SubjectPublicKeyInfo DER
#[must_use]
pub fn p256_point_to_spki(point: &[u8]) -> Vec<u8> {
    let mut spki = Vec::with_capacity(P256_SPKI_PREFIX.len() + point.len());
    spki.extend_from_slice(&P256_SPKI_PREFIX);
    spki.extend_from_slice(point);
    spki
}

/// Extract the uncompressed P-256 point from SubjectPublicKeyInfo DER
///
/// # Errors
/// Returns `ProviderError::VerificationFailed` if the key is not a P-256 SPKI.
pub fn spki_to_p256_point(spki: &[u8]) -> Result<&[u8], ProviderError> {
    match spki.strip_prefix(P256_SPKI_PREFIX.as_slice()) {
        Some(point) if point.len() == P256_POINT_LEN && point[0] == 0x04 => Ok(point),
        _ => Err(ProviderError::VerificationFailed(
            "Public key is not an uncompressed P-256 SubjectPublicKeyInfo".to_string(),
        )),
    }
}

/// SHA-256 digest
#[must_use]
pub fn sha256(data: &[u8]) -> Vec<u8> {
    digest::digest(&digest::SHA256, data).as_ref().to_vec()
}

/// Build the signed message of an assertion: `authenticatorData || SHA-256(clientDataJSON)`
#[must_use]
pub fn assertion_signed_data(authenticator_data: &[u8], client_data_json: &[u8]) -> Vec<u8> {
    let client_data_hash = digest::digest(&digest::SHA256, client_data_json);
    let mut data = Vec::with_capacity(authenticator_data.len() + client_data_hash.as_ref().len());
    data.extend_from_slice(authenticator_data);
    data.extend_from_slice(client_data_hash.as_ref());
    data
}

/// Verify an ES256 (ECDSA P-256 with SHA-256, ASN.1 DER) signature
///
/// # Errors
/// Returns `ProviderError::VerificationFailed` if the key is malformed or the
/// signature does not verify.
pub fn verify_es256_signature(
    public_key_spki: &[u8],
    data: &[u8],
    signature_der: &[u8],
) -> Result<(), ProviderError> {
    let point = spki_to_p256_point(public_key_spki)?;
    signature::UnparsedPublicKey::new(&signature::ECDSA_P256_SHA256_ASN1, point)
        .verify(data, signature_der)
        .map_err(|_| ProviderError::VerificationFailed("Signature verification failed".to_string()))
}

/// Check the `type`, `challenge` and `origin` members of a clientDataJSON
///
/// # Errors
/// Returns `ProviderError::VerificationFailed` on the first mismatch.
pub fn verify_client_data(
    client_data_json: &[u8],
    expected_type: &str,
    expected_challenge: &[u8],
    expected_origin: &str,
) -> Result<(), ProviderError> {
    let client_data: serde_json::Value = serde_json::from_slice(client_data_json)
        .map_err(|_| ProviderError::VerificationFailed("Invalid client data format".to_string()))?;

    if client_data["type"] != expected_type {
        return Err(ProviderError::VerificationFailed(
            "Invalid client data type".to_string(),
        ));
    }

    if client_data["challenge"] != URL_SAFE_NO_PAD.encode(expected_challenge) {
        return Err(ProviderError::VerificationFailed(
            "Challenge verification failed".to_string(),
        ));
    }

    if client_data["origin"] != expected_origin {
        return Err(ProviderError::VerificationFailed(
            "Origin verification failed".to_string(),
        ));
    }

    Ok(())
}
