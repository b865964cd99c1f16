//! Byte/string conversions used by the passkey store and credential options
//!
//! Stored records use lowercase hex. Binary fields of the credential
//! request/response types serialize as unpadded Base64URL, matching the JSON
//! form of the `WebAuthn` API.

use crate::passkey::errors::PasskeyError;

/// Encode a binary buffer into the storage string format (lowercase hex)
#[must_use]
pub fn buffer_to_string(buffer: &[u8]) -> String {
    hex::encode(buffer)
}

/// Decode a storage string back into bytes
///
/// Upper- and lowercase digits are both accepted.
///
/// # Errors
/// Returns `PasskeyError::Encoding` if the string has odd length or contains
/// non-hex characters.
pub fn hex_string_to_bytes(value: &str) -> Result<Vec<u8>, PasskeyError> {
    hex::decode(value).map_err(|e| PasskeyError::Encoding(format!("invalid hex '{value}': {e}")))
}

/// Serde adapter for `Vec<u8>` fields carried as unpadded Base64URL strings
pub mod base64url {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as Base64URL
    ///
    /// # Errors
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Deserialize bytes from Base64URL
    ///
    /// # Errors
    /// Fails if the input is not a string or not valid Base64URL.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        URL_SAFE_NO_PAD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let mut large = vec![0u8; 4096];
        for (i, byte) in large.iter_mut().enumerate() {
            *byte = u8::try_from(i % 256).unwrap();
        }

        for buffer in [Vec::new(), vec![0x00], vec![0xab, 0x12], large] {
            let encoded = buffer_to_string(&buffer);
            assert_eq!(encoded.len(), buffer.len() * 2);
            assert_eq!(hex_string_to_bytes(&encoded).unwrap(), buffer);
        }
    }

    #[test]
    fn test_encoding_is_lowercase() {
        assert_eq!(buffer_to_string(&[0xAB, 0xCD, 0x01]), "abcd01");
        assert_eq!(hex_string_to_bytes("ABCD01").unwrap(), vec![0xab, 0xcd, 0x01]);
    }

    #[test]
    fn test_invalid_hex_is_rejected() {
        assert!(matches!(
            hex_string_to_bytes("abc"),
            Err(PasskeyError::Encoding(_))
        ));
        assert!(matches!(
            hex_string_to_bytes("zz"),
            Err(PasskeyError::Encoding(_))
        ));
    }
}
