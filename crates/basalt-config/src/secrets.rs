//! Secret property values
//!
//! Sensitive properties (tokens, passwords) can be stored in encrypted form
//! and are decrypted transparently during resolution. The resolver only
//! depends on the [`SecretCodec`] capability; which cipher backs it is the
//! caller's choice. [`AesGcmCodec`] is the stock implementation, recognizing
//! values wrapped as `{aes-gcm}<base64(nonce || ciphertext)>`.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use rand::RngCore;

use crate::{ConfigError, Result};

/// Marker prefix on encrypted property values
const ENCRYPTED_PREFIX: &str = "{aes-gcm}";

/// Nonce size for AES-256-GCM (96 bits)
const NONCE_SIZE: usize = 12;

/// Key size for AES-256 (256 bits)
const KEY_SIZE: usize = 32;

/// Capability to detect and reverse the encryption of property values.
///
/// `decrypt` is only called on values for which `is_encrypted` returned true.
/// Implementations must be synchronous and side-effect-free with respect to
/// the resolver.
pub trait SecretCodec: Send + Sync {
    /// Whether the raw value is in encrypted form
    fn is_encrypted(&self, raw: &str) -> bool;

    /// Reverse the encryption transform
    fn decrypt(&self, raw: &str) -> Result<String>;
}

/// Codec for stores that carry no encrypted values. Every value passes
/// through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCodec;

impl SecretCodec for PlainCodec {
    fn is_encrypted(&self, _raw: &str) -> bool {
        false
    }

    fn decrypt(&self, raw: &str) -> Result<String> {
        Ok(raw.to_string())
    }
}

/// AES-256-GCM codec over `{aes-gcm}`-wrapped values
#[derive(Clone)]
pub struct AesGcmCodec {
    key: Option<[u8; KEY_SIZE]>,
}

impl AesGcmCodec {
    /// Codec with a decryption key
    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Self { key: Some(key) }
    }

    /// Codec without a key: still recognizes encrypted values, but every
    /// decryption attempt fails. Used when the scanner runs without access
    /// to the secret key.
    pub fn sealed() -> Self {
        Self { key: None }
    }

    /// Parse a key from a hex or base64 string
    pub fn from_key_str(key_str: &str) -> Result<Self> {
        Ok(Self::new(Self::parse_key(key_str)?))
    }

    fn parse_key(key_str: &str) -> Result<[u8; KEY_SIZE]> {
        // Try hex first
        if key_str.len() == KEY_SIZE * 2 {
            let bytes = hex::decode(key_str)
                .map_err(|e| ConfigError::encryption(format!("Invalid hex key: {e}")))?;
            if bytes.len() == KEY_SIZE {
                let mut key = [0u8; KEY_SIZE];
                key.copy_from_slice(&bytes);
                return Ok(key);
            }
        }

        // Try base64
        let bytes = BASE64
            .decode(key_str.trim())
            .map_err(|e| ConfigError::encryption(format!("Invalid base64 key: {e}")))?;

        if bytes.len() != KEY_SIZE {
            return Err(ConfigError::encryption(format!(
                "Key must be {} bytes, got {}",
                KEY_SIZE,
                bytes.len()
            )));
        }

        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&bytes);
        Ok(key)
    }

    /// Generate a new random key
    pub fn generate_key() -> [u8; KEY_SIZE] {
        let mut key = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut key);
        key
    }

    /// Encrypt a plaintext value into the wrapped form this codec recognizes
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let key = self
            .key
            .ok_or_else(|| ConfigError::encryption("No secret key configured"))?;

        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| ConfigError::encryption(format!("Failed to create cipher: {e}")))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| ConfigError::encryption(format!("Encryption failed: {e}")))?;

        let mut wrapped = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        wrapped.extend_from_slice(&nonce_bytes);
        wrapped.extend_from_slice(&ciphertext);

        Ok(format!("{ENCRYPTED_PREFIX}{}", BASE64.encode(wrapped)))
    }
}

impl SecretCodec for AesGcmCodec {
    fn is_encrypted(&self, raw: &str) -> bool {
        raw.starts_with(ENCRYPTED_PREFIX)
    }

    fn decrypt(&self, raw: &str) -> Result<String> {
        let encoded = raw
            .strip_prefix(ENCRYPTED_PREFIX)
            .ok_or_else(|| ConfigError::encryption("Value is not encrypted"))?;

        let key = self
            .key
            .ok_or_else(|| ConfigError::encryption("No secret key configured"))?;

        let wrapped = BASE64
            .decode(encoded)
            .map_err(|e| ConfigError::encryption(format!("Invalid ciphertext base64: {e}")))?;

        if wrapped.len() < NONCE_SIZE {
            return Err(ConfigError::encryption("Invalid nonce size"));
        }
        let (nonce_bytes, ciphertext) = wrapped.split_at(NONCE_SIZE);

        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| ConfigError::encryption(format!("Failed to create cipher: {e}")))?;

        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| ConfigError::encryption(format!("Decryption failed: {e}")))?;

        String::from_utf8(plaintext)
            .map_err(|e| ConfigError::encryption(format!("Invalid UTF-8 in decrypted value: {e}")))
    }
}

impl std::fmt::Debug for AesGcmCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmCodec")
            .field("key", &self.key.map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_round_trip() {
        let codec = AesGcmCodec::new(AesGcmCodec::generate_key());
        let wrapped = codec.encrypt("my-secret-token").unwrap();

        assert!(wrapped.starts_with("{aes-gcm}"));
        assert!(codec.is_encrypted(&wrapped));
        assert_eq!(codec.decrypt(&wrapped).unwrap(), "my-secret-token");
    }

    #[test]
    fn plaintext_is_not_detected_as_encrypted() {
        let codec = AesGcmCodec::new(AesGcmCodec::generate_key());
        assert!(!codec.is_encrypted("foo"));
        assert!(!codec.is_encrypted("{b64}foo"));
    }

    #[test]
    fn wrong_key_fails() {
        let codec = AesGcmCodec::new(AesGcmCodec::generate_key());
        let other = AesGcmCodec::new(AesGcmCodec::generate_key());

        let wrapped = codec.encrypt("secret").unwrap();
        assert!(other.decrypt(&wrapped).is_err());
    }

    #[test]
    fn sealed_codec_detects_but_cannot_decrypt() {
        let keyed = AesGcmCodec::new(AesGcmCodec::generate_key());
        let wrapped = keyed.encrypt("secret").unwrap();

        let sealed = AesGcmCodec::sealed();
        assert!(sealed.is_encrypted(&wrapped));
        let err = sealed.decrypt(&wrapped).unwrap_err();
        assert!(err.to_string().contains("No secret key configured"));
    }

    #[test]
    fn key_parses_from_hex_and_base64() {
        let key = AesGcmCodec::generate_key();

        let codec = AesGcmCodec::from_key_str(&hex::encode(key)).unwrap();
        let wrapped = codec.encrypt("v").unwrap();
        assert_eq!(codec.decrypt(&wrapped).unwrap(), "v");

        let codec = AesGcmCodec::from_key_str(&BASE64.encode(key)).unwrap();
        assert_eq!(codec.decrypt(&wrapped).unwrap(), "v");
    }

    #[test]
    fn short_key_is_rejected() {
        let err = AesGcmCodec::from_key_str(&BASE64.encode([0u8; 16])).unwrap_err();
        assert!(matches!(err, ConfigError::Encryption(_)));
    }

    #[test]
    fn truncated_wrapped_value_is_rejected() {
        let codec = AesGcmCodec::new(AesGcmCodec::generate_key());
        let err = codec.decrypt("{aes-gcm}AAAA").unwrap_err();
        assert!(matches!(err, ConfigError::Encryption(_)));
    }

    #[test]
    fn plain_codec_passes_everything_through() {
        let codec = PlainCodec;
        assert!(!codec.is_encrypted("{aes-gcm}abc"));
        assert_eq!(codec.decrypt("abc").unwrap(), "abc");
    }

    #[test]
    fn debug_redacts_key() {
        let codec = AesGcmCodec::new(AesGcmCodec::generate_key());
        let debug = format!("{codec:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains('['));
    }
}
