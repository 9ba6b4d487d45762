// src/wallet/key_management.rs
//! Key material for delegated access keys.
//!
//! Provides generation, parsing and usage of the ed25519 key pairs that back
//! function-call access keys:
//! - Fresh key generation from the OS random number generator
//! - NEAR text encoding (`ed25519:<base58>`)
//! - Message signing
//!
//! Uses the following primitives:
//! - ed25519 signatures (via `ed25519-dalek`)
//! - Base58 text encoding (via `bs58`)

use crate::error::{Error, Result};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use std::str::FromStr;

/// Curve prefix used by NEAR for ed25519 keys.
const ED25519_PREFIX: &str = "ed25519:";

/// An ed25519 key pair usable as a NEAR access key.
///
/// # Security Notes
/// - The secret half is only exposed through [`KeyPair::secret_key_string`],
///   which the credential store uses to persist it
/// - `Debug` prints the public key only
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generates a new key pair from the operating system RNG.
    ///
    /// The secret never leaves the process until it is persisted locally.
    pub fn generate() -> Self {
        KeyPair {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Raw 32-byte public key, as it appears in transaction encodings.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.verifying_key().to_bytes()
    }

    /// Public key in `ed25519:<base58>` form.
    pub fn public_key_string(&self) -> String {
        format!(
            "{}{}",
            ED25519_PREFIX,
            bs58::encode(self.public_key_bytes()).into_string()
        )
    }

    /// Secret key in `ed25519:<base58(secret ‖ public)>` form.
    ///
    /// This is the layout NEAR tooling uses for stored private keys.
    pub fn secret_key_string(&self) -> String {
        format!(
            "{}{}",
            ED25519_PREFIX,
            bs58::encode(self.signing_key.to_keypair_bytes()).into_string()
        )
    }

    /// Signs a message.
    ///
    /// # Returns
    /// 64-byte ed25519 signature
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        let signature: Signature = self.signing_key.sign(message);
        signature.to_bytes()
    }
}

impl FromStr for KeyPair {
    type Err = Error;

    /// Parses a NEAR secret key.
    ///
    /// Accepts both the 64-byte `secret ‖ public` form and a bare 32-byte
    /// seed. For the 64-byte form the embedded public half must match the
    /// one derived from the secret.
    fn from_str(encoded: &str) -> Result<Self> {
        let body = encoded.strip_prefix(ED25519_PREFIX).ok_or_else(|| {
            Error::InvalidKey(format!(
                "unsupported key type in `{}`",
                encoded.split(':').next().unwrap_or_default()
            ))
        })?;

        let bytes = bs58::decode(body)
            .into_vec()
            .map_err(|e| Error::InvalidKey(format!("base58 decoding failed: {}", e)))?;

        let signing_key = match bytes.len() {
            64 => {
                let mut keypair = [0u8; 64];
                keypair.copy_from_slice(&bytes);
                SigningKey::from_keypair_bytes(&keypair)
                    .map_err(|e| Error::InvalidKey(format!("inconsistent key pair: {}", e)))?
            }
            32 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes);
                SigningKey::from_bytes(&seed)
            }
            n => {
                return Err(Error::InvalidKey(format!(
                    "expected 32 or 64 key bytes, got {}",
                    n
                )))
            }
        };

        Ok(KeyPair { signing_key })
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key_string())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::Verifier;

    #[test]
    fn test_secret_key_string_roundtrip_keeps_public_key() {
        let key = KeyPair::generate();
        let parsed: KeyPair = key.secret_key_string().parse().unwrap();
        assert_eq!(parsed.public_key_string(), key.public_key_string());
    }

    #[test]
    fn test_seed_only_form_is_accepted() {
        let seed = [7u8; 32];
        let encoded = format!("ed25519:{}", bs58::encode(seed).into_string());
        let parsed: KeyPair = encoded.parse().unwrap();
        assert_eq!(
            parsed.public_key_bytes(),
            SigningKey::from_bytes(&seed).verifying_key().to_bytes()
        );
    }

    #[test]
    fn test_rejects_other_curves_and_lengths() {
        assert!(matches!(
            "secp256k1:abc".parse::<KeyPair>(),
            Err(Error::InvalidKey(_))
        ));
        let short = format!("ed25519:{}", bs58::encode([1u8; 10]).into_string());
        assert!(matches!(short.parse::<KeyPair>(), Err(Error::InvalidKey(_))));
        assert!("ed25519:0OIl".parse::<KeyPair>().is_err());
    }

    #[test]
    fn test_rejects_mismatched_public_half() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        let mut bytes = a.signing_key.to_keypair_bytes();
        bytes[32..].copy_from_slice(&b.public_key_bytes());
        let encoded = format!("ed25519:{}", bs58::encode(bytes).into_string());
        assert!(encoded.parse::<KeyPair>().is_err());
    }

    #[test]
    fn test_signature_verifies() {
        let key = KeyPair::generate();
        let signature = Signature::from_bytes(&key.sign(b"payload"));
        assert!(key.verifying_key().verify(b"payload", &signature).is_ok());
    }

    #[test]
    fn test_debug_hides_secret() {
        let key = KeyPair::generate();
        let rendered = format!("{:?}", key);
        assert!(!rendered.contains(&key.secret_key_string()));
    }
}
