use crate::domain::ports::MessageSigner;
use crate::error::{Result, UnderwritingError};
use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use std::path::Path;
use std::sync::Arc;

/// Ed25519 signer holding the service key in memory.
///
/// `Clone` shares the key; it is never mutated after construction.
#[derive(Clone)]
pub struct Ed25519Signer {
    key: Arc<SigningKey>,
}

impl Ed25519Signer {
    pub fn new(key: SigningKey) -> Self {
        Self { key: Arc::new(key) }
    }

    /// Fresh random key. Attestations signed with it cannot be verified after restart.
    pub fn generate() -> Self {
        Self::new(SigningKey::generate(&mut OsRng))
    }

    /// Parses a 32-byte secret key written as 64 hex digits (optional `0x` prefix).
    pub fn from_hex(secret: &str) -> Result<Self> {
        let trimmed = secret.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| UnderwritingError::SigningError(format!("Invalid signing key: {e}")))?;
        Ok(Self::new(SigningKey::from_bytes(&bytes)))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let secret = std::fs::read_to_string(path).map_err(|e| {
            UnderwritingError::SigningError(format!(
                "Signing key unavailable at {}: {e}",
                path.display()
            ))
        })?;
        Self::from_hex(&secret)
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }
}

#[async_trait]
impl MessageSigner for Ed25519Signer {
    fn key_id(&self) -> String {
        hex::encode(self.key.verifying_key().as_bytes())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>> {
        let signature = self
            .key
            .try_sign(message)
            .map_err(|e| UnderwritingError::SigningError(e.to_string()))?;
        Ok(signature.to_bytes().to_vec())
    }
}
