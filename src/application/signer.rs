use crate::domain::attestation::{Freshness, SignedAttestation, canonical_encoding};
use crate::domain::loan::WalletAddress;
use crate::domain::ports::MessageSignerBox;
use crate::domain::risk::AssessmentResult;
use crate::error::{Result, UnderwritingError};
use tracing::debug;

/// Turns assessment results into signed attestations.
///
/// The key behind the `MessageSigner` is read-only, so one signer can serve
/// any number of concurrent requests.
pub struct AttestationSigner {
    signer: MessageSignerBox,
}

impl AttestationSigner {
    pub fn new(signer: MessageSignerBox) -> Self {
        Self { signer }
    }

    pub fn key_id(&self) -> String {
        self.signer.key_id()
    }

    /// Signs `result` for `wallet`, stamped with the current time and a fresh nonce.
    pub async fn sign(
        &self,
        result: AssessmentResult,
        wallet: WalletAddress,
    ) -> Result<SignedAttestation> {
        self.sign_with(result, wallet, Freshness::now()).await
    }

    pub async fn sign_with(
        &self,
        result: AssessmentResult,
        wallet: WalletAddress,
        freshness: Freshness,
    ) -> Result<SignedAttestation> {
        let payload = canonical_encoding(&result, &wallet, &freshness)?;
        let signature = self.signer.sign_message(&payload).await?;
        if signature.is_empty() {
            return Err(UnderwritingError::SigningError(
                "Signer returned an empty signature".to_string(),
            ));
        }

        debug!(%wallet, nonce = freshness.nonce, "signed loan terms");

        Ok(SignedAttestation {
            result,
            borrower_wallet_address: wallet,
            freshness,
            signature: hex::encode(signature),
            signer_public_key_id: self.signer.key_id(),
        })
    }
}
