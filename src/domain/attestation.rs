use super::loan::WalletAddress;
use super::risk::{AssessmentResult, RESULT_SCALE};
use crate::error::{Result, UnderwritingError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Prefix of every signed payload. Versioned so the layout can evolve.
pub const DOMAIN_TAG: &[u8; 26] = b"loan-terms-attestation/v1\0";

/// Width of each encoded decimal field.
pub const FIXED_WIDTH: usize = 32;

/// Total size of the canonical payload.
pub const ENCODED_LEN: usize = DOMAIN_TAG.len() + 20 + 3 * FIXED_WIDTH + 8 + 8;

/// Marks a payload as belonging to one point in time, so identical terms
/// signed for a later request produce a different attestation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Freshness {
    pub issued_at: DateTime<Utc>,
    pub nonce: u64,
}

impl Freshness {
    pub fn new(issued_at: DateTime<Utc>, nonce: u64) -> Self {
        Self { issued_at, nonce }
    }

    /// Current time plus a random nonce.
    pub fn now() -> Self {
        Self {
            issued_at: Utc::now(),
            nonce: rand::random(),
        }
    }
}

/// Signed statement of loan terms for one borrower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAttestation {
    pub result: AssessmentResult,
    pub borrower_wallet_address: WalletAddress,
    pub freshness: Freshness,
    /// Lowercase hex.
    pub signature: String,
    /// Lowercase hex of the signer's public key.
    pub signer_public_key_id: String,
}

impl SignedAttestation {
    /// Rebuilds the exact bytes that were signed.
    pub fn signed_payload(&self) -> Result<Vec<u8>> {
        canonical_encoding(&self.result, &self.borrower_wallet_address, &self.freshness)
    }
}

/// Fixed-order, fixed-width big-endian encoding of an attestation payload.
///
/// Layout: domain tag, wallet (20 bytes), loan size, collateral percent and
/// interest rate (32 bytes each, value scaled by 10^18), issued-at seconds
/// (i64), nonce (u64).
pub fn canonical_encoding(
    result: &AssessmentResult,
    wallet: &WalletAddress,
    freshness: &Freshness,
) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(ENCODED_LEN);
    out.extend_from_slice(DOMAIN_TAG);
    out.extend_from_slice(wallet.as_bytes());
    out.extend_from_slice(&encode_fixed(result.loan_size.value())?);
    out.extend_from_slice(&encode_fixed(result.collateral_percent.points())?);
    out.extend_from_slice(&encode_fixed(result.final_interest_rate.points())?);
    out.extend_from_slice(&freshness.issued_at.timestamp().to_be_bytes());
    out.extend_from_slice(&freshness.nonce.to_be_bytes());
    Ok(out)
}

/// Encodes `value * 10^18` as a 32-byte big-endian unsigned integer.
pub fn encode_fixed(value: Decimal) -> Result<[u8; FIXED_WIDTH]> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(UnderwritingError::SigningError(format!(
            "Cannot encode negative value {value}"
        )));
    }

    let rounded = value.round_dp(RESULT_SCALE);
    let mantissa = u128::try_from(rounded.mantissa()).map_err(|_| {
        UnderwritingError::SigningError(format!("Cannot encode value {value}"))
    })?;
    let scaled = 10u128
        .checked_pow(RESULT_SCALE - rounded.scale())
        .and_then(|factor| mantissa.checked_mul(factor))
        .ok_or_else(|| {
            UnderwritingError::SigningError(format!("Value {value} overflows the encoding"))
        })?;

    let mut out = [0u8; FIXED_WIDTH];
    out[FIXED_WIDTH - 16..].copy_from_slice(&scaled.to_be_bytes());
    Ok(out)
}
