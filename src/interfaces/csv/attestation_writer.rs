use crate::domain::attestation::SignedAttestation;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct AttestationRow<'a> {
    wallet: String,
    loan_size: String,
    collateral_percent: String,
    interest_rate: String,
    issued_at: i64,
    nonce: u64,
    signer: &'a str,
    signature: &'a str,
}

impl<'a> From<&'a SignedAttestation> for AttestationRow<'a> {
    fn from(attestation: &'a SignedAttestation) -> Self {
        let result = &attestation.result;
        Self {
            wallet: attestation.borrower_wallet_address.to_string(),
            loan_size: result.loan_size.value().normalize().to_string(),
            collateral_percent: result.collateral_percent.points().normalize().to_string(),
            interest_rate: result.final_interest_rate.points().normalize().to_string(),
            issued_at: attestation.freshness.issued_at.timestamp(),
            nonce: attestation.freshness.nonce,
            signer: &attestation.signer_public_key_id,
            signature: &attestation.signature,
        }
    }
}

/// Writes signed attestations as CSV, one row per attestation.
///
/// Header: `wallet,loan_size,collateral_percent,interest_rate,issued_at,nonce,signer,signature`.
pub struct AttestationWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> AttestationWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write(&mut self, attestation: &SignedAttestation) -> Result<()> {
        self.writer.serialize(AttestationRow::from(attestation))?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
