use super::money::{Amount, Percent};
use super::risk::RESULT_SCALE;
use crate::error::UnderwritingError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the borrower intends to use the loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanUse {
    /// The underlying asset may be swapped, so the position may have to be liquidated.
    Variable,
    /// The underlying asset stays the same for the life of the loan.
    Fixed,
}

impl FromStr for LoanUse {
    type Err = UnderwritingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VARIABLE" => Ok(LoanUse::Variable),
            "FIXED" => Ok(LoanUse::Fixed),
            other => Err(UnderwritingError::ValidationError(format!(
                "Unknown loan use `{other}`, expected VARIABLE or FIXED"
            ))),
        }
    }
}

impl fmt::Display for LoanUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanUse::Variable => write!(f, "VARIABLE"),
            LoanUse::Fixed => write!(f, "FIXED"),
        }
    }
}

/// A 20-byte account address, written as `0x` followed by 40 hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress([u8; 20]);

impl WalletAddress {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl From<[u8; 20]> for WalletAddress {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl FromStr for WalletAddress {
    type Err = UnderwritingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| {
                UnderwritingError::ValidationError(format!(
                    "Wallet address `{trimmed}` must start with 0x"
                ))
            })?;

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes).map_err(|e| {
            UnderwritingError::ValidationError(format!("Invalid wallet address `{trimmed}`: {e}"))
        })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = UnderwritingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WalletAddress> for String {
    fn from(wallet: WalletAddress) -> Self {
        wallet.to_string()
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// A loan request exactly as a caller submitted it.
///
/// Nothing here is trusted yet; convert it into a [`LoanRequest`] first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub wallet: String,
    pub requested_loan_size: Decimal,
    pub loan_use: String,
    pub collateral_percent: Decimal,
    pub asset: String,
}

/// A validated loan request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanRequest {
    pub requested_loan_size: Amount,
    pub loan_use: LoanUse,
    pub collateral_percent_entered: Percent,
    pub borrowed_asset_id: String,
    pub borrower_wallet_address: WalletAddress,
}

impl LoanRequest {
    pub fn new(
        requested_loan_size: Decimal,
        loan_use: LoanUse,
        collateral_percent_entered: Decimal,
        borrowed_asset_id: impl Into<String>,
        borrower_wallet_address: WalletAddress,
    ) -> Result<Self, UnderwritingError> {
        if requested_loan_size <= Decimal::ZERO {
            return Err(UnderwritingError::ValidationError(format!(
                "Requested loan size must be positive, got {requested_loan_size}"
            )));
        }
        if requested_loan_size.round_dp(RESULT_SCALE).is_zero() {
            return Err(UnderwritingError::ValidationError(format!(
                "Requested loan size {requested_loan_size} is below the smallest representable amount"
            )));
        }
        if collateral_percent_entered.scale() > RESULT_SCALE {
            return Err(UnderwritingError::ValidationError(format!(
                "Collateral percent {collateral_percent_entered} has more than {RESULT_SCALE} decimal places"
            )));
        }
        let collateral_percent_entered = Percent::new(collateral_percent_entered).map_err(|_| {
            UnderwritingError::ValidationError(format!(
                "Collateral percent must not be negative, got {collateral_percent_entered}"
            ))
        })?;
        let borrowed_asset_id = borrowed_asset_id.into();
        if borrowed_asset_id.trim().is_empty() {
            return Err(UnderwritingError::ValidationError(
                "Borrowed asset id must not be empty".to_string(),
            ));
        }

        Ok(Self {
            requested_loan_size: Amount::new(requested_loan_size)?,
            loan_use,
            collateral_percent_entered,
            borrowed_asset_id,
            borrower_wallet_address,
        })
    }
}

impl TryFrom<LoanApplication> for LoanRequest {
    type Error = UnderwritingError;

    fn try_from(application: LoanApplication) -> Result<Self, Self::Error> {
        let loan_use: LoanUse = application.loan_use.parse()?;
        let wallet: WalletAddress = application.wallet.parse()?;
        Self::new(
            application.requested_loan_size,
            loan_use,
            application.collateral_percent,
            application.asset.trim(),
            wallet,
        )
    }
}
