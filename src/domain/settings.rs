use super::money::{Amount, Percent};
use crate::error::{Result, UnderwritingError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Protocol-wide parameters for a single assessment.
///
/// Fetched fresh for every request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Upper bound on any approved loan outside capped jurisdictions.
    pub max_loan_size: Amount,
    pub liquidity_buffer: Percent,
    pub risk_premium_interest_rate: Percent,
    /// Published alongside the other settings. Not an input to the assessment.
    pub supply_to_debt_ratio: Decimal,
}

impl GlobalSettings {
    /// Rejects snapshots the engine cannot work with.
    pub fn validate(self) -> Result<Self> {
        if self.max_loan_size.is_zero() {
            return Err(UnderwritingError::ValidationError(
                "Max loan size must be positive".to_string(),
            ));
        }
        if self.supply_to_debt_ratio < Decimal::ZERO {
            return Err(UnderwritingError::ValidationError(
                "Supply to debt ratio must not be negative".to_string(),
            ));
        }
        Ok(self)
    }

    /// Minimum collateral for a loan that may have to be liquidated.
    pub fn liquidation_collateral(&self) -> Percent {
        self.liquidity_buffer + self.risk_premium_interest_rate
    }
}
