use super::money::{Amount, Percent};
use crate::error::{Result, UnderwritingError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// Loan size granted per point of a state's interest-rate cap.
pub const CAP_LOAN_UNIT: Decimal = Decimal::ONE_HUNDRED;

/// Largest cap accepted from reference data, in percentage points.
pub const MAX_STATE_CAP: Decimal = Decimal::ONE_HUNDRED;

/// Regulatory interest-rate ceiling for one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawStateCap")]
pub enum StateCap {
    Uncapped,
    Capped(Percent),
}

impl StateCap {
    pub fn rate(&self) -> Option<Percent> {
        match self {
            StateCap::Uncapped => None,
            StateCap::Capped(cap) => Some(*cap),
        }
    }
}

/// Cap loan ceiling: a state capped at `cap` points allows `CAP_LOAN_UNIT * cap`.
pub fn capped_loan_size(cap: Percent) -> Amount {
    // Caps built in code bypass the load-time bound.
    let size = CAP_LOAN_UNIT
        .checked_mul(cap.points())
        .unwrap_or(Decimal::MAX);
    Amount::new(size).unwrap_or(Amount::ZERO)
}

/// Reference data encodes "no cap" as `false` and a cap as a bare number.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawStateCap {
    Rate(Decimal),
    Flag(bool),
}

impl TryFrom<RawStateCap> for StateCap {
    type Error = UnderwritingError;

    fn try_from(raw: RawStateCap) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawStateCap::Flag(false) => Ok(StateCap::Uncapped),
            RawStateCap::Flag(true) => Err(UnderwritingError::ConfigError(
                "State cap must be `false` or a rate, got `true`".to_string(),
            )),
            RawStateCap::Rate(rate) if rate > MAX_STATE_CAP => Err(UnderwritingError::ConfigError(
                format!("State cap must not exceed {MAX_STATE_CAP}, got {rate}"),
            )),
            RawStateCap::Rate(rate) if rate > Decimal::ZERO => {
                Ok(StateCap::Capped(Percent::new(rate)?))
            }
            RawStateCap::Rate(rate) => Err(UnderwritingError::ConfigError(format!(
                "State cap must be positive, got {rate}"
            ))),
        }
    }
}

/// Static per-state interest-rate caps. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct StateCapLookup {
    caps: HashMap<String, StateCap>,
}

impl StateCapLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_cap(mut self, state: impl Into<String>, cap: StateCap) -> Self {
        self.caps.insert(state.into(), cap);
        self
    }

    /// States missing from the reference data are treated as uncapped.
    pub fn cap_for(&self, state: &str) -> StateCap {
        self.caps.get(state).copied().unwrap_or(StateCap::Uncapped)
    }

    pub fn len(&self) -> usize {
        self.caps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caps.is_empty()
    }
}
