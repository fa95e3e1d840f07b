//! Risk assessment for a single loan request.
//!
//! Everything in here is a pure function of an [`AssessmentContext`] and a
//! [`LoanRequest`]: the same inputs always yield the same terms, which is what
//! makes a signature over those terms worth anything.

use super::bank::BankProfile;
use super::loan::{LoanRequest, LoanUse};
use super::money::{Amount, Percent};
use super::settings::GlobalSettings;
use super::state_caps::{StateCap, StateCapLookup, capped_loan_size};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Collateral required when nothing else about the borrower is known.
pub const DEFAULT_MINIMUM_COLLATERAL: Percent = Percent::from_points_unchecked(dec!(150));

/// Decimal places kept in every assessment output.
pub const RESULT_SCALE: u32 = 18;

const BALANCE_DISCOUNT_WEIGHT: Decimal = dec!(0.5);

/// Everything the engine needs besides the request itself.
///
/// Built once per request by parameter resolution and never mutated.
#[derive(Debug, Clone)]
pub struct AssessmentContext {
    pub settings: GlobalSettings,
    pub bank_profile: Option<BankProfile>,
    pub state_caps: Arc<StateCapLookup>,
    /// Country code whose states are subject to the cap table.
    pub home_country: String,
    /// Current supply rate of the borrowed asset.
    pub supply_rate: Percent,
}

impl AssessmentContext {
    /// The interest-rate cap that binds this borrower, if any.
    ///
    /// Only bank-verified borrowers in the home country with a reported state
    /// can be capped.
    pub fn state_cap(&self) -> Option<Percent> {
        let profile = self.bank_profile.as_ref()?;
        if profile.country != self.home_country {
            return None;
        }
        let state = profile.state.as_deref()?;
        match self.state_caps.cap_for(state) {
            StateCap::Capped(cap) => Some(cap),
            StateCap::Uncapped => None,
        }
    }
}

/// Terms offered to the borrower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub final_interest_rate: Percent,
    pub collateral_percent: Percent,
    pub loan_size: Amount,
}

/// Derives loan size, collateral and interest rate for `request`.
pub fn assess(context: &AssessmentContext, request: &LoanRequest) -> AssessmentResult {
    let settings = &context.settings;
    let bank_connected = context.bank_profile.is_some();

    let mut loan_size = request.requested_loan_size.min(settings.max_loan_size);

    let mut minimum_collateral = DEFAULT_MINIMUM_COLLATERAL;
    if bank_connected {
        minimum_collateral = Percent::ZERO;
    }

    let state_cap = context.state_cap();
    if let Some(cap) = state_cap {
        // A capped state dictates the loan size, even above the protocol maximum.
        loan_size = capped_loan_size(cap);
    }

    minimum_collateral = match (request.loan_use, bank_connected) {
        // The asset may be swapped or the borrower is unverified: liquidation must stay possible.
        (LoanUse::Variable, _) | (LoanUse::Fixed, false) => settings.liquidation_collateral(),
        (LoanUse::Fixed, true) => minimum_collateral,
    };

    let collateral_percent = minimum_collateral.max(request.collateral_percent_entered);

    let mut premium_multiplier = Decimal::ONE;
    if let Some(profile) = &context.bank_profile {
        premium_multiplier *= balance_factor(profile.lowest_balance_60_day, loan_size);
    }
    premium_multiplier *= collateral_factor(collateral_percent);

    let final_interest_rate = match state_cap {
        Some(cap) => cap,
        None => context.supply_rate + settings.risk_premium_interest_rate * premium_multiplier,
    };

    AssessmentResult {
        final_interest_rate: final_interest_rate.round_dp(RESULT_SCALE),
        collateral_percent: collateral_percent.round_dp(RESULT_SCALE),
        loan_size: loan_size.round_dp(RESULT_SCALE),
    }
}

/// `1 - 0.5 * (lowest balance / loan size)`, clamped to `[0, 1]`.
///
/// A zero-sized loan is fully covered by any balance and earns the full discount.
pub fn balance_factor(lowest_balance: Decimal, loan_size: Amount) -> Decimal {
    if loan_size.is_zero() {
        return Decimal::ZERO;
    }
    let discount = lowest_balance
        .checked_div(loan_size.value())
        .and_then(|ratio| BALANCE_DISCOUNT_WEIGHT.checked_mul(ratio));
    match discount {
        Some(discount) => clamp_unit(Decimal::ONE - discount),
        // The ratio left the representable range, so the factor sits at a bound.
        None if lowest_balance.is_sign_negative() => Decimal::ONE,
        None => Decimal::ZERO,
    }
}

/// `1 - 2/3 * collateral`, with collateral as a fraction, clamped to `[0, 1]`.
///
/// Reaches zero at 150% collateral.
pub fn collateral_factor(collateral_percent: Percent) -> Decimal {
    let two_thirds = Decimal::TWO / Decimal::from(3);
    clamp_unit(Decimal::ONE - two_thirds * collateral_percent.as_fraction())
}

fn clamp_unit(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, Decimal::ONE)
}
