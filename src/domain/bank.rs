use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trailing window used for the lowest-balance metric.
pub const BALANCE_WINDOW_DAYS: u64 = 60;

/// A linked bank account as reported by the bank data provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankLink {
    pub account_id: String,
    pub country: String,
    /// Only reported for accounts held in the home jurisdiction.
    #[serde(default)]
    pub state: Option<String>,
}

/// Bank data attached to a borrower. Its presence means the borrower is bank-verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankProfile {
    pub country: String,
    pub state: Option<String>,
    /// Minimum balance seen over the trailing window. Negative when overdrawn.
    pub lowest_balance_60_day: Decimal,
}

impl BankProfile {
    pub fn new(link: BankLink, lowest_balance_60_day: Decimal) -> Self {
        Self {
            country: link.country,
            state: link.state,
            lowest_balance_60_day,
        }
    }
}

/// A posted bank transaction.
///
/// Positive amounts are money leaving the account, negative amounts are money
/// entering it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransaction {
    pub date: NaiveDate,
    pub amount: Decimal,
}

/// Current balance plus recent history of one account.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BankActivity {
    pub available_balance: Decimal,
    #[serde(default)]
    pub transactions: Vec<BankTransaction>,
}

impl BankActivity {
    /// Lowest balance the account held between `as_of - window_days` and `as_of`.
    ///
    /// Replays the history backwards from the available balance: an outflow is
    /// added back in, an inflow is taken out again.
    pub fn lowest_balance(&self, as_of: NaiveDate, window_days: u64) -> Decimal {
        let window_start = as_of
            .checked_sub_days(Days::new(window_days))
            .unwrap_or(NaiveDate::MIN);

        let mut in_window: Vec<&BankTransaction> = self
            .transactions
            .iter()
            .filter(|txn| txn.date >= window_start && txn.date <= as_of)
            .collect();
        // newest first
        in_window.sort_by(|a, b| b.date.cmp(&a.date));

        let mut running = self.available_balance;
        let mut lowest = running;
        for txn in in_window {
            running += txn.amount;
            lowest = lowest.min(running);
        }
        lowest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_lowest_balance_without_history_is_current_balance() {
        let activity = BankActivity {
            available_balance: dec!(250),
            transactions: vec![],
        };
        assert_eq!(activity.lowest_balance(day(31), BALANCE_WINDOW_DAYS), dec!(250));
    }

    #[test]
    fn test_lowest_balance_replays_backwards() {
        // Balance today is 100. Yesterday 400 came in, before that 50 went out.
        let activity = BankActivity {
            available_balance: dec!(100),
            transactions: vec![
                BankTransaction {
                    date: day(10),
                    amount: dec!(50),
                },
                BankTransaction {
                    date: day(30),
                    amount: dec!(-400),
                },
            ],
        };
        // 100 -> (undo inflow) -300 -> (undo outflow) -250
        assert_eq!(activity.lowest_balance(day(31), BALANCE_WINDOW_DAYS), dec!(-300));
    }

    #[test]
    fn test_lowest_balance_ignores_transactions_outside_window() {
        let activity = BankActivity {
            available_balance: dec!(100),
            transactions: vec![
                BankTransaction {
                    date: NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
                    amount: dec!(-1000),
                },
                BankTransaction {
                    date: day(20),
                    amount: dec!(-30),
                },
            ],
        };
        assert_eq!(activity.lowest_balance(day(31), BALANCE_WINDOW_DAYS), dec!(70));
    }

    #[test]
    fn test_profile_from_link() {
        let link = BankLink {
            account_id: "acc-1".to_string(),
            country: "USA".to_string(),
            state: Some("NY".to_string()),
        };
        let profile = BankProfile::new(link, dec!(42));
        assert_eq!(profile.state.as_deref(), Some("NY"));
        assert_eq!(profile.lowest_balance_60_day, dec!(42));
    }
}
