//! Reference environment loaded from a JSON file.
//!
//! Stands in for the indexing service, bank data provider and rate feed when
//! running the service locally or in tests.
//!
//! ```json
//! {
//!   "settings": { "max_loan_size": "1000", "liquidity_buffer": "20",
//!                 "risk_premium_interest_rate": "10", "supply_to_debt_ratio": "1.5" },
//!   "supply_rates": { "DAI": "3.5" },
//!   "bank_accounts": [
//!     { "wallet": "0x…", "account_id": "acc-1", "country": "USA", "state": "NY",
//!       "available_balance": "900", "transactions": [] }
//!   ],
//!   "state_caps": { "NY": 8, "CA": false }
//! }
//! ```

use super::in_memory::{InMemoryBankAccounts, InMemorySettingsSource, InMemorySupplyRates};
use crate::domain::bank::{BankActivity, BankLink, BankTransaction};
use crate::domain::loan::WalletAddress;
use crate::domain::money::Percent;
use crate::domain::settings::GlobalSettings;
use crate::domain::state_caps::StateCapLookup;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub settings: Option<GlobalSettings>,
    #[serde(default)]
    pub supply_rates: HashMap<String, Percent>,
    #[serde(default)]
    pub bank_accounts: Vec<BankAccountFixture>,
    #[serde(default)]
    pub state_caps: StateCapLookup,
}

#[derive(Debug, Deserialize)]
pub struct BankAccountFixture {
    pub wallet: WalletAddress,
    pub account_id: String,
    pub country: String,
    #[serde(default)]
    pub state: Option<String>,
    pub available_balance: Decimal,
    #[serde(default)]
    pub transactions: Vec<BankTransaction>,
}

/// In-memory collaborators seeded from a [`Fixtures`] document.
pub struct FixtureEnvironment {
    pub settings: InMemorySettingsSource,
    pub bank_accounts: InMemoryBankAccounts,
    pub supply_rates: InMemorySupplyRates,
    pub state_caps: StateCapLookup,
}

impl Fixtures {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Seeds the in-memory adapters. Supply rates count as observed now.
    pub async fn into_environment(self, max_rate_age: Duration) -> FixtureEnvironment {
        let settings = match self.settings {
            Some(settings) => InMemorySettingsSource::with_settings(settings),
            None => InMemorySettingsSource::new(),
        };

        let supply_rates = InMemorySupplyRates::new(max_rate_age);
        for (asset, rate) in self.supply_rates {
            supply_rates.record(asset, rate).await;
        }

        let bank_accounts = InMemoryBankAccounts::new();
        for account in self.bank_accounts {
            let link = BankLink {
                account_id: account.account_id,
                country: account.country,
                state: account.state,
            };
            let activity = BankActivity {
                available_balance: account.available_balance,
                transactions: account.transactions,
            };
            bank_accounts.link(account.wallet, link, activity).await;
        }

        FixtureEnvironment {
            settings,
            bank_accounts,
            supply_rates,
            state_caps: self.state_caps,
        }
    }
}
