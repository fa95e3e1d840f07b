use crate::domain::bank::{BALANCE_WINDOW_DAYS, BankActivity, BankLink};
use crate::domain::loan::WalletAddress;
use crate::domain::money::Percent;
use crate::domain::ports::{BalanceHistory, BankProfileSource, SettingsSource, SupplyRateFeed};
use crate::domain::settings::GlobalSettings;
use crate::error::{Result, UnderwritingError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Settings published in memory.
///
/// Until something is published every fetch fails as unavailable.
#[derive(Default, Clone)]
pub struct InMemorySettingsSource {
    settings: Arc<RwLock<Option<GlobalSettings>>>,
}

impl InMemorySettingsSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: GlobalSettings) -> Self {
        Self {
            settings: Arc::new(RwLock::new(Some(settings))),
        }
    }

    /// Replaces the current snapshot. Requests already in flight keep the one they fetched.
    pub async fn publish(&self, settings: GlobalSettings) {
        *self.settings.write().await = Some(settings);
    }
}

#[async_trait]
impl SettingsSource for InMemorySettingsSource {
    async fn fetch_global_settings(&self) -> Result<GlobalSettings> {
        self.settings
            .read()
            .await
            .clone()
            .ok_or_else(|| UnderwritingError::unavailable("settings source", "no settings published"))
    }
}

#[derive(Debug, Clone)]
struct BankRecord {
    link: BankLink,
    activity: BankActivity,
}

/// Linked bank accounts and their activity, keyed by borrower wallet.
///
/// Serves both the profile lookup and the balance aggregation, the way a
/// bank data provider answers both from the same account.
#[derive(Default, Clone)]
pub struct InMemoryBankAccounts {
    by_wallet: Arc<RwLock<HashMap<WalletAddress, BankRecord>>>,
}

impl InMemoryBankAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn link(&self, wallet: WalletAddress, link: BankLink, activity: BankActivity) {
        let mut accounts = self.by_wallet.write().await;
        accounts.insert(wallet, BankRecord { link, activity });
    }
}

#[async_trait]
impl BankProfileSource for InMemoryBankAccounts {
    async fn fetch_bank_profile(&self, borrower: &WalletAddress) -> Result<Option<BankLink>> {
        let accounts = self.by_wallet.read().await;
        Ok(accounts.get(borrower).map(|record| record.link.clone()))
    }
}

#[async_trait]
impl BalanceHistory for InMemoryBankAccounts {
    async fn lowest_balance_60_days(&self, link: &BankLink) -> Result<Decimal> {
        let accounts = self.by_wallet.read().await;
        let record = accounts
            .values()
            .find(|record| record.link.account_id == link.account_id)
            .ok_or_else(|| {
                UnderwritingError::unavailable(
                    "balance history",
                    format!("unknown account {}", link.account_id),
                )
            })?;
        Ok(record
            .activity
            .lowest_balance(Utc::now().date_naive(), BALANCE_WINDOW_DAYS))
    }
}

#[derive(Debug, Clone, Copy)]
struct RateObservation {
    rate: Percent,
    observed_at: DateTime<Utc>,
}

/// Supply rates recorded in memory, refused once older than `max_age`.
#[derive(Clone)]
pub struct InMemorySupplyRates {
    rates: Arc<RwLock<HashMap<String, RateObservation>>>,
    max_age: Duration,
}

impl InMemorySupplyRates {
    pub fn new(max_age: Duration) -> Self {
        Self {
            rates: Arc::new(RwLock::new(HashMap::new())),
            max_age,
        }
    }

    pub async fn record(&self, asset_id: impl Into<String>, rate: Percent) {
        self.record_at(asset_id, rate, Utc::now()).await;
    }

    pub async fn record_at(
        &self,
        asset_id: impl Into<String>,
        rate: Percent,
        observed_at: DateTime<Utc>,
    ) {
        let mut rates = self.rates.write().await;
        rates.insert(asset_id.into(), RateObservation { rate, observed_at });
    }
}

#[async_trait]
impl SupplyRateFeed for InMemorySupplyRates {
    async fn current_supply_rate(&self, asset_id: &str) -> Result<Percent> {
        let rates = self.rates.read().await;
        let observation = rates.get(asset_id).ok_or_else(|| {
            UnderwritingError::unavailable("supply rate feed", format!("unknown asset {asset_id}"))
        })?;

        let age = (Utc::now() - observation.observed_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        if age > self.max_age {
            return Err(UnderwritingError::unavailable(
                "supply rate feed",
                format!("rate for {asset_id} is {}s old", age.as_secs()),
            ));
        }
        Ok(observation.rate)
    }
}
