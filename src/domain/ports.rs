use super::bank::BankLink;
use super::loan::WalletAddress;
use super::money::Percent;
use super::settings::GlobalSettings;
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Source of protocol-wide settings (typically an indexing service).
#[async_trait]
pub trait SettingsSource: Send + Sync {
    async fn fetch_global_settings(&self) -> Result<GlobalSettings>;
}

/// Looks up the bank account linked to a borrower.
///
/// `Ok(None)` means no bank is linked, which is a valid outcome.
#[async_trait]
pub trait BankProfileSource: Send + Sync {
    async fn fetch_bank_profile(&self, borrower: &WalletAddress) -> Result<Option<BankLink>>;
}

/// Aggregates an account's transaction history into its lowest trailing balance.
#[async_trait]
pub trait BalanceHistory: Send + Sync {
    async fn lowest_balance_60_days(&self, link: &BankLink) -> Result<Decimal>;
}

/// Current money-market supply rate per asset.
#[async_trait]
pub trait SupplyRateFeed: Send + Sync {
    async fn current_supply_rate(&self, asset_id: &str) -> Result<Percent>;
}

/// Holder of the service's signing key.
#[async_trait]
pub trait MessageSigner: Send + Sync {
    /// Identifier of the public half of the key, as published to verifiers.
    fn key_id(&self) -> String;
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>>;
}

pub type SettingsSourceBox = Box<dyn SettingsSource>;
pub type BankProfileSourceBox = Box<dyn BankProfileSource>;
pub type BalanceHistoryBox = Box<dyn BalanceHistory>;
pub type SupplyRateFeedBox = Box<dyn SupplyRateFeed>;
pub type MessageSignerBox = Box<dyn MessageSigner>;
