#![allow(dead_code)]

use loan_attestor::application::signer::AttestationSigner;
use loan_attestor::application::underwriter::{Collaborators, Underwriter};
use loan_attestor::config::UnderwriterConfig;
use loan_attestor::domain::bank::{BankActivity, BankLink};
use loan_attestor::domain::loan::{LoanApplication, WalletAddress};
use loan_attestor::domain::money::{Amount, Percent};
use loan_attestor::domain::settings::GlobalSettings;
use loan_attestor::domain::state_caps::{StateCap, StateCapLookup};
use loan_attestor::infrastructure::ed25519::Ed25519Signer;
use loan_attestor::infrastructure::in_memory::{
    InMemoryBankAccounts, InMemorySettingsSource, InMemorySupplyRates,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

/// RFC 8032 test vector 1 secret key.
pub const SECRET_KEY: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
pub const BORROWER: &str = "0x52908400098527886e0f7030069857d2e4169ee7";

pub const FIXTURES_JSON: &str = r#"{
    "settings": {
        "max_loan_size": "1000",
        "liquidity_buffer": "20",
        "risk_premium_interest_rate": "10",
        "supply_to_debt_ratio": "1.5"
    },
    "supply_rates": { "DAI": "3" },
    "bank_accounts": [
        {
            "wallet": "0x1111111111111111111111111111111111111111",
            "account_id": "acc-ny",
            "country": "USA",
            "state": "NY",
            "available_balance": "900"
        },
        {
            "wallet": "0x2222222222222222222222222222222222222222",
            "account_id": "acc-ca",
            "country": "USA",
            "state": "CA",
            "available_balance": "0"
        }
    ],
    "state_caps": { "NY": 8, "CA": false }
}"#;

/// A linked bank account for the test borrower.
pub struct Bank {
    pub country: &'static str,
    pub state: Option<&'static str>,
    pub balance: Decimal,
}

pub fn settings() -> GlobalSettings {
    GlobalSettings {
        max_loan_size: Amount::new(dec!(1000)).unwrap(),
        liquidity_buffer: Percent::new(dec!(20)).unwrap(),
        risk_premium_interest_rate: Percent::new(dec!(10)).unwrap(),
        supply_to_debt_ratio: dec!(1.5),
    }
}

pub fn state_caps() -> StateCapLookup {
    StateCapLookup::new()
        .with_cap("NY", StateCap::Capped(Percent::new(dec!(8)).unwrap()))
        .with_cap("CA", StateCap::Uncapped)
}

pub fn borrower() -> WalletAddress {
    BORROWER.parse().unwrap()
}

pub fn signer() -> Ed25519Signer {
    Ed25519Signer::from_hex(SECRET_KEY).unwrap()
}

pub fn config() -> UnderwriterConfig {
    UnderwriterConfig {
        fetch_timeout: Duration::from_millis(200),
        ..UnderwriterConfig::default()
    }
}

pub async fn bank_accounts(bank: Option<Bank>) -> InMemoryBankAccounts {
    let accounts = InMemoryBankAccounts::new();
    if let Some(bank) = bank {
        let link = BankLink {
            account_id: "acc-test".to_string(),
            country: bank.country.to_string(),
            state: bank.state.map(str::to_string),
        };
        let activity = BankActivity {
            available_balance: bank.balance,
            transactions: vec![],
        };
        accounts.link(borrower(), link, activity).await;
    }
    accounts
}

pub async fn supply_rates() -> InMemorySupplyRates {
    let rates = InMemorySupplyRates::new(Duration::from_secs(60));
    rates.record("DAI", Percent::new(dec!(3)).unwrap()).await;
    rates
}

/// Underwriter over in-memory collaborators: DAI at 3%, NY capped at 8.
pub async fn underwriter(bank: Option<Bank>) -> Underwriter {
    let accounts = bank_accounts(bank).await;
    Underwriter::new(
        Collaborators {
            settings: Box::new(InMemorySettingsSource::with_settings(settings())),
            bank_profiles: Box::new(accounts.clone()),
            balances: Box::new(accounts),
            supply_rates: Box::new(supply_rates().await),
        },
        state_caps(),
        AttestationSigner::new(Box::new(signer())),
        config(),
    )
}

pub fn application(size: Decimal, loan_use: &str, collateral: Decimal) -> LoanApplication {
    LoanApplication {
        wallet: BORROWER.to_string(),
        requested_loan_size: size,
        loan_use: loan_use.to_string(),
        collateral_percent: collateral,
        asset: "DAI".to_string(),
    }
}

pub fn assert_close(actual: Decimal, expected: Decimal) {
    assert!(
        (actual - expected).abs() < dec!(0.000000001),
        "expected {expected}, got {actual}"
    );
}

pub fn write_fixtures(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

pub fn write_requests(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "wallet,requested_loan_size,loan_use,collateral_percent,asset").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file
}
