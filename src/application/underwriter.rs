use super::signer::AttestationSigner;
use crate::config::UnderwriterConfig;
use crate::domain::attestation::SignedAttestation;
use crate::domain::bank::BankProfile;
use crate::domain::loan::{LoanApplication, LoanRequest};
use crate::domain::ports::{
    BalanceHistoryBox, BankProfileSourceBox, SettingsSourceBox, SupplyRateFeedBox,
};
use crate::domain::risk::{self, AssessmentContext, AssessmentResult};
use crate::domain::state_caps::StateCapLookup;
use crate::error::{Result, UnderwritingError};
use std::future::Future;
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span, warn};

/// The external collaborators parameter resolution depends on.
pub struct Collaborators {
    pub settings: SettingsSourceBox,
    pub bank_profiles: BankProfileSourceBox,
    pub balances: BalanceHistoryBox,
    pub supply_rates: SupplyRateFeedBox,
}

/// The main entry point for underwriting loan requests.
///
/// `Underwriter` resolves the parameters of a request, runs the risk engine
/// over them and signs the outcome. It holds no per-request state, so a single
/// instance can be shared behind an `Arc` and called concurrently.
pub struct Underwriter {
    collaborators: Collaborators,
    state_caps: Arc<StateCapLookup>,
    signer: AttestationSigner,
    config: UnderwriterConfig,
}

impl Underwriter {
    /// Creates a new `Underwriter`.
    ///
    /// # Arguments
    ///
    /// * `collaborators` - Sources for settings, bank data and supply rates.
    /// * `state_caps` - Per-state interest-rate cap reference data.
    /// * `signer` - Signs the final terms.
    /// * `config` - Home jurisdiction and fetch timeouts.
    pub fn new(
        collaborators: Collaborators,
        state_caps: StateCapLookup,
        signer: AttestationSigner,
        config: UnderwriterConfig,
    ) -> Self {
        Self {
            collaborators,
            state_caps: Arc::new(state_caps),
            signer,
            config,
        }
    }

    pub fn signer_key_id(&self) -> String {
        self.signer.key_id()
    }

    /// Validates, assesses and signs a loan application.
    ///
    /// Returns either a signed attestation or an error; an unsigned result is
    /// never handed out.
    pub async fn assess_and_sign(&self, application: LoanApplication) -> Result<SignedAttestation> {
        let request = LoanRequest::try_from(application)?;
        let span = info_span!(
            "assess_and_sign",
            wallet = %request.borrower_wallet_address,
            asset = %request.borrowed_asset_id,
        );

        async {
            let result = self.assess(&request).await?;
            let attestation = self
                .signer
                .sign(result, request.borrower_wallet_address)
                .await?;
            info!(
                loan_size = %result.loan_size,
                collateral = %result.collateral_percent,
                rate = %result.final_interest_rate,
                "issued loan terms attestation"
            );
            Ok::<_, UnderwritingError>(attestation)
        }
        .instrument(span)
        .await
    }

    /// Resolves parameters and runs the risk engine, without signing.
    pub async fn assess(&self, request: &LoanRequest) -> Result<AssessmentResult> {
        let context = self.resolve(request).await?;
        let result = risk::assess(&context, request);
        debug!(?result, "assessment complete");
        Ok(result)
    }

    /// Fetches everything the engine needs for `request`.
    ///
    /// Settings, bank profile and supply rate are fetched concurrently, each
    /// bounded by the configured timeout. Any failure fails the whole request.
    pub async fn resolve(&self, request: &LoanRequest) -> Result<AssessmentContext> {
        let wallet = request.borrower_wallet_address;
        let (settings, bank_link, supply_rate) = tokio::try_join!(
            self.bounded(
                "settings source",
                self.collaborators.settings.fetch_global_settings()
            ),
            self.bounded(
                "bank profile source",
                self.collaborators.bank_profiles.fetch_bank_profile(&wallet)
            ),
            self.bounded(
                "supply rate feed",
                self.collaborators
                    .supply_rates
                    .current_supply_rate(&request.borrowed_asset_id)
            ),
        )?;

        let settings = settings.validate().map_err(|e| {
            UnderwritingError::unavailable("settings source", format!("invalid settings: {e}"))
        })?;

        let bank_profile = match bank_link {
            Some(link) => {
                let lowest = self
                    .bounded(
                        "balance history",
                        self.collaborators.balances.lowest_balance_60_days(&link),
                    )
                    .await?;
                Some(BankProfile::new(link, lowest))
            }
            None => None,
        };

        if let Some(profile) = &bank_profile
            && profile.country == self.config.home_country
            && profile.state.is_none()
        {
            warn!(%wallet, "home-country bank profile has no state, no rate cap applied");
        }

        Ok(AssessmentContext {
            settings,
            bank_profile,
            state_caps: Arc::clone(&self.state_caps),
            home_country: self.config.home_country.clone(),
            supply_rate,
        })
    }

    async fn bounded<T, F>(&self, collaborator: &'static str, fetch: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.config.fetch_timeout, fetch).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                warn!(collaborator, error = %err, "collaborator fetch failed");
                Err(err)
            }
            Err(_) => {
                warn!(collaborator, timeout = ?self.config.fetch_timeout, "collaborator fetch timed out");
                Err(UnderwritingError::unavailable(
                    collaborator,
                    format!("no response within {:?}", self.config.fetch_timeout),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bank::{BankActivity, BankLink};
    use crate::domain::money::{Amount, Percent};
    use crate::domain::settings::GlobalSettings;
    use crate::domain::state_caps::StateCap;
    use crate::infrastructure::ed25519::Ed25519Signer;
    use crate::infrastructure::in_memory::{
        InMemoryBankAccounts, InMemorySettingsSource, InMemorySupplyRates,
    };
    use rust_decimal_macros::dec;
    use std::time::Duration;

    const WALLET: &str = "0x00000000000000000000000000000000000000aa";

    fn settings() -> GlobalSettings {
        GlobalSettings {
            max_loan_size: Amount::new(dec!(1000)).unwrap(),
            liquidity_buffer: Percent::new(dec!(20)).unwrap(),
            risk_premium_interest_rate: Percent::new(dec!(10)).unwrap(),
            supply_to_debt_ratio: dec!(1.5),
        }
    }

    async fn underwriter(bank: Option<(&str, Option<&str>)>) -> Underwriter {
        let rates = InMemorySupplyRates::new(Duration::from_secs(60));
        rates.record("DAI", Percent::new(dec!(3)).unwrap()).await;

        let accounts = InMemoryBankAccounts::new();
        if let Some((country, state)) = bank {
            let link = BankLink {
                account_id: "acc".to_string(),
                country: country.to_string(),
                state: state.map(str::to_string),
            };
            let activity = BankActivity {
                available_balance: dec!(0),
                transactions: vec![],
            };
            accounts.link(WALLET.parse().unwrap(), link, activity).await;
        }

        Underwriter::new(
            Collaborators {
                settings: Box::new(InMemorySettingsSource::with_settings(settings())),
                bank_profiles: Box::new(accounts.clone()),
                balances: Box::new(accounts),
                supply_rates: Box::new(rates),
            },
            StateCapLookup::new().with_cap("NY", StateCap::Capped(Percent::new(dec!(8)).unwrap())),
            AttestationSigner::new(Box::new(Ed25519Signer::from_hex(&"01".repeat(32)).unwrap())),
            UnderwriterConfig::default(),
        )
    }

    fn application(size: &str, loan_use: &str) -> LoanApplication {
        LoanApplication {
            wallet: WALLET.to_string(),
            requested_loan_size: size.parse().unwrap(),
            loan_use: loan_use.to_string(),
            collateral_percent: dec!(0),
            asset: "DAI".to_string(),
        }
    }

    #[tokio::test]
    async fn test_resolve_without_bank() {
        let uw = underwriter(None).await;
        let request = LoanRequest::try_from(application("500", "FIXED")).unwrap();
        let ctx = uw.resolve(&request).await.unwrap();
        assert!(ctx.bank_profile.is_none());
        assert_eq!(ctx.supply_rate.points(), dec!(3));
        assert_eq!(ctx.home_country, "USA");
    }

    #[tokio::test]
    async fn test_resolve_attaches_lowest_balance() {
        let uw = underwriter(Some(("USA", Some("NY")))).await;
        let request = LoanRequest::try_from(application("500", "FIXED")).unwrap();
        let ctx = uw.resolve(&request).await.unwrap();
        let profile = ctx.bank_profile.unwrap();
        assert_eq!(profile.lowest_balance_60_day, dec!(0));
        assert_eq!(profile.state.as_deref(), Some("NY"));
    }

    #[tokio::test]
    async fn test_assess_and_sign_capped_state() {
        let uw = underwriter(Some(("USA", Some("NY")))).await;
        let attestation = uw.assess_and_sign(application("50", "FIXED")).await.unwrap();
        assert_eq!(attestation.result.loan_size.value(), dec!(800));
        assert_eq!(attestation.result.final_interest_rate.points(), dec!(8));
        assert_eq!(attestation.signer_public_key_id, uw.signer_key_id());
    }

    #[tokio::test]
    async fn test_validation_error_before_any_fetch() {
        let uw = underwriter(None).await;
        let err = uw
            .assess_and_sign(application("500", "SOMETIMES"))
            .await
            .unwrap_err();
        assert!(matches!(err, UnderwritingError::ValidationError(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_unknown_asset_is_unavailable() {
        let uw = underwriter(None).await;
        let mut app = application("500", "FIXED");
        app.asset = "WBTC".to_string();
        let err = uw.assess_and_sign(app).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
