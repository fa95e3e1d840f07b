use clap::Parser;
use loan_attestor::application::signer::AttestationSigner;
use loan_attestor::application::underwriter::{Collaborators, Underwriter};
use loan_attestor::config::UnderwriterConfig;
use loan_attestor::infrastructure::ed25519::Ed25519Signer;
use loan_attestor::infrastructure::fixtures::Fixtures;
use loan_attestor::interfaces::csv::attestation_writer::AttestationWriter;
use loan_attestor::interfaces::csv::request_reader::LoanApplicationReader;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Loan requests CSV file
    requests: PathBuf,

    /// JSON file with settings, supply rates, bank accounts and state caps
    #[arg(long)]
    fixtures: PathBuf,

    /// Hex-encoded Ed25519 secret key. A throwaway key is generated if omitted.
    #[arg(long)]
    key_file: Option<PathBuf>,

    /// Country whose states are subject to interest-rate caps
    #[arg(long)]
    home_country: Option<String>,

    /// Timeout for each collaborator fetch, in milliseconds
    #[arg(long)]
    fetch_timeout_ms: Option<u64>,

    /// Maximum age of a supply rate observation, in seconds
    #[arg(long)]
    max_rate_age_secs: Option<u64>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = UnderwriterConfig::from_env().into_diagnostic()?;
    if let Some(country) = cli.home_country {
        config.home_country = country;
    }
    if let Some(ms) = cli.fetch_timeout_ms {
        config.fetch_timeout = Duration::from_millis(ms);
    }
    if let Some(secs) = cli.max_rate_age_secs {
        config.max_rate_age = Duration::from_secs(secs);
    }
    let config = config.validate().into_diagnostic()?;

    let signer = match cli.key_file {
        Some(path) => Ed25519Signer::from_file(path).into_diagnostic()?,
        None => {
            warn!("no --key-file given, signing with an ephemeral signing key");
            Ed25519Signer::generate()
        }
    };

    let env = Fixtures::from_path(&cli.fixtures)
        .into_diagnostic()?
        .into_environment(config.max_rate_age)
        .await;
    info!(state_caps = env.state_caps.len(), "fixtures loaded");

    let underwriter = Underwriter::new(
        Collaborators {
            settings: Box::new(env.settings),
            bank_profiles: Box::new(env.bank_accounts.clone()),
            balances: Box::new(env.bank_accounts),
            supply_rates: Box::new(env.supply_rates),
        },
        env.state_caps,
        AttestationSigner::new(Box::new(signer)),
        config,
    );
    info!(signer = %underwriter.signer_key_id(), "underwriter ready");

    let file = File::open(&cli.requests).into_diagnostic()?;
    let reader = LoanApplicationReader::new(file);
    let stdout = io::stdout();
    let mut writer = AttestationWriter::new(stdout.lock());

    let (mut issued, mut rejected) = (0usize, 0usize);
    for application in reader.applications() {
        match application {
            Ok(application) => match underwriter.assess_and_sign(application).await {
                Ok(attestation) => {
                    writer.write(&attestation).into_diagnostic()?;
                    issued += 1;
                }
                Err(e) => {
                    error!(error = %e, retryable = e.is_retryable(), "rejected loan request");
                    rejected += 1;
                }
            },
            Err(e) => {
                error!(error = %e, "rejected loan request: unreadable row");
                rejected += 1;
            }
        }
    }
    writer.flush().into_diagnostic()?;

    info!(issued, rejected, "batch complete");
    Ok(())
}
