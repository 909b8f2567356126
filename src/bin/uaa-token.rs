use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::{sleep, Duration};
use tracing::info;
use uaa_token::resilience::retry::RetrySettings;
use uaa_token::store::CredentialStore;
use uaa_token::utils::config_loader;
use uaa_token::utils::logging;
use uaa_token::utils::logging::LogLevel;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "uaa-token.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// how many times to ask for a bearer token
    #[arg(long, default_value_t = 1)]
    repeat: u32,
    /// pause between repeated requests
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,
    /// print prometheus metrics of the provider before exit
    #[arg(long)]
    print_metrics: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level)?;

    // -------------------------------
    // 2. Build credential store (no network yet)
    // -------------------------------

    let store = CredentialStore::from_settings(&service_config)
        .context("cannot build credential store")?;
    let retry = RetrySettings::from(service_config.settings.retry.as_ref());
    info!(
        issuer = %store.identity().issuer_uri(),
        client_id = %store.identity().client_id(),
        skip_tls_verify = store.identity().skip_tls_verify(),
        "credential store ready"
    );

    // -------------------------------
    // 3. Ask for bearer tokens
    // -------------------------------

    for round in 1..=args.repeat.max(1) {
        let bearer = store
            .get_bearer_token_with_retry(&retry)
            .await
            .context("cannot obtain bearer token")?;
        info!(round, expires_at = %store.expires_at().await.to_rfc3339(), "bearer token obtained");
        println!("{}", bearer);

        if round < args.repeat {
            sleep(Duration::from_millis(args.interval_ms)).await;
        }
    }

    if args.print_metrics {
        print!("{}", store.metrics().render());
    }

    Ok(())
}
