//! AppVeyor test analyzer - main entry point.
//!
//! Analyses every configured project branch and writes one report each.

use chrono::Utc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use appveyor_test_analyzer::client::AppVeyorClient;
use appveyor_test_analyzer::config::{Config, FetchPolicy};
use appveyor_test_analyzer::report::sink_from_config;
use appveyor_test_analyzer::services::{AnalysisOptions, analysis, failed_count, run_targets};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Check for --check-config flag (validate and exit)
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|arg| arg == "--check-config") {
        match Config::from_env() {
            Ok(_) => std::process::exit(0),
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
    }

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - APPVEYOR_API_KEY must hold an AppVeyor API token");
            error!("  - ATA_TARGETS must list project:branch pairs, e.g. 'azure-functions-host:dev'");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  AppVeyor Test Analyzer");
    info!("  Endpoint: {}", config.endpoint);
    info!("  Window: last {} days", config.days);
    info!("========================================");

    if config.fetch_policy == FetchPolicy::Tolerant {
        warn!("Tolerant fetch policy: failed builds/jobs are skipped and reports marked partial");
    }

    let client = match AppVeyorClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create AppVeyor client: {}", e);
            std::process::exit(1);
        }
    };
    let sink = sink_from_config(&config);
    let options = AnalysisOptions::from_config(&config, Utc::now());

    let outcomes = run_targets(&client, sink.as_ref(), &config.targets, &options).await;

    for outcome in &outcomes {
        match &outcome.result {
            Ok(path) => info!("{}: report at {}", outcome.target, path.display()),
            Err(_) if analysis::is_lookup_failure(outcome) => error!(
                "{}: no such project visible to this API key",
                outcome.target
            ),
            Err(e) => error!("{}: failed, no report written ({})", outcome.target, e),
        }
    }

    let failed = failed_count(&outcomes);
    if failed > 0 {
        error!("{} of {} targets failed", failed, outcomes.len());
        std::process::exit(1);
    }
}
