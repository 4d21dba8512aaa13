use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use qrusafe::config::Config;
use qrusafe::intel::aggregate::Aggregator;
use qrusafe::intel::safe_browsing::SafeBrowsing;
use qrusafe::intel::traits::ThreatProvider;
use qrusafe::intel::virustotal::VirusTotal;
use qrusafe::web;

/// QRuSafe: URL safety checks for scanned QR codes.
///
/// Aggregates Google Safe Browsing and VirusTotal verdicts into a single
/// safe/unsafe answer, served over HTTP to the scanner UI.
#[derive(Parser)]
#[command(name = "qrusafe", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Listen port (overrides the PORT env var)
        #[arg(long)]
        port: Option<u16>,

        /// Bind address (overrides the BIND env var)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Check a single URL from the command line
    Check {
        /// The URL to check (e.g. http://example.com)
        url: String,
    },
}

/// Shared HTTP client for all outbound provider calls.
///
/// The 10-second timeout caps how long one unresponsive provider can
/// stall an aggregate response.
fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent("qrusafe/0.1")
        .timeout(Duration::from_secs(10))
        .build()
        .context("Failed to build HTTP client")
}

/// Wire up the real providers from config.
fn build_aggregator(config: &Config) -> Result<Aggregator> {
    let client = http_client()?;
    let providers: Vec<Arc<dyn ThreatProvider>> = vec![
        Arc::new(SafeBrowsing::new(
            client.clone(),
            config.google_api_key.clone(),
        )),
        Arc::new(VirusTotal::new(client, config.virustotal_api_key.clone())),
    ];
    Ok(Aggregator::new(providers))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("qrusafe=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, bind } => {
            let mut config = Config::load()?;
            config.require_providers()?;
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(bind) = bind {
                config.bind = bind;
            }

            let aggregator = Arc::new(build_aggregator(&config)?);
            web::run_server(&config, aggregator).await?;
        }

        Commands::Check { url } => {
            let config = Config::load()?;
            config.require_providers()?;
            let aggregator = build_aggregator(&config)?;

            println!("Checking {url} ...");
            let verdict = aggregator.check(&url).await?;

            if verdict.safe {
                println!("{}  {}", "SAFE".green().bold(), verdict.message);
            } else {
                println!("{}  {}", "DANGEROUS".red().bold(), verdict.message);
            }
            println!("{}", serde_json::to_string_pretty(&verdict.details)?);
        }
    }

    Ok(())
}
