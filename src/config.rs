use std::env;

use anyhow::{Context, Result};

/// Default listen port when PORT is not set.
pub const DEFAULT_PORT: u16 = 234;

/// Central configuration loaded from environment variables.
///
/// Both API keys are secrets and come from env vars (never hardcoded).
/// The .env file is loaded automatically at startup via dotenvy.
pub struct Config {
    /// Google Safe Browsing API key (GOOGLE_API_KEY env var)
    pub google_api_key: String,
    /// VirusTotal API key (VIRUS_TOTAL_API_KEY env var)
    pub virustotal_api_key: String,
    /// Listen port for the HTTP server (PORT env var)
    pub port: u16,
    /// Bind address for the HTTP server (BIND env var)
    pub bind: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Keys default to empty strings — `require_providers` enforces their
    /// presence before anything talks to the providers.
    pub fn load() -> Result<Self> {
        let port = match env::var("PORT") {
            Ok(value) => value.parse().context("PORT must be a valid port number")?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            google_api_key: env::var("GOOGLE_API_KEY").unwrap_or_default(),
            virustotal_api_key: env::var("VIRUS_TOTAL_API_KEY").unwrap_or_default(),
            port,
            bind: env::var("BIND").unwrap_or_else(|_| "0.0.0.0".to_string()),
        })
    }

    /// Check that both provider API keys are configured.
    /// Call this before any operation that queries the providers.
    pub fn require_providers(&self) -> Result<()> {
        if self.google_api_key.is_empty() {
            anyhow::bail!(
                "GOOGLE_API_KEY not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        if self.virustotal_api_key.is_empty() {
            anyhow::bail!(
                "VIRUS_TOTAL_API_KEY not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        Ok(())
    }
}
