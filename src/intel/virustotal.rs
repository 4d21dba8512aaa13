// VirusTotal v3 adapter.
//
// VirusTotal analyzes URLs asynchronously: submitting a URL yields an
// analysis id, and the analysis completes some time later. Rather than
// a single fixed sleep, this adapter polls the analysis endpoint on a
// short interval with a capped number of attempts, and reports an
// explicit Inconclusive verdict when the analysis hasn't completed by
// the deadline.
//
// API docs: https://docs.virustotal.com/reference/scan-url

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::traits::{ProviderVerdict, ThreatProvider, Verdict};

pub const DEFAULT_BASE_URL: &str = "https://www.virustotal.com";

/// Time between analysis polls.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Polls before giving up and reporting Inconclusive.
const MAX_POLLS: u32 = 5;

/// VirusTotal URL-analysis adapter.
pub struct VirusTotal {
    client: Client,
    api_key: String,
    base_url: String,
    poll_interval: Duration,
    max_polls: u32,
}

impl VirusTotal {
    /// Create an adapter against the production VirusTotal endpoint.
    pub fn new(client: Client, api_key: String) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_BASE_URL)
    }

    /// Point the adapter at a different host (used by tests).
    pub fn with_base_url(client: Client, api_key: String, base_url: &str) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            poll_interval: POLL_INTERVAL,
            max_polls: MAX_POLLS,
        }
    }

    /// Submit a URL for analysis and return the analysis id.
    ///
    /// A 2xx response without a `data.id` still fails — without an id
    /// there is nothing to poll, so this provider has no data to offer
    /// for the request.
    async fn submit(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/v3/urls", self.base_url))
            .header("x-apikey", &self.api_key)
            .form(&[("url", url)])
            .send()
            .await
            .context("Failed to submit URL to VirusTotal")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("VirusTotal submission returned {}: {}", status, body);
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse VirusTotal submission response")?;

        match body.pointer("/data/id").and_then(Value::as_str) {
            Some(id) => Ok(id.to_string()),
            None => anyhow::bail!("VirusTotal submission response carried no analysis id"),
        }
    }

    /// Fetch the current state of an analysis by id.
    async fn fetch_analysis(&self, analysis_id: &str) -> Result<Value> {
        let response = self
            .client
            .get(format!("{}/api/v3/analyses/{}", self.base_url, analysis_id))
            .header("x-apikey", &self.api_key)
            .send()
            .await
            .context("Failed to fetch VirusTotal analysis")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("VirusTotal analysis fetch returned {}: {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse VirusTotal analysis")
    }
}

#[async_trait]
impl ThreatProvider for VirusTotal {
    fn name(&self) -> &'static str {
        "virustotal"
    }

    async fn check_url(&self, url: &str) -> Result<ProviderVerdict> {
        let analysis_id = self.submit(url).await?;
        debug!(url = url, analysis_id = %analysis_id, "URL submitted to VirusTotal");

        let mut last_raw = Value::Null;
        for attempt in 1..=self.max_polls {
            tokio::time::sleep(self.poll_interval).await;

            let raw = self.fetch_analysis(&analysis_id).await?;
            if analysis_completed(&raw) {
                let verdict = if malicious_count(&raw) > 0 {
                    Verdict::Flagged
                } else {
                    Verdict::Clean
                };
                debug!(url = url, attempt = attempt, verdict = ?verdict, "VirusTotal analysis complete");
                return Ok(ProviderVerdict { verdict, raw });
            }
            last_raw = raw;
        }

        warn!(url = url, analysis_id = %analysis_id, "VirusTotal analysis still pending at deadline");
        Ok(ProviderVerdict {
            verdict: Verdict::Inconclusive,
            raw: last_raw,
        })
    }
}

/// Whether the analysis payload reports a finished scan.
pub fn analysis_completed(raw: &Value) -> bool {
    raw.pointer("/data/attributes/status").and_then(Value::as_str) == Some("completed")
}

/// Number of engines reporting the URL as malicious.
pub fn malicious_count(raw: &Value) -> u64 {
    raw.pointer("/data/attributes/stats/malicious")
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn analysis(status: &str, malicious: u64) -> Value {
        json!({
            "data": {
                "id": "u-abc123-1700000000",
                "type": "analysis",
                "attributes": {
                    "status": status,
                    "stats": {
                        "malicious": malicious,
                        "suspicious": 0,
                        "harmless": 70,
                        "undetected": 10
                    }
                }
            }
        })
    }

    #[test]
    fn completed_analysis_is_detected() {
        assert!(analysis_completed(&analysis("completed", 0)));
        assert!(!analysis_completed(&analysis("queued", 0)));
        assert!(!analysis_completed(&json!({})));
    }

    #[test]
    fn malicious_count_reads_stats() {
        assert_eq!(malicious_count(&analysis("completed", 3)), 3);
        assert_eq!(malicious_count(&analysis("completed", 0)), 0);
    }

    #[test]
    fn missing_stats_count_as_zero() {
        // Incomplete analyses often carry no stats block at all
        assert_eq!(malicious_count(&json!({ "data": { "id": "x" } })), 0);
    }
}
