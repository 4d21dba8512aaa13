// Google Safe Browsing v4 adapter.
//
// A single synchronous call to threatMatches:find. Safe Browsing returns
// an empty JSON object for URLs it knows nothing bad about, and a
// `matches` array when any requested threat list contains the URL.
//
// API docs: https://developers.google.com/safe-browsing/v4/lookup-api

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::traits::{ProviderVerdict, ThreatProvider, Verdict};

pub const DEFAULT_BASE_URL: &str = "https://safebrowsing.googleapis.com";

/// Safe Browsing threat-match adapter.
pub struct SafeBrowsing {
    client: Client,
    api_key: String,
    base_url: String,
}

impl SafeBrowsing {
    /// Create an adapter against the production Safe Browsing endpoint.
    pub fn new(client: Client, api_key: String) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_BASE_URL)
    }

    /// Point the adapter at a different host (used by tests).
    pub fn with_base_url(client: Client, api_key: String, base_url: &str) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ThreatProvider for SafeBrowsing {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn check_url(&self, url: &str) -> Result<ProviderVerdict> {
        let endpoint = format!(
            "{}/v4/threatMatches:find?key={}",
            self.base_url, self.api_key
        );

        let request = ThreatMatchRequest {
            client: ClientInfo {
                client_id: "QRuSafe".to_string(),
                client_version: "1.0".to_string(),
            },
            threat_info: ThreatInfo {
                threat_types: vec![
                    "MALWARE",
                    "SOCIAL_ENGINEERING",
                    "UNWANTED_SOFTWARE",
                    "POTENTIALLY_HARMFUL_APPLICATION",
                ],
                platform_types: vec!["ANY_PLATFORM"],
                threat_entry_types: vec!["URL"],
                threat_entries: vec![ThreatEntry {
                    url: url.to_string(),
                }],
            },
        };

        let response = self
            .client
            .post(&endpoint)
            .json(&request)
            .send()
            .await
            .context("Failed to call Safe Browsing API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Safe Browsing API returned {}: {}", status, body);
        }

        let raw: Value = response
            .json()
            .await
            .context("Failed to parse Safe Browsing response")?;

        let verdict = interpret_response(&raw);
        debug!(url = url, verdict = ?verdict, "Safe Browsing lookup complete");

        Ok(ProviderVerdict { verdict, raw })
    }
}

/// A URL is flagged iff the response carries at least one threat match.
pub fn interpret_response(raw: &Value) -> Verdict {
    let has_matches = raw
        .get("matches")
        .and_then(Value::as_array)
        .is_some_and(|matches| !matches.is_empty());

    if has_matches {
        Verdict::Flagged
    } else {
        Verdict::Clean
    }
}

// --- Safe Browsing request types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThreatMatchRequest {
    client: ClientInfo,
    threat_info: ThreatInfo,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientInfo {
    client_id: String,
    client_version: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThreatInfo {
    threat_types: Vec<&'static str>,
    platform_types: Vec<&'static str>,
    threat_entry_types: Vec<&'static str>,
    threat_entries: Vec<ThreatEntry>,
}

#[derive(Serialize)]
struct ThreatEntry {
    url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_is_clean() {
        // Safe Browsing returns {} for URLs on no threat list
        assert_eq!(interpret_response(&json!({})), Verdict::Clean);
    }

    #[test]
    fn empty_matches_array_is_clean() {
        assert_eq!(interpret_response(&json!({ "matches": [] })), Verdict::Clean);
    }

    #[test]
    fn malware_match_is_flagged() {
        let raw = json!({
            "matches": [{
                "threatType": "MALWARE",
                "platformType": "ANY_PLATFORM",
                "threatEntryType": "URL",
                "threat": { "url": "http://malware.testing.google.test/testing/malware/" }
            }]
        });
        assert_eq!(interpret_response(&raw), Verdict::Flagged);
    }

    #[test]
    fn non_array_matches_is_clean() {
        // Defensive: a malformed `matches` shape never flags a URL
        assert_eq!(
            interpret_response(&json!({ "matches": "yes" })),
            Verdict::Clean
        );
    }

    #[test]
    fn request_serializes_with_camel_case_keys() {
        let request = ThreatMatchRequest {
            client: ClientInfo {
                client_id: "QRuSafe".to_string(),
                client_version: "1.0".to_string(),
            },
            threat_info: ThreatInfo {
                threat_types: vec!["MALWARE"],
                platform_types: vec!["ANY_PLATFORM"],
                threat_entry_types: vec!["URL"],
                threat_entries: vec![ThreatEntry {
                    url: "http://example.com".to_string(),
                }],
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["client"]["clientId"], "QRuSafe");
        assert_eq!(value["threatInfo"]["threatTypes"][0], "MALWARE");
        assert_eq!(
            value["threatInfo"]["threatEntries"][0]["url"],
            "http://example.com"
        );
    }
}
