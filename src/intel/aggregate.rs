// Verdict aggregation — fan a URL out to every provider and OR the flags.
//
// Each provider call is an independent fallible operation. A failed
// provider is recorded as unavailable in the details rather than failing
// the whole request; the request errors only when no provider answered
// at all. Partial data is never conflated with a safe verdict — a flag
// from the one provider that did answer still makes the aggregate unsafe.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use futures::future::join_all;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::traits::{ThreatProvider, Verdict};

pub const MSG_SAFE: &str = "This link appears safe.";
pub const MSG_DANGEROUS: &str = "This link is flagged as potentially dangerous.";
pub const MSG_INCOMPLETE: &str =
    "No provider flagged this link, but some results were unavailable.";

/// The combined verdict returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateVerdict {
    pub safe: bool,
    pub message: String,
    /// Provider name → raw payload, or an `unavailable` marker when that
    /// provider's call failed. Entries exist only for providers actually
    /// queried.
    pub details: BTreeMap<String, Value>,
}

/// Fans one URL out to all configured providers.
pub struct Aggregator {
    providers: Vec<Arc<dyn ThreatProvider>>,
}

impl Aggregator {
    pub fn new(providers: Vec<Arc<dyn ThreatProvider>>) -> Self {
        Self { providers }
    }

    /// Check a URL against every provider concurrently and combine the
    /// verdicts with logical OR.
    ///
    /// Errors only when every provider failed — a single unreachable
    /// provider degrades to an `unavailable` entry in the details.
    pub async fn check(&self, url: &str) -> Result<AggregateVerdict> {
        let calls = self
            .providers
            .iter()
            .map(|provider| async move { (provider.name(), provider.check_url(url).await) });
        let outcomes = join_all(calls).await;

        let mut details = BTreeMap::new();
        let mut any_flagged = false;
        let mut all_conclusive = true;
        let mut any_succeeded = false;

        for (name, outcome) in outcomes {
            match outcome {
                Ok(provider_verdict) => {
                    any_succeeded = true;
                    match provider_verdict.verdict {
                        Verdict::Flagged => any_flagged = true,
                        Verdict::Clean => {}
                        Verdict::Inconclusive => all_conclusive = false,
                    }
                    details.insert(name.to_string(), provider_verdict.raw);
                }
                Err(error) => {
                    warn!(provider = name, url = url, error = %error, "Provider check failed");
                    all_conclusive = false;
                    details.insert(
                        name.to_string(),
                        json!({ "unavailable": true, "error": error.to_string() }),
                    );
                }
            }
        }

        if !any_succeeded {
            anyhow::bail!("All threat providers were unavailable for {url}");
        }

        let (safe, message) = if any_flagged {
            (false, MSG_DANGEROUS)
        } else if all_conclusive {
            (true, MSG_SAFE)
        } else {
            (true, MSG_INCOMPLETE)
        };

        info!(
            url = url,
            safe = safe,
            providers = details.len(),
            "Aggregate verdict computed"
        );

        Ok(AggregateVerdict {
            safe,
            message: message.to_string(),
            details,
        })
    }
}
