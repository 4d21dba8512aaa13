// Threat provider trait — the swap-ready abstraction.
//
// Each external threat-intelligence service is wrapped in a ThreatProvider
// so the aggregator never cares which concrete API sits behind it, and
// tests can substitute fakes for the real HTTP clients.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Outcome of a single provider's look at one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The provider associates the URL with malicious activity.
    Flagged,
    /// The provider found nothing wrong with the URL.
    Clean,
    /// The provider's analysis did not finish before our deadline.
    /// Never coerced to Clean or Flagged.
    Inconclusive,
}

/// One provider's verdict plus the raw payload it was derived from.
/// The payload is opaque — kept for display and debugging only.
#[derive(Debug, Clone)]
pub struct ProviderVerdict {
    pub verdict: Verdict,
    pub raw: Value,
}

/// Trait for external threat-intelligence services. Implementations must
/// be async because every provider is an HTTP API call.
#[async_trait]
pub trait ThreatProvider: Send + Sync {
    /// Short provider name, used as the key in aggregate `details`.
    fn name(&self) -> &'static str;

    /// Check a single URL. Transport and protocol failures are errors —
    /// a provider that can't answer is never reported as Clean.
    async fn check_url(&self, url: &str) -> Result<ProviderVerdict>;
}
