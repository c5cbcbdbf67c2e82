// src/providers/mod.rs
pub mod finance;
pub mod news;
pub mod website;
pub mod wikipedia;

use async_trait::async_trait;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tracing::warn;

use crate::error::ScrapeError;
use crate::fetch::DocumentFetcher;
use crate::profile::{ProviderOutput, Query};
use crate::session::SessionManager;

pub const WEBSITE_PROVIDER: &str = "Company Website";
pub const WIKIPEDIA_PROVIDER: &str = "Wikipedia";
pub const FINANCE_PROVIDER: &str = "Financial Data";
pub const NEWS_PROVIDER: &str = "News";

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("provider_fetch_total", "Provider invocations.");
        describe_counter!(
            "provider_empty_total",
            "Provider invocations that yielded no data."
        );
        describe_counter!(
            "provider_errors_total",
            "Retrieval-path errors recovered inside providers."
        );
        describe_counter!("session_recreate_total", "Browser session recreations.");
        describe_counter!("aggregate_requests_total", "Aggregation runs started.");
    });
}

/// A provider maps an entity query to a best-effort partial fact set plus
/// the URL it consulted. Internal failures never escape: they are logged
/// and reduced to an empty or partial output.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn fetch(&self, query: &Query) -> ProviderOutput;
    fn name(&self) -> &'static str;
}

/// Uniform instrumentation wrapper around one provider call.
pub(crate) async fn run_provider(provider: &dyn Provider, query: &Query) -> ProviderOutput {
    ensure_metrics_described();
    counter!("provider_fetch_total", "provider" => provider.name()).increment(1);

    let out = provider.fetch(query).await;
    if out.is_empty() {
        counter!("provider_empty_total", "provider" => provider.name()).increment(1);
    }
    out
}

/// Two retrieval strategies, in order: the stateful browser session, then a
/// stateless document fetch with the configured short timeout.
pub(crate) async fn fetch_document(
    session: &SessionManager,
    fetcher: &DocumentFetcher,
    url: &str,
) -> Result<String, ScrapeError> {
    match session.fetch_page(url).await {
        Ok(html) => Ok(html),
        Err(e) => {
            counter!("provider_errors_total", "kind" => e.kind()).increment(1);
            warn!(error = %e, %url, "session fetch failed, falling back to stateless fetch");
            fetcher.get_text(url).await
        }
    }
}
