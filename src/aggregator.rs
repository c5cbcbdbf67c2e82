// src/aggregator.rs
//! Orchestrates one aggregation run: validate the query, call each source
//! in order, score identity confidence, gate the quote lookup on it, and
//! merge everything into a single record with per-field provenance.

use std::sync::Arc;

use metrics::counter;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::ValidationError;
use crate::fetch::{domain_token, DocumentFetcher};
use crate::profile::{update_result, AggregateRecord, Query};
use crate::providers::{
    ensure_metrics_described, finance::FinanceProvider, news::NewsProvider, run_provider,
    website::WebsiteProvider, wikipedia::WikipediaProvider, Provider,
};
use crate::relevance::{score_website, score_wikipedia, Tier};
use crate::session::SessionManager;
use crate::ticker::{ResolutionTier, TickerResolver, TickerTable, DEFAULT_TICKER_TABLE_PATH};

/// Trailing legal forms stripped before guessing a domain from the name.
const LEGAL_SUFFIXES: &[&str] = &[
    "inc", "inc.", "corp", "corp.", "corporation", "co", "co.", "company", "llc", "ltd", "ltd.",
    "plc", "group", "holdings",
];

pub struct Aggregator {
    website: WebsiteProvider,
    wikipedia: WikipediaProvider,
    finance: FinanceProvider,
    news: NewsProvider,
    resolver: TickerResolver,
}

impl Aggregator {
    pub fn new(cfg: &AppConfig) -> anyhow::Result<Self> {
        ensure_metrics_described();
        let session = Arc::new(SessionManager::new(cfg));
        let fetcher = Arc::new(DocumentFetcher::new(cfg)?);
        let table = TickerTable::load_from_file(DEFAULT_TICKER_TABLE_PATH);

        Ok(Self {
            website: WebsiteProvider::new(cfg, Arc::clone(&session), Arc::clone(&fetcher)),
            wikipedia: WikipediaProvider::new(Arc::clone(&session), Arc::clone(&fetcher)),
            finance: FinanceProvider::new(
                Arc::clone(&session),
                Arc::clone(&fetcher),
                cfg.quote_api_key.clone(),
            ),
            news: NewsProvider::new(Arc::clone(&fetcher), cfg.max_news_articles),
            resolver: TickerResolver::new(table, session, fetcher),
        })
    }

    /// Run the full pipeline for one query. Only an invalid query is an
    /// error; every upstream failure degrades into an emptier record.
    pub async fn aggregate(&self, query: &Query) -> Result<AggregateRecord, ValidationError> {
        query.validate()?;
        counter!("aggregate_requests_total").increment(1);
        info!(entity = %query.entity_name, website = ?query.website, "aggregation started");

        let mut record = AggregateRecord::new(query);
        let hint = query.website.as_deref().and_then(domain_token);

        if query.website.is_none() {
            flag_missing_website(&mut record, &query.entity_name);
        } else {
            let output = run_provider(&self.website, query).await;
            let rel = score_website(&output.scored_text(), &query.entity_name, hint.as_deref());
            info!(score = rel.score, tier = rel.tier.as_str(), matched = ?rel.matched, "website relevance");
            record.data_quality.website_relevance = Some(rel.tier);
            if rel.tier.accepted() {
                update_result(&mut record, &output, self.website.name());
            } else {
                warn!("website content did not look like the queried company, discarding");
                record
                    .source_urls
                    .extend(output.source_url.clone().map(|u| (self.website.name().to_string(), u)));
            }
        }

        let output = run_provider(&self.wikipedia, query).await;
        let rel = score_wikipedia(&output.scored_text(), &query.entity_name, hint.as_deref());
        info!(score = rel.score, tier = rel.tier.as_str(), matched = ?rel.matched, "wikipedia relevance");
        record.data_quality.wikipedia_relevance = Some(rel.tier);
        if rel.tier.accepted() {
            update_result(&mut record, &output, self.wikipedia.name());
        } else {
            warn!("wikipedia article rejected as a different entity");
            record
                .source_urls
                .extend(output.source_url.clone().map(|u| (self.wikipedia.name().to_string(), u)));
        }

        if finance_allowed(
            record.data_quality.website_relevance.as_ref(),
            record.data_quality.wikipedia_relevance.as_ref(),
        ) {
            let resolved = self.resolver.resolve(&query.entity_name).await;
            let output = self.finance.fetch_for_ticker(&resolved.symbol).await;
            if output.is_empty() {
                record.data_quality.financial_data = Some(format!(
                    "No quote data found for ticker {}",
                    resolved.symbol
                ));
            } else if resolved.tier == ResolutionTier::Generated {
                record.data_quality.financial_data = Some(format!(
                    "Ticker {} was generated from the name and may be wrong",
                    resolved.symbol
                ));
            }
            update_result(&mut record, &output, self.finance.name());
        } else {
            info!("identity confidence too low, skipping financial lookup");
            record.data_quality.finance_skipped = true;
        }

        let output = run_provider(&self.news, query).await;
        if output.articles.is_empty() {
            record.data_quality.news = Some("No recent news found".to_string());
        }
        update_result(&mut record, &output, self.news.name());

        info!(
            overview_fields = record.overview.len(),
            financial_fields = record.financials.len(),
            news = record.news.len(),
            "aggregation finished"
        );
        Ok(record)
    }
}

/// Degradation bookkeeping for a query with no website: flag it, warn the
/// consumer, and report the informational domain guess.
pub fn flag_missing_website(record: &mut AggregateRecord, entity_name: &str) {
    record.data_quality.website_missing = true;
    record.warning =
        Some("No website provided; identity was inferred from the name alone".to_string());
    record.guessed_website = guess_website(entity_name);
}

/// Gate for the quote lookup: at least one identity signal must clear the
/// medium bar.
pub fn finance_allowed(website: Option<&Tier>, wikipedia: Option<&Tier>) -> bool {
    website.is_some_and(|t| t.accepted()) || wikipedia.is_some_and(|t| t.accepted())
}

/// Informational-only domain guess from the entity name. Never fetched.
pub fn guess_website(entity_name: &str) -> Option<String> {
    let words: Vec<&str> = entity_name
        .split_whitespace()
        .filter(|w| !LEGAL_SUFFIXES.contains(&w.trim_matches(',').to_lowercase().as_str()))
        .collect();
    let slug: String = words
        .join("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    (!slug.is_empty()).then(|| format!("{slug}.com"))
}
