// src/ticker.rs
//! # Ticker Resolver
//!
//! Turns a company name into a financial ticker symbol through an ordered
//! set of resolution tiers, first success wins:
//!
//! 1. case-insensitive lookup in a configurable table of well-known
//!    company → ticker mappings (JSON file with a built-in seed);
//! 2. a live symbol-search against the quote provider (session-backed,
//!    stateless-fetch fallback);
//! 3. hard-coded overrides for names the live lookup is known to mangle;
//! 4. a generated heuristic ticker.
//!
//! Resolution never fails outright — tier 4 always produces a candidate —
//! but generated tickers are low-confidence and the quote provider will
//! usually find nothing for them.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::fetch::DocumentFetcher;
use crate::session::SessionManager;

pub const DEFAULT_TICKER_TABLE_PATH: &str = "config/tickers.json";

/// Names the live symbol search is known to mis-resolve.
const OVERRIDES: &[(&str, &str)] = &[("microsoft", "MSFT"), ("apple", "AAPL")];

/// Which tier produced the symbol. `Generated` is low-confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    KnownTable,
    LiveLookup,
    Override,
    Generated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTicker {
    pub symbol: String,
    pub tier: ResolutionTier,
}

/// Fixed table of well-known company → ticker mappings, loadable from JSON
/// with a built-in seed as fallback.
#[derive(Debug, Clone)]
pub struct TickerTable {
    entries: HashMap<String, String>,
}

impl TickerTable {
    /// Load from a JSON object file; falls back to the seed on any error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => match serde_json::from_str::<HashMap<String, String>>(&s) {
                Ok(map) => Self {
                    entries: map
                        .into_iter()
                        .map(|(k, v)| (k.to_lowercase(), v))
                        .collect(),
                },
                Err(_) => Self::default_seed(),
            },
            Err(_) => Self::default_seed(),
        }
    }

    pub fn lookup(&self, company_name: &str) -> Option<&str> {
        self.entries
            .get(&company_name.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Built-in seed of widely known US tickers.
    pub fn default_seed() -> Self {
        let mut entries = HashMap::new();
        for (k, v) in [
            ("apple", "AAPL"),
            ("microsoft", "MSFT"),
            ("amazon", "AMZN"),
            ("google", "GOOGL"),
            ("alphabet", "GOOGL"),
            ("meta", "META"),
            ("facebook", "META"),
            ("netflix", "NFLX"),
            ("tesla", "TSLA"),
            ("nvidia", "NVDA"),
            ("ibm", "IBM"),
            ("intel", "INTC"),
            ("adobe", "ADBE"),
            ("oracle", "ORCL"),
            ("salesforce", "CRM"),
            ("cisco", "CSCO"),
            ("walmart", "WMT"),
            ("disney", "DIS"),
            ("coca-cola", "KO"),
            ("coke", "KO"),
            ("pepsi", "PEP"),
            ("pepsico", "PEP"),
            ("mcdonald's", "MCD"),
            ("mcdonalds", "MCD"),
            ("starbucks", "SBUX"),
            ("nike", "NKE"),
            ("boeing", "BA"),
            ("ford", "F"),
            ("general motors", "GM"),
            ("gm", "GM"),
            ("exxon", "XOM"),
            ("exxonmobil", "XOM"),
            ("chevron", "CVX"),
            ("jpmorgan", "JPM"),
            ("jp morgan", "JPM"),
            ("bank of america", "BAC"),
            ("wells fargo", "WFC"),
            ("goldman sachs", "GS"),
            ("morgan stanley", "MS"),
            ("visa", "V"),
            ("mastercard", "MA"),
            ("american express", "AXP"),
            ("amex", "AXP"),
            ("paypal", "PYPL"),
            ("at&t", "T"),
            ("verizon", "VZ"),
            ("comcast", "CMCSA"),
            ("johnson & johnson", "JNJ"),
            ("pfizer", "PFE"),
            ("merck", "MRK"),
            ("ups", "UPS"),
            ("fedex", "FDX"),
            ("target", "TGT"),
            ("home depot", "HD"),
            ("lowes", "LOW"),
            ("lowe's", "LOW"),
        ] {
            entries.insert(k.to_string(), v.to_string());
        }
        Self { entries }
    }
}

/// Generated heuristic ticker: initials for multi-word names (kept when at
/// least two characters), first four characters uppercased otherwise.
pub fn generated_ticker(company_name: &str) -> String {
    let words: Vec<&str> = company_name.split_whitespace().collect();

    if words.len() > 1 {
        let initials: String = words
            .iter()
            .filter_map(|w| w.chars().find(|c| c.is_alphanumeric()))
            .collect::<String>()
            .to_uppercase();
        if initials.chars().count() >= 2 {
            return initials;
        }
    }

    company_name
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(4)
        .collect::<String>()
        .to_uppercase()
}

fn override_for(company_name: &str) -> Option<&'static str> {
    let lower = company_name.trim().to_lowercase();
    OVERRIDES
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, sym)| *sym)
}

pub struct TickerResolver {
    table: TickerTable,
    session: Arc<SessionManager>,
    fetcher: Arc<DocumentFetcher>,
}

impl TickerResolver {
    pub fn new(
        table: TickerTable,
        session: Arc<SessionManager>,
        fetcher: Arc<DocumentFetcher>,
    ) -> Self {
        Self {
            table,
            session,
            fetcher,
        }
    }

    /// Resolve a name through the tier cascade. Tier 1 short-circuits all
    /// network traffic.
    pub async fn resolve(&self, company_name: &str) -> ResolvedTicker {
        if let Some(symbol) = self.table.lookup(company_name) {
            info!(%company_name, %symbol, "ticker resolved from known table");
            return ResolvedTicker {
                symbol: symbol.to_string(),
                tier: ResolutionTier::KnownTable,
            };
        }

        if let Some(symbol) = self.live_lookup(company_name).await {
            info!(%company_name, %symbol, "ticker resolved via symbol search");
            return ResolvedTicker {
                symbol,
                tier: ResolutionTier::LiveLookup,
            };
        }

        if let Some(symbol) = override_for(company_name) {
            return ResolvedTicker {
                symbol: symbol.to_string(),
                tier: ResolutionTier::Override,
            };
        }

        let symbol = generated_ticker(company_name);
        warn!(%company_name, %symbol, "no ticker found, using generated candidate");
        ResolvedTicker {
            symbol,
            tier: ResolutionTier::Generated,
        }
    }

    /// Session-backed lookup-page scrape, then the stateless JSON symbol
    /// search when the session path yields nothing.
    async fn live_lookup(&self, company_name: &str) -> Option<String> {
        let lookup_url = format!(
            "https://finance.yahoo.com/lookup?s={}",
            company_name.replace(' ', "+")
        );
        match self.session.fetch_page(&lookup_url).await {
            Ok(html) => {
                if let Some(symbol) = parse_lookup_table(&html) {
                    return Some(symbol);
                }
            }
            Err(e) => {
                warn!(error = %e, %company_name, "session ticker lookup failed, trying search endpoint");
            }
        }

        let search_url = format!(
            "https://query1.finance.yahoo.com/v1/finance/search?q={}",
            company_name.replace(' ', "+")
        );
        match self.fetcher.get_json(&search_url).await {
            Ok(json) => parse_symbol_search(&json),
            Err(e) => {
                warn!(error = %e, %company_name, "symbol search endpoint failed");
                None
            }
        }
    }
}

/// First symbol cell of the quote provider's lookup results table.
fn parse_lookup_table(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let cell = Selector::parse(r#"table[data-test="lookup-table"] tbody tr td"#).unwrap();
    let symbol = doc
        .select(&cell)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    if symbol.is_empty() {
        None
    } else {
        Some(symbol)
    }
}

/// First quote symbol of the JSON symbol-search response.
fn parse_symbol_search(json: &serde_json::Value) -> Option<String> {
    json.get("quotes")?
        .as_array()?
        .first()?
        .get("symbol")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn resolver() -> TickerResolver {
        let cfg = AppConfig::default();
        TickerResolver::new(
            TickerTable::default_seed(),
            Arc::new(SessionManager::new(&cfg)),
            Arc::new(DocumentFetcher::new(&cfg).unwrap()),
        )
    }

    #[test]
    fn table_lookup_is_case_insensitive() {
        let table = TickerTable::default_seed();
        assert_eq!(table.lookup("Tesla"), Some("TSLA"));
        assert_eq!(table.lookup("  MICROSOFT "), Some("MSFT"));
        assert_eq!(table.lookup("Unknown Corp"), None);
    }

    #[tokio::test]
    async fn known_table_short_circuits_later_tiers() {
        // A table hit must return before any session or network activity;
        // the resolver here has no browser and an unused fetcher.
        let r = resolver().resolve("Nvidia").await;
        assert_eq!(r.symbol, "NVDA");
        assert_eq!(r.tier, ResolutionTier::KnownTable);
    }

    #[test]
    fn generated_multi_word_uses_initials() {
        assert_eq!(generated_ticker("Blue River Labs"), "BRL");
        assert_eq!(generated_ticker("General Dynamics"), "GD");
    }

    #[test]
    fn generated_single_word_takes_first_four() {
        assert_eq!(generated_ticker("Zylox"), "ZYLO");
        assert_eq!(generated_ticker("Axo"), "AXO");
    }

    #[test]
    fn overrides_match_known_misresolutions() {
        assert_eq!(override_for("Apple"), Some("AAPL"));
        assert_eq!(override_for("nobody"), None);
    }

    #[test]
    fn lookup_table_parse_takes_first_symbol_cell() {
        let html = r#"<table data-test="lookup-table"><tbody>
            <tr><td>ACME</td><td>Acme Corp</td></tr>
            <tr><td>ACMX</td><td>Acme Holdings</td></tr>
        </tbody></table>"#;
        assert_eq!(parse_lookup_table(html).as_deref(), Some("ACME"));
        assert_eq!(parse_lookup_table("<p>no table</p>"), None);
    }

    #[test]
    fn symbol_search_parse_takes_first_quote() {
        let json: serde_json::Value = serde_json::from_str(
            r#"{"quotes":[{"symbol":"ACME","shortname":"Acme Corp"},{"symbol":"ACMX"}]}"#,
        )
        .unwrap();
        assert_eq!(parse_symbol_search(&json).as_deref(), Some("ACME"));
        assert_eq!(
            parse_symbol_search(&serde_json::json!({"quotes": []})),
            None
        );
    }
}
