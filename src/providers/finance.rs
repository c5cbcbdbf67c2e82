// src/providers/finance.rs
//! Quote provider: Alpha Vantage GLOBAL_QUOTE over JSON first, then a
//! Yahoo Finance page scrape when the API returns nothing useful (rate
//! limits on the demo key make that a common case).

use std::sync::Arc;

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{info, warn};

use crate::extract::element_text;
use crate::fetch::DocumentFetcher;
use crate::profile::ProviderOutput;
use crate::providers::{fetch_document, FINANCE_PROVIDER};
use crate::session::SessionManager;

/// Quotes outside this band are treated as scrape noise and dropped.
const PRICE_MIN: f64 = 0.0;
const PRICE_MAX: f64 = 100_000.0;

pub struct FinanceProvider {
    session: Arc<SessionManager>,
    fetcher: Arc<DocumentFetcher>,
    api_key: String,
}

impl FinanceProvider {
    pub fn new(session: Arc<SessionManager>, fetcher: Arc<DocumentFetcher>, api_key: String) -> Self {
        Self {
            session,
            fetcher,
            api_key,
        }
    }

    pub fn name(&self) -> &'static str {
        FINANCE_PROVIDER
    }

    /// Quote lookup for an already-resolved ticker. Not part of the generic
    /// provider pipeline since it keys on the symbol, not the entity name.
    pub async fn fetch_for_ticker(&self, ticker: &str) -> ProviderOutput {
        info!(%ticker, "fetching financial data");

        let api_url = format!(
            "https://www.alphavantage.co/query?function=GLOBAL_QUOTE&symbol={ticker}&apikey={}",
            self.api_key
        );
        let api_out = match self.fetcher.get_json(&api_url).await {
            Ok(json) => parse_global_quote(&json, &api_url),
            Err(e) => {
                warn!(error = %e, %ticker, "quote api request failed");
                ProviderOutput::default()
            }
        };
        if !needs_price_fallback(&api_out) {
            return api_out;
        }
        info!(%ticker, "no usable price from quote api, scraping yahoo");

        let page_url = format!("https://finance.yahoo.com/quote/{ticker}");
        match fetch_document(&self.session, &self.fetcher, &page_url).await {
            Ok(html) => {
                let scraped = parse_quote_page(&html, &page_url);
                if scraped.is_empty() && !api_out.is_empty() {
                    api_out
                } else {
                    scraped
                }
            }
            Err(e) => {
                warn!(error = %e, %ticker, "yahoo quote scrape failed");
                if api_out.is_empty() {
                    ProviderOutput::with_source_url(page_url)
                } else {
                    api_out
                }
            }
        }
    }
}

/// The page scrape runs whenever the API gave no usable price, even when
/// other quote fields came back.
fn needs_price_fallback(out: &ProviderOutput) -> bool {
    !out.scalars.contains_key("stock_price")
}

fn sane_price(raw: &str) -> Option<String> {
    let cleaned = raw.trim().trim_start_matches('$').replace(',', "");
    let value: f64 = cleaned.parse().ok()?;
    (value > PRICE_MIN && value < PRICE_MAX).then(|| cleaned)
}

/// Alpha Vantage keys its fields with numeric prefixes.
fn parse_global_quote(json: &Value, url: &str) -> ProviderOutput {
    let mut out = ProviderOutput::with_source_url(url);
    let Some(quote) = json.get("Global Quote").and_then(Value::as_object) else {
        return out;
    };

    let field = |key: &str| {
        quote
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    if let Some(price) = field("05. price").and_then(|p| sane_price(&p)) {
        out.set("stock_price", price);
    }
    if let Some(prev) = field("08. previous close") {
        out.set("previous_close", prev);
    }
    if let Some(change) = field("09. change") {
        out.set("change", change);
    }
    if let Some(pct) = field("10. change percent") {
        out.set("change_percent", pct);
    }
    out
}

fn parse_quote_page(html: &str, url: &str) -> ProviderOutput {
    let doc = Html::parse_document(html);
    let mut out = ProviderOutput::with_source_url(url);

    let price_sel = Selector::parse(r#"[data-field="regularMarketPrice"]"#).unwrap();
    if let Some(el) = doc.select(&price_sel).next() {
        let raw = el
            .value()
            .attr("value")
            .map(str::to_string)
            .unwrap_or_else(|| element_text(el));
        if let Some(price) = sane_price(&raw) {
            out.set("stock_price", price);
        }
    }

    // Summary tables label each statistic in the first cell of its row.
    let row_sel = Selector::parse("table tr").unwrap();
    let cell_sel = Selector::parse("td").unwrap();
    for row in doc.select(&row_sel) {
        let cells: Vec<String> = row.select(&cell_sel).map(element_text).collect();
        let [label, value] = cells.as_slice() else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        let label = label.to_lowercase();
        if label.contains("market cap") {
            out.set("market_cap", value.clone());
        } else if label.contains("pe ratio") || label.contains("p/e") {
            out.set("pe_ratio", value.clone());
        } else if label.contains("previous close") {
            out.set("previous_close", value.clone());
        }
    }

    out
}
