// src/providers/website.rs
//! Website provider: fetches the company's own site and extracts the page
//! title, meta description, an "about" section, product/service names, and
//! a leadership list.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::info;

use crate::config::AppConfig;
use crate::extract::leadership::extract_leadership;
use crate::extract::{
    element_text, find_section_by_keywords, ABOUT_KEYWORDS, PRODUCT_KEYWORDS,
};
use crate::fetch::{normalize_url, DocumentFetcher};
use crate::profile::{ProviderOutput, Query};
use crate::providers::{fetch_document, Provider, WEBSITE_PROVIDER};
use crate::session::SessionManager;

/// Product names longer than this are treated as captured prose, not names.
const MAX_PRODUCT_NAME_LEN: usize = 100;
/// Cap on the extracted about-section text.
const MAX_ABOUT_LEN: usize = 1500;

pub struct WebsiteProvider {
    session: Arc<SessionManager>,
    fetcher: Arc<DocumentFetcher>,
    max_products: usize,
}

impl WebsiteProvider {
    pub fn new(cfg: &AppConfig, session: Arc<SessionManager>, fetcher: Arc<DocumentFetcher>) -> Self {
        Self {
            session,
            fetcher,
            max_products: cfg.max_products,
        }
    }
}

#[async_trait]
impl Provider for WebsiteProvider {
    async fn fetch(&self, query: &Query) -> ProviderOutput {
        let Some(website) = &query.website else {
            return ProviderOutput::default();
        };
        let url = normalize_url(website);
        info!(%url, "scraping company website");

        match fetch_document(&self.session, &self.fetcher, &url).await {
            Ok(html) => extract_website(&html, &url, self.max_products),
            Err(e) => {
                tracing::warn!(error = %e, %url, "website retrieval failed");
                ProviderOutput::with_source_url(url)
            }
        }
    }

    fn name(&self) -> &'static str {
        WEBSITE_PROVIDER
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        s.chars().take(max).collect()
    } else {
        s.to_string()
    }
}

/// Pure extraction over fetched markup.
pub fn extract_website(html: &str, url: &str, max_products: usize) -> ProviderOutput {
    let doc = Html::parse_document(html);
    let mut out = ProviderOutput::with_source_url(url);

    let title_sel = Selector::parse("title").unwrap();
    if let Some(title) = doc.select(&title_sel).next() {
        out.set("title", element_text(title));
    }

    // Meta description lands in the `summary` field.
    let meta_sel = Selector::parse(r#"meta[name="description"]"#).unwrap();
    if let Some(meta) = doc.select(&meta_sel).next() {
        if let Some(content) = meta.value().attr("content") {
            out.set("summary", content.trim());
        }
    }

    if let Some(section) = find_section_by_keywords(&doc, ABOUT_KEYWORDS) {
        let about = element_text(section);
        if !about.is_empty() {
            out.set("about", truncate_chars(&about, MAX_ABOUT_LEN));
        }
    }

    out.products = extract_products(&doc, max_products);
    out.leadership = extract_leadership(&doc);

    out
}

/// Product/service names: headings inside the product section first, list
/// items when no headings qualify.
fn extract_products(doc: &Html, max_products: usize) -> Vec<String> {
    let Some(section) = find_section_by_keywords(doc, PRODUCT_KEYWORDS) else {
        return Vec::new();
    };

    let headings = Selector::parse("h1, h2, h3, h4, h5").unwrap();
    let mut products: Vec<String> = section
        .select(&headings)
        .map(element_text)
        .filter(|t| !t.is_empty() && t.chars().count() < MAX_PRODUCT_NAME_LEN)
        .collect();

    if products.is_empty() {
        let items = Selector::parse("li").unwrap();
        products = section
            .select(&items)
            .map(element_text)
            .filter(|t| !t.is_empty() && t.chars().count() < MAX_PRODUCT_NAME_LEN)
            .collect();
    }

    products.truncate(max_products);
    products
}
