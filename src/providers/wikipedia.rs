// src/providers/wikipedia.rs
//! Encyclopedia provider: fetches the article for the entity name, falling
//! back to full-text search and following the first result when no exact
//! title exists. Extracts the lead paragraph plus a fixed set of infobox
//! fields and leadership roles.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

use crate::extract::leadership::Leader;
use crate::extract::{clean_citations, element_text};
use crate::fetch::DocumentFetcher;
use crate::profile::{ProviderOutput, Query};
use crate::providers::{fetch_document, Provider, WIKIPEDIA_PROVIDER};
use crate::session::SessionManager;

const MISSING_ARTICLE_MARKER: &str = "Wikipedia does not have an article with this exact name";

/// Infobox headers that map straight onto overview scalars.
const INFOBOX_FIELDS: &[(&str, &[&str])] = &[
    ("founded", &["founded"]),
    ("headquarters", &["headquarters", "location"]),
    ("industry", &["industry"]),
    ("employees", &["employees"]),
    ("revenue", &["revenue"]),
];

/// Infobox headers naming executive roles; their cells may list several
/// people split on comma or newline.
const INFOBOX_ROLES: &[&str] = &[
    "founder",
    "founders",
    "ceo",
    "chief executive",
    "chairman",
    "key people",
];

pub struct WikipediaProvider {
    session: Arc<SessionManager>,
    fetcher: Arc<DocumentFetcher>,
}

impl WikipediaProvider {
    pub fn new(session: Arc<SessionManager>, fetcher: Arc<DocumentFetcher>) -> Self {
        Self { session, fetcher }
    }

    fn article_url(entity_name: &str) -> String {
        format!(
            "https://en.wikipedia.org/wiki/{}",
            entity_name.replace(' ', "_")
        )
    }

    fn search_url(entity_name: &str) -> String {
        format!(
            "https://en.wikipedia.org/w/index.php?search={}",
            entity_name.replace(' ', "+")
        )
    }

    /// Resolve the article HTML: exact title first, then full-text search
    /// following the first result. Returns the markup and the final URL.
    async fn resolve_article(&self, entity_name: &str) -> Option<(String, String)> {
        let url = Self::article_url(entity_name);
        let html = match fetch_document(&self.session, &self.fetcher, &url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(error = %e, %url, "wikipedia fetch failed");
                return None;
            }
        };

        if !html.contains(MISSING_ARTICLE_MARKER) {
            return Some((html, url));
        }

        info!(%entity_name, "no exact wikipedia title, trying search");
        let search = Self::search_url(entity_name);
        let html = match fetch_document(&self.session, &self.fetcher, &search).await {
            Ok(html) => html,
            Err(e) => {
                warn!(error = %e, url = %search, "wikipedia search failed");
                return None;
            }
        };

        // A redirect straight to an article has no results list.
        match first_search_result(&html) {
            None if html.contains("mw-search-results") || html.contains("Search results") => {
                warn!(%entity_name, "no wikipedia results found");
                None
            }
            None => Some((html, search)),
            Some(href) => {
                let target = if href.starts_with("http") {
                    href
                } else {
                    format!("https://en.wikipedia.org{href}")
                };
                let html = match fetch_document(&self.session, &self.fetcher, &target).await {
                    Ok(html) => html,
                    Err(e) => {
                        warn!(error = %e, url = %target, "following search result failed");
                        return None;
                    }
                };
                Some((html, target))
            }
        }
    }
}

#[async_trait]
impl Provider for WikipediaProvider {
    async fn fetch(&self, query: &Query) -> ProviderOutput {
        if query.entity_name.is_empty() {
            return ProviderOutput::default();
        }
        info!(entity = %query.entity_name, "scraping wikipedia");

        match self.resolve_article(&query.entity_name).await {
            Some((html, url)) => extract_article(&html, &url),
            None => ProviderOutput::with_source_url(Self::article_url(&query.entity_name)),
        }
    }

    fn name(&self) -> &'static str {
        WIKIPEDIA_PROVIDER
    }
}

/// First link of the full-text search results, if the page is a results
/// page at all.
fn first_search_result(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse(".mw-search-result-heading a").unwrap();
    doc.select(&sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string)
}

/// Pure extraction over article markup.
pub fn extract_article(html: &str, url: &str) -> ProviderOutput {
    let doc = Html::parse_document(html);
    let mut out = ProviderOutput::with_source_url(url);

    // Lead paragraph becomes the overview description.
    let para_sel = Selector::parse("#mw-content-text p").unwrap();
    for p in doc.select(&para_sel) {
        if p.value().classes().any(|c| c == "mw-empty-elt") {
            continue;
        }
        let text = clean_citations(&element_text(p));
        if !text.is_empty() {
            out.set("description", text);
            break;
        }
    }

    let infobox_sel = Selector::parse(".infobox tr").unwrap();
    let th_sel = Selector::parse("th").unwrap();
    let td_sel = Selector::parse("td").unwrap();

    for row in doc.select(&infobox_sel) {
        let Some(th) = row.select(&th_sel).next() else {
            continue;
        };
        let Some(td) = row.select(&td_sel).next() else {
            continue;
        };
        let header = element_text(th).to_lowercase();
        let value = clean_citations(&element_text(td));
        if value.is_empty() {
            continue;
        }

        for (field, needles) in INFOBOX_FIELDS {
            if needles.iter().any(|n| header.contains(n)) {
                out.set(field, value.clone());
                break;
            }
        }

        if INFOBOX_ROLES.iter().any(|r| header.contains(r)) {
            let position = element_text(th);
            out.leadership.extend(split_role_cell(td, &position));
        }
    }

    out
}

/// Split a multi-name infobox cell on commas and line breaks.
fn split_role_cell(td: ElementRef<'_>, position: &str) -> Vec<Leader> {
    // Line breaks inside the cell separate people; re-introduce them from
    // list items before splitting.
    let li_sel = Selector::parse("li").unwrap();
    let items: Vec<String> = td.select(&li_sel).map(element_text).collect();
    let raw = if items.is_empty() {
        element_text(td)
    } else {
        items.join(",")
    };

    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|name| !name.is_empty() && name.chars().count() <= 50)
        .map(|name| Leader {
            name: clean_citations(name),
            position: position.to_string(),
        })
        .collect()
}
