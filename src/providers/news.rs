// src/providers/news.rs
//! News provider: Google News RSS first, then Bing News and finally a
//! Google search result page when the feed yields nothing. Runs over plain
//! HTTP only; news engines serve usable markup without a browser.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use quick_xml::de::from_str;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use time::{
    format_description::well_known::Rfc2822, macros::format_description, OffsetDateTime, UtcOffset,
};
use tracing::{info, warn};

use crate::extract::element_text;
use crate::fetch::DocumentFetcher;
use crate::profile::{Article, ProviderOutput, Query};
use crate::providers::{Provider, NEWS_PROVIDER};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    source: Option<ItemSource>,
}

#[derive(Debug, Deserialize)]
struct ItemSource {
    #[serde(rename = "$text")]
    name: Option<String>,
}

/// RFC 2822 feed timestamps become plain `YYYY-MM-DD`; anything unparseable
/// falls back to today's date.
fn feed_date(ts: Option<&str>) -> String {
    let fmt = format_description!("[year]-[month]-[day]");
    ts.and_then(|v| OffsetDateTime::parse(v, &Rfc2822).ok())
        .map(|dt| dt.to_offset(UtcOffset::UTC))
        .and_then(|dt| dt.format(&fmt).ok())
        .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string())
}

pub struct NewsProvider {
    fetcher: Arc<DocumentFetcher>,
    max_articles: usize,
}

impl NewsProvider {
    pub fn new(fetcher: Arc<DocumentFetcher>, max_articles: usize) -> Self {
        Self {
            fetcher,
            max_articles,
        }
    }

    /// Returns the articles together with the endpoint that produced them,
    /// so provenance names the source that actually answered.
    async fn from_rss(&self, entity_name: &str) -> Option<(String, Vec<Article>)> {
        let url = rss_url(entity_name);
        let body = match self.fetcher.get_text(&url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, %url, "news rss fetch failed");
                return None;
            }
        };
        match parse_rss(&body, self.max_articles) {
            Ok(articles) if !articles.is_empty() => Some((url, articles)),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "news rss parse failed");
                None
            }
        }
    }

    async fn from_bing(&self, entity_name: &str) -> Option<(String, Vec<Article>)> {
        let url = bing_url(entity_name);
        let body = self
            .fetcher
            .get_text(&url)
            .await
            .map_err(|e| warn!(error = %e, %url, "bing news fetch failed"))
            .ok()?;
        let articles = parse_bing_news(&body, self.max_articles);
        (!articles.is_empty()).then_some((url, articles))
    }

    async fn from_google_search(&self, entity_name: &str) -> Option<(String, Vec<Article>)> {
        let url = google_url(entity_name);
        let body = self
            .fetcher
            .get_text(&url)
            .await
            .map_err(|e| warn!(error = %e, %url, "google news fetch failed"))
            .ok()?;
        let articles = parse_google_news(&body, self.max_articles);
        (!articles.is_empty()).then_some((url, articles))
    }
}

fn rss_url(entity_name: &str) -> String {
    format!(
        "https://news.google.com/rss/search?q={}",
        entity_name.replace(' ', "+")
    )
}

fn bing_url(entity_name: &str) -> String {
    format!(
        "https://www.bing.com/news/search?q={}",
        entity_name.replace(' ', "+")
    )
}

fn google_url(entity_name: &str) -> String {
    format!(
        "https://www.google.com/search?q={}+news&tbm=nws",
        entity_name.replace(' ', "+")
    )
}

#[async_trait]
impl Provider for NewsProvider {
    async fn fetch(&self, query: &Query) -> ProviderOutput {
        if query.entity_name.is_empty() {
            return ProviderOutput::default();
        }
        info!(entity = %query.entity_name, "searching news");

        let name = &query.entity_name;
        let (url, articles) = match self.from_rss(name).await {
            Some(hit) => hit,
            None => match self.from_bing(name).await {
                Some(hit) => hit,
                // Nothing anywhere; report the primary endpoint consulted.
                None => match self.from_google_search(name).await {
                    Some(hit) => hit,
                    None => (rss_url(name), Vec::new()),
                },
            },
        };

        let mut out = ProviderOutput::with_source_url(url);
        out.articles = articles;
        out
    }

    fn name(&self) -> &'static str {
        NEWS_PROVIDER
    }
}

fn parse_rss(xml: &str, max: usize) -> anyhow::Result<Vec<Article>> {
    let rss: Rss = from_str(xml)?;
    let mut out = Vec::new();
    for it in rss.channel.item {
        let title = it.title.unwrap_or_default().trim().to_string();
        if title.is_empty() {
            continue;
        }
        out.push(Article {
            title,
            link: it.link.unwrap_or_default(),
            date: feed_date(it.pub_date.as_deref()),
            source: it
                .source
                .and_then(|s| s.name)
                .unwrap_or_else(|| "Google News".to_string()),
            description: it.description.unwrap_or_default(),
        });
        if out.len() >= max {
            break;
        }
    }
    Ok(out)
}

fn select_text(el: ElementRef<'_>, selectors: &[&str]) -> String {
    for raw in selectors {
        let sel = Selector::parse(raw).unwrap();
        if let Some(found) = el.select(&sel).next() {
            let text = element_text(found);
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

fn select_href(el: ElementRef<'_>) -> String {
    let sel = Selector::parse("a").unwrap();
    el.select(&sel)
        .find_map(|a| a.value().attr("href"))
        .unwrap_or_default()
        .to_string()
}

fn parse_bing_news(html: &str, max: usize) -> Vec<Article> {
    let doc = Html::parse_document(html);
    let card_sel = Selector::parse(".news-card").unwrap();
    let today = Utc::now().format("%Y-%m-%d").to_string();

    let mut out = Vec::new();
    for card in doc.select(&card_sel) {
        let title = select_text(card, &[".title", "a"]);
        if title.is_empty() {
            continue;
        }
        out.push(Article {
            title,
            link: select_href(card),
            date: today.clone(),
            source: select_text(card, &[".source"]),
            description: select_text(card, &[".snippet"]),
        });
        if out.len() >= max {
            break;
        }
    }
    out
}

fn parse_google_news(html: &str, max: usize) -> Vec<Article> {
    let doc = Html::parse_document(html);
    let today = Utc::now().format("%Y-%m-%d").to_string();

    let mut out = Vec::new();
    for raw in ["div.SoaBEf", "div.WlydOe"] {
        let sel = Selector::parse(raw).unwrap();
        for item in doc.select(&sel) {
            let title = select_text(item, &["div.mCBkyc", "h3"]);
            if title.is_empty() {
                continue;
            }
            out.push(Article {
                title,
                link: select_href(item),
                date: today.clone(),
                source: select_text(item, &[".CEMjEf", ".UPmit"]),
                description: select_text(item, &[".GI74Re", "div.Y3v8qd"]),
            });
            if out.len() >= max {
                return out;
            }
        }
        if !out.is_empty() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<rss version="2.0"><channel>
        <title>search</title>
        <item>
            <title>Acme ships new widget</title>
            <link>https://example.com/a</link>
            <pubDate>Tue, 05 Aug 2025 12:30:00 GMT</pubDate>
            <description>Short take.</description>
            <source url="https://example.com">Example Wire</source>
        </item>
        <item>
            <title>Acme earnings beat</title>
            <link>https://example.com/b</link>
        </item>
    </channel></rss>"#;

    #[test]
    fn rss_items_become_articles() {
        let articles = parse_rss(FEED, 5).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Acme ships new widget");
        assert_eq!(articles[0].date, "2025-08-05");
        assert_eq!(articles[0].source, "Example Wire");
        assert_eq!(articles[1].source, "Google News");
    }

    #[test]
    fn rss_respects_article_cap() {
        let articles = parse_rss(FEED, 1).unwrap();
        assert_eq!(articles.len(), 1);
    }

    #[test]
    fn unparseable_date_falls_back_to_today() {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        assert_eq!(feed_date(Some("not a date")), today);
        assert_eq!(feed_date(None), today);
    }

    #[test]
    fn bing_cards_are_parsed() {
        let html = r#"<div class="news-card">
            <a class="title" href="https://example.com/c">Acme expands</a>
            <div class="source">Example Post</div>
            <div class="snippet">Acme opens a second plant.</div>
        </div>"#;
        let articles = parse_bing_news(html, 5);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Acme expands");
        assert_eq!(articles[0].link, "https://example.com/c");
        assert_eq!(articles[0].source, "Example Post");
    }

    #[test]
    fn google_results_are_parsed_with_alternate_selectors() {
        let html = r#"<div class="WlydOe">
            <a href="https://example.com/d"><h3>Acme in talks</h3></a>
            <span class="UPmit">Example Daily</span>
            <div class="Y3v8qd">Merger rumors swirl.</div>
        </div>"#;
        let articles = parse_google_news(html, 5);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Acme in talks");
        assert_eq!(articles[0].source, "Example Daily");
    }

    #[test]
    fn each_source_reports_its_own_endpoint() {
        assert_eq!(
            rss_url("Acme Corp"),
            "https://news.google.com/rss/search?q=Acme+Corp"
        );
        assert_eq!(
            bing_url("Acme Corp"),
            "https://www.bing.com/news/search?q=Acme+Corp"
        );
        assert_eq!(
            google_url("Acme Corp"),
            "https://www.google.com/search?q=Acme+Corp+news&tbm=nws"
        );
    }

    #[test]
    fn empty_markup_yields_no_articles() {
        assert!(parse_bing_news("<p>nothing</p>", 5).is_empty());
        assert!(parse_google_news("<p>nothing</p>", 5).is_empty());
    }
}
