// src/fetch.rs
//! Stateless document-fetch collaborator: a shared reqwest client with a
//! fixed short timeout. The document structure is the caller's problem —
//! this layer only guarantees "text or a transport failure".

use std::time::Duration;

use reqwest::Client;

use crate::config::AppConfig;
use crate::error::ScrapeError;

pub struct DocumentFetcher {
    client: Client,
}

impl DocumentFetcher {
    pub fn new(cfg: &AppConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(cfg.fetch_timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;
        Ok(Self { client })
    }

    /// Fetch a URL and return its body text.
    pub async fn get_text(&self, url: &str) -> Result<String, ScrapeError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::Network(format!("GET {url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Network(format!("GET {url}: status {status}")));
        }

        resp.text()
            .await
            .map_err(|e| ScrapeError::Network(format!("reading body of {url}: {e}")))
    }

    /// Fetch a URL and parse its body as JSON.
    pub async fn get_json(&self, url: &str) -> Result<serde_json::Value, ScrapeError> {
        let text = self.get_text(url).await?;
        serde_json::from_str(&text)
            .map_err(|e| ScrapeError::Parse(format!("JSON from {url}: {e}")))
    }
}

/// Prefix a scheme when the input lacks one.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Derive the bare domain token from a website, e.g.
/// `https://www.acme.com/about` → `acme`. Used as the relevance domain hint.
pub fn domain_token(website: &str) -> Option<String> {
    let normalized = normalize_url(website);
    let parsed = url::Url::parse(&normalized).ok()?;
    let host = parsed.host_str()?.trim_start_matches("www.");
    let token = host.split('.').next()?.to_ascii_lowercase();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_url_prefixes_scheme() {
        assert_eq!(normalize_url("acme.com"), "https://acme.com");
        assert_eq!(normalize_url("http://acme.com"), "http://acme.com");
        assert_eq!(normalize_url("  https://acme.com "), "https://acme.com");
    }

    #[test]
    fn domain_token_strips_www_and_tld() {
        assert_eq!(domain_token("https://www.acme.com").as_deref(), Some("acme"));
        assert_eq!(domain_token("acme.io/products").as_deref(), Some("acme"));
        assert_eq!(
            domain_token("http://blue-river.example.org").as_deref(),
            Some("blue-river")
        );
    }
}
