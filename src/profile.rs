// src/profile.rs
//! Data model for one aggregation run: the immutable [`Query`], the partial
//! [`ProviderOutput`] each provider returns, and the merged, provenance-
//! tagged [`AggregateRecord`].
//!
//! Merge semantics: scalar fields are last-writer-wins in provider-call
//! order with `sources[key]` tracking the latest writer; list fields are
//! append-only, every entry tagged with its originating provider. An empty
//! provider output mutates nothing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::extract::leadership::Leader;
use crate::relevance::Tier;

/// Scalar keys that land in `overview`.
pub const OVERVIEW_FIELDS: &[&str] = &[
    "description",
    "summary",
    "about",
    "title",
    "founded",
    "headquarters",
    "industry",
    "employees",
    "revenue",
];

/// Scalar keys that land in `financials`.
pub const FINANCIAL_FIELDS: &[&str] = &[
    "stock_price",
    "market_cap",
    "pe_ratio",
    "previous_close",
    "change",
    "change_percent",
];

/// Immutable input to one aggregation run.
#[derive(Debug, Clone, Deserialize)]
pub struct Query {
    pub entity_name: String,
    pub website: Option<String>,
}

impl Query {
    pub fn new(entity_name: impl Into<String>, website: Option<String>) -> Self {
        let website = website.map(|w| w.trim().to_string()).filter(|w| !w.is_empty());
        Self {
            entity_name: entity_name.into().trim().to_string(),
            website,
        }
    }

    /// At least one of name/website must be present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.entity_name.is_empty() && self.website.is_none() {
            return Err(ValidationError(
                "Company name or website required".to_string(),
            ));
        }
        Ok(())
    }
}

/// One news article as extracted from a news source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub date: String,
    pub source: String,
    pub description: String,
}

/// Best-effort partial field map from one provider call. Absent keys mean
/// "not found", never an error signal.
#[derive(Debug, Clone, Default)]
pub struct ProviderOutput {
    /// Scalar fields keyed by record field name (see the field constants).
    pub scalars: BTreeMap<String, String>,
    pub leadership: Vec<Leader>,
    pub products: Vec<String>,
    pub articles: Vec<Article>,
    /// URL the provider actually consulted.
    pub source_url: Option<String>,
}

impl ProviderOutput {
    pub fn with_source_url(url: impl Into<String>) -> Self {
        Self {
            source_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if !value.trim().is_empty() {
            self.scalars.insert(key.to_string(), value);
        }
    }

    /// True when the output carries no extracted data (a bare source URL
    /// does not count).
    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty()
            && self.leadership.is_empty()
            && self.products.is_empty()
            && self.articles.is_empty()
    }

    /// Concatenated scalar text, used for relevance scoring.
    pub fn scored_text(&self) -> String {
        self.scalars
            .values()
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderEntry {
    pub name: String,
    pub position: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductEntry {
    pub name: String,
    pub source: String,
}

/// A news entry keeps the outlet in `source` (as reported upstream) and the
/// originating provider in `provider`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsEntry {
    pub title: String,
    pub link: String,
    pub date: String,
    pub source: String,
    pub description: String,
    pub provider: String,
}

/// Degradation flags; absent flags mean "no problem observed".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataQuality {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub website_missing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_relevance: Option<Tier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wikipedia_relevance: Option<Tier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_data: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub finance_skipped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news: Option<String>,
}

/// The merged output of one aggregation run. Produced fresh per query;
/// nothing persists across queries except the shared browser session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guessed_website: Option<String>,
    pub overview: BTreeMap<String, String>,
    pub financials: BTreeMap<String, String>,
    pub leadership: Vec<LeaderEntry>,
    pub products: Vec<ProductEntry>,
    pub news: Vec<NewsEntry>,
    /// Scalar-field-name -> provider name; exactly one provenance per field.
    pub sources: BTreeMap<String, String>,
    /// Provider name -> URL it consulted.
    pub source_urls: BTreeMap<String, String>,
    pub data_quality: DataQuality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl AggregateRecord {
    pub fn new(query: &Query) -> Self {
        Self {
            name: query.entity_name.clone(),
            website: query.website.clone(),
            guessed_website: None,
            overview: BTreeMap::new(),
            financials: BTreeMap::new(),
            leadership: Vec::new(),
            products: Vec::new(),
            news: Vec::new(),
            sources: BTreeMap::new(),
            source_urls: BTreeMap::new(),
            data_quality: DataQuality::default(),
            warning: None,
        }
    }
}

/// Merge an accepted provider output into the record.
pub fn update_result(record: &mut AggregateRecord, output: &ProviderOutput, provider: &str) {
    if output.is_empty() {
        return;
    }

    if let Some(url) = &output.source_url {
        record
            .source_urls
            .insert(provider.to_string(), url.clone());
    }

    for (key, value) in &output.scalars {
        let bucket = if OVERVIEW_FIELDS.contains(&key.as_str()) {
            &mut record.overview
        } else if FINANCIAL_FIELDS.contains(&key.as_str()) {
            &mut record.financials
        } else {
            tracing::debug!(%key, %provider, "dropping unknown scalar field");
            continue;
        };
        bucket.insert(key.clone(), value.clone());
        record.sources.insert(key.clone(), provider.to_string());
    }

    for leader in &output.leadership {
        record.leadership.push(LeaderEntry {
            name: leader.name.clone(),
            position: leader.position.clone(),
            source: provider.to_string(),
        });
    }

    for product in &output.products {
        record.products.push(ProductEntry {
            name: product.clone(),
            source: provider.to_string(),
        });
    }

    for article in &output.articles {
        record.news.push(NewsEntry {
            title: article.title.clone(),
            link: article.link.clone(),
            date: article.date.clone(),
            source: article.source.clone(),
            description: article.description.clone(),
            provider: provider.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> Query {
        Query::new("Acme", Some("acme.com".to_string()))
    }

    fn website_output() -> ProviderOutput {
        let mut out = ProviderOutput::with_source_url("https://acme.com");
        out.set("summary", "Acme makes widgets");
        out.set("title", "Acme — widgets for all");
        out.products.push("Widget Pro".to_string());
        out
    }

    #[test]
    fn validation_requires_name_or_website() {
        assert!(Query::new("", None).validate().is_err());
        assert!(Query::new("Acme", None).validate().is_ok());
        assert!(Query::new("", Some("acme.com".into())).validate().is_ok());
        // Whitespace-only website does not satisfy validation.
        assert!(Query::new("", Some("   ".into())).validate().is_err());
    }

    #[test]
    fn scalar_merge_routes_fields_and_tracks_provenance() {
        let mut record = AggregateRecord::new(&query());
        update_result(&mut record, &website_output(), "Company Website");

        assert_eq!(record.overview.get("summary").unwrap(), "Acme makes widgets");
        assert_eq!(record.sources.get("summary").unwrap(), "Company Website");
        assert_eq!(
            record.source_urls.get("Company Website").unwrap(),
            "https://acme.com"
        );
        assert!(record.financials.is_empty());
    }

    #[test]
    fn provenance_complete_for_every_scalar() {
        let mut record = AggregateRecord::new(&query());
        update_result(&mut record, &website_output(), "Company Website");

        let mut fin = ProviderOutput::default();
        fin.set("stock_price", "123.45");
        update_result(&mut record, &fin, "Financial Data");

        for key in record.overview.keys().chain(record.financials.keys()) {
            assert!(record.sources.contains_key(key), "no provenance for {key}");
        }
    }

    #[test]
    fn later_writer_wins_and_updates_source() {
        let mut record = AggregateRecord::new(&query());

        let mut first = ProviderOutput::default();
        first.set("description", "from the website");
        update_result(&mut record, &first, "Company Website");

        let mut second = ProviderOutput::default();
        second.set("description", "from wikipedia");
        update_result(&mut record, &second, "Wikipedia");

        assert_eq!(record.overview.get("description").unwrap(), "from wikipedia");
        assert_eq!(record.sources.get("description").unwrap(), "Wikipedia");
    }

    #[test]
    fn empty_output_mutates_nothing() {
        let mut record = AggregateRecord::new(&query());
        let before = serde_json::to_string(&record).unwrap();

        update_result(
            &mut record,
            &ProviderOutput::with_source_url("https://nowhere.example"),
            "Wikipedia",
        );

        let after = serde_json::to_string(&record).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn list_merge_appends_in_deterministic_order() {
        let mut a = AggregateRecord::new(&query());
        let mut b = AggregateRecord::new(&query());
        let out = website_output();

        update_result(&mut a, &out, "Company Website");
        update_result(&mut a, &out, "Wikipedia");
        update_result(&mut b, &out, "Company Website");
        update_result(&mut b, &out, "Wikipedia");

        assert_eq!(a.products.len(), 2);
        assert_eq!(a.products, b.products);
        assert_eq!(a.products[0].source, "Company Website");
        assert_eq!(a.products[1].source, "Wikipedia");
    }

    #[test]
    fn unknown_scalar_keys_are_dropped() {
        let mut record = AggregateRecord::new(&query());
        let mut out = ProviderOutput::default();
        out.set("mystery_field", "value");
        update_result(&mut record, &out, "Wikipedia");

        assert!(record.overview.is_empty());
        assert!(record.financials.is_empty());
        assert!(record.sources.is_empty());
    }
}
