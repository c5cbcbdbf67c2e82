// src/relevance.rs
//! Relevance scoring: a pure, deterministic confidence that a retrieved
//! document is about the query entity, bucketed into none/low/medium/high.
//!
//! Signals are additive and independent; thresholds differ per provider
//! type. The numeric thresholds are a starting calibration, not a derived
//! optimum — tune against labeled examples before trusting them elsewhere.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Generic "is-a-company" indicator words and phrases.
pub const COMPANY_INDICATORS: &[&str] = &[
    "company",
    "corporation",
    "inc",
    "llc",
    "ltd",
    "plc",
    "enterprise",
    "firm",
    "business",
    "founded",
    "headquarters",
    "headquartered",
    "industry",
    "subsidiary",
    "manufacturer",
    "about us",
    "careers",
    "products",
    "services",
    "customers",
];

/// Indicators that a document is about something other than a company —
/// mythology, geography, fiction and the like.
pub const NON_COMPANY_INDICATORS: &[&str] = &[
    "ancient",
    "mythology",
    "historical",
    "history",
    "river",
    "mountain",
    "geographic",
    "literature",
    "fiction",
    "novel",
    "movie",
    "film",
    "album",
    "song",
    "bible",
    "greek",
    "roman",
    "definition",
    "idiom",
    "phrase",
    "meaning",
];

const EXACT_NAME_POINTS: i32 = 3;
const DOMAIN_HINT_POINTS: i32 = 2;
const WEBSITE_INDICATOR_POINTS: i32 = 2;
const MIN_TOKEN_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    None,
    Low,
    Medium,
    High,
}

impl Tier {
    /// Medium and high are "accept and merge"; low/none means discard.
    pub fn accepted(self) -> bool {
        matches!(self, Tier::Medium | Tier::High)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::None => "none",
            Tier::Low => "low",
            Tier::Medium => "medium",
            Tier::High => "high",
        }
    }
}

/// Result of one relevance evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Relevance {
    pub score: i32,
    pub tier: Tier,
    pub matched: Vec<String>,
}

impl Default for Relevance {
    fn default() -> Self {
        Self {
            score: 0,
            tier: Tier::None,
            matched: Vec::new(),
        }
    }
}

/// Lowercased word set of a text, split on non-alphanumerics.
fn token_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// An indicator "hits" when a single word is present as a token, or a
/// phrase is present as a substring.
fn indicator_hits(lower_text: &str, tokens: &HashSet<String>, indicators: &[&str]) -> Vec<String> {
    indicators
        .iter()
        .filter(|ind| {
            if ind.contains(' ') {
                lower_text.contains(*ind)
            } else {
                tokens.contains(**ind)
            }
        })
        .map(|s| s.to_string())
        .collect()
}

/// Shared name/domain signals: exact full-name substring, per-token hits,
/// domain-hint token.
fn name_signals(
    lower_text: &str,
    tokens: &HashSet<String>,
    entity_name: &str,
    domain_hint: Option<&str>,
    matched: &mut Vec<String>,
) -> i32 {
    let mut score = 0;

    let name_lower = entity_name.trim().to_lowercase();
    if !name_lower.is_empty() && lower_text.contains(&name_lower) {
        score += EXACT_NAME_POINTS;
        matched.push(format!("exact:{name_lower}"));
    }

    for token in name_lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
    {
        if tokens.contains(token) {
            score += 1;
            matched.push(format!("token:{token}"));
        }
    }

    if let Some(domain) = domain_hint {
        let domain = domain.trim().to_lowercase();
        if !domain.is_empty() && (tokens.contains(&domain) || lower_text.contains(&domain)) {
            score += DOMAIN_HINT_POINTS;
            matched.push(format!("domain:{domain}"));
        }
    }

    score
}

/// Score website text against the query.
///
/// Tiers: `score >= 3` high, `0 < score < 3` medium, `score == 0` low.
pub fn score_website(text: &str, entity_name: &str, domain_hint: Option<&str>) -> Relevance {
    let lower = text.to_lowercase();
    let tokens = token_set(text);
    let mut matched = Vec::new();
    let mut score = 0;

    let indicators = indicator_hits(&lower, &tokens, COMPANY_INDICATORS);
    if !indicators.is_empty() {
        score += WEBSITE_INDICATOR_POINTS;
        matched.push("company_indicator".to_string());
    }

    score += name_signals(&lower, &tokens, entity_name, domain_hint, &mut matched);

    let tier = if score >= 3 {
        Tier::High
    } else if score > 0 {
        Tier::Medium
    } else {
        Tier::Low
    };

    Relevance {
        score,
        tier,
        matched,
    }
}

/// Score an encyclopedia article against the query.
///
/// Each distinct company indicator counts one point. If non-company
/// indicators outnumber company indicators the article is forced to `low`
/// regardless of the numeric score. Tiers: `score >= 4` high, `2..4`
/// medium, below 2 low.
pub fn score_wikipedia(text: &str, entity_name: &str, domain_hint: Option<&str>) -> Relevance {
    let lower = text.to_lowercase();
    let tokens = token_set(text);
    let mut matched = Vec::new();

    let company = indicator_hits(&lower, &tokens, COMPANY_INDICATORS);
    let non_company = indicator_hits(&lower, &tokens, NON_COMPANY_INDICATORS);

    if non_company.len() > company.len() {
        // Likely a definition, a myth, a place — not the company we want.
        let mut matched: Vec<String> = non_company
            .iter()
            .map(|w| format!("non_company:{w}"))
            .collect();
        matched.push("forced_low".to_string());
        return Relevance {
            score: 0,
            tier: Tier::Low,
            matched,
        };
    }

    let mut score = company.len() as i32;
    matched.extend(company.iter().map(|w| format!("indicator:{w}")));

    score += name_signals(&lower, &tokens, entity_name, domain_hint, &mut matched);

    let tier = if score >= 4 {
        Tier::High
    } else if score >= 2 {
        Tier::Medium
    } else {
        Tier::Low
    };

    Relevance {
        score,
        tier,
        matched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn website_boundaries_are_exact() {
        // No signals at all: 0 -> low.
        let r = score_website("lorem ipsum dolor", "Xqzvk", None);
        assert_eq!((r.score, r.tier), (0, Tier::Low));

        // Indicator only: 2 -> medium.
        let r = score_website("great products await", "Xqzvk", None);
        assert_eq!((r.score, r.tier), (2, Tier::Medium));

        // Indicator + one name token: 3 -> high.
        let r = score_website("great products from the acme team", "Acme", None);
        assert!(r.score >= 3);
        assert_eq!(r.tier, Tier::High);
    }

    #[test]
    fn website_single_token_is_medium() {
        // A multi-word name with one token present, no exact match, no
        // indicators: 1 -> medium.
        let r = score_website("the labs are open", "Blue River Labs", None);
        assert_eq!((r.score, r.tier), (1, Tier::Medium));
    }

    #[test]
    fn exact_name_match_counts_three_plus_tokens() {
        // Single-word name: exact substring (+3) and token (+1).
        let r = score_website("welcome to northwind", "Northwind", None);
        assert_eq!(r.score, 4);
        assert_eq!(r.tier, Tier::High);
    }

    #[test]
    fn domain_hint_adds_two() {
        let base = score_website("independent page", "Zzz", None);
        let hinted = score_website("independent page for acme fans", "Zzz", Some("acme"));
        assert_eq!(base.score, 0);
        assert_eq!(hinted.score, 2);
        assert_eq!(hinted.tier, Tier::Medium);
    }

    #[test]
    fn wikipedia_boundaries_are_exact() {
        // Two distinct indicators: 2 -> medium.
        let r = score_wikipedia("a company in the software industry", "Xqzvk", None);
        assert_eq!((r.score, r.tier), (2, Tier::Medium));

        // Indicators + exact name reach high.
        let r = score_wikipedia("Acme is a company in the software industry", "Acme", None);
        assert!(r.score >= 4);
        assert_eq!(r.tier, Tier::High);

        // One indicator only: 1 -> low.
        let r = score_wikipedia("the firm was mentioned", "Xqzvk", None);
        assert_eq!((r.score, r.tier), (1, Tier::Low));
    }

    #[test]
    fn wikipedia_indicators_count_per_distinct_word() {
        // "company" twice still counts once; "industry" adds a second point.
        let r = score_wikipedia("company company industry", "Xqzvk", None);
        assert_eq!(r.score, 2);
    }

    #[test]
    fn wikipedia_non_company_majority_forces_low() {
        // Exact name + one indicator would score medium, but mythology,
        // river and ancient outnumber the single company indicator.
        let text = "Acme is an ancient river spirit in greek mythology, not a company";
        let r = score_wikipedia(text, "Acme", None);
        assert_eq!(r.tier, Tier::Low);
        assert!(r.matched.iter().any(|m| m == "forced_low"));
    }

    #[test]
    fn scoring_is_deterministic() {
        let a = score_website("Acme products and services", "Acme", Some("acme"));
        let b = score_website("Acme products and services", "Acme", Some("acme"));
        assert_eq!(a, b);
    }

    #[test]
    fn accepted_tiers() {
        assert!(Tier::High.accepted());
        assert!(Tier::Medium.accepted());
        assert!(!Tier::Low.accepted());
        assert!(!Tier::None.accepted());
    }
}
