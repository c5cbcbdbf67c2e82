// src/extract/leadership.rs
//! Leadership extraction shared by the website and encyclopedia providers.
//!
//! Candidates are discovered by trying four patterns in order until one
//! yields at least one entry: heading-plus-description inside a detected
//! leadership section, list items split into name/position pairs, card-like
//! sub-blocks, and finally a page-wide scan for executive titles.

use once_cell::sync::OnceCell;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use super::{element_text, find_section_by_keywords, next_block, LEADERSHIP_KEYWORDS};

/// Headings that look like section titles rather than person names.
const NAME_STOPWORDS: &[&str] = &["team", "leadership", "management", "board", "directors"];

/// Executive titles for the page-wide fallback scan.
pub const EXECUTIVE_TITLES: &[&str] = &[
    "ceo",
    "chief executive",
    "president",
    "founder",
    "chairman",
    "cto",
    "cfo",
    "chief financial",
    "chief technology",
];

/// Person names longer than this are almost certainly captured headings.
const MAX_NAME_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leader {
    pub name: String,
    pub position: String,
}

fn plausible_name(name: &str) -> bool {
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return false;
    }
    let lower = name.to_ascii_lowercase();
    !NAME_STOPWORDS.iter().any(|w| lower.contains(w))
}

fn push_unique(out: &mut Vec<Leader>, name: String, position: String) {
    if out.iter().any(|l| l.name == name) {
        return;
    }
    out.push(Leader { name, position });
}

/// Pattern 1: heading element followed by a description block.
fn from_headings(section: ElementRef<'_>) -> Vec<Leader> {
    let names = Selector::parse("h3, h4, h5, strong, b").unwrap();
    let mut out = Vec::new();
    for name_el in section.select(&names) {
        let name = element_text(name_el);
        if !plausible_name(&name) {
            continue;
        }
        let position = next_block(name_el, &["p", "div", "span"])
            .map(element_text)
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "Leadership".to_string());
        push_unique(&mut out, name, position);
    }
    out
}

/// Pattern 2: list items split on `,` / `-` / `–`.
fn from_list_items(section: ElementRef<'_>) -> Vec<Leader> {
    static RE_SPLIT: OnceCell<Regex> = OnceCell::new();
    let re = RE_SPLIT.get_or_init(|| Regex::new(r"[,\-–]").unwrap());

    let items = Selector::parse("li").unwrap();
    let mut out = Vec::new();
    for item in section.select(&items) {
        let text = element_text(item);
        let mut parts = re.splitn(&text, 2);
        let (Some(name), Some(position)) = (parts.next(), parts.next()) else {
            continue;
        };
        let name = name.trim().to_string();
        let position = position.trim().to_string();
        if plausible_name(&name) && !position.is_empty() {
            push_unique(&mut out, name, position);
        }
    }
    out
}

/// Pattern 3: card-like sub-blocks with a heading plus a description.
fn from_cards(section: ElementRef<'_>) -> Vec<Leader> {
    let cards = Selector::parse("div, article, section").unwrap();
    let names = Selector::parse("h3, h4, h5, strong, b").unwrap();
    let descs = Selector::parse("p, div, span").unwrap();

    let mut out = Vec::new();
    for card in section.select(&cards) {
        let Some(name_el) = card.select(&names).next() else {
            continue;
        };
        let name = element_text(name_el);
        if !plausible_name(&name) {
            continue;
        }
        let position = card
            .select(&descs)
            .map(element_text)
            .find(|t| !t.is_empty() && *t != name)
            .unwrap_or_else(|| "Leadership".to_string());
        if name != position {
            push_unique(&mut out, name, position);
        }
    }
    out
}

/// Pattern 4: page-wide scan for executive titles, name/position split on
/// `:` or `,`. Only leaf elements with short text are considered so we
/// don't match whole page containers.
fn from_title_scan(doc: &Html) -> Vec<Leader> {
    let all = Selector::parse("*").unwrap();
    let mut out = Vec::new();

    for el in doc.select(&all) {
        if el.children().any(|c| c.value().is_element()) {
            continue;
        }
        let text = element_text(el);
        if text.is_empty() || text.chars().count() > 120 {
            continue;
        }
        let lower = text.to_ascii_lowercase();
        let Some(title) = EXECUTIVE_TITLES.iter().find(|t| lower.contains(**t)) else {
            continue;
        };

        let (name, position) = if let Some((left, right)) = text.split_once(':') {
            if left.to_ascii_lowercase().contains(title) {
                // "CEO: Jane Doe"
                (right.trim(), left.trim())
            } else {
                // "Jane Doe: CEO"
                (left.trim(), right.trim())
            }
        } else if let Some((left, right)) = text.split_once(',') {
            if right.to_ascii_lowercase().contains(title) {
                // "Jane Doe, CEO"
                (left.trim(), right.trim())
            } else {
                continue;
            }
        } else {
            continue;
        };

        if plausible_name(name) && !position.is_empty() {
            push_unique(&mut out, name.to_string(), position.to_string());
        }
    }
    out
}

/// Extract leadership entries from a parsed page, first pattern that yields
/// a candidate wins.
pub fn extract_leadership(doc: &Html) -> Vec<Leader> {
    if let Some(section) = find_section_by_keywords(doc, LEADERSHIP_KEYWORDS) {
        let found = from_headings(section);
        if !found.is_empty() {
            return found;
        }
        let found = from_list_items(section);
        if !found.is_empty() {
            return found;
        }
        let found = from_cards(section);
        if !found.is_empty() {
            return found;
        }
    }
    from_title_scan(doc)
}
