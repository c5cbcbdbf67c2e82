// src/extract/mod.rs
//! Shared parsed-document helpers: keyword-driven section search over a
//! `scraper::Html` tree plus text normalization. The keyword vocabularies
//! live here as named constants so they can be tuned and tested
//! independently of the traversal logic.

pub mod leadership;

use once_cell::sync::OnceCell;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Section vocabulary for "about the company" blocks.
pub const ABOUT_KEYWORDS: &[&str] = &[
    "about us",
    "about",
    "our company",
    "who we are",
    "mission",
    "vision",
];

/// Section vocabulary for product/service blocks.
pub const PRODUCT_KEYWORDS: &[&str] = &[
    "products",
    "services",
    "solutions",
    "offerings",
    "what we do",
];

/// Section vocabulary for leadership/team blocks.
pub const LEADERSHIP_KEYWORDS: &[&str] = &[
    "leadership",
    "management",
    "team",
    "executives",
    "founders",
    "board",
    "directors",
];

/// Normalize extracted text: decode HTML entities, strip tags, collapse
/// whitespace.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip Wikipedia citation brackets: `[12]`, `[a]`, `[citation needed]`.
pub fn clean_citations(text: &str) -> String {
    static RE_CITE: OnceCell<Regex> = OnceCell::new();
    let re = RE_CITE.get_or_init(|| Regex::new(r"\[\d+\]|\[[a-z]\]|\[citation needed\]").unwrap());
    re.replace_all(text, "").trim().to_string()
}

/// Flattened, whitespace-normalized text of one element.
pub fn element_text(el: ElementRef<'_>) -> String {
    normalize_text(&el.text().collect::<String>())
}

fn contains_keyword(value: &str, keywords: &[&str]) -> bool {
    let lower = value.to_ascii_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

/// First following sibling element with one of the given tag names.
pub fn next_block<'a>(el: ElementRef<'a>, names: &[&str]) -> Option<ElementRef<'a>> {
    el.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sib| names.contains(&sib.value().name()))
}

/// Locate a section by keyword match against element ids, then class names,
/// then heading text (where the section is the heading's following block).
pub fn find_section_by_keywords<'a>(
    doc: &'a Html,
    keywords: &[&str],
) -> Option<ElementRef<'a>> {
    let all = Selector::parse("*").unwrap();

    // Pass 1: id attribute.
    for el in doc.select(&all) {
        if let Some(id) = el.value().id() {
            if contains_keyword(id, keywords) {
                return Some(el);
            }
        }
    }

    // Pass 2: class attribute.
    for el in doc.select(&all) {
        if el.value().classes().any(|c| contains_keyword(c, keywords)) {
            return Some(el);
        }
    }

    // Pass 3: heading text; the content follows the heading.
    let headings = Selector::parse("h1, h2, h3, h4").unwrap();
    for h in doc.select(&headings) {
        if contains_keyword(&element_text(h), keywords) {
            if let Some(block) = next_block(h, &["div", "section", "ul"]) {
                return Some(block);
            }
            return h.parent().and_then(ElementRef::wrap);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_tags_and_entities() {
        let s = "  Acme&nbsp;<b>Corp</b>\n  builds  things ";
        assert_eq!(normalize_text(s), "Acme Corp builds things");
    }

    #[test]
    fn clean_citations_removes_brackets() {
        let s = "Acme Corp[1] is a company[a] known widely.[citation needed]";
        assert_eq!(
            clean_citations(s),
            "Acme Corp is a company known widely."
        );
    }

    #[test]
    fn section_found_by_id_before_class() {
        let html = Html::parse_document(
            r#"<html><body>
                <div class="about-note">classy</div>
                <div id="about-us"><p>We make rockets.</p></div>
            </body></html>"#,
        );
        let section = find_section_by_keywords(&html, ABOUT_KEYWORDS).unwrap();
        assert_eq!(element_text(section), "We make rockets.");
    }

    #[test]
    fn section_found_via_heading_sibling() {
        let html = Html::parse_document(
            r#"<html><body>
                <h2>Our Mission</h2>
                <div><p>Ship faster.</p></div>
            </body></html>"#,
        );
        let section = find_section_by_keywords(&html, ABOUT_KEYWORDS).unwrap();
        assert_eq!(element_text(section), "Ship faster.");
    }

    #[test]
    fn missing_section_is_none() {
        let html = Html::parse_document("<html><body><p>nothing here</p></body></html>");
        assert!(find_section_by_keywords(&html, PRODUCT_KEYWORDS).is_none());
    }
}
