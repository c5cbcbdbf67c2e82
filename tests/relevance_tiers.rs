// tests/relevance_tiers.rs
//
// Tier boundaries for both scoring profiles, driven through the public
// library surface the way the aggregator uses them.

use company_profile_aggregator::relevance::{score_website, score_wikipedia, Tier};

#[test]
fn website_with_indicator_and_exact_name_is_high() {
    let text = "Blue River Labs builds analytics products. About us: our company \
                serves enterprise customers.";
    let rel = score_website(text, "Blue River Labs", None);
    assert_eq!(rel.tier, Tier::High);
    assert!(rel.score >= 3);
}

#[test]
fn website_with_partial_name_only_is_medium() {
    let rel = score_website("River kayaking trip reports and gear", "Blue River Labs", None);
    assert_eq!(rel.tier, Tier::Medium);
}

#[test]
fn website_with_no_signal_is_low() {
    let rel = score_website("Cooking tips and weekend recipes", "Zylox", None);
    assert_eq!(rel.tier, Tier::Low);
    assert_eq!(rel.score, 0);
}

#[test]
fn website_domain_hint_lifts_tier() {
    let without = score_website("zylox platform release notes", "Some Other Name", None);
    let with = score_website("zylox platform release notes", "Some Other Name", Some("zylox"));
    assert!(with.score > without.score);
}

#[test]
fn wikipedia_company_article_is_accepted() {
    let text = "Zylox is a technology company headquartered in Austin. The business \
                was founded in 2015 and its products are sold worldwide. Revenue \
                reached $80 million and the corporation employs 400 people.";
    let rel = score_wikipedia(text, "Zylox", None);
    assert!(rel.tier.accepted(), "got {:?}", rel);
}

#[test]
fn wikipedia_generic_concept_is_forced_low() {
    let text = "A river is a natural watercourse. In mythology the river often \
                marks a boundary; the genus includes several species and the word \
                derives from Latin. Its meaning varies by language.";
    let rel = score_wikipedia(text, "Blue River Labs", None);
    assert_eq!(rel.tier, Tier::Low);
    assert!(rel.matched.iter().any(|m| m == "forced_low"));
}

#[test]
fn low_tiers_never_pass_the_acceptance_gate() {
    assert!(!Tier::Low.accepted());
    assert!(!Tier::None.accepted());
    assert!(Tier::Medium.accepted());
    assert!(Tier::High.accepted());
}
