// tests/merge_provenance.rs
//
// Merge invariants across several provider outputs: field routing, single
// provenance per scalar, last writer wins, append-only tagged lists.

use company_profile_aggregator::extract::leadership::Leader;
use company_profile_aggregator::profile::{
    update_result, AggregateRecord, Article, ProviderOutput, Query,
};
use company_profile_aggregator::providers::{
    FINANCE_PROVIDER, NEWS_PROVIDER, WEBSITE_PROVIDER, WIKIPEDIA_PROVIDER,
};

fn record() -> AggregateRecord {
    AggregateRecord::new(&Query::new("Acme Corp", Some("acme.com".to_string())))
}

#[test]
fn scalars_route_by_field_name_with_provenance() {
    let mut rec = record();

    let mut site = ProviderOutput::with_source_url("https://acme.com");
    site.set("summary", "Widgets for everyone");
    update_result(&mut rec, &site, WEBSITE_PROVIDER);

    let mut quote = ProviderOutput::with_source_url("https://api.example/quote");
    quote.set("stock_price", "42.00");
    update_result(&mut rec, &quote, FINANCE_PROVIDER);

    assert_eq!(rec.overview.get("summary").unwrap(), "Widgets for everyone");
    assert_eq!(rec.financials.get("stock_price").unwrap(), "42.00");
    assert_eq!(rec.sources.get("summary").unwrap(), WEBSITE_PROVIDER);
    assert_eq!(rec.sources.get("stock_price").unwrap(), FINANCE_PROVIDER);
    assert_eq!(
        rec.source_urls.get(WEBSITE_PROVIDER).unwrap(),
        "https://acme.com"
    );
}

#[test]
fn later_provider_overwrites_scalar_and_its_provenance() {
    let mut rec = record();

    let mut site = ProviderOutput::default();
    site.set("description", "From the website");
    update_result(&mut rec, &site, WEBSITE_PROVIDER);

    let mut wiki = ProviderOutput::default();
    wiki.set("description", "From the encyclopedia");
    update_result(&mut rec, &wiki, WIKIPEDIA_PROVIDER);

    assert_eq!(
        rec.overview.get("description").unwrap(),
        "From the encyclopedia"
    );
    assert_eq!(rec.sources.get("description").unwrap(), WIKIPEDIA_PROVIDER);
    assert_eq!(rec.sources.len(), 1);
}

#[test]
fn list_entries_append_and_carry_their_provider_tag() {
    let mut rec = record();

    let mut site = ProviderOutput::default();
    site.leadership.push(Leader {
        name: "Jane Doe".to_string(),
        position: "CEO".to_string(),
    });
    site.products.push("Widget Pro".to_string());
    update_result(&mut rec, &site, WEBSITE_PROVIDER);

    let mut wiki = ProviderOutput::default();
    wiki.leadership.push(Leader {
        name: "John Roe".to_string(),
        position: "Chairman".to_string(),
    });
    update_result(&mut rec, &wiki, WIKIPEDIA_PROVIDER);

    let mut news = ProviderOutput::default();
    news.articles.push(Article {
        title: "Acme expands".to_string(),
        link: "https://example.com/a".to_string(),
        date: "2025-08-05".to_string(),
        source: "Example Wire".to_string(),
        description: "Second plant opens.".to_string(),
    });
    update_result(&mut rec, &news, NEWS_PROVIDER);

    assert_eq!(rec.leadership.len(), 2);
    assert_eq!(rec.leadership[0].source, WEBSITE_PROVIDER);
    assert_eq!(rec.leadership[1].source, WIKIPEDIA_PROVIDER);
    assert_eq!(rec.products[0].source, WEBSITE_PROVIDER);
    assert_eq!(rec.news.len(), 1);
    assert_eq!(rec.news[0].source, "Example Wire");
    assert_eq!(rec.news[0].provider, NEWS_PROVIDER);
}

#[test]
fn empty_output_leaves_the_record_untouched() {
    let mut rec = record();
    let before = serde_json::to_value(&rec).expect("serialize");

    update_result(&mut rec, &ProviderOutput::default(), WEBSITE_PROVIDER);

    let after = serde_json::to_value(&rec).expect("serialize");
    assert_eq!(before, after);
}

#[test]
fn record_serializes_without_empty_optionals() {
    let rec = record();
    let v = serde_json::to_value(&rec).expect("serialize");
    assert!(v.get("warning").is_none());
    assert!(v.get("guessed_website").is_none());
    assert_eq!(v.get("name").unwrap(), "Acme Corp");
    assert_eq!(v.get("website").unwrap(), "acme.com");
}
