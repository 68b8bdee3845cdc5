//! Integration tests for `WakeSource::poll` against a local `wiremock`
//! server standing in for the county search page.

use std::collections::HashSet;
use std::time::Duration;

use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use caskwatch_core::RefreshScope;
use caskwatch_scraper::{InventorySource, NcProduct, ScraperError, SourceSettings, WakeSource};

fn fast_settings() -> SourceSettings {
    SourceSettings {
        base_delay: Duration::ZERO,
        backoff_unit: Duration::ZERO,
        task_delay: Duration::ZERO,
        max_concurrent: 4,
        request_timeout: Duration::from_secs(5),
        ..SourceSettings::default()
    }
}

fn product(code: &str, name: &str, listing_type: &str) -> NcProduct {
    NcProduct {
        nc_code: code.to_owned(),
        brand_name: name.to_owned(),
        listing_type: listing_type.to_owned(),
        size: "750ml".to_owned(),
        available: 12,
        supplier: None,
    }
}

fn catalog() -> Vec<NcProduct> {
    vec![
        product("00123", "Blanton's Single Barrel", "Allocation"),
        product("00456", "Buffalo Trace", "Listed"),
        product("00789", "Eagle Rare", "Limited"),
    ]
}

fn source(server: &MockServer) -> WakeSource {
    WakeSource::with_origin(catalog(), fast_settings(), &server.uri())
        .expect("failed to build test source")
}

fn in_stock_page(name: &str, rows: &[(&str, u32)]) -> String {
    let items: String = rows
        .iter()
        .map(|(address, qty)| {
            format!(
                r#"<li><span class="address">{}</span><span class="quantity">{qty} in stock</span></li>"#,
                address.replacen(". ", ".<br/>", 1)
            )
        })
        .collect();
    format!(
        r#"<div class="wake-product"><h4>{name}</h4><div class="inventory-collapse"><ul>{items}</ul></div></div>"#
    )
}

fn out_of_stock_page(name: &str) -> String {
    format!(r#"<div class="wake-product"><h4>{name}</h4><p class="out-of-stock">Out of Stock</p></div>"#)
}

async fn mount_search(server: &MockServer, code: &str, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/search-results"))
        .and(body_string_contains(format!("productSearch={code}")))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn full_refresh_collects_store_hits_for_every_product() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search-results"))
        .and(header("referer", format!("{}/search-our-inventory/", server.uri()).as_str()))
        .and(body_string_contains("productSearch=00123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(in_stock_page(
            "Blanton's Single Barrel",
            &[
                ("7200 Sandy Fork Rd. Raleigh, NC 27609", 3),
                ("3320 Olympia Dr. Raleigh, NC 27603", 0),
            ],
        )))
        .expect(1)
        .mount(&server)
        .await;
    mount_search(
        &server,
        "00456",
        ResponseTemplate::new(200).set_body_string(in_stock_page(
            "Buffalo Trace",
            &[("2645 Appliance Ct. Raleigh, NC 27604", 24)],
        )),
    )
    .await;
    mount_search(
        &server,
        "00789",
        ResponseTemplate::new(200).set_body_string(out_of_stock_page("Eagle Rare")),
    )
    .await;

    let report = source(&server).poll().await.unwrap();

    assert_eq!(report.scope, RefreshScope::Jurisdiction);
    assert!(report.skipped.is_empty());

    let mut items = report.items;
    items.sort_by(|a, b| a.product_id.cmp(&b.product_id));
    assert_eq!(items.len(), 2);

    assert_eq!(items[0].product_id, "wake-00123");
    assert_eq!(items[0].store_id, "wake-7200-sandy-fork-rd-raleigh");
    assert_eq!(items[0].quantity, 3);
    assert_eq!(items[0].listing_type, "Allocation");
    assert!(items[0].location.is_known());

    assert_eq!(items[1].product_id, "wake-00456");
    assert_eq!(items[1].quantity, 24);
    assert_eq!(items[1].county, "Wake");
}

#[tokio::test]
async fn failed_product_is_not_counted_as_refreshed() {
    let server = MockServer::start().await;

    mount_search(
        &server,
        "00123",
        ResponseTemplate::new(200).set_body_string(in_stock_page(
            "Blanton's Single Barrel",
            &[("7200 Sandy Fork Rd. Raleigh, NC 27609", 1)],
        )),
    )
    .await;
    mount_search(&server, "00456", ResponseTemplate::new(500)).await;
    mount_search(
        &server,
        "00789",
        ResponseTemplate::new(200).set_body_string("<p>No results</p>"),
    )
    .await;

    let report = source(&server).poll().await.unwrap();

    assert_eq!(report.items.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].unit, "00456");
    let expected: HashSet<String> = ["00123", "00789"].iter().map(|c| (*c).to_owned()).collect();
    assert_eq!(report.scope, RefreshScope::Products(expected));
}

#[tokio::test]
async fn subset_filter_only_searches_stale_products() {
    let server = MockServer::start().await;

    mount_search(
        &server,
        "00789",
        ResponseTemplate::new(200).set_body_string(out_of_stock_page("Eagle Rare")),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/search-results"))
        .and(body_string_contains("productSearch=00123"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut source = source(&server);
    source.set_products_to_track(vec!["00789".to_owned()]);
    let report = source.poll().await.unwrap();

    assert!(report.items.is_empty());
    let expected: HashSet<String> = std::iter::once("00789".to_owned()).collect();
    assert_eq!(report.scope, RefreshScope::Products(expected));
}

#[tokio::test]
async fn nothing_stale_makes_no_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut source = source(&server);
    source.set_products_to_track(vec!["99999".to_owned()]);
    let report = source.poll().await.unwrap();

    assert!(report.items.is_empty());
    assert_eq!(report.scope, RefreshScope::Products(HashSet::new()));
}

#[tokio::test]
async fn every_search_failing_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search-results"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let result = source(&server).poll().await;

    assert!(
        matches!(result, Err(ScraperError::AllUnitsFailed { units: 3, .. })),
        "expected AllUnitsFailed, got: {result:?}"
    );
}
