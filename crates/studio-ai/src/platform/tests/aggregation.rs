use chrono::{TimeZone, Utc};
use serde_json::Value;

use super::common::*;
use crate::platform::aggregation::SESSION_PAGE_SIZE;
use crate::platform::client::PlatformError;
use crate::platform::transport::PlatformResponse;

fn window_end() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap()
}

fn full_page(start: u32, total: u64) -> Value {
    let rows = (start..start + SESSION_PAGE_SIZE)
        .map(|index| session_json(&format!("ses-{index}"), 20, 5))
        .collect();
    page_json(rows, total, start / SESSION_PAGE_SIZE, SESSION_PAGE_SIZE)
}

fn detail_responses(count: usize) -> Vec<PlatformResponse> {
    std::iter::repeat(ok(session_json("ses-detail", 20, 12)))
        .take(count)
        .collect()
}

#[tokio::test]
async fn a_short_page_ends_the_collection_early() {
    let (collector, transport) = collector_with(vec![
        ok(token_grant()),
        ok(page_json(vec![session_json("ses-1", 20, 5)], 40, 0, SESSION_PAGE_SIZE)),
        ok(session_json("ses-1", 20, 12)),
    ]);

    let sessions = collector
        .collect(3, Some(window_end()), None)
        .await
        .expect("collection succeeds");

    assert_eq!(sessions.len(), 1);
    assert!(sessions[0].detail.is_some());
    assert_eq!(transport.requests_for("sessions"), 1);
}

#[tokio::test]
async fn a_failed_detail_fetch_keeps_the_summary_row() {
    let (collector, _transport) = collector_with(vec![
        ok(token_grant()),
        ok(page_json(vec![session_json("ses-1", 20, 5)], 1, 0, SESSION_PAGE_SIZE)),
        status(500),
    ]);

    let sessions = collector
        .collect(3, Some(window_end()), None)
        .await
        .expect("collection succeeds");

    assert_eq!(sessions.len(), 1);
    assert!(sessions[0].detail.is_none());
    assert_eq!(sessions[0].summary.id, "ses-1");
}

#[tokio::test]
async fn a_covered_total_count_stops_before_max_pages() {
    let mut script = vec![ok(token_grant()), ok(full_page(0, SESSION_PAGE_SIZE as u64))];
    script.extend(detail_responses(SESSION_PAGE_SIZE as usize));
    let (collector, transport) = collector_with(script);

    let sessions = collector
        .collect(5, Some(window_end()), None)
        .await
        .expect("collection succeeds");

    assert_eq!(sessions.len(), SESSION_PAGE_SIZE as usize);
    assert_eq!(transport.requests_for("sessions"), 1);
}

#[tokio::test]
async fn max_pages_bounds_the_collection() {
    let mut script = vec![ok(token_grant()), ok(full_page(0, 1000))];
    script.extend(detail_responses(SESSION_PAGE_SIZE as usize));
    script.push(ok(full_page(SESSION_PAGE_SIZE, 1000)));
    script.extend(detail_responses(SESSION_PAGE_SIZE as usize));
    let (collector, transport) = collector_with(script);

    let sessions = collector
        .collect(2, Some(window_end()), None)
        .await
        .expect("collection succeeds");

    assert_eq!(sessions.len(), 2 * SESSION_PAGE_SIZE as usize);
    assert_eq!(transport.requests_for("sessions"), 2);
}

#[tokio::test]
async fn resolved_locations_filter_the_listing() {
    let (collector, transport) = collector_with(vec![
        ok(token_grant()),
        ok(page_json(Vec::new(), 0, 0, SESSION_PAGE_SIZE)),
    ]);

    collector
        .collect(1, Some(window_end()), Some("downtown"))
        .await
        .expect("collection succeeds");

    let listing = transport
        .requests()
        .into_iter()
        .find(|request| request.path == "sessions")
        .expect("listing request issued");
    assert_eq!(listing.query_value("locationId"), Some("8402"));
}

#[tokio::test]
async fn unknown_locations_collect_without_a_filter() {
    let (collector, transport) = collector_with(vec![
        ok(token_grant()),
        ok(page_json(Vec::new(), 0, 0, SESSION_PAGE_SIZE)),
    ]);

    collector
        .collect(1, Some(window_end()), Some("Lakeshore"))
        .await
        .expect("collection succeeds");

    let listing = transport
        .requests()
        .into_iter()
        .find(|request| request.path == "sessions")
        .expect("listing request issued");
    assert_eq!(listing.query_value("locationId"), None);
}

#[tokio::test]
async fn a_failed_page_listing_propagates() {
    let (collector, _transport) = collector_with(vec![ok(token_grant()), status(502)]);

    let result = collector.collect(2, Some(window_end()), None).await;

    assert!(matches!(
        result,
        Err(PlatformError::Upstream { status: 502, .. })
    ));
}
