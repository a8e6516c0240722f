use florida_branch_map::adapters::nominatim::{NominatimGeocoder, DEFAULT_USER_AGENT};
use florida_branch_map::core::GeocodingService;
use florida_branch_map::domain::ports::LookupError;
use httpmock::prelude::*;
use std::time::Duration;

const MIAMI: &str = "14202 SW 142nd Ave, Miami, FL 33186";

#[tokio::test]
async fn test_lookup_located() {
    let server = MockServer::start_async().await;
    let search = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/search")
                .query_param("q", MIAMI)
                .query_param("format", "jsonv2")
                .query_param("limit", "1")
                .header("user-agent", DEFAULT_USER_AGENT);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {
                        "lat": "25.6516",
                        "lon": "-80.4295",
                        "display_name": "14202, Southwest 142nd Avenue, Miami-Dade County, Florida"
                    }
                ]));
        })
        .await;

    let geocoder = NominatimGeocoder::new(server.base_url(), DEFAULT_USER_AGENT).unwrap();
    let coords = geocoder
        .lookup(MIAMI, Duration::from_secs(10))
        .await
        .unwrap()
        .unwrap();

    search.assert_async().await;
    assert!((coords.latitude() - 25.65).abs() < 0.01);
    assert!((coords.longitude() + 80.43).abs() < 0.01);
}

#[tokio::test]
async fn test_lookup_empty_result_is_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([]));
        })
        .await;

    let geocoder = NominatimGeocoder::new(server.base_url(), DEFAULT_USER_AGENT).unwrap();
    let result = geocoder
        .lookup("1417 Transmitter Rd, Fl 32401", Duration::from_secs(10))
        .await;

    assert_eq!(result, Ok(None));
}

#[tokio::test]
async fn test_service_unavailable_is_transient() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search");
            then.status(503);
        })
        .await;

    let geocoder = NominatimGeocoder::new(server.base_url(), DEFAULT_USER_AGENT).unwrap();
    let result = geocoder.lookup(MIAMI, Duration::from_secs(10)).await;

    assert!(matches!(result, Err(LookupError::Transient(ref msg)) if msg.contains("503")));
}

#[tokio::test]
async fn test_forbidden_is_permanent() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search");
            then.status(403);
        })
        .await;

    let geocoder = NominatimGeocoder::new(server.base_url(), DEFAULT_USER_AGENT).unwrap();
    let result = geocoder.lookup(MIAMI, Duration::from_secs(10)).await;

    assert!(matches!(result, Err(LookupError::Permanent(_))));
}

#[tokio::test]
async fn test_slow_response_times_out_as_transient() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search");
            then.status(200)
                .delay(Duration::from_millis(1500))
                .json_body(serde_json::json!([]));
        })
        .await;

    let geocoder = NominatimGeocoder::new(server.base_url(), DEFAULT_USER_AGENT).unwrap();
    let result = geocoder.lookup(MIAMI, Duration::from_millis(100)).await;

    assert!(matches!(result, Err(LookupError::Transient(_))));
}

#[tokio::test]
async fn test_garbage_body_is_permanent() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search");
            then.status(200)
                .header("Content-Type", "text/html")
                .body("<html>maintenance</html>");
        })
        .await;

    let geocoder = NominatimGeocoder::new(server.base_url(), DEFAULT_USER_AGENT).unwrap();
    let result = geocoder.lookup(MIAMI, Duration::from_secs(10)).await;

    assert!(matches!(result, Err(LookupError::Permanent(_))));
}
