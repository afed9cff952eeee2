//! Integration tests for `GeocodeClient` using wiremock HTTP mocks.

use eva_geocode::{GeocodeClient, GeocodeError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> GeocodeClient {
    GeocodeClient::new(base_url, 10, "eva-search/0.1 (test)", "gb")
        .expect("client construction should not fail")
}

#[tokio::test]
async fn lookup_first_returns_parsed_coordinates() {
    let server = MockServer::start().await;

    let body = serde_json::json!([
        {
            "lat": "51.5073219",
            "lon": "-0.1276474",
            "display_name": "Westminster, London, Greater London, England, SW1A 1AA, United Kingdom"
        },
        {
            "lat": "53.0",
            "lon": "-1.0",
            "display_name": "Somewhere Else, United Kingdom"
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("format", "json"))
        .and(query_param("q", "SW1A 1AA"))
        .and(query_param("countrycodes", "gb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client
        .lookup_first("SW1A 1AA")
        .await
        .expect("lookup should succeed")
        .expect("should resolve to a place");

    // First result wins; the second entry is ignored.
    assert!((result.latitude - 51.5073219).abs() < 1e-9);
    assert!((result.longitude - (-0.1276474)).abs() < 1e-9);
    assert_eq!(result.city.as_deref(), Some("Westminster"));
}

#[tokio::test]
async fn lookup_first_sends_configured_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("user-agent", "eva-search/0.1 (test)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.lookup_first("EC1A 1BB").await.expect("lookup ok");
    assert!(result.is_none(), "empty result array resolves to None");
}

#[tokio::test]
async fn non_2xx_status_is_an_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.lookup_first("SW1A 1AA").await;
    assert!(matches!(result, Err(GeocodeError::Http(_))));
}

#[tokio::test]
async fn malformed_body_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.lookup_first("SW1A 1AA").await;
    assert!(matches!(result, Err(GeocodeError::Deserialize { .. })));
}

#[tokio::test]
async fn unparseable_coordinates_are_an_error() {
    let server = MockServer::start().await;

    let body = serde_json::json!([
        { "lat": "not-a-number", "lon": "-0.1", "display_name": "Broken, UK" }
    ]);

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.lookup_first("SW1A 1AA").await;
    assert!(matches!(result, Err(GeocodeError::Coordinates { .. })));
}
