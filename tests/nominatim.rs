//! Integration tests for `NominatimClient` using wiremock HTTP mocks.

use std::time::Duration;

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zonas::geocoder::{GeocodeError, Geocoder, NominatimClient};

fn test_client(base_url: &str) -> NominatimClient {
    NominatimClient::new(base_url, "zonas-test/1.0", Duration::from_secs(5))
        .expect("client construction should not fail")
}

#[tokio::test]
async fn geocode_returns_first_candidate() {
    let server = MockServer::start().await;

    let body = serde_json::json!([
        {
            "place_id": 1234,
            "lat": "-34.5800",
            "lon": "-58.4500",
            "display_name": "1500, Avenida San Martín, Palermo, Buenos Aires, Argentina"
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Avenida San Martin 1500, CABA"))
        .and(query_param("format", "json"))
        .and(query_param("limit", "1"))
        .and(header("user-agent", "zonas-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let candidates = client
        .geocode("Avenida San Martin 1500, CABA")
        .await
        .expect("should geocode");

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].point.x(), -58.45);
    assert_eq!(candidates[0].point.y(), -34.58);
    assert!(candidates[0].display_name.contains("Palermo"));
}

#[tokio::test]
async fn geocode_empty_array_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let candidates = client.geocode("Calle Inexistente 1, CABA").await.unwrap();
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn geocode_http_error_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.geocode("Boedo 100, CABA").await.unwrap_err();
    assert!(matches!(err, GeocodeError::Status { status: 503 }));
}

#[tokio::test]
async fn geocode_rejects_bad_coordinates() {
    let server = MockServer::start().await;

    let body = serde_json::json!([{ "lat": "n/a", "lon": "-58.4", "display_name": "?" }]);

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.geocode("Boedo 100, CABA").await.unwrap_err();
    assert!(matches!(err, GeocodeError::InvalidCoordinate(_)));
}

#[tokio::test]
async fn geocode_unreachable_server_is_transport_error() {
    // Nothing listens on port 1
    let client = test_client("http://127.0.0.1:1/");
    let err = client.geocode("Boedo 100, CABA").await.unwrap_err();
    assert!(matches!(err, GeocodeError::Transport(_)));
}
