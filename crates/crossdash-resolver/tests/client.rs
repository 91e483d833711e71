//! Integration tests for `ResolverClient` using wiremock HTTP mocks.

use crossdash_core::Coordinate;
use crossdash_resolver::{AddressResolver, ResolutionError, ResolutionErrorKind, ResolverClient};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ResolverClient {
    ResolverClient::new(base_url, 5, "crossdash-test/0.1")
        .expect("client construction should not fail")
}

fn user_location() -> Coordinate {
    Coordinate::new(40.7128, -74.006).expect("valid coordinate")
}

#[tokio::test]
async fn find_address_returns_parsed_result() {
    let server = MockServer::start().await;

    let body = json!({
        "address": "City Hall Park, New York, NY 10007",
        "eta": [9, 8, 7, 6],
        "hospitals": [
            { "lat": "40.0", "lng": "-73.0", "name": "NYU Langone" },
            { "lat": 40.71, "lng": -74.0, "name": "Lower Manhattan Hospital" }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/find-address"))
        .and(query_param("latitude", "40.7128"))
        .and(query_param("longitude", "-74.006"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client
        .find_address(user_location())
        .await
        .expect("should resolve");

    assert_eq!(result.address, "City Hall Park, New York, NY 10007");
    assert_eq!(result.eta_minutes, vec![9, 8, 7, 6]);
    assert_eq!(result.facilities.len(), 2);
    let primary = result.primary_facility().expect("primary facility");
    assert_eq!(primary.location, Coordinate::new(40.0, -73.0).unwrap());
    assert_eq!(primary.name.as_deref(), Some("NYU Langone"));
}

#[tokio::test]
async fn resolve_trait_delegates_to_find_address() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/find-address"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "address": "Somewhere",
            "eta": [3],
            "hospitals": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let resolver: &dyn AddressResolver = &client;
    let result = resolver.resolve(user_location()).await.expect("should resolve");

    assert_eq!(result.address, "Somewhere");
    assert!(result.facilities.is_empty());
}

#[tokio::test]
async fn server_error_is_network_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/find-address"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.find_address(user_location()).await.unwrap_err();

    assert!(
        matches!(err, ResolutionError::UnexpectedStatus { status: 500, .. }),
        "got {err:?}"
    );
    assert_eq!(err.kind(), ResolutionErrorKind::NetworkFailure);
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/find-address"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.find_address(user_location()).await.unwrap_err();

    assert_eq!(err.kind(), ResolutionErrorKind::MalformedResponse);
}

#[tokio::test]
async fn missing_eta_field_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/find-address"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "address": "Somewhere",
            "hospitals": []
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.find_address(user_location()).await.unwrap_err();

    assert!(matches!(err, ResolutionError::MalformedResponse { .. }));
}

#[tokio::test]
async fn unparseable_facility_coordinate_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/find-address"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "address": "Somewhere",
            "eta": [5],
            "hospitals": [{ "lat": "forty", "lng": "-73.0" }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.find_address(user_location()).await.unwrap_err();

    assert_eq!(err.kind(), ResolutionErrorKind::MalformedResponse);
}

#[tokio::test]
async fn unreachable_resolver_is_network_failure() {
    // Port 1 on localhost is reserved and refuses connections.
    let client = test_client("http://127.0.0.1:1");
    let err = client.find_address(user_location()).await.unwrap_err();

    assert!(
        matches!(err, ResolutionError::NetworkFailure(_)),
        "got {err:?}"
    );
}
