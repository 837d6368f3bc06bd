//! Integration tests for `VisionClient` using wiremock HTTP mocks.

use blcdb_vision::{Recommendation, VisionClient, VisionError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> VisionClient {
    VisionClient::with_base_url("test-key", 30, base_url)
        .expect("client construction should not fail")
}

const ENDPOINT: &str = "/v1beta/models/gemini-3-flash-preview:generateContent";

#[tokio::test]
async fn classify_parses_the_structured_verdict() {
    let server = MockServer::start().await;

    let verdict_text = serde_json::json!({
        "brandName": "Chang",
        "isThai": true,
        "recommendation": "Boycott",
        "reasonEn": "Brand of a Thai beverage conglomerate",
        "reasonKm": "ម៉ាកភេសជ្ជៈរបស់ក្រុមហ៊ុនថៃ"
    })
    .to_string();
    let body = serde_json::json!({
        "candidates": [
            { "content": { "parts": [ { "text": verdict_text } ] } }
        ]
    });

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let verdict = client
        .classify_brand("aGVsbG8=")
        .await
        .expect("should parse verdict");

    assert_eq!(verdict.brand_name, "Chang");
    assert!(verdict.is_thai);
    assert_eq!(verdict.recommendation, Recommendation::Boycott);
    assert!(!verdict.reason_km.is_empty());
}

#[tokio::test]
async fn api_error_envelope_becomes_a_typed_error() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" }
    });
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(400).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .classify_brand("aGVsbG8=")
        .await
        .expect_err("must surface the API error");
    match err {
        VisionError::Api(message) => assert_eq!(message, "API key not valid"),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_candidate_set_is_an_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": []
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .classify_brand("aGVsbG8=")
        .await
        .expect_err("must fail on empty candidates");
    assert!(matches!(err, VisionError::Api(_)));
}

#[tokio::test]
async fn malformed_verdict_text_is_a_deserialize_error() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "candidates": [
            { "content": { "parts": [ { "text": "I could not identify the brand, sorry!" } ] } }
        ]
    });
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .classify_brand("aGVsbG8=")
        .await
        .expect_err("must fail on prose instead of JSON");
    assert!(matches!(err, VisionError::Deserialize { .. }));
}
