//! Sad path tests: service errors, broken bodies, dead transports.
//!
//! Every failure degrades to "nothing is shown" and nothing is cached.

mod common;

use common::{components, envelope, paris_results, TestEnv, BLURB, QUIET, SEARCH, THUMB, WAIT};
use entity_suggest::control::ChannelRenderer;
use entity_suggest::services::fetcher::decode_candidates;
use entity_suggest::services::Response;
use entity_suggest::test_utils::next_within;
use entity_suggest::types::ResourceKind;
use entity_suggest::{Candidate, QueryKey, SuggestConfig, SuggestError};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

// ============================================================================
// Search Failures
// ============================================================================

#[tokio::test]
async fn test_service_error_code_not_cached() {
    let c = components();
    c.transport.respond_json(
        SEARCH,
        &json!({"status": "400 Bad Request", "code": "/api/status/error", "result": null}),
    );

    let err = c.fetcher.fetch("ctx1", "par").unwrap().await.unwrap_err();
    assert!(matches!(err, SuggestError::Service { .. }));
    assert_eq!(err.code(), "SERVICE_ERROR");
    assert!(c.cache.get_candidates(&QueryKey::new("ctx1", "par")).is_none());
}

#[tokio::test]
async fn test_http_500_not_cached() {
    let c = components();
    c.transport.respond(
        SEARCH,
        Response {
            status: 500,
            body: b"Internal Server Error".to_vec(),
        },
    );

    let err = c.fetcher.fetch("ctx1", "par").unwrap().await.unwrap_err();
    assert!(err.is_service());
    assert!(err.to_string().contains("500"));
    assert_eq!(c.cache.candidate_len(), 0);
}

#[tokio::test]
async fn test_unrouted_request_is_404() {
    let c = components();
    let err = c.fetcher.fetch("ctx1", "par").unwrap().await.unwrap_err();
    assert_eq!(err.code(), "SERVICE_ERROR");
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let c = components();
    c.transport.respond_text(SEARCH, "<html>gateway timeout</html>");

    let err = c.fetcher.fetch("ctx1", "par").unwrap().await.unwrap_err();
    assert!(matches!(err, SuggestError::Decode(_)));
    assert_eq!(err.code(), "DECODE_ERROR");
    assert_eq!(c.cache.candidate_len(), 0);
}

#[tokio::test]
async fn test_transport_failure_is_network_error() {
    let c = components();
    c.transport.fail(SEARCH, "connection refused");

    let err = c.fetcher.fetch("ctx1", "par").unwrap().await.unwrap_err();
    assert_eq!(err.code(), "NETWORK_ERROR");
    assert!(!err.is_service());
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn test_failure_then_recovery() {
    let c = components();
    c.transport.fail(SEARCH, "connection refused");
    assert!(c.fetcher.fetch("ctx1", "par").unwrap().await.is_err());

    c.transport.respond_json(SEARCH, &paris_results());
    let list = c.fetcher.fetch("ctx1", "par").unwrap().await.unwrap();
    assert_eq!(list[0].id, "/en/paris");
    assert_eq!(c.transport.requests_matching(SEARCH), 2);
}

#[test]
fn test_decode_tolerates_missing_fields() {
    let response = Response::ok(
        envelope(json!([
            {"id": "/en/x"},
            {"id": "/en/y", "name": null, "type": null, "alias": ["Why"]}
        ]))
        .to_string(),
    );
    let list = decode_candidates(&response).unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].name, "");
    assert!(list[1].types.is_empty());
    assert_eq!(list[1].aliases, vec!["Why".to_string()]);
    assert!(!list[0].has_detail());
}

#[test]
fn test_decode_wrong_shape() {
    let response = Response::ok(json!({"result": "not a list"}).to_string());
    assert!(decode_candidates(&response).is_err());
}

// ============================================================================
// Detail Failures
// ============================================================================

#[tokio::test]
async fn test_text_failure_suppresses_flyout() {
    let c = components();
    c.transport.fail(BLURB, "connection reset");
    c.transport.respond(THUMB, Response::ok("png"));
    let (renderer, mut ready) = ChannelRenderer::new();

    let token = c.joiner.begin(
        Candidate::new("/en/paris", "Paris")
            .with_article("/en/paris")
            .with_image("/en/paris"),
        renderer,
    );

    common::until("thumbnail cached", || {
        c.cache.get_resource(ResourceKind::Image, "/en/paris").is_some()
    })
    .await;
    assert!(next_within(&mut ready, QUIET).await.is_none());
    assert!(!token.has_fired());
    assert!(c.cache.get_resource(ResourceKind::Text, "/en/paris").is_none());
}

#[tokio::test]
async fn test_text_error_status_suppresses_flyout() {
    let c = components();
    c.transport.respond(
        BLURB,
        Response {
            status: 404,
            body: b"not found".to_vec(),
        },
    );
    c.transport.respond(THUMB, Response::ok("png"));
    let (renderer, mut ready) = ChannelRenderer::new();

    c.joiner.begin(
        Candidate::new("/en/paris", "Paris")
            .with_article("/en/paris")
            .with_image("/en/paris"),
        renderer,
    );

    assert!(next_within(&mut ready, QUIET).await.is_none());
    assert!(c.cache.get_resource(ResourceKind::Text, "/en/paris").is_none());
}

#[tokio::test]
async fn test_image_failure_still_resolves() {
    let c = components();
    c.transport.respond(BLURB, Response::ok("City in France"));
    c.transport.fail(THUMB, "connection reset");
    let (renderer, mut ready) = ChannelRenderer::new();

    c.joiner.begin(
        Candidate::new("/en/paris", "Paris")
            .with_article("/en/paris")
            .with_image("/en/paris"),
        renderer,
    );

    let event = next_within(&mut ready, WAIT).await.expect("flyout should still show");
    assert_eq!(event.text, "City in France");
    assert!(event.image_url.contains("/api/trans/image_thumb/en/paris"));
}

#[tokio::test]
async fn test_control_survives_search_failure() {
    let mut env = TestEnv::new();
    env.transport.respond_text(SEARCH, "garbage");

    env.control
        .on_query_text_changed("ctx1", "par")
        .unwrap()
        .await
        .unwrap();
    assert!(env.views.try_recv().is_err());
    assert_eq!(env.control.cache().candidate_len(), 0);
}

// ============================================================================
// Configuration Failures
// ============================================================================

#[test]
fn test_config_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = SuggestConfig::from_file(&dir.path().join("absent.json")).unwrap_err();
    assert_eq!(err.code(), "CONFIG_READ_ERROR");
}

#[test]
fn test_config_invalid_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("suggest.json");
    fs::write(&path, "{ service_url: ").unwrap();

    let err = SuggestConfig::from_file(&path).unwrap_err();
    assert_eq!(err.code(), "CONFIG_PARSE_ERROR");
    assert!(SuggestError::from(err).to_string().contains("suggest.json"));
}
