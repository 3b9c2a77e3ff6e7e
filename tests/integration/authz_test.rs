//! Integration tests for the credential-based authorization endpoints.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{TestApp, TestOptions};

#[tokio::test]
async fn test_check_granted() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/authz/check",
            Some(json!({"access_token": "token:jane@example.com", "module": "Inventory", "action": "READ"})),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["authorized"], true);
    assert_eq!(response.body["decision"], "granted");
    assert_eq!(response.body["evaluated_permission"], "inventory:read");
    assert_eq!(
        response.body["permitted_actions"],
        json!(["inventory:list", "inventory:read"])
    );
    assert!(response.body.get("reason").is_none());
}

#[tokio::test]
async fn test_check_denied_returns_decision_body() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/authz/check",
            Some(json!({"access_token": "token:jane@example.com", "module": "inventory", "action": "delete"})),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["authorized"], false);
    assert_eq!(response.body["decision"], "denied");
    assert_eq!(response.body["reason"], "permission_missing");
    assert_eq!(response.body["email"], "jane@example.com");
}

#[tokio::test]
async fn test_check_rejects_unknown_verb() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/authz/check",
            Some(json!({"access_token": "token:jane@example.com", "module": "inventory", "action": "destroy"})),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error_code"], "invalid_action");
}

#[tokio::test]
async fn test_two_credentials_rejected_before_any_work() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/authz",
            Some(json!({"session_token": "s", "access_token": "token:jane@example.com"})),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error_code"], "invalid_request");
    assert_eq!(app.directory_calls(), 0);
    assert_eq!(app.verifier.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_no_credential_rejected() {
    let app = TestApp::new();
    let response = app.request("POST", "/authz", Some(json!({})), &[]).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_source_refreshed_then_cache() {
    let app = TestApp::new();
    let body = json!({"access_token": "token:jane@example.com"});

    let first = app.request("POST", "/authz", Some(body.clone()), &[]).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["source"], "refreshed");
    assert_eq!(first.body["effective_auth"]["email"], "jane@example.com");
    assert_eq!(first.body["effective_auth"]["home_department"], "Warehouse");
    assert_eq!(first.body["effective_auth"]["groups"], json!(["staff@example.com"]));

    let second = app.request("POST", "/authz", Some(body), &[]).await;
    assert_eq!(second.body["source"], "cache");
    assert_eq!(app.directory_calls(), 1);
}

#[tokio::test]
async fn test_session_token_in_body() {
    let app = TestApp::new();
    let token = app.session_token("jane@example.com");

    let response = app
        .request("POST", "/authz", Some(json!({"session_token": token})), &[])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["effective_auth"]["email"], "jane@example.com");
}

#[tokio::test]
async fn test_invalid_access_token_is_unauthorized() {
    let app = TestApp::new();

    let response = app
        .request("POST", "/authz", Some(json!({"access_token": "garbage"})), &[])
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error_code"], "invalid_access_token");
    assert_eq!(app.directory_calls(), 0);
}

#[tokio::test]
async fn test_network_guard_rejects_outside_address() {
    let app = TestApp::with_options(TestOptions {
        networks: vec!["10.0.0.0/8".to_string()],
        ..Default::default()
    })
    .from_ip([192, 168, 1, 5]);

    let response = app
        .request("POST", "/authz", Some(json!({"access_token": "token:jane@example.com"})), &[])
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error_code"], "network_not_allowed");
    assert_eq!(app.verifier.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rate_limit_exceeded() {
    let app = TestApp::with_options(TestOptions {
        rate_limit: 2,
        ..Default::default()
    });
    let body = json!({"access_token": "token:jane@example.com"});

    for _ in 0..2 {
        let ok = app.request("POST", "/authz", Some(body.clone()), &[]).await;
        assert_eq!(ok.status, StatusCode::OK);
    }
    let limited = app.request("POST", "/authz", Some(body), &[]).await;

    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.body["error_code"], "rate_limited");
}

#[tokio::test]
async fn test_directory_test_endpoint() {
    let app = TestApp::new();

    let response = app
        .request("POST", "/authz/test", Some(json!({"email": " Jane@Example.com "})), &[])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["requested_email"], "jane@example.com");
    assert_eq!(response.body["raw_user"]["primaryEmail"], "jane@example.com");
    assert!(response.body["raw_groups"]["groups"].is_array());

    let sample = app.request("POST", "/authz/test", Some(json!({})), &[]).await;
    assert_eq!(sample.body["requested_email"], "sample@example.com");
    assert_eq!(sample.body["effective_auth"]["permissions"], json!(["reports:read"]));
}

#[tokio::test]
async fn test_directory_outage_is_bad_gateway() {
    let app = TestApp::new();
    app.directory.down.store(true, std::sync::atomic::Ordering::SeqCst);

    let response = app
        .request("POST", "/authz", Some(json!({"access_token": "token:jane@example.com"})), &[])
        .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["error_code"], "workspace_unavailable");
    assert_eq!(app.directory_calls(), 2);
}
