//! Integration tests for the session-cookie endpoints.

use axum::http::StatusCode;

use crate::helpers::{TestApp, TestOptions};

#[tokio::test]
async fn test_me_requires_session() {
    let app = TestApp::new();

    let response = app.request("GET", "/me", None, &[]).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error_code"], "missing_session");
}

#[tokio::test]
async fn test_me_rejects_forged_session() {
    let app = TestApp::new();

    let response = app.with_session("GET", "/me", "not.a.jwt").await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error_code"], "invalid_session_token");
}

#[tokio::test]
async fn test_me_returns_profile_and_cache_status() {
    let app = TestApp::new();
    let token = app.session_token("jane@example.com");

    let first = app.with_session("GET", "/me", &token).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["cache_status"], "cache_miss");
    assert_eq!(first.body["effective_auth"]["email"], "jane@example.com");

    let second = app.with_session("GET", "/me", &token).await;
    assert_eq!(second.body["cache_status"], "cache_hit");
}

#[tokio::test]
async fn test_session_metadata() {
    let app = TestApp::new();
    let token = app.session_token("jane@example.com");

    let response = app.with_session("GET", "/session", &token).await;

    assert_eq!(response.status, StatusCode::OK);
    let session = &response.body["session"];
    let issued = session["issued_at"].as_i64().unwrap();
    let expires = session["expires_at"].as_i64().unwrap();
    assert_eq!(expires - issued, 3600);
    assert_eq!(session["requires_refresh"], false);
}

#[tokio::test]
async fn test_refresh_reissues_session_and_refetches() {
    let app = TestApp::new();
    let token = app.session_token("jane@example.com");
    app.with_session("GET", "/me", &token).await;

    let response = app.with_session("POST", "/session/refresh", &token).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["cache_status"], "cache_refresh");
    let renewed = response.cookie_value("ga_session").unwrap();
    assert_ne!(renewed, token);
    assert_eq!(app.directory_calls(), 2);

    let me = app.with_session("GET", "/me", &renewed).await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_checks_origin() {
    let app = TestApp::with_options(TestOptions {
        origins: vec!["https://app.example.com".to_string()],
        ..Default::default()
    });
    let token = app.session_token("jane@example.com");
    let cookie = format!("ga_session={token}");

    let foreign = app
        .request(
            "POST",
            "/session/refresh",
            None,
            &[("Cookie", cookie.as_str()), ("Origin", "https://evil.example.net")],
        )
        .await;
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);
    assert_eq!(foreign.body["error_code"], "origin_not_allowed");

    let missing = app
        .request("POST", "/session/refresh", None, &[("Cookie", cookie.as_str())])
        .await;
    assert_eq!(missing.status, StatusCode::FORBIDDEN);

    let allowed = app
        .request(
            "POST",
            "/session/refresh",
            None,
            &[("Cookie", cookie.as_str()), ("Origin", "https://app.example.com")],
        )
        .await;
    assert_eq!(allowed.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_clears_cookie_and_cache() {
    let app = TestApp::new();
    let token = app.session_token("jane@example.com");
    app.with_session("GET", "/me", &token).await;

    let response = app.with_session("POST", "/logout", &token).await;

    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let cleared = response.cookie("ga_session").unwrap();
    assert!(cleared.starts_with("ga_session=;"));
    assert!(cleared.contains("Max-Age=0"));

    let after = app.with_session("GET", "/me", &token).await;
    assert_eq!(after.body["cache_status"], "cache_miss");
    assert_eq!(app.directory_calls(), 2);
}

#[tokio::test]
async fn test_logout_without_session_still_clears() {
    let app = TestApp::new();
    let response = app.request("POST", "/logout", None, &[]).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert!(response.cookie("ga_session").is_some());
}
