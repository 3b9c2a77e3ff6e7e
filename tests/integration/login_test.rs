//! Integration tests for the browser login flow and probes.

use axum::http::StatusCode;

use crate::helpers::TestApp;

fn query_param(url: &str, name: &str) -> String {
    let prefix = format!("{name}=");
    url.split(['?', '&'])
        .find_map(|pair| pair.strip_prefix(prefix.as_str()))
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_health_and_live() {
    let app = TestApp::new();

    let health = app.request("GET", "/health", None, &[]).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "ok");
    assert_eq!(health.body["environment"], "local");

    let live = app.request("GET", "/live", None, &[]).await;
    assert_eq!(live.body["status"], "live");
}

#[tokio::test]
async fn test_login_redirects_with_state_cookie() {
    let app = TestApp::new();

    let response = app.request("GET", "/login", None, &[]).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let location = response.location().unwrap();
    assert!(location.starts_with("https://accounts.test/auth"));
    let cookie = response.cookie("ga_oauth_state").unwrap();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=600"));
    assert!(cookie.contains("SameSite=Lax"));
}

#[tokio::test]
async fn test_full_login_flow() {
    let app = TestApp::new();
    let login = app.request("GET", "/login", None, &[]).await;
    let location = login.location().unwrap();
    let state = query_param(&location, "state");
    let nonce = query_param(&location, "nonce");
    let state_cookie = format!("ga_oauth_state={}", login.cookie_value("ga_oauth_state").unwrap());

    let path = format!("/auth/callback?code=id:jane@example.com:{nonce}&state={state}");
    let callback = app
        .request("GET", &path, None, &[("Cookie", state_cookie.as_str())])
        .await;

    assert_eq!(callback.status, StatusCode::SEE_OTHER);
    assert_eq!(callback.location().as_deref(), Some("/me"));
    assert!(callback.cookie("ga_oauth_state").unwrap().contains("Max-Age=0"));
    let session = callback.cookie_value("ga_session").unwrap();

    let me = app.with_session("GET", "/me", &session).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["cache_status"], "cache_hit");
    assert_eq!(me.body["effective_auth"]["email"], "jane@example.com");
}

#[tokio::test]
async fn test_callback_without_state_cookie() {
    let app = TestApp::new();

    let response = app
        .request("GET", "/auth/callback?code=id:jane@example.com:n&state=s", None, &[])
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error_code"], "oauth_state_mismatch");
}

#[tokio::test]
async fn test_callback_state_mismatch() {
    let app = TestApp::new();
    let login = app.request("GET", "/login", None, &[]).await;
    let nonce = query_param(&login.location().unwrap(), "nonce");
    let state_cookie = format!("ga_oauth_state={}", login.cookie_value("ga_oauth_state").unwrap());

    let path = format!("/auth/callback?code=id:jane@example.com:{nonce}&state=forged");
    let response = app
        .request("GET", &path, None, &[("Cookie", state_cookie.as_str())])
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error_code"], "oauth_state_mismatch");
}

#[tokio::test]
async fn test_callback_nonce_mismatch() {
    let app = TestApp::new();
    let login = app.request("GET", "/login", None, &[]).await;
    let state = query_param(&login.location().unwrap(), "state");
    let state_cookie = format!("ga_oauth_state={}", login.cookie_value("ga_oauth_state").unwrap());

    let path = format!("/auth/callback?code=id:jane@example.com:replayed&state={state}");
    let response = app
        .request("GET", &path, None, &[("Cookie", state_cookie.as_str())])
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.directory_calls(), 0);
}

#[tokio::test]
async fn test_callback_invalid_id_token() {
    let app = TestApp::new();
    let login = app.request("GET", "/login", None, &[]).await;
    let state = query_param(&login.location().unwrap(), "state");
    let state_cookie = format!("ga_oauth_state={}", login.cookie_value("ga_oauth_state").unwrap());

    let path = format!("/auth/callback?code=bogus&state={state}");
    let response = app
        .request("GET", &path, None, &[("Cookie", state_cookie.as_str())])
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
