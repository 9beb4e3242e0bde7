// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google provider tests against a local mock server.

use cardata::config::Config;
use cardata::services::{AuthError, GoogleEndpoints, GoogleProvider, IdentityProvider};
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

fn provider_for(server: &MockServer, config: &Config) -> GoogleProvider {
    let endpoints = GoogleEndpoints {
        authorization: server.url("/o/oauth2/auth"),
        token: server.url("/token"),
        userinfo: server.url("/oauth2/v2/userinfo"),
    };
    GoogleProvider::with_endpoints(config, endpoints).unwrap()
}

#[tokio::test]
async fn test_exchange_code_posts_form() {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/token")
                .x_www_form_urlencoded_tuple("code", "validcode")
                .x_www_form_urlencoded_tuple("client_id", "test_client_id")
                .x_www_form_urlencoded_tuple("client_secret", "test_secret")
                .x_www_form_urlencoded_tuple("grant_type", "authorization_code");
            then.status(200)
                .json_body(json!({"access_token": "ya29.token", "expires_in": 3599}));
        })
        .await;

    let provider = provider_for(&server, &Config::test_default());
    let token = provider.exchange_code("validcode").await.unwrap();

    assert_eq!(token, "ya29.token");
    token_mock.assert_async().await;
}

#[tokio::test]
async fn test_exchange_code_rejected() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/token");
            then.status(400)
                .json_body(json!({"error": "invalid_grant"}));
        })
        .await;

    let provider = provider_for(&server, &Config::test_default());
    let result = provider.exchange_code("stale").await;

    assert_eq!(
        result.unwrap_err(),
        AuthError::ExchangeFailed("HTTP 400 Bad Request".to_string())
    );
}

#[tokio::test]
async fn test_exchange_code_missing_access_token() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/token");
            then.status(200).json_body(json!({"token_type": "Bearer"}));
        })
        .await;

    let provider = provider_for(&server, &Config::test_default());
    let result = provider.exchange_code("validcode").await;

    assert!(matches!(result, Err(AuthError::ExchangeFailed(_))));
}

#[tokio::test]
async fn test_fetch_identity_sends_bearer_token() {
    let server = MockServer::start_async().await;
    let userinfo_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/oauth2/v2/userinfo")
                .header("authorization", "Bearer ya29.token");
            then.status(200).json_body(json!({
                "id": "1234",
                "email": "a@b.com",
                "verified_email": true,
                "name": "A",
                "picture": "https://example.com/a.png"
            }));
        })
        .await;

    let provider = provider_for(&server, &Config::test_default());
    let identity = provider.fetch_identity("ya29.token").await.unwrap();

    assert_eq!(identity.email, "a@b.com");
    assert!(identity.verified_email);
    assert_eq!(identity.name, "A");
    userinfo_mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_identity_without_verified_flag_is_unverified() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/oauth2/v2/userinfo");
            then.status(200).json_body(json!({"email": "a@b.com"}));
        })
        .await;

    let provider = provider_for(&server, &Config::test_default());
    let identity = provider.fetch_identity("ya29.token").await.unwrap();

    assert!(!identity.verified_email);
    assert_eq!(identity.name, "");
}

#[tokio::test]
async fn test_fetch_identity_unauthorized() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/oauth2/v2/userinfo");
            then.status(401);
        })
        .await;

    let provider = provider_for(&server, &Config::test_default());
    let result = provider.fetch_identity("expired").await;

    assert_eq!(
        result.unwrap_err(),
        AuthError::IdentityFetchFailed("HTTP 401 Unauthorized".to_string())
    );
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/token");
            then.status(200)
                .delay(Duration::from_secs(2))
                .json_body(json!({"access_token": "late"}));
        })
        .await;

    let mut config = Config::test_default();
    config.provider_timeout = Duration::from_millis(100);
    let provider = provider_for(&server, &config);

    let result = provider.exchange_code("validcode").await;
    assert!(matches!(result, Err(AuthError::ExchangeFailed(_))));
}

#[test]
fn test_authorization_url_points_at_endpoint() {
    let server = MockServer::start();
    let provider = provider_for(&server, &Config::test_default());

    let url = provider.authorization_url("state-token");
    assert!(url.starts_with(&server.url("/o/oauth2/auth?")));
    assert!(url.ends_with("state=state-token"));
}
