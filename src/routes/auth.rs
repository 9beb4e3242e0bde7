// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth authentication routes.

use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::middleware::auth::SESSION_COOKIE;
use crate::services::identity::random_token;
use crate::AppState;

/// Anonymous per-browser key that login attempts are stored under.
pub const LOGIN_COOKIE: &str = "cardata_login";

/// Covers both `/auth/google` and its callback.
const LOGIN_COOKIE_PATH: &str = "/auth/google";

const LOGIN_KEY_BYTES: usize = 16;

/// Where a successful login lands.
const HOME_PATH: &str = "/api/vehicles";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login_page))
        .route("/auth/google", get(auth_start))
        .route("/auth/google/callback", get(auth_callback))
        .route("/auth/logout", post(logout))
}

/// Login page: a single "Login with Google" link.
async fn login_page() -> Html<&'static str> {
    Html(r#"<a href="/auth/google"> Login with Google </a>"#)
}

/// Start OAuth flow - redirect to Google authorization.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect)> {
    // Reuse the browser's key so a second click replaces the first attempt.
    let login_key = match jar.get(LOGIN_COOKIE) {
        Some(cookie) if !cookie.value().is_empty() => cookie.value().to_string(),
        _ => random_token(LOGIN_KEY_BYTES)?,
    };

    let auth_url = state.identity_broker.begin_login(&login_key)?;

    let cookie = login_cookie(
        login_key,
        state.config.secure_cookies(),
        state.config.login_attempt_ttl,
    );

    Ok((jar.add(cookie), Redirect::temporary(&auth_url)))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - verify state, exchange code, create session.
///
/// Every failure sends the browser back to the login page.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> (CookieJar, Redirect) {
    let login_key = jar
        .get(LOGIN_COOKIE)
        .map(|c| c.value().to_string())
        .unwrap_or_default();
    let jar = jar.remove(removal_cookie(LOGIN_COOKIE, LOGIN_COOKIE_PATH));

    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Google");
        return (jar, Redirect::to("/login"));
    }

    let (Some(received_state), Some(code)) = (params.state, params.code) else {
        tracing::warn!("OAuth callback missing state or code");
        return (jar, Redirect::to("/login"));
    };

    match state
        .identity_broker
        .complete_login(&login_key, &received_state, &code)
        .await
    {
        Ok(session) => {
            let cookie = session_cookie(
                session.token,
                state.config.secure_cookies(),
                state.config.session_ttl,
            );
            (jar.add(cookie), Redirect::to(HOME_PATH))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login rejected");
            (jar, Redirect::to("/login"))
        }
    }
}

/// Logout - drop the session cookie. POST only, so a cross-site link or
/// image cannot end the session.
async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar
        .remove(removal_cookie(SESSION_COOKIE, "/"))
        .remove(removal_cookie(LOGIN_COOKIE, LOGIN_COOKIE_PATH));
    (jar, Redirect::to("/login"))
}

fn login_cookie(value: String, secure: bool, ttl: Duration) -> Cookie<'static> {
    Cookie::build((LOGIN_COOKIE, value))
        .path(LOGIN_COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age(ttl))
        .build()
}

fn session_cookie(value: String, secure: bool, ttl: Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age(ttl))
        .build()
}

fn removal_cookie(name: &'static str, path: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path(path).build()
}

fn max_age(ttl: Duration) -> time::Duration {
    time::Duration::seconds(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX))
}
