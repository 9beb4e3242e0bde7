// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication middleware.
//!
//! A session is a signed HS256 JWT, carried in the `cardata_session` cookie
//! (or an `Authorization: Bearer` header). There is no server-side current
//! user: each request is authenticated on its own.

use crate::models::Identity;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "cardata_session";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (verified email address)
    pub sub: String,
    /// Display name
    pub name: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user extracted from the session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub email: String,
    pub display_name: String,
}

/// Middleware that requires a valid session; otherwise redirects to `/login`.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        Some(cookie.value().to_string())
    } else {
        request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string)
    };

    let user = token.and_then(|t| verify_session_token(&t, &state.config.session_signing_key).ok());

    let Some(user) = user else {
        return Redirect::to("/login").into_response();
    };

    request.extensions_mut().insert(user);
    next.run(request).await
}

/// Create a session token for a verified identity.
pub fn create_session_token(
    identity: &Identity,
    signing_key: &[u8],
    ttl: Duration,
) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    if !identity.email_verified {
        anyhow::bail!("refusing to issue a session for an unverified email");
    }

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;
    let exp = usize::try_from(ttl.as_secs())
        .ok()
        .and_then(|ttl| now.checked_add(ttl))
        .ok_or_else(|| anyhow::anyhow!("session lifetime out of range"))?;

    let claims = Claims {
        sub: identity.email.clone(),
        name: identity.display_name.clone(),
        iat: now,
        exp,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Verify a session token's signature and expiry.
pub fn verify_session_token(
    token: &str,
    signing_key: &[u8],
) -> Result<SessionUser, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation)?;

    Ok(SessionUser {
        email: token_data.claims.sub,
        display_name: token_data.claims.name,
    })
}
