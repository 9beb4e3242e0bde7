// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity broker: drives the OAuth2 authorization-code flow and turns a
//! provider callback into a trusted [`Identity`] plus a signed session.
//!
//! Login attempts are keyed by an anonymous per-browser login key, so two
//! browsers logging in at the same time never invalidate each other. Within
//! one browser a newer attempt replaces the older one.

use crate::config::Config;
use crate::middleware::auth::create_session_token;
use crate::models::Identity;
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use subtle::ConstantTimeEq;

/// Entropy of an anti-forgery token.
pub const STATE_TOKEN_BYTES: usize = 32;

/// Cap on outstanding attempts across all browsers.
pub const DEFAULT_MAX_PENDING: usize = 10_000;

/// Expired attempts are swept once every this many inserts.
const SWEEP_EVERY: usize = 256;

/// A full store sweeps at most this often.
const FULL_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Authentication failures. Every variant means "not logged in".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("state does not match an outstanding login attempt")]
    ForgeryMismatch,

    #[error("authorization code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("identity fetch failed: {0}")]
    IdentityFetchFailed(String),

    #[error("email address is not verified")]
    UnverifiedEmail,

    #[error("random source unavailable")]
    TokenGeneration,

    #[error("too many logins in progress")]
    TooManyPendingLogins,

    #[error("session could not be issued: {0}")]
    Session(String),
}

/// Identity payload returned by the provider's userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderIdentity {
    pub email: String,
    #[serde(default)]
    pub verified_email: bool,
    #[serde(default)]
    pub name: String,
}

/// An OAuth2 identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authorization endpoint URL carrying `state`.
    fn authorization_url(&self, state: &str) -> String;

    /// Trade an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<String, AuthError>;

    /// Resolve an access token into the user's identity.
    async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity, AuthError>;
}

struct PendingAttempt {
    token: String,
    created_at: Instant,
}

/// Outstanding login attempts, one per browser.
///
/// Holds at most `max_pending` entries. Expired entries are swept every
/// [`SWEEP_EVERY`] inserts, and when the store is full.
pub struct LoginAttempts {
    pending: DashMap<String, PendingAttempt>,
    ttl: Duration,
    max_pending: usize,
    inserts: AtomicUsize,
    last_full_sweep: Mutex<Option<Instant>>,
}

impl LoginAttempts {
    pub fn new(ttl: Duration) -> Self {
        Self::with_limit(ttl, DEFAULT_MAX_PENDING)
    }

    pub fn with_limit(ttl: Duration, max_pending: usize) -> Self {
        Self {
            pending: DashMap::new(),
            ttl,
            max_pending,
            inserts: AtomicUsize::new(0),
            last_full_sweep: Mutex::new(None),
        }
    }

    /// Store `token` as the browser's current attempt, replacing any older one.
    ///
    /// A browser with no attempt yet is refused while the store is full.
    pub fn record(&self, login_key: &str, token: String) -> Result<(), AuthError> {
        let inserts = self.inserts.fetch_add(1, Ordering::Relaxed) + 1;
        if inserts % SWEEP_EVERY == 0 {
            self.purge_expired();
        }

        if !self.pending.contains_key(login_key) && self.pending.len() >= self.max_pending {
            self.purge_expired_when_full();
            if self.pending.len() >= self.max_pending {
                tracing::warn!(pending = self.pending.len(), "Login attempt store full");
                return Err(AuthError::TooManyPendingLogins);
            }
        }

        self.pending.insert(
            login_key.to_string(),
            PendingAttempt {
                token,
                created_at: Instant::now(),
            },
        );
        Ok(())
    }

    /// Remove the browser's attempt and check `received` against it.
    ///
    /// Single use: the attempt is gone afterwards whether or not it matched.
    pub fn consume(&self, login_key: &str, received: &str) -> bool {
        let Some((_, attempt)) = self.pending.remove(login_key) else {
            return false;
        };

        if attempt.created_at.elapsed() > self.ttl {
            return false;
        }

        attempt.token.as_bytes().ct_eq(received.as_bytes()).into()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn purge_expired(&self) {
        let ttl = self.ttl;
        self.pending
            .retain(|_, attempt| attempt.created_at.elapsed() <= ttl);
    }

    /// Sweep, unless a full store was already swept within the last interval.
    fn purge_expired_when_full(&self) {
        let Ok(mut last) = self.last_full_sweep.lock() else {
            return;
        };
        if last.is_some_and(|at| at.elapsed() < FULL_SWEEP_INTERVAL) {
            return;
        }
        *last = Some(Instant::now());
        drop(last);

        self.purge_expired();
    }
}

/// A login that passed every check.
#[derive(Debug, Clone)]
pub struct EstablishedSession {
    pub identity: Identity,
    /// Signed session token for the session cookie.
    pub token: String,
}

/// Coordinates login attempts against a single identity provider.
pub struct IdentityBroker {
    provider: Arc<dyn IdentityProvider>,
    attempts: LoginAttempts,
    signing_key: Vec<u8>,
    session_ttl: Duration,
}

impl IdentityBroker {
    pub fn new(provider: Arc<dyn IdentityProvider>, config: &Config) -> Self {
        Self {
            provider,
            attempts: LoginAttempts::with_limit(
                config.login_attempt_ttl,
                config.max_pending_logins,
            ),
            signing_key: config.session_signing_key.clone(),
            session_ttl: config.session_ttl,
        }
    }

    pub fn with_settings(
        provider: Arc<dyn IdentityProvider>,
        signing_key: Vec<u8>,
        session_ttl: Duration,
        attempt_ttl: Duration,
    ) -> Self {
        Self {
            provider,
            attempts: LoginAttempts::new(attempt_ttl),
            signing_key,
            session_ttl,
        }
    }

    /// Outstanding attempts (for diagnostics and tests).
    pub fn attempts(&self) -> &LoginAttempts {
        &self.attempts
    }

    /// Start a login for the browser identified by `login_key`.
    ///
    /// Returns the provider URL to redirect to. Any earlier unconsumed attempt
    /// from the same browser stops being valid.
    pub fn begin_login(&self, login_key: &str) -> Result<String, AuthError> {
        let token = random_token(STATE_TOKEN_BYTES)?;
        let url = self.provider.authorization_url(&token);
        self.attempts.record(login_key, token)?;

        tracing::info!("Starting OAuth flow, redirecting to identity provider");
        Ok(url)
    }

    /// Finish a login from the provider callback.
    ///
    /// The state check happens before any network call. No retries: codes are
    /// single-use.
    pub async fn complete_login(
        &self,
        login_key: &str,
        received_state: &str,
        code: &str,
    ) -> Result<EstablishedSession, AuthError> {
        if !self.attempts.consume(login_key, received_state) {
            tracing::warn!("OAuth state mismatch, rejecting callback");
            return Err(AuthError::ForgeryMismatch);
        }

        let access_token = self.provider.exchange_code(code).await?;
        let profile = self.provider.fetch_identity(&access_token).await?;

        if profile.email.trim().is_empty() {
            tracing::warn!("Rejecting login with no email address");
            return Err(AuthError::IdentityFetchFailed(
                "identity has no email address".to_string(),
            ));
        }

        if !profile.verified_email {
            tracing::warn!(email = %profile.email, "Rejecting login with unverified email");
            return Err(AuthError::UnverifiedEmail);
        }

        let identity = Identity {
            email: profile.email,
            email_verified: true,
            display_name: profile.name,
        };

        let token = create_session_token(&identity, &self.signing_key, self.session_ttl)
            .map_err(|e| AuthError::Session(e.to_string()))?;

        tracing::info!(email = %identity.email, "Login complete, session issued");
        Ok(EstablishedSession { identity, token })
    }
}

/// `len` bytes from the OS CSPRNG, base64url without padding.
pub fn random_token(len: usize) -> Result<String, AuthError> {
    let mut bytes = vec![0u8; len];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AuthError::TokenGeneration)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
