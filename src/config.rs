// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables and,
//! optionally, a JSON secrets file.
//!
//! Read once at startup; immutable afterwards.

use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;

const MIN_SIGNING_KEY_LEN: usize = 32;

/// Upper bound for any configured duration (one year).
const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Google OAuth client ID (public)
    pub google_client_id: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// Callback URL registered with the provider
    pub oauth_redirect_url: String,
    /// `mysql://...` or `sqlite:...`
    pub database_url: String,
    /// HS256 key for session tokens (raw bytes)
    pub session_signing_key: Vec<u8>,
    /// Server port
    pub port: u16,
    /// Bound on each outbound provider call
    pub provider_timeout: Duration,
    /// Bound on each database query
    pub query_timeout: Duration,
    /// Lifetime of an issued session
    pub session_ttl: Duration,
    /// Lifetime of an unconsumed login attempt
    pub login_attempt_ttl: Duration,
    /// Cap on login attempts in progress across all browsers
    pub max_pending_logins: usize,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            google_client_id: "test_client_id".to_string(),
            google_client_secret: "test_secret".to_string(),
            oauth_redirect_url: "http://localhost:8080/auth/google/callback".to_string(),
            database_url: "sqlite::memory:".to_string(),
            session_signing_key: b"test_session_key_32_bytes_min!!!".to_vec(),
            port: 8080,
            provider_timeout: Duration::from_secs(10),
            query_timeout: Duration::from_secs(5),
            session_ttl: Duration::from_secs(12 * 60 * 60),
            login_attempt_ttl: Duration::from_secs(600),
            max_pending_logins: 10_000,
        }
    }

    /// Load configuration.
    ///
    /// If `CARDATA_CONFIG_FILE` is set, the database URL and OAuth client
    /// credentials come from that file; everything else from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        match env::var("CARDATA_CONFIG_FILE") {
            Ok(path) => {
                let secrets = SecretsFile::read(Path::new(&path))?;
                Self::from_parts(
                    secrets.oauth.client_id,
                    secrets.oauth.client_secret,
                    secrets.db_con,
                )
            }
            Err(_) => Self::from_env(),
        }
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_parts(
            required("GOOGLE_CLIENT_ID")?,
            required("GOOGLE_CLIENT_SECRET")?,
            required("DATABASE_URL")?,
        )
    }

    fn from_parts(
        google_client_id: String,
        google_client_secret: String,
        database_url: String,
    ) -> Result<Self, ConfigError> {
        let session_signing_key = required("SESSION_SIGNING_KEY")?.into_bytes();
        if session_signing_key.len() < MIN_SIGNING_KEY_LEN {
            return Err(ConfigError::Invalid(
                "SESSION_SIGNING_KEY",
                format!("must be at least {} bytes", MIN_SIGNING_KEY_LEN),
            ));
        }

        Ok(Self {
            google_client_id: google_client_id.trim().to_string(),
            google_client_secret: google_client_secret.trim().to_string(),
            oauth_redirect_url: required("OAUTH_REDIRECT_URL")?,
            database_url,
            session_signing_key,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            provider_timeout: duration_or("PROVIDER_TIMEOUT_SECS", 10, 1)?,
            query_timeout: duration_or("QUERY_TIMEOUT_SECS", 5, 1)?,
            session_ttl: duration_or("SESSION_TTL_HOURS", 12, 60 * 60)?,
            login_attempt_ttl: duration_or("LOGIN_ATTEMPT_TTL_SECS", 600, 1)?,
            max_pending_logins: usize::try_from(positive(
                "LOGIN_ATTEMPT_MAX_PENDING",
                number_or("LOGIN_ATTEMPT_MAX_PENDING", 10_000)?,
            )?)
            .unwrap_or(usize::MAX),
        })
    }

    /// Cookies carry `Secure` whenever the public callback is served over TLS.
    pub fn secure_cookies(&self) -> bool {
        self.oauth_redirect_url.starts_with("https://")
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn number_or(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(key, format!("not a number: {raw}"))),
        Err(_) => Ok(default),
    }
}

fn positive(key: &'static str, value: u64) -> Result<u64, ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid(key, "must be greater than zero".to_string()));
    }
    Ok(value)
}

fn duration_or(key: &'static str, default: u64, unit_secs: u64) -> Result<Duration, ConfigError> {
    duration(key, number_or(key, default)?, unit_secs)
}

/// `value` units of `unit_secs` seconds, non-zero and at most a year.
fn duration(key: &'static str, value: u64, unit_secs: u64) -> Result<Duration, ConfigError> {
    positive(key, value)?
        .checked_mul(unit_secs)
        .filter(|secs| *secs <= MAX_DURATION_SECS)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::Invalid(key, format!("{value} is too large")))
}

/// Legacy secrets-file layout.
#[derive(Debug, Deserialize)]
struct SecretsFile {
    #[serde(rename = "dbCon")]
    db_con: String,
    #[serde(rename = "oauthconfigs")]
    oauth: OAuthSecrets,
}

#[derive(Debug, Deserialize)]
struct OAuthSecrets {
    #[serde(rename = "clientid")]
    client_id: String,
    #[serde(rename = "clientsecret")]
    client_secret: String,
}

impl SecretsFile {
    fn read(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::File(format!("{}: {}", path.display(), e)))?;
        Self::parse(&raw)
    }

    fn parse(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::File(e.to_string()))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),

    #[error("Secrets file error: {0}")]
    File(String),
}
