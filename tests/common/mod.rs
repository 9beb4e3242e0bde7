// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use cardata::config::Config;
use cardata::db::{sqlite, SqliteRecordStore};
use cardata::routes::create_router;
use cardata::services::{AuthError, IdentityBroker, IdentityProvider, ProviderIdentity};
use cardata::AppState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const SCHEMA: &[&str] = &[
    "CREATE TABLE Car (
        CarID INTEGER PRIMARY KEY,
        LicensePlate TEXT NOT NULL,
        Make TEXT NOT NULL,
        Model TEXT NOT NULL,
        ModelYear INTEGER NOT NULL,
        OdometerReading REAL NOT NULL,
        Units TEXT NOT NULL,
        DatePurchased TEXT NOT NULL,
        MileageWhenPurchased REAL NOT NULL,
        CurrentlyActive BOOLEAN NOT NULL,
        MileageWhenSold REAL,
        DateSold TEXT,
        Nickname TEXT
    )",
    "CREATE TABLE ServiceStation (
        StationID INTEGER PRIMARY KEY,
        Name TEXT NOT NULL,
        Address TEXT NOT NULL
    )",
    "CREATE TABLE FillUp (
        PurchaseID INTEGER PRIMARY KEY,
        CarID INTEGER NOT NULL,
        StationID INTEGER NOT NULL,
        PurchaseDate TEXT NOT NULL,
        GallonsPurchased REAL NOT NULL,
        IsFillUp BOOLEAN NOT NULL,
        TripMileage REAL NOT NULL,
        OdometerReading REAL NOT NULL,
        Cost REAL NOT NULL,
        Units TEXT NOT NULL
    )",
    "CREATE TABLE Repair (
        TransactionID INTEGER PRIMARY KEY,
        CarID INTEGER NOT NULL,
        StationID INTEGER NOT NULL,
        PurchaseDate TEXT NOT NULL,
        OdometerReading REAL NOT NULL,
        Cost REAL NOT NULL,
        Description TEXT NOT NULL,
        Units TEXT NOT NULL
    )",
];

/// The two-car garage: one active car with no optional fields, one sold
/// car with all of them.
#[allow(dead_code)]
pub const GARAGE: &[&str] = &[
    "INSERT INTO Car VALUES (1, '7ABC123', 'Honda', 'Civic', 2012, 98000.0, 'miles',
        '2015-06-01', 40000.0, 1, NULL, NULL, NULL)",
    "INSERT INTO Car VALUES (2, '4XYZ987', 'Ford', 'Ranger', 2004, 15000.0, 'miles',
        '2010-01-15', 9000.0, 0, 15000.0, '2020-05-01', 'Betsy')",
];

/// Stations, fill-ups and repairs for car 1.
#[allow(dead_code)]
pub const HISTORY: &[&str] = &[
    "INSERT INTO ServiceStation VALUES (1, 'Chevron', '100 El Camino Real')",
    "INSERT INTO ServiceStation VALUES (2, 'Joe''s Garage', '12 Main St')",
    "INSERT INTO FillUp VALUES (11, 1, 1, '2021-03-02', 10.0, 1, 320.0, 97680.0, 38.5, 'miles')",
    "INSERT INTO FillUp VALUES (10, 1, 1, '2021-02-20', 4.0, 0, 90.0, 97360.0, 15.2, 'miles')",
    "INSERT INTO Repair VALUES (5, 1, 2, '2021-04-10', 97900.0, 420.0, 'Front brake pads', 'miles')",
];

/// Open an empty in-memory store with the schema applied.
#[allow(dead_code)]
pub async fn empty_store() -> SqliteRecordStore {
    let store = sqlite::connect("sqlite::memory:", Duration::from_secs(5))
        .await
        .expect("in-memory SQLite should open");

    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(store.pool())
            .await
            .expect("schema should apply");
    }

    store
}

/// Run raw statements against the store.
#[allow(dead_code)]
pub async fn run(store: &SqliteRecordStore, statements: &[&str]) {
    for statement in statements {
        sqlx::query(statement)
            .execute(store.pool())
            .await
            .expect("seed statement should apply");
    }
}

/// Store seeded with [`GARAGE`].
#[allow(dead_code)]
pub async fn garage_store() -> SqliteRecordStore {
    let store = empty_store().await;
    run(&store, GARAGE).await;
    store
}

/// Identity provider stub that counts outbound calls.
pub struct StubProvider {
    identity_body: String,
    fail_exchange: bool,
    pub exchange_calls: AtomicUsize,
    pub identity_calls: AtomicUsize,
}

#[allow(dead_code)]
impl StubProvider {
    /// Provider answering with the given userinfo JSON.
    pub fn returning(identity_body: &str) -> Arc<Self> {
        Arc::new(Self {
            identity_body: identity_body.to_string(),
            fail_exchange: false,
            exchange_calls: AtomicUsize::new(0),
            identity_calls: AtomicUsize::new(0),
        })
    }

    /// Provider whose token endpoint rejects every code.
    pub fn rejecting_codes() -> Arc<Self> {
        Arc::new(Self {
            identity_body: String::new(),
            fail_exchange: true,
            exchange_calls: AtomicUsize::new(0),
            identity_calls: AtomicUsize::new(0),
        })
    }

    pub fn verified(email: &str, name: &str) -> Arc<Self> {
        Self::returning(&format!(
            r#"{{"email":"{email}","verified_email":true,"name":"{name}"}}"#
        ))
    }

    pub fn network_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst) + self.identity_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for StubProvider {
    fn authorization_url(&self, state: &str) -> String {
        format!(
            "https://provider.test/auth?client_id=test_client_id&state={}",
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<String, AuthError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_exchange {
            return Err(AuthError::ExchangeFailed("HTTP 400 Bad Request".to_string()));
        }
        Ok(format!("access-for-{code}"))
    }

    async fn fetch_identity(&self, _access_token: &str) -> Result<ProviderIdentity, AuthError> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        serde_json::from_str(&self.identity_body)
            .map_err(|e| AuthError::IdentityFetchFailed(e.to_string()))
    }
}

/// Broker over `provider` using the test configuration.
#[allow(dead_code)]
pub fn test_broker(provider: Arc<StubProvider>) -> IdentityBroker {
    IdentityBroker::new(provider, &Config::test_default())
}

/// Pull the `state` query parameter out of an authorization URL.
#[allow(dead_code)]
pub fn state_from_url(url: &str) -> String {
    let raw = url
        .split(['?', '&'])
        .find_map(|pair| pair.strip_prefix("state="))
        .expect("authorization URL should carry state");
    urlencoding::decode(raw)
        .expect("state should be valid percent-encoding")
        .into_owned()
}

/// Create a test app over `store` and `provider`.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(
    store: SqliteRecordStore,
    provider: Arc<StubProvider>,
) -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(store, provider, Config::test_default())
}

/// Like [`create_test_app`], with a caller-adjusted configuration.
#[allow(dead_code)]
pub fn create_test_app_with_config(
    store: SqliteRecordStore,
    provider: Arc<StubProvider>,
    config: Config,
) -> (axum::Router, Arc<AppState>) {
    let identity_broker = IdentityBroker::new(provider, &config);

    let state = Arc::new(AppState {
        config,
        db: Arc::new(store),
        identity_broker,
    });

    (create_router(state.clone()), state)
}
