// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (relational store).
//!
//! Read-only access to the `Car`, `FillUp`, `Repair` and `ServiceStation`
//! tables. Every backend runs the same SQL from [`queries`] and decodes rows
//! into the models through `sqlx::FromRow`, so nullable columns come back as
//! `Option<T>` rather than zero values.

use crate::models::{FuelPurchase, Repair, ServiceStation, Vehicle};
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::TryStreamExt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Lazy, finite, single-pass sequence of decoded records.
pub type RecordStream<'a, T> = BoxStream<'a, Result<T, RepositoryError>>;

/// Data-path errors. "No rows" and "query broke" are always distinct.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    #[error("query failed: {0}")]
    Query(String),

    #[error("row decode failed: {0}")]
    Decode(String),

    #[error("query timed out")]
    Timeout,
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::TypeNotFound { .. }
            | sqlx::Error::Decode(_) => RepositoryError::Decode(err.to_string()),
            sqlx::Error::PoolTimedOut => RepositoryError::Timeout,
            _ => RepositoryError::Query(err.to_string()),
        }
    }
}

/// Read access to vehicle records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Look up one vehicle by primary key.
    async fn get_vehicle(&self, id: i32) -> Result<Vehicle, RepositoryError>;

    /// All vehicles, in the store's natural row order.
    fn list_vehicles(&self) -> RecordStream<'_, Vehicle>;

    /// License plates only.
    fn list_license_plates(&self) -> RecordStream<'_, String>;

    /// Fuel purchases for one vehicle, oldest first.
    fn list_fill_ups(&self, vehicle_id: i32) -> RecordStream<'_, FuelPurchase>;

    /// Repairs for one vehicle, oldest first.
    fn list_repairs(&self, vehicle_id: i32) -> RecordStream<'_, Repair>;

    fn list_stations(&self) -> RecordStream<'_, ServiceStation>;

    async fn get_station(&self, id: i32) -> Result<ServiceStation, RepositoryError>;

    /// Bound applied to each query issued through this store.
    fn query_timeout(&self) -> Duration;
}

/// Run a single query under `limit`.
pub(crate) async fn bounded<T, F>(limit: Duration, query: F) -> Result<T, RepositoryError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    tokio::time::timeout(limit, query)
        .await
        .map_err(|_| RepositoryError::Timeout)?
        .map_err(RepositoryError::from)
}

/// Drain a record stream under `limit`.
///
/// The first failing row aborts the whole collection.
pub async fn collect_bounded<T>(
    stream: RecordStream<'_, T>,
    limit: Duration,
) -> Result<Vec<T>, RepositoryError> {
    tokio::time::timeout(limit, stream.try_collect::<Vec<T>>())
        .await
        .map_err(|_| RepositoryError::Timeout)?
}

/// Implements [`RecordStore`] for a `sqlx` pool type. The SQL is identical
/// across backends; only the pool differs.
macro_rules! sql_record_store {
    ($(#[$meta:meta])* $name:ident, $pool:ty) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            pool: $pool,
            query_timeout: std::time::Duration,
        }

        impl $name {
            pub fn new(pool: $pool, query_timeout: std::time::Duration) -> Self {
                Self {
                    pool,
                    query_timeout,
                }
            }

            pub fn pool(&self) -> &$pool {
                &self.pool
            }
        }

        #[async_trait::async_trait]
        impl $crate::db::RecordStore for $name {
            async fn ping(&self) -> Result<(), $crate::db::RepositoryError> {
                $crate::db::bounded(
                    self.query_timeout,
                    sqlx::query($crate::db::queries::PING).execute(&self.pool),
                )
                .await?;
                Ok(())
            }

            async fn get_vehicle(
                &self,
                id: i32,
            ) -> Result<$crate::models::Vehicle, $crate::db::RepositoryError> {
                $crate::db::bounded(
                    self.query_timeout,
                    sqlx::query_as::<_, $crate::models::Vehicle>(
                        $crate::db::queries::SELECT_VEHICLE,
                    )
                    .bind(id)
                    .fetch_optional(&self.pool),
                )
                .await?
                .ok_or($crate::db::RepositoryError::NotFound)
            }

            fn list_vehicles(&self) -> $crate::db::RecordStream<'_, $crate::models::Vehicle> {
                use futures_util::StreamExt;
                sqlx::query_as::<_, $crate::models::Vehicle>($crate::db::queries::SELECT_VEHICLES)
                    .fetch(&self.pool)
                    .map(|row| row.map_err($crate::db::RepositoryError::from))
                    .boxed()
            }

            fn list_license_plates(&self) -> $crate::db::RecordStream<'_, String> {
                use futures_util::StreamExt;
                sqlx::query_scalar::<_, String>($crate::db::queries::SELECT_LICENSE_PLATES)
                    .fetch(&self.pool)
                    .map(|row| row.map_err($crate::db::RepositoryError::from))
                    .boxed()
            }

            fn list_fill_ups(
                &self,
                vehicle_id: i32,
            ) -> $crate::db::RecordStream<'_, $crate::models::FuelPurchase> {
                use futures_util::StreamExt;
                sqlx::query_as::<_, $crate::models::FuelPurchase>(
                    $crate::db::queries::SELECT_FILL_UPS,
                )
                .bind(vehicle_id)
                .fetch(&self.pool)
                .map(|row| row.map_err($crate::db::RepositoryError::from))
                .boxed()
            }

            fn list_repairs(
                &self,
                vehicle_id: i32,
            ) -> $crate::db::RecordStream<'_, $crate::models::Repair> {
                use futures_util::StreamExt;
                sqlx::query_as::<_, $crate::models::Repair>($crate::db::queries::SELECT_REPAIRS)
                    .bind(vehicle_id)
                    .fetch(&self.pool)
                    .map(|row| row.map_err($crate::db::RepositoryError::from))
                    .boxed()
            }

            fn list_stations(
                &self,
            ) -> $crate::db::RecordStream<'_, $crate::models::ServiceStation> {
                use futures_util::StreamExt;
                sqlx::query_as::<_, $crate::models::ServiceStation>(
                    $crate::db::queries::SELECT_STATIONS,
                )
                .fetch(&self.pool)
                .map(|row| row.map_err($crate::db::RepositoryError::from))
                .boxed()
            }

            async fn get_station(
                &self,
                id: i32,
            ) -> Result<$crate::models::ServiceStation, $crate::db::RepositoryError> {
                $crate::db::bounded(
                    self.query_timeout,
                    sqlx::query_as::<_, $crate::models::ServiceStation>(
                        $crate::db::queries::SELECT_STATION,
                    )
                    .bind(id)
                    .fetch_optional(&self.pool),
                )
                .await?
                .ok_or($crate::db::RepositoryError::NotFound)
            }

            fn query_timeout(&self) -> std::time::Duration {
                self.query_timeout
            }
        }
    };
}

pub mod mysql;
pub mod queries;
pub mod sqlite;

pub use mysql::MySqlRecordStore;
pub use sqlite::SqliteRecordStore;

/// Connect to the store named by `url` and check it is reachable.
///
/// `mysql://` selects MySQL, `sqlite:` selects SQLite.
pub async fn connect(
    url: &str,
    query_timeout: Duration,
) -> Result<Arc<dyn RecordStore>, RepositoryError> {
    let store: Arc<dyn RecordStore> = if url.starts_with("mysql:") {
        Arc::new(mysql::connect(url, query_timeout).await?)
    } else if url.starts_with("sqlite:") {
        Arc::new(sqlite::connect(url, query_timeout).await?)
    } else {
        return Err(RepositoryError::Query(
            "unsupported database URL scheme (expected mysql: or sqlite:)".to_string(),
        ));
    };

    store.ping().await?;
    Ok(store)
}
