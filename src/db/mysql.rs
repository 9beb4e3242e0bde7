//! MySQL backend (the production store).

use super::RepositoryError;
use sqlx::mysql::MySqlPoolOptions;
use std::time::Duration;
use tracing::info;

const MAX_CONNECTIONS: u32 = 10;

sql_record_store!(
    /// Record store over a MySQL connection pool.
    MySqlRecordStore,
    sqlx::MySqlPool
);

/// Open a MySQL pool. Acquiring a connection shares the query bound.
pub async fn connect(url: &str, query_timeout: Duration) -> Result<MySqlRecordStore, RepositoryError> {
    let pool = MySqlPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(query_timeout)
        .connect(url)
        .await?;

    info!(max_connections = MAX_CONNECTIONS, "Connected to MySQL");
    Ok(MySqlRecordStore::new(pool, query_timeout))
}
