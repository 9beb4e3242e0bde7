//! SQLite backend, used for local development and tests.

use super::RepositoryError;
use sqlx::sqlite::SqlitePoolOptions;
use std::time::Duration;
use tracing::info;

sql_record_store!(
    /// Record store over a SQLite connection pool.
    SqliteRecordStore,
    sqlx::SqlitePool
);

/// Open a SQLite pool.
///
/// In-memory databases exist per connection, so `sqlite::memory:` gets a
/// single connection that is never recycled.
pub async fn connect(url: &str, query_timeout: Duration) -> Result<SqliteRecordStore, RepositoryError> {
    let in_memory = url.contains(":memory:");
    let options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(4)
    };

    let pool = options.acquire_timeout(query_timeout).connect(url).await?;

    info!(in_memory, "Connected to SQLite");
    Ok(SqliteRecordStore::new(pool, query_timeout))
}
