//! SQLite store bootstrap.
//!
//! Opens the connection pool and creates the schema. Every invariant that
//! must hold across concurrent requests (attendance alternation, single
//! signing, receipt immutability) is enforced by statements or triggers in
//! this schema, not by in-process locks.

mod schema;

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::info;

use crate::error::EngineResult;

pub use schema::init_schema;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a pool for `database_url` and makes sure the schema exists.
///
/// # Example
///
/// ```no_run
/// # async fn run() -> chango_payroll::error::EngineResult<()> {
/// let pool = chango_payroll::store::open_pool("sqlite://chango.db", 8).await?;
/// # Ok(())
/// # }
/// ```
pub async fn open_pool(database_url: &str, max_connections: u32) -> EngineResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    info!(database_url, max_connections, "Opened database");
    init_schema(&pool).await?;
    Ok(pool)
}

/// Opens a private in-memory database with the schema applied.
///
/// The pool holds a single connection that is never recycled, so the
/// database lives as long as the pool.
pub async fn open_in_memory() -> EngineResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// Opens a file-backed pool with `max_connections` connections in a fresh
/// temporary directory. The database is removed when the directory drops.
#[cfg(test)]
pub(crate) async fn open_temp_file(
    max_connections: u32,
) -> EngineResult<(tempfile::TempDir, SqlitePool)> {
    let dir = tempfile::TempDir::new().map_err(sqlx::Error::Io)?;
    let url = format!("sqlite://{}", dir.path().join("chango.db").display());
    let pool = open_pool(&url, max_connections).await?;
    Ok((dir, pool))
}

/// Parses a decimal stored as TEXT.
pub(crate) fn decode_decimal(column: &str, value: &str) -> Result<Decimal, sqlx::Error> {
    Decimal::from_str(value).map_err(|e| decode_error(column, e.to_string()))
}

/// Builds the error returned when a stored value cannot be mapped back.
pub(crate) fn decode_error(column: &str, message: impl Into<String>) -> sqlx::Error {
    let message: String = message.into();
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: message.into(),
    }
}
