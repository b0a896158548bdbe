use anyhow::Result;
use libsql::{Builder, Connection};
use std::future::Future;
use std::pin::Pin;
use std::{path::Path, sync::Arc};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};
use tokio::sync::RwLock;

use crate::constants::DATABASE_FILE_NAME;

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    username  TEXT    NOT NULL,
    email     TEXT    UNIQUE NOT NULL
);
"#;

const CREATE_EXPENSES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS expenses (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id       INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title         TEXT    NOT NULL,
    amount_cents  INTEGER NOT NULL,
    date          TEXT    NOT NULL,
    category      INTEGER NOT NULL DEFAULT 0 CHECK (category BETWEEN 0 AND 3)
);
"#;

const CREATE_EXPENSES_DATE_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);
"#;

const CREATE_EXPENSES_USER_DATE_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_expenses_user_date ON expenses(user_id, date);
"#;

/// Storage format for `expenses.date`. Fixed width, so text order is time order.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z"
);

/// Calendar date format used in URLs and for range bounds
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

pub type Db = Arc<RwLock<Connection>>;

/// Open (or create) the service database inside `data_dir`
pub async fn init_db(data_dir: &str) -> Result<Db> {
    tokio::fs::create_dir_all(data_dir).await?;
    let path = Path::new(data_dir).join(DATABASE_FILE_NAME);
    tracing::info!(path = %path.display(), "opening database");
    let db = Builder::new_local(path).build().await?;
    let conn = db.connect()?;

    // Cascade deletes depend on this, and it is a per-connection setting.
    conn.execute("PRAGMA foreign_keys = ON", ()).await?;

    conn.execute(CREATE_USERS_TABLE, ()).await?;
    conn.execute(CREATE_EXPENSES_TABLE, ()).await?;
    conn.execute(CREATE_EXPENSES_DATE_INDEX, ()).await?;
    conn.execute(CREATE_EXPENSES_USER_DATE_INDEX, ()).await?;

    Ok(Arc::new(RwLock::new(conn)))
}

/// Current UTC time truncated to the stored precision
pub fn now_timestamp() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(now.nanosecond() / 1_000 * 1_000)
        .unwrap_or(now)
}

pub fn format_timestamp(value: OffsetDateTime) -> Result<String, time::error::Format> {
    value.to_offset(UtcOffset::UTC).format(TIMESTAMP_FORMAT)
}

pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, time::error::Parse> {
    Ok(PrimitiveDateTime::parse(value, TIMESTAMP_FORMAT)?.assume_utc())
}

pub fn format_date(value: Date) -> Result<String, time::error::Format> {
    value.format(DATE_FORMAT)
}

/// Execute a function within a database transaction, returning handler-compatible errors
///
/// The closure must return a boxed future to handle lifetime issues with async closures.
/// Any error from the closure rolls the transaction back.
pub async fn with_transaction<F, T, E>(db_conn: &Db, f: F) -> Result<T, E>
where
    F: for<'a> FnOnce(&'a Connection) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>,
    E: From<TransactionError>,
{
    let conn = db_conn.write().await;

    conn.execute("BEGIN TRANSACTION", ())
        .await
        .map_err(TransactionError::Begin)?;

    match f(&*conn).await {
        Ok(result) => {
            conn.execute("COMMIT", ())
                .await
                .map_err(TransactionError::Commit)?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_err) = conn.execute("ROLLBACK", ()).await {
                tracing::error!("failed to roll back transaction: {}", rollback_err);
            }
            Err(e)
        }
    }
}

/// Errors that can occur during transaction management
#[derive(Debug)]
pub enum TransactionError {
    Begin(libsql::Error),
    Commit(libsql::Error),
}

impl std::fmt::Display for TransactionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionError::Begin(e) => write!(f, "failed to begin transaction: {}", e),
            TransactionError::Commit(e) => write!(f, "failed to commit transaction: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn timestamps_keep_microseconds() {
        let value = datetime!(2024-01-15 10:30:00.123456 UTC);
        let stored = format_timestamp(value).unwrap();
        assert_eq!(stored, "2024-01-15T10:30:00.123456Z");
        assert_eq!(parse_timestamp(&stored).unwrap(), value);
    }

    #[test]
    fn timestamps_are_normalized_to_utc() {
        let value = datetime!(2024-01-01 01:00:00 +02:00);
        assert_eq!(
            format_timestamp(value).unwrap(),
            "2023-12-31T23:00:00.000000Z"
        );
    }

    #[test]
    fn stored_timestamps_sort_after_their_date() {
        let day = format_date(date!(2024 - 01 - 31)).unwrap();
        let next_day = format_date(date!(2024 - 02 - 01)).unwrap();
        let late = format_timestamp(datetime!(2024-01-31 23:59:59.999999 UTC)).unwrap();
        assert!(day.as_str() <= late.as_str());
        assert!(late.as_str() < next_day.as_str());
    }
}
