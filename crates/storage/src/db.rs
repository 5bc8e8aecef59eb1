use chrono::{NaiveDate, NaiveDateTime};
use finboard_core::{
    CategoryTotal, ImportBatch, Money, MonthlyTotal, RawRecord, Summary, Transaction,
};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, QueryBuilder, Sqlite};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub type DbPool = Pool<Sqlite>;

pub const DEFAULT_LIMIT: i64 = 100;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Amount out of range: {0}")]
    AmountOutOfRange(Money),
    #[error("Invalid raw data: {0}")]
    RawData(#[from] serde_json::Error),
}

/// Opens (creating if needed) the database at `path` and brings the schema up
/// to date. The returned pool is the only handle storage functions use.
pub async fn create_db(path: &Path) -> Result<DbPool, StorageError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_millis(5000))
        .pragma("cache_size", "-32000");

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

pub async fn close(pool: DbPool) {
    pool.close().await;
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS import_batches (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source TEXT NOT NULL,
            file_name TEXT NOT NULL,
            file_sha256 TEXT NOT NULL,
            row_count INTEGER NOT NULL,
            imported_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            batch_id INTEGER NOT NULL,
            transaction_date TEXT NOT NULL,
            description TEXT NOT NULL,
            merchant TEXT NOT NULL,
            amount_cents INTEGER NOT NULL,
            category TEXT NOT NULL,
            source TEXT NOT NULL,
            raw_data TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY (batch_id) REFERENCES import_batches(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    for index in [
        "CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(transaction_date)",
        "CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category)",
        "CREATE INDEX IF NOT EXISTS idx_transactions_source ON transactions(source)",
    ] {
        sqlx::query(index).execute(pool).await?;
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchReceipt {
    pub batch_id: i64,
    pub inserted: usize,
}

/// Stores every record of `batch` in one database transaction. Either all rows
/// become visible or none do.
pub async fn insert_batch(pool: &DbPool, batch: &ImportBatch) -> Result<BatchReceipt, StorageError> {
    let rows = batch
        .transactions
        .iter()
        .map(|t| {
            let cents = t
                .amount
                .bounded_cents()
                .ok_or(StorageError::AmountOutOfRange(t.amount))?;
            Ok((t, cents, t.raw_data.to_json()?))
        })
        .collect::<Result<Vec<_>, StorageError>>()?;

    let mut tx = pool.begin().await?;

    let batch_id: i64 = sqlx::query_scalar(
        "INSERT INTO import_batches (source, file_name, file_sha256, row_count) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(&batch.source)
    .bind(&batch.file_name)
    .bind(&batch.file_sha256)
    .bind(batch.len() as i64)
    .fetch_one(&mut *tx)
    .await?;

    for (t, cents, raw_json) in &rows {
        sqlx::query(
            "INSERT INTO transactions (batch_id, transaction_date, description, merchant, amount_cents, category, source, raw_data) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(batch_id)
        .bind(t.transaction_date)
        .bind(&t.description)
        .bind(&t.merchant)
        .bind(cents)
        .bind(&t.category)
        .bind(&t.source)
        .bind(raw_json)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(BatchReceipt {
        batch_id,
        inserted: rows.len(),
    })
}

/// Optional narrowing for [`query_transactions`]. Date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub limit: Option<i64>,
}

type TransactionRow = (
    i64,
    i64,
    NaiveDate,
    String,
    String,
    i64,
    String,
    String,
    String,
    NaiveDateTime,
);

fn into_transaction(r: TransactionRow) -> Result<Transaction, StorageError> {
    Ok(Transaction {
        id: r.0,
        batch_id: r.1,
        transaction_date: r.2,
        description: r.3,
        merchant: r.4,
        amount: Money::from_cents(r.5),
        category: r.6,
        source: r.7,
        raw_data: RawRecord::from_json(&r.8)?,
        created_at: r.9.and_utc(),
    })
}

/// Newest first, capped at `filter.limit` (default [`DEFAULT_LIMIT`]).
pub async fn query_transactions(
    pool: &DbPool,
    filter: &TransactionFilter,
) -> Result<Vec<Transaction>, StorageError> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT id, batch_id, transaction_date, description, merchant, amount_cents, category, source, raw_data, created_at FROM transactions WHERE 1 = 1",
    );

    if let Some(start) = filter.start_date {
        qb.push(" AND transaction_date >= ").push_bind(start);
    }
    if let Some(end) = filter.end_date {
        qb.push(" AND transaction_date <= ").push_bind(end);
    }
    if let Some(category) = &filter.category {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(source) = &filter.source {
        qb.push(" AND source = ").push_bind(source.clone());
    }

    let limit = filter.limit.unwrap_or(DEFAULT_LIMIT).max(0);
    qb.push(" ORDER BY transaction_date DESC, id DESC LIMIT ")
        .push_bind(limit);

    let rows = qb
        .build_query_as::<TransactionRow>()
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(into_transaction).collect()
}

pub async fn count_transactions(pool: &DbPool) -> Result<i64, StorageError> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Totals, per-category spending and per-month spending over all records.
pub async fn summary(pool: &DbPool) -> Result<Summary, StorageError> {
    let (outflow_cents, inflow_cents) = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN amount_cents < 0 THEN amount_cents END), 0),
            COALESCE(SUM(CASE WHEN amount_cents > 0 THEN amount_cents END), 0)
        FROM transactions
        "#,
    )
    .fetch_one(pool)
    .await?;

    let category_breakdown = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT category, SUM(amount_cents) AS total
        FROM transactions
        GROUP BY category
        HAVING total < 0
        ORDER BY total ASC, category ASC
        "#,
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|(category, total)| CategoryTotal {
        category,
        amount: Money::from_cents(total).abs(),
    })
    .collect();

    let monthly_spending = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT strftime('%Y-%m', transaction_date) AS month, SUM(amount_cents) AS total
        FROM transactions
        WHERE amount_cents < 0
        GROUP BY month
        ORDER BY month ASC
        "#,
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|(month, total)| MonthlyTotal {
        month,
        amount: Money::from_cents(total).abs(),
    })
    .collect();

    Ok(Summary::from_signed_totals(
        Money::from_cents(outflow_cents),
        Money::from_cents(inflow_cents),
        category_breakdown,
        monthly_spending,
    ))
}
