pub mod db;

pub use db::{
    close, count_transactions, create_db, insert_batch, query_transactions, summary,
    BatchReceipt, DbPool, StorageError, TransactionFilter, DEFAULT_LIMIT,
};
