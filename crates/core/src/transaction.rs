use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::money::Money;
use super::raw::RawRecord;

/// A canonical transaction that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub transaction_date: NaiveDate,
    pub description: String,
    pub merchant: String,
    pub amount: Money,
    pub category: String,
    pub source: String,
    pub raw_data: RawRecord,
}

impl NewTransaction {
    pub fn is_spending(&self) -> bool {
        self.amount.is_outflow()
    }

    pub fn is_income(&self) -> bool {
        self.amount.is_inflow()
    }
}

/// A stored transaction. Records are never modified after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub batch_id: i64,
    pub transaction_date: NaiveDate,
    pub description: String,
    pub merchant: String,
    pub amount: Money,
    pub category: String,
    pub source: String,
    pub raw_data: RawRecord,
    pub created_at: DateTime<Utc>,
}

/// All records produced from a single source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportBatch {
    pub source: String,
    pub file_name: String,
    /// Hex SHA-256 of the file bytes.
    pub file_sha256: String,
    pub transactions: Vec<NewTransaction>,
}

impl ImportBatch {
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn total(&self) -> Money {
        self.transactions.iter().map(|t| t.amount).sum()
    }
}
