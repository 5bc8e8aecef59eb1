use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use finboard_core::Transaction;
use finboard_storage::{query_transactions, TransactionFilter};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, state::AppState};

/// Raw query string. Blank values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TransactionItem {
    pub id: i64,
    pub transaction_date: NaiveDate,
    pub description: String,
    pub merchant: String,
    pub amount: f64,
    pub category: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionItem {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            transaction_date: t.transaction_date,
            description: t.description,
            merchant: t.merchant,
            amount: t.amount.to_f64(),
            category: t.category,
            source: t.source,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionList {
    pub count: usize,
    pub transactions: Vec<TransactionItem>,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_date(name: &str, value: Option<String>) -> Result<Option<NaiveDate>, ApiError> {
    present(value)
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                .map_err(|_| ApiError::BadRequest(format!("Invalid {name}: '{v}'")))
        })
        .transpose()
}

impl TransactionQuery {
    pub fn into_filter(self, default_limit: i64) -> Result<TransactionFilter, ApiError> {
        let limit = present(self.limit)
            .map(|v| {
                v.parse::<i64>()
                    .map_err(|_| ApiError::BadRequest(format!("Invalid limit: '{v}'")))
            })
            .transpose()?
            .unwrap_or(default_limit);

        Ok(TransactionFilter {
            start_date: parse_date("start_date", self.start_date)?,
            end_date: parse_date("end_date", self.end_date)?,
            category: present(self.category),
            source: present(self.source),
            limit: Some(limit),
        })
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<TransactionList>, ApiError> {
    let filter = query.into_filter(state.config.default_limit)?;
    let transactions: Vec<TransactionItem> = query_transactions(&state.pool, &filter)
        .await?
        .into_iter()
        .map(TransactionItem::from)
        .collect();

    Ok(Json(TransactionList {
        count: transactions.len(),
        transactions,
    }))
}
