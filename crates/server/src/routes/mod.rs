use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::state::AppState;

pub mod summary;
pub mod transactions;
pub mod upload;

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Finance Dashboard API is running"
    }))
}

#[derive(Debug, Serialize)]
pub struct SourceList {
    pub sources: Vec<String>,
}

pub async fn sources(State(state): State<AppState>) -> Json<SourceList> {
    let sources = state
        .loader
        .registry()
        .source_ids()
        .into_iter()
        .map(str::to_string)
        .collect();
    Json(SourceList { sources })
}
