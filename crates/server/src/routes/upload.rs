use anyhow::Context;
use axum::{
    extract::{Multipart, State},
    Json,
};
use chrono::Local;
use serde::Serialize;
use uuid::Uuid;

use crate::{error::ApiError, ingest, state::AppState};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
}

pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut source_type = None;
    let mut file_data = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("source_type") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                source_type = Some(text.trim().to_string());
            }
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                file_data = Some(bytes);
            }
            _ => continue,
        }
    }

    let data = file_data.ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;
    let source = source_type
        .filter(|s| state.loader.supports(s))
        .ok_or_else(|| ApiError::BadRequest("Invalid or missing source_type".to_string()))?;

    let uploads_dir = &state.config.uploads_dir;
    tokio::fs::create_dir_all(uploads_dir)
        .await
        .with_context(|| format!("creating {}", uploads_dir.display()))?;

    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = uploads_dir.join(format!("{source}_{stamp}_{}.csv", Uuid::new_v4().simple()));
    tokio::fs::write(&path, &data)
        .await
        .with_context(|| format!("saving upload to {}", path.display()))?;
    tracing::info!(source = %source, path = %path.display(), bytes = data.len(), "saved upload");

    let count = ingest::import_file(&state.pool, state.loader.clone(), &path, &source).await?;

    Ok(Json(UploadResponse {
        success: true,
        message: format!("Imported {count} transactions from {source}."),
        count,
    }))
}
