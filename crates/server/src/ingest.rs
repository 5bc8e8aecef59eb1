use std::path::Path;
use std::sync::Arc;

use finboard_import::{ImportError, Loader};
use finboard_storage::{insert_batch, DbPool, StorageError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Import task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Parses `path` as `source` off the async runtime, then stores the batch in
/// one transaction. Returns the number of records inserted.
pub async fn import_file(
    pool: &DbPool,
    loader: Arc<Loader>,
    path: &Path,
    source: &str,
) -> Result<usize, IngestError> {
    let owned_path = path.to_path_buf();
    let owned_source = source.to_string();
    let batch =
        tokio::task::spawn_blocking(move || loader.load(&owned_path, &owned_source)).await??;

    let receipt = insert_batch(pool, &batch).await?;
    tracing::info!(
        source = %batch.source,
        file = %batch.file_name,
        sha256 = %batch.file_sha256,
        batch_id = receipt.batch_id,
        count = receipt.inserted,
        "imported file"
    );
    Ok(receipt.inserted)
}
