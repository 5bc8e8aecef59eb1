use finboard_core::{ImportBatch, NewTransaction};
use std::path::Path;

use crate::adapter::NormalizedRow;
use crate::error::ImportError;
use crate::hash;
use crate::registry::AdapterRegistry;
use crate::rules::Categorizer;

/// Turns one source file into a batch of categorized canonical records.
///
/// Holds no per-import state, so a single `Loader` can serve concurrent imports.
#[derive(Debug)]
pub struct Loader {
    registry: AdapterRegistry,
    categorizer: Categorizer,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(AdapterRegistry::with_defaults(), Categorizer::default())
    }
}

impl Loader {
    pub fn new(registry: AdapterRegistry, categorizer: Categorizer) -> Self {
        Self { registry, categorizer }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn categorizer(&self) -> &Categorizer {
        &self.categorizer
    }

    pub fn supports(&self, source: &str) -> bool {
        self.registry.contains(source)
    }

    /// Parses `path` with the adapter registered for `source` and categorizes
    /// every row. The source is checked before the file is touched.
    pub fn load(&self, path: &Path, source: &str) -> Result<ImportBatch, ImportError> {
        let adapter = self.registry.get(source)?;
        let rows = adapter.parse(path)?;

        let transactions = rows.into_iter().map(|row| self.finish(row)).collect();
        let file_sha256 = hash::to_hex(&hash::sha256_file(path)?);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(ImportBatch {
            source: adapter.source_id().to_string(),
            file_name,
            file_sha256,
            transactions,
        })
    }

    /// Number of records `path` produces, without keeping them.
    pub fn count(&self, path: &Path, source: &str) -> Result<usize, ImportError> {
        self.load(path, source).map(|batch| batch.len())
    }

    fn finish(&self, row: NormalizedRow) -> NewTransaction {
        let category = self
            .categorizer
            .categorize(&row.description, Some(&row.merchant))
            .to_string();
        NewTransaction {
            transaction_date: row.transaction_date,
            description: row.description,
            merchant: row.merchant,
            amount: row.amount,
            category,
            source: row.source,
            raw_data: row.raw_data,
        }
    }
}
