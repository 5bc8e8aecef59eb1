//! CSV normalization and categorization pipeline.
//!
//! A [`SourceAdapter`] reads one institution's export into [`NormalizedRow`]s,
//! the [`Categorizer`] labels each row, and the [`Loader`] ties the two together
//! into an [`finboard_core::ImportBatch`] ready for storage.

pub mod adapter;
pub mod csv;
pub mod error;
pub mod hash;
pub mod loader;
pub mod registry;
pub mod rules;

pub use adapter::{NormalizedRow, SourceAdapter, APPLE_CARD, BOA_CREDIT};
pub use self::csv::{CsvColumnMapping, CsvImportProfile, CsvSourceAdapter, SignConvention};
pub use error::ImportError;
pub use loader::Loader;
pub use registry::AdapterRegistry;
pub use rules::{categorize, CategoryRule, Categorizer, RulesError, DEFAULT_CATEGORY_RULES};

pub mod import {
    use crate::*;

    /// Built-in adapters plus `profiles`, categorized with `categorizer`.
    pub fn create_loader(
        profiles: impl IntoIterator<Item = CsvImportProfile>,
        categorizer: Categorizer,
    ) -> Result<Loader, ImportError> {
        let mut registry = AdapterRegistry::with_defaults();
        for profile in profiles {
            registry.register_profile(profile)?;
        }
        Ok(Loader::new(registry, categorizer))
    }
}
