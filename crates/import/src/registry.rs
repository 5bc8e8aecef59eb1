use std::collections::HashMap;

use crate::adapter::{apple_card_profile, boa_credit_profile, SourceAdapter};
use crate::csv::{CsvImportProfile, CsvSourceAdapter};
use crate::error::ImportError;

/// Source id → adapter. New formats are added here, never in the loader.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Box<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in Apple Card and Bank of America adapters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(CsvSourceAdapter::new(apple_card_profile()));
        registry.register(CsvSourceAdapter::new(boa_credit_profile()));
        registry
    }

    /// Registers `adapter` under its source id, returning any adapter it replaced.
    pub fn register<A: SourceAdapter + 'static>(
        &mut self,
        adapter: A,
    ) -> Option<Box<dyn SourceAdapter>> {
        self.adapters
            .insert(adapter.source_id().to_string(), Box::new(adapter))
    }

    pub fn register_profile(&mut self, profile: CsvImportProfile) -> Result<(), ImportError> {
        profile.validate()?;
        self.register(CsvSourceAdapter::new(profile));
        Ok(())
    }

    pub fn get(&self, source: &str) -> Result<&dyn SourceAdapter, ImportError> {
        self.adapters
            .get(source)
            .map(|a| &**a)
            .ok_or_else(|| ImportError::UnsupportedSource(source.to_string()))
    }

    pub fn contains(&self, source: &str) -> bool {
        self.adapters.contains_key(source)
    }

    pub fn source_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("sources", &self.source_ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::NormalizedRow;
    use std::path::Path;

    struct Fixed(&'static str);

    impl SourceAdapter for Fixed {
        fn source_id(&self) -> &str {
            self.0
        }

        fn parse(&self, _path: &Path) -> Result<Vec<NormalizedRow>, ImportError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn defaults_are_registered() {
        let registry = AdapterRegistry::with_defaults();
        assert_eq!(registry.source_ids(), vec!["apple_card", "boa_credit"]);
        assert_eq!(registry.get("apple_card").unwrap().source_id(), "apple_card");
    }

    #[test]
    fn unknown_source_is_unsupported() {
        let registry = AdapterRegistry::with_defaults();
        let err = registry.get("chase_debit").err().unwrap();
        assert!(matches!(err, ImportError::UnsupportedSource(ref s) if s == "chase_debit"));
        assert!(!registry.contains("chase_debit"));
    }

    #[test]
    fn register_replaces_existing() {
        let mut registry = AdapterRegistry::new();
        assert!(registry.register(Fixed("x")).is_none());
        assert!(registry.register(Fixed("x")).is_some());
        assert_eq!(registry.source_ids(), vec!["x"]);
    }

    #[test]
    fn register_profile_validates() {
        let mut registry = AdapterRegistry::new();
        let mut profile = crate::adapter::boa_credit_profile();
        profile.source = "boa_checking".to_string();
        registry.register_profile(profile.clone()).unwrap();
        assert!(registry.contains("boa_checking"));

        profile.mapping.date_columns.clear();
        assert!(registry.register_profile(profile).is_err());
    }
}
