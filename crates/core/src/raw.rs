use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Verbatim snapshot of one source row: original column name → original cell text.
///
/// Captured before any column is renamed or dropped, and stored alongside the
/// canonical record for audit and reprocessing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(BTreeMap<String, String>);

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from parallel header/value sequences.
    ///
    /// A repeated header keeps every value: the second `Amount` is stored as
    /// `Amount.1`, the third as `Amount.2`, and so on.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut record = Self::new();
        for (k, v) in pairs {
            record.push(k.into(), v.into());
        }
        record
    }

    fn push(&mut self, column: String, value: String) {
        if !self.0.contains_key(&column) {
            self.0.insert(column, value);
            return;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{column}.{n}");
            if !self.0.contains_key(&candidate) {
                self.0.insert(candidate, value);
                return;
            }
            n += 1;
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(RawRecord)
    }
}
