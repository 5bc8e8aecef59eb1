use thiserror::Error;

/// Every way a single file import can fail. Any of these aborts the whole file.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Unsupported source type: {0}")]
    UnsupportedSource(String),
    #[error("Missing required column '{column}' for source '{source_id}'")]
    Format { source_id: String, column: String },
    #[error("Invalid date '{value}' in row {row}")]
    DateParse { value: String, row: usize },
    #[error("Invalid amount '{value}' in row {row}")]
    InvalidAmount { value: String, row: usize },
    #[error("Empty '{column}' in row {row}")]
    EmptyField { column: String, row: usize },
    #[error("Invalid import profile: {0}")]
    InvalidProfile(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ImportError {
    /// True when the file itself is at fault rather than the environment.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            ImportError::Format { .. }
                | ImportError::DateParse { .. }
                | ImportError::InvalidAmount { .. }
                | ImportError::EmptyField { .. }
                | ImportError::Csv(_)
        )
    }
}
