use chrono::NaiveDate;
use finboard_core::{Money, RawRecord};
use std::path::Path;

use crate::csv::{CsvColumnMapping, CsvImportProfile, SignConvention};
use crate::error::ImportError;

pub const APPLE_CARD: &str = "apple_card";
pub const BOA_CREDIT: &str = "boa_credit";

/// One source row after column mapping, date parsing and sign correction.
/// Carries no category yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub transaction_date: NaiveDate,
    pub description: String,
    pub merchant: String,
    /// Negative = money leaving the account.
    pub amount: Money,
    pub source: String,
    pub raw_data: RawRecord,
}

/// Reads one institution's export format.
///
/// Implementations open the file, read every row, and close it before
/// returning. A row that cannot be normalized fails the whole file.
pub trait SourceAdapter: Send + Sync {
    fn source_id(&self) -> &str;

    fn parse(&self, path: &Path) -> Result<Vec<NormalizedRow>, ImportError>;
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Apple Card export: charges positive, payments negative.
///
/// Newer exports carry a `Merchant` column; older ones and hand-trimmed files
/// don't, in which case merchant is the description. Apple's own `Category`
/// column is ignored.
pub fn apple_card_profile() -> CsvImportProfile {
    CsvImportProfile {
        source: APPLE_CARD.to_string(),
        name: "Apple Card".to_string(),
        delimiter: ",".to_string(),
        mapping: CsvColumnMapping {
            date_columns: columns(&["Transaction Date"]),
            description_columns: columns(&["Description"]),
            merchant_columns: columns(&["Merchant"]),
            amount_columns: columns(&["Amount (USD)", "Amount"]),
            sign: SignConvention::ChargesPositive,
            date_format: Some("%m/%d/%Y".to_string()),
        },
    }
}

/// Bank of America credit card export: charges already negative, no merchant column.
pub fn boa_credit_profile() -> CsvImportProfile {
    CsvImportProfile {
        source: BOA_CREDIT.to_string(),
        name: "Bank of America Credit".to_string(),
        delimiter: ",".to_string(),
        mapping: CsvColumnMapping {
            date_columns: columns(&["Posted Date"]),
            description_columns: columns(&["Payee"]),
            merchant_columns: Vec::new(),
            amount_columns: columns(&["Amount"]),
            sign: SignConvention::ChargesNegative,
            date_format: Some("%m/%d/%Y".to_string()),
        },
    }
}
