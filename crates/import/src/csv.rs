use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use finboard_core::{Money, RawRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::adapter::{NormalizedRow, SourceAdapter};
use crate::error::ImportError;

/// How a source signs its amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignConvention {
    /// Charges are already negative, payments positive. Kept as-is.
    #[default]
    ChargesNegative,
    /// Charges are positive, payments negative. Negated on import.
    ChargesPositive,
}

impl SignConvention {
    pub fn normalize(self, amount: Money) -> Money {
        match self {
            SignConvention::ChargesNegative => amount,
            SignConvention::ChargesPositive => -amount,
        }
    }
}

/// Header names accepted for each canonical field. The first name present in
/// the file's header row is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvColumnMapping {
    pub date_columns: Vec<String>,
    pub description_columns: Vec<String>,
    /// Empty, or absent from the file, means merchant falls back to description.
    #[serde(default)]
    pub merchant_columns: Vec<String>,
    pub amount_columns: Vec<String>,
    #[serde(default)]
    pub sign: SignConvention,
    /// Tried before the built-in date formats.
    #[serde(default)]
    pub date_format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvImportProfile {
    pub source: String,
    pub name: String,
    pub mapping: CsvColumnMapping,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

fn default_delimiter() -> String {
    ",".to_string()
}

impl CsvImportProfile {
    pub fn validate(&self) -> Result<(), ImportError> {
        if self.source.trim().is_empty() {
            return Err(ImportError::InvalidProfile("source id is empty".to_string()));
        }
        let m = &self.mapping;
        for (field, columns) in [
            ("date", &m.date_columns),
            ("description", &m.description_columns),
            ("amount", &m.amount_columns),
        ] {
            if columns.is_empty() {
                return Err(ImportError::InvalidProfile(format!(
                    "{}: no {field} column configured",
                    self.source
                )));
            }
        }
        if self.delimiter.len() != 1 {
            return Err(ImportError::InvalidProfile(format!(
                "{}: delimiter must be a single byte, got '{}'",
                self.source, self.delimiter
            )));
        }
        Ok(())
    }

    fn delimiter_byte(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b',')
    }
}

/// Header positions resolved once per file.
struct ColumnIndexes {
    date: usize,
    description: usize,
    merchant: Option<usize>,
    amount: usize,
}

impl ColumnIndexes {
    fn resolve(headers: &csv::StringRecord, profile: &CsvImportProfile) -> Result<Self, ImportError> {
        let m = &profile.mapping;
        Ok(ColumnIndexes {
            date: require_column(headers, &m.date_columns, &profile.source)?,
            description: require_column(headers, &m.description_columns, &profile.source)?,
            merchant: find_column(headers, &m.merchant_columns),
            amount: require_column(headers, &m.amount_columns, &profile.source)?,
        })
    }
}

fn find_column(headers: &csv::StringRecord, candidates: &[String]) -> Option<usize> {
    candidates.iter().find_map(|wanted| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').trim() == wanted.as_str())
    })
}

fn require_column(
    headers: &csv::StringRecord,
    candidates: &[String],
    source_id: &str,
) -> Result<usize, ImportError> {
    find_column(headers, candidates).ok_or_else(|| ImportError::Format {
        source_id: source_id.to_string(),
        column: candidates.first().cloned().unwrap_or_default(),
    })
}

/// Adapter for any source whose layout a [`CsvImportProfile`] can describe.
#[derive(Debug, Clone)]
pub struct CsvSourceAdapter {
    profile: CsvImportProfile,
}

impl CsvSourceAdapter {
    pub fn new(profile: CsvImportProfile) -> Self {
        Self { profile }
    }

    pub fn parse_reader<R: Read>(&self, data: R) -> Result<Vec<NormalizedRow>, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.profile.delimiter_byte())
            .from_reader(data);
        parse_profile(&mut reader, &self.profile)
    }
}

impl SourceAdapter for CsvSourceAdapter {
    fn source_id(&self) -> &str {
        &self.profile.source
    }

    fn parse(&self, path: &Path) -> Result<Vec<NormalizedRow>, ImportError> {
        let file = File::open(path)?;
        self.parse_reader(file)
    }
}

pub fn parse_profile<R: Read>(
    reader: &mut csv::Reader<R>,
    profile: &CsvImportProfile,
) -> Result<Vec<NormalizedRow>, ImportError> {
    let headers = reader.headers()?.clone();
    let columns = ColumnIndexes::resolve(&headers, profile)?;
    let mapping = &profile.mapping;
    let mut rows = Vec::new();

    for (row, result) in reader.records().enumerate() {
        let record = result?;

        if record.is_empty() {
            continue;
        }

        let raw_data = RawRecord::from_pairs(headers.iter().zip(record.iter()));

        let date_text = record.get(columns.date).unwrap_or_default();
        let transaction_date = parse_date(date_text, mapping.date_format.as_deref()).ok_or_else(
            || ImportError::DateParse {
                value: date_text.trim().to_string(),
                row,
            },
        )?;

        let description = record.get(columns.description).unwrap_or_default().trim();
        if description.is_empty() {
            return Err(ImportError::EmptyField {
                column: headers
                    .get(columns.description)
                    .unwrap_or_default()
                    .to_string(),
                row,
            });
        }

        let merchant = columns
            .merchant
            .and_then(|col| record.get(col))
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(description);

        let amount_text = record.get(columns.amount).unwrap_or_default();
        let amount = parse_amount(amount_text).ok_or_else(|| ImportError::InvalidAmount {
            value: amount_text.trim().to_string(),
            row,
        })?;

        rows.push(NormalizedRow {
            transaction_date,
            description: description.to_string(),
            merchant: merchant.to_string(),
            amount: mapping.sign.normalize(amount),
            source: profile.source.clone(),
            raw_data,
        });
    }

    Ok(rows)
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%Y/%m/%d", "%m-%d-%Y", "%d/%m/%Y", "%b %d, %Y",
    "%B %d, %Y", "%d %b %Y", "%d %B %Y", "%Y%m%d",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// `%Y` happily reads "24" as year 24; such dates are treated as misparses.
fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    (date.year() >= 1000).then_some(date)
}

pub fn parse_date(s: &str, preferred: Option<&str>) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(fmt) = preferred {
        if let Some(date) = NaiveDate::parse_from_str(s, fmt).ok().and_then(plausible) {
            return Some(date);
        }
    }

    for fmt in DATE_FORMATS {
        if let Some(date) = NaiveDate::parse_from_str(s, fmt).ok().and_then(plausible) {
            return Some(date);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return plausible(dt.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .and_then(|dt| plausible(dt.date()))
}

/// Parses a currency cell into [`Money`]. Returns `None` for text that is not a
/// number or whose magnitude exceeds [`Money::MAX_ABS_CENTS`].
pub fn parse_amount(s: &str) -> Option<Money> {
    let s = s.trim();
    let (negative, s) = match s.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, s),
    };
    let s = s.replace([',', '$', ' '], "");
    let mut dec = Decimal::from_str(&s).ok()?;
    if negative {
        dec = -dec;
    }
    let money = Money::from_decimal(dec);
    money.bounded_cents()?;
    Some(money)
}
