use thiserror::Error;

use crate::model::Manufacturer;

#[derive(Debug, Error)]
pub enum EquivError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Config validation error (no source files, inverted band, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),

    /// A row field could not be normalized under the strict policy.
    #[error("{manufacturer} row {line} ('{record}'): cannot parse {field} '{value}'")]
    DataFormat {
        manufacturer: Manufacturer,
        line: usize,
        record: String,
        field: &'static str,
        value: String,
    },

    /// Malformed model code.
    #[error("malformed model code '{code}': {reason}")]
    CodeParse { code: String, reason: String },

    /// Query rejected before matching (empty code, non-positive target).
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl EquivError {
    /// True for errors caused by catalog content rather than caller input.
    pub fn is_data_error(&self) -> bool {
        matches!(self, Self::DataFormat { .. })
    }
}
