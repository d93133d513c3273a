use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReshapeError {
    /// A value column header is not a three-letter month abbreviation, so no date can be
    /// synthesized for it.
    #[error("Cannot parse '{label} {year}' as a month and year; '{label}' is not a month abbreviation")]
    DateParse { label: String, year: i32 },

    #[error("Required column '{0}' not found")]
    MissingColumn(String),

    #[error("Failed processing DataFrame: {0}")]
    Polars(#[from] PolarsError),
}
