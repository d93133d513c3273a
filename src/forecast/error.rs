use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
    /// The year whose months are carried forward has no rows in the table.
    #[error("No rows found for base year {base_year}")]
    InsufficientHistory { base_year: i32 },

    #[error("Training and evaluation need at least 2 rows with a temperature, found {rows}")]
    TooFewRows { rows: usize },

    #[error("Test fraction must lie strictly between 0 and 1, got {0}")]
    InvalidTestFraction(f64),

    #[error("Feature matrix has {rows} rows but {targets} targets were given")]
    ShapeMismatch { rows: usize, targets: usize },

    #[error("Cannot forecast the year after {0}")]
    YearOverflow(i32),

    #[error("Failed processing DataFrame: {0}")]
    Polars(#[from] PolarsError),
}
