// long_frame.rs

//! Contains the `LongFrame` structure holding the tidy one-row-per-month temperature table.

use crate::types::records::LongRecord;
use polars::prelude::{col, lit, Column, DataFrame, Expr, IntoLazy, PolarsResult};

/// Column holding the year (`Int32`).
pub const YEAR: &str = "Year";
/// Column holding the month label as it appeared in the wide header (`String`).
pub const MONTH: &str = "Month";
/// Column holding the temperature reading (`Float64`).
pub const TEMPERATURE: &str = "Temperature";
/// Column holding the first-of-month date (`Date`).
pub const DATE: &str = "Date";

/// A wrapper around a Polars `DataFrame` holding the long (tidy) temperature table.
///
/// Every row is one (year, month) pair with the columns [`YEAR`], [`MONTH`], [`TEMPERATURE`]
/// and [`DATE`]. Frames produced by [`crate::reshape`] are sorted ascending by date.
///
/// Instances are typically obtained via [`crate::reshape`] or
/// [`crate::TemperatureExplorer::long`].
///
/// # Errors
///
/// Methods that read or filter the frame return a [`polars::prelude::PolarsError`] if the
/// frame does not have the expected schema.
#[derive(Clone, Debug)]
pub struct LongFrame {
    /// The underlying Polars DataFrame containing the long table.
    pub frame: DataFrame,
}

impl LongFrame {
    /// Creates a new `LongFrame` wrapping the given `DataFrame`.
    ///
    /// # Arguments
    ///
    /// * `frame` - A `DataFrame` assumed to contain the columns `Year` (Int32), `Month` (String),
    ///   `Temperature` (Float64) and `Date` (Date).
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// Builds a `LongFrame` from records, keeping their order.
    pub fn from_records(records: &[LongRecord]) -> PolarsResult<Self> {
        let years: Vec<i32> = records.iter().map(|r| r.year).collect();
        let months: Vec<&str> = records.iter().map(|r| r.month.as_str()).collect();
        let temperatures: Vec<f64> = records.iter().map(|r| r.temperature).collect();
        let dates: Vec<chrono::NaiveDate> = records.iter().map(|r| r.date).collect();

        let frame = DataFrame::new(vec![
            Column::new(YEAR.into(), years),
            Column::new(MONTH.into(), months),
            Column::new(TEMPERATURE.into(), temperatures),
            Column::new(DATE.into(), dates),
        ])?;
        Ok(Self::new(frame))
    }

    /// Number of (year, month) rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Collects the table into row records, in frame order.
    ///
    /// Rows with a missing year, month or date are skipped; a missing temperature is read
    /// as `NaN`.
    pub fn records(&self) -> PolarsResult<Vec<LongRecord>> {
        let years = self.frame.column(YEAR)?.i32()?;
        let months = self.frame.column(MONTH)?.str()?;
        let temperatures = self.frame.column(TEMPERATURE)?.f64()?;
        let dates = self.frame.column(DATE)?.as_materialized_series().date()?;

        Ok(years
            .into_iter()
            .zip(months)
            .zip(temperatures)
            .zip(dates.as_date_iter())
            .filter_map(|(((year, month), temperature), date)| {
                Some(LongRecord {
                    year: year?,
                    month: month?.to_string(),
                    temperature: temperature.unwrap_or(f64::NAN),
                    date: date?,
                })
            })
            .collect())
    }

    /// The temperature column, with missing values read as `NaN`.
    pub fn temperatures(&self) -> PolarsResult<Vec<f64>> {
        Ok(self
            .frame
            .column(TEMPERATURE)?
            .f64()?
            .into_iter()
            .map(|t| t.unwrap_or(f64::NAN))
            .collect())
    }

    /// Filters the rows based on a Polars predicate expression.
    ///
    /// Returns a new `LongFrame`; the original is left unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// # use tempcast::{load_bytes, reshape, TEMPERATURE};
    /// use polars::prelude::{col, lit};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let wide = load_bytes(b"YEAR,JAN,JUL\n2001,10.0,30.0\n2002,11.0,31.0\n")?;
    /// let long = reshape(&wide)?;
    ///
    /// let warm = long.filter(col(TEMPERATURE).gt(lit(20.0)))?;
    /// assert_eq!(warm.height(), 2);
    /// # Ok(())
    /// # }
    /// ```
    pub fn filter(&self, predicate: Expr) -> PolarsResult<LongFrame> {
        let frame = self.frame.clone().lazy().filter(predicate).collect()?;
        Ok(LongFrame::new(frame))
    }

    /// Filters the rows to the inclusive year range `start_year..=end_year`.
    pub fn get_range(&self, start_year: i32, end_year: i32) -> PolarsResult<LongFrame> {
        self.filter(
            col(YEAR)
                .gt_eq(lit(start_year))
                .and(col(YEAR).lt_eq(lit(end_year))),
        )
    }

    /// Filters the rows to a single year.
    pub fn get_for_year(&self, year: i32) -> PolarsResult<LongFrame> {
        self.filter(col(YEAR).eq(lit(year)))
    }
}
