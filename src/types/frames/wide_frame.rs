// wide_frame.rs

//! Contains the `WideFrame` structure wrapping the year-by-month table as it was uploaded.

use crate::types::month::YEAR_COLUMN;
use polars::prelude::{DataFrame, DataType, PolarsResult};

/// A wrapper around a Polars `DataFrame` holding the wide-format temperature table:
/// one row per year, a `YEAR` column and one numeric column per month.
///
/// Instances are typically obtained from [`crate::load_bytes`] or [`crate::load_path`],
/// which coerce every non-`YEAR` column to `Float64`. A `WideFrame` can also be built
/// directly around any `DataFrame` with [`WideFrame::new`]; accessors cast on read.
///
/// The frame is never mutated by the analyses. Every derived view (long table, yearly and
/// seasonal means, statistics) is a new structure, so one `WideFrame` can be handed to
/// several analyses without them observing each other.
///
/// # Errors
///
/// Accessors that read a named column return a [`polars::prelude::PolarsError`] when the
/// column does not exist or cannot be cast to the requested type.
#[derive(Clone, Debug)]
pub struct WideFrame {
    /// The underlying Polars DataFrame containing the wide table.
    pub frame: DataFrame,
}

impl WideFrame {
    /// Creates a new `WideFrame` wrapping the given `DataFrame`.
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// Number of rows (years) in the table.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// All column names, in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str().to_string())
            .collect()
    }

    /// Returns `true` when a column with exactly this (case-sensitive) name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.frame
            .get_column_names()
            .iter()
            .any(|column| column.as_str() == name)
    }

    /// Names of every column except `YEAR`: the columns holding temperatures.
    pub fn value_column_names(&self) -> Vec<String> {
        self.column_names()
            .into_iter()
            .filter(|name| name != YEAR_COLUMN)
            .collect()
    }

    /// The `YEAR` column as `i32` values. Cells that are empty, not numeric, fractional or
    /// outside the `i32` range are `None`.
    pub fn years(&self) -> PolarsResult<Vec<Option<i32>>> {
        let years = self
            .frame
            .column(YEAR_COLUMN)?
            .cast(&DataType::Float64)?;
        Ok(years
            .f64()?
            .into_iter()
            .map(|year| {
                year.filter(|y| {
                    y.fract() == 0.0 && *y >= f64::from(i32::MIN) && *y <= f64::from(i32::MAX)
                })
                .map(|y| y as i32)
            })
            .collect())
    }

    /// Values of a column as `f64`, with empty or non-numeric cells read as `NaN`.
    pub fn column_values(&self, name: &str) -> PolarsResult<Vec<f64>> {
        let values = self.frame.column(name)?.cast(&DataType::Float64)?;
        Ok(values
            .f64()?
            .into_iter()
            .map(|value| value.unwrap_or(f64::NAN))
            .collect())
    }

    /// The first `rows` rows, for an overview of an uploaded file.
    pub fn head(&self, rows: usize) -> WideFrame {
        WideFrame::new(self.frame.head(Some(rows)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn sample_frame() -> Result<WideFrame, PolarsError> {
        let frame = df!(
            "YEAR" => [2001i64, 2002, 2003],
            "JAN" => [Some(10.5), None, Some(11.0)],
            "FEB" => [12i64, 13, 14],
        )?;
        Ok(WideFrame::new(frame))
    }

    #[test]
    fn test_wide_frame_value_columns_exclude_year() -> Result<(), Box<dyn std::error::Error>> {
        let wide = sample_frame()?;
        assert_eq!(wide.height(), 3);
        assert_eq!(wide.column_names(), vec!["YEAR", "JAN", "FEB"]);
        assert_eq!(wide.value_column_names(), vec!["JAN", "FEB"]);
        assert!(wide.has_column("JAN"));
        assert!(!wide.has_column("jan"));
        Ok(())
    }

    #[test]
    fn test_wide_frame_reads_years_and_casts_values() -> Result<(), Box<dyn std::error::Error>> {
        let wide = sample_frame()?;
        assert_eq!(wide.years()?, vec![Some(2001), Some(2002), Some(2003)]);

        let jan = wide.column_values("JAN")?;
        assert_eq!(jan[0], 10.5);
        assert!(jan[1].is_nan(), "empty cell should read as NaN");
        assert_eq!(wide.column_values("FEB")?, vec![12.0, 13.0, 14.0]);
        Ok(())
    }

    #[test]
    fn test_wide_frame_fractional_years_are_not_truncated() -> Result<(), Box<dyn std::error::Error>>
    {
        let wide = WideFrame::new(df!(
            "YEAR" => [2001.0, 2001.7, 2003.0],
            "JAN" => [1.0, 2.0, 3.0],
        )?);
        assert_eq!(wide.years()?, vec![Some(2001), None, Some(2003)]);
        Ok(())
    }

    #[test]
    fn test_wide_frame_missing_column_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
        let wide = sample_frame()?;
        assert!(wide.column_values("MAR").is_err());
        assert_eq!(wide.head(2).height(), 2);
        Ok(())
    }
}
