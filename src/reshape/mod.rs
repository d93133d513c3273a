//! Turns the wide year-by-month table into the long, date-indexed table.

pub mod error;

use crate::reshape::error::ReshapeError;
use crate::types::frames::long_frame::LongFrame;
use crate::types::frames::wide_frame::WideFrame;
use crate::types::month::{parse_month_date, YEAR_COLUMN};
use crate::types::records::LongRecord;
use log::{info, warn};

/// Reshapes a [`WideFrame`] into a [`LongFrame`] with one row per (year, month column).
///
/// Every column other than `YEAR` is treated as a month column. For each year and month
/// column a row is emitted with the month label, the temperature and a first-of-month date
/// parsed from `"<label> <year>"`. The result is stably sorted ascending by date.
///
/// Duplicate years are passed through: each produces its own set of rows. Rows whose year
/// cell is empty are skipped because no date can be formed for them.
///
/// # Errors
///
/// * [`ReshapeError::MissingColumn`] when there is no `YEAR` column.
/// * [`ReshapeError::DateParse`] when a value column is not a month abbreviation.
///
/// # Example
///
/// ```
/// use tempcast::{load_bytes, reshape};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let wide = load_bytes(b"YEAR,FEB,JAN\n2002,3.0,1.0\n2001,4.0,2.0\n")?;
/// let long = reshape(&wide)?;
///
/// let months: Vec<String> = long
///     .records()?
///     .into_iter()
///     .map(|r| format!("{} {}", r.month, r.year))
///     .collect();
/// assert_eq!(months, ["JAN 2001", "FEB 2001", "JAN 2002", "FEB 2002"]);
/// # Ok(())
/// # }
/// ```
pub fn reshape(wide: &WideFrame) -> Result<LongFrame, ReshapeError> {
    if !wide.has_column(YEAR_COLUMN) {
        return Err(ReshapeError::MissingColumn(YEAR_COLUMN.to_string()));
    }
    let years = wide.years()?;
    let value_columns = wide.value_column_names();

    let mut records = Vec::with_capacity(years.len() * value_columns.len());
    let mut skipped = 0usize;
    for label in &value_columns {
        let temperatures = wide.column_values(label)?;
        for (year, temperature) in years.iter().zip(temperatures) {
            let Some(year) = *year else {
                skipped += 1;
                continue;
            };
            let date = parse_month_date(label, year).ok_or_else(|| ReshapeError::DateParse {
                label: label.clone(),
                year,
            })?;
            records.push(LongRecord {
                year,
                month: label.clone(),
                temperature,
                date,
            });
        }
    }

    if skipped > 0 {
        warn!("Skipped {} cells belonging to rows without a year", skipped);
    }

    records.sort_by_key(|record| record.date);
    info!(
        "Reshaped {} years x {} month columns into {} rows",
        years.len(),
        value_columns.len(),
        records.len()
    );
    Ok(LongFrame::from_records(&records)?)
}
