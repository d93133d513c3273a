//! Grouping and summary views over the wide and long tables.
//!
//! Every function borrows its input and returns a new structure; none of them add columns
//! to the frames they are given.

use crate::analysis::error::AggregateError;
use crate::types::frames::long_frame::{LongFrame, MONTH, TEMPERATURE};
use crate::types::frames::wide_frame::WideFrame;
use crate::types::month::YEAR_COLUMN;
use crate::types::records::{SeasonalTemperature, YearlyTemperature};
use crate::types::season::Season;
use crate::utils::{finite, sorted_finite};
use chrono::NaiveDate;
use log::{debug, warn};
use polars::prelude::*;
use serde::Serialize;

/// Density-normalised histogram of temperatures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `bins + 1` bin edges, ascending.
    pub edges: Vec<f64>,
    /// Number of readings per bin.
    pub counts: Vec<usize>,
    /// `count / (total * bin_width)` per bin; integrates to 1 over the range.
    pub density: Vec<f64>,
}

/// Distribution summary of one month label across all years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub month: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// The temperatures recorded for one month label, year by year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthHistory {
    pub month: String,
    pub points: Vec<YearlyTemperature>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub temperature: f64,
}

/// Temperatures in date order, with the upper bound of a chart's y-axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub points: Vec<TimelinePoint>,
    /// Highest finite temperature plus one degree.
    pub y_max: f64,
}

/// Arithmetic mean of the given columns per row, as a Polars expression.
/// A null in any column makes the row's mean null.
fn row_mean_expr<S: AsRef<str>>(columns: &[S]) -> Option<Expr> {
    let n = columns.len();
    columns
        .iter()
        .map(|name| col(name.as_ref()).cast(DataType::Float64))
        .reduce(|sum, column| sum + column)
        .map(|sum| sum / lit(n as f64))
}

/// Mean of every temperature column, per row of the wide table.
///
/// Missing values are not imputed: a row with an empty cell has a `NaN` mean.
/// Rows keep their table order.
///
/// # Errors
///
/// [`AggregateError::MissingColumn`] without a `YEAR` column, [`AggregateError::NoValueColumns`]
/// when `YEAR` is the only column.
pub fn yearly_mean(wide: &WideFrame) -> Result<Vec<YearlyTemperature>, AggregateError> {
    if !wide.has_column(YEAR_COLUMN) {
        return Err(AggregateError::MissingColumn(YEAR_COLUMN.to_string()));
    }
    let mean = row_mean_expr(&wide.value_column_names()).ok_or(AggregateError::NoValueColumns)?;

    let frame = wide
        .frame
        .clone()
        .lazy()
        .select([mean.alias(TEMPERATURE)])
        .collect()?;
    let means = frame.column(TEMPERATURE)?.f64()?;

    Ok(wide
        .years()?
        .into_iter()
        .zip(means)
        .filter_map(|(year, temperature)| {
            Some(YearlyTemperature {
                year: year?,
                temperature: temperature.unwrap_or(f64::NAN),
            })
        })
        .collect())
}

/// Mean of each season's month group, per year.
///
/// Rows are ordered season-major: every Winter row in table order, then Summer, Monsoon
/// and Autumn. See [`Season`] for the month groups.
///
/// # Errors
///
/// [`AggregateError::MissingColumn`] naming the first absent column, checked in the order
/// DEC, JAN, FEB, MAR, APR, MAY, JUN, JUL, AUG, SEP, OCT, NOV (names are case-sensitive).
pub fn seasonal_mean(wide: &WideFrame) -> Result<Vec<SeasonalTemperature>, AggregateError> {
    let required = std::iter::once(YEAR_COLUMN)
        .chain(Season::ALL.iter().flat_map(|season| season.months().iter().copied()));
    for column in required {
        if !wide.has_column(column) {
            return Err(AggregateError::MissingColumn(column.to_string()));
        }
    }

    let mut selection = Vec::with_capacity(Season::ALL.len());
    for season in Season::ALL {
        let mean = row_mean_expr(season.months()).ok_or(AggregateError::NoValueColumns)?;
        selection.push(mean.alias(season.name()));
    }
    let frame = wide.frame.clone().lazy().select(selection).collect()?;

    let years = wide.years()?;
    let mut rows = Vec::with_capacity(years.len() * Season::ALL.len());
    for season in Season::ALL {
        let means = frame.column(season.name())?.f64()?;
        for (year, temperature) in years.iter().zip(means) {
            if let Some(year) = *year {
                rows.push(SeasonalTemperature {
                    year,
                    season,
                    temperature: temperature.unwrap_or(f64::NAN),
                });
            }
        }
    }
    Ok(rows)
}

/// Histogram of the finite temperatures over `bins` equal-width bins.
///
/// Bins span `[min, max]`, the last bin including `max`. When every reading is the same the
/// range is widened to `[value - 0.5, value + 0.5]`.
///
/// # Errors
///
/// [`AggregateError::InvalidBinCount`] for zero bins, [`AggregateError::NoFiniteValues`] when
/// there is nothing to count.
pub fn histogram(long: &LongFrame, bins: usize) -> Result<Histogram, AggregateError> {
    if bins == 0 {
        return Err(AggregateError::InvalidBinCount);
    }
    let values = sorted_finite(&long.temperatures()?);
    let (Some(&first), Some(&last)) = (values.first(), values.last()) else {
        return Err(AggregateError::NoFiniteValues);
    };

    let (low, high) = if first == last {
        warn!("All temperatures equal {first}; widening histogram range");
        (first - 0.5, last + 0.5)
    } else {
        (first, last)
    };
    let width = (high - low) / bins as f64;

    let mut counts = vec![0usize; bins];
    for value in &values {
        let idx = (((value - low) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let total = values.len() as f64;
    let density = counts
        .iter()
        .map(|&count| count as f64 / (total * width))
        .collect();
    let edges = (0..=bins).map(|i| low + width * i as f64).collect();
    debug!("Histogram of {} readings over {} bins", values.len(), bins);

    Ok(Histogram {
        edges,
        counts,
        density,
    })
}

/// Minimum, quartiles and maximum of each month label across all years.
///
/// Months keep their order of first appearance. Quartiles interpolate linearly between
/// ranks. Non-finite readings are ignored; a month without any finite reading has a count
/// of zero and `NaN` statistics.
pub fn monthly_box_stats(long: &LongFrame) -> Result<Vec<BoxStats>, AggregateError> {
    let temperature = || col(TEMPERATURE);
    let stats = long
        .frame
        .clone()
        .lazy()
        .with_column(finite(col(TEMPERATURE)).alias(TEMPERATURE))
        .group_by_stable([col(MONTH)])
        .agg([
            temperature().count().cast(DataType::UInt64).alias("count"),
            temperature().min().alias("min"),
            temperature()
                .quantile(lit(0.25), QuantileMethod::Linear)
                .alias("q1"),
            temperature().median().alias("median"),
            temperature()
                .quantile(lit(0.75), QuantileMethod::Linear)
                .alias("q3"),
            temperature().max().alias("max"),
        ])
        .collect()?;

    let stat = |name: &str| -> PolarsResult<Vec<f64>> {
        Ok(stats
            .column(name)?
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|value| value.unwrap_or(f64::NAN))
            .collect())
    };
    let (min, q1, median) = (stat("min")?, stat("q1")?, stat("median")?);
    let (q3, max) = (stat("q3")?, stat("max")?);
    let months = stats.column(MONTH)?.str()?;
    let counts = stats.column("count")?.u64()?;

    Ok(months
        .into_iter()
        .zip(counts)
        .enumerate()
        .filter_map(|(i, (month, count))| {
            Some(BoxStats {
                month: month?.to_string(),
                count: count.unwrap_or(0) as usize,
                min: min[i],
                q1: q1[i],
                median: median[i],
                q3: q3[i],
                max: max[i],
            })
        })
        .collect())
}

/// The year-by-year temperatures of each month label, months in order of first appearance.
pub fn monthly_history(long: &LongFrame) -> Result<Vec<MonthHistory>, AggregateError> {
    let months = long
        .frame
        .clone()
        .lazy()
        .select([col(MONTH).unique_stable()])
        .collect()?;

    let mut history = Vec::new();
    for month in months.column(MONTH)?.str()?.into_iter().flatten() {
        let points = long
            .filter(col(MONTH).eq(lit(month)))?
            .records()?
            .into_iter()
            .map(|record| YearlyTemperature {
                year: record.year,
                temperature: record.temperature,
            })
            .collect();
        history.push(MonthHistory {
            month: month.to_string(),
            points,
        });
    }
    Ok(history)
}

/// Temperatures in frame (date) order.
pub fn timeline(long: &LongFrame) -> Result<Timeline, AggregateError> {
    let points: Vec<TimelinePoint> = long
        .records()?
        .into_iter()
        .map(|record| TimelinePoint {
            date: record.date,
            temperature: record.temperature,
        })
        .collect();
    let y_max = points
        .iter()
        .map(|point| point.temperature)
        .filter(|t| t.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if !y_max.is_finite() {
        return Err(AggregateError::NoFiniteValues);
    }
    Ok(Timeline {
        points,
        y_max: y_max + 1.0,
    })
}
