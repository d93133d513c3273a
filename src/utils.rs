use crate::types::frames::long_frame::{TEMPERATURE, YEAR};
use crate::types::records::YearlyTemperature;
use ordered_float::OrderedFloat;
use polars::prelude::*;
use std::collections::BTreeSet;

/// Finite values of `values`, sorted ascending.
pub(crate) fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Number of distinct finite values.
pub(crate) fn distinct_finite_count(values: &[f64]) -> usize {
    values
        .iter()
        .filter(|v| v.is_finite())
        .map(|&v| OrderedFloat(v))
        .collect::<BTreeSet<_>>()
        .len()
}

/// `expr` as `Float64` with every non-finite value replaced by null, so Polars aggregations
/// skip it.
pub(crate) fn finite(expr: Expr) -> Expr {
    let values = expr.cast(DataType::Float64);
    when(values.clone().is_finite())
        .then(values)
        .otherwise(lit(NULL).cast(DataType::Float64))
}

/// Reads a two-column (`Year`, `Temperature`) frame into yearly temperatures.
/// Rows without a year are dropped, missing temperatures become `NaN`.
pub(crate) fn yearly_series(frame: &DataFrame) -> PolarsResult<Vec<YearlyTemperature>> {
    let years = frame.column(YEAR)?.i32()?;
    let temperatures = frame.column(TEMPERATURE)?.f64()?;
    Ok(years
        .into_iter()
        .zip(temperatures)
        .filter_map(|(year, temperature)| {
            Some(YearlyTemperature {
                year: year?,
                temperature: temperature.unwrap_or(f64::NAN),
            })
        })
        .collect())
}
