use crate::analysis::error::AggregateError;
use crate::types::frames::wide_frame::WideFrame;
use crate::utils::finite;
use polars::prelude::*;
use serde::Serialize;

/// Summary statistics of one column of the wide table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    /// Number of finite values.
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

const STATISTICS: [&str; 8] = ["count", "mean", "std", "min", "q25", "q50", "q75", "max"];

fn summary_exprs(name: &str) -> [Expr; 8] {
    let values = || finite(col(name));
    [
        values().count().cast(DataType::Float64),
        values().mean(),
        values().std(1),
        values().min(),
        values().quantile(lit(0.25), QuantileMethod::Linear),
        values().median(),
        values().quantile(lit(0.75), QuantileMethod::Linear),
        values().max(),
    ]
}

/// Count, mean, sample standard deviation, minimum, quartiles and maximum of every column,
/// `YEAR` included, in table order. Empty and non-finite cells are left out of every
/// statistic; a column without any finite value has a count of zero and `NaN` statistics.
pub fn describe(wide: &WideFrame) -> Result<Vec<ColumnSummary>, AggregateError> {
    let mut summaries = Vec::new();
    for name in wide.column_names() {
        let selection: Vec<Expr> = summary_exprs(&name)
            .into_iter()
            .zip(STATISTICS)
            .map(|(expr, statistic)| expr.alias(statistic))
            .collect();
        let row = wide.frame.clone().lazy().select(selection).collect()?;

        let mut values = [f64::NAN; 8];
        for (value, statistic) in values.iter_mut().zip(STATISTICS) {
            if let Some(v) = row.column(statistic)?.cast(&DataType::Float64)?.f64()?.get(0) {
                *value = v;
            }
        }
        let [count, mean, std, min, q25, q50, q75, max] = values;
        summaries.push(ColumnSummary {
            name,
            count: count as usize,
            mean,
            std,
            min,
            q25,
            q50,
            q75,
            max,
        });
    }
    Ok(summaries)
}
