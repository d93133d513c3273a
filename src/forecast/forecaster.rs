//! Next-year temperature forecast built on a regression tree over (year, month) features.

use crate::forecast::encoding::MonthEncoder;
use crate::forecast::error::ForecastError;
use crate::forecast::metrics::r2_score;
use crate::forecast::split::train_test_split;
use crate::forecast::tree::{RegressionTree, TreeParams};
use crate::types::frames::long_frame::{LongFrame, TEMPERATURE, YEAR};
use crate::types::records::{LongRecord, YearlyTemperature};
use crate::utils::yearly_series;
use log::info;
use ndarray::Axis;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Which year's months are carried forward into the forecast year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaseYear {
    /// The highest year present in the table.
    #[default]
    Latest,
    Fixed(i32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastOptions {
    /// Share of rows held out for scoring, rounded up to whole rows.
    pub test_fraction: f64,
    pub base_year: BaseYear,
    /// Shuffle seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,
    pub tree: TreeParams,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            test_fraction: 0.3,
            base_year: BaseYear::Latest,
            seed: None,
            tree: TreeParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPrediction {
    pub month: String,
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    /// Mean temperature per year, the forecast year included, ascending by year.
    pub series: Vec<YearlyTemperature>,
    /// R² of the tree on the held-out rows.
    pub r2: f64,
    pub base_year: i32,
    pub forecast_year: i32,
    /// Predicted temperature of each base-year month, moved to the forecast year.
    pub predictions: Vec<MonthlyPrediction>,
    pub train_rows: usize,
    pub test_rows: usize,
}

impl ForecastResult {
    /// Mean predicted temperature of the forecast year.
    pub fn forecast_temperature(&self) -> Option<f64> {
        self.series
            .iter()
            .find(|point| point.year == self.forecast_year)
            .map(|point| point.temperature)
    }
}

fn resolve_base_year(records: &[LongRecord], base_year: BaseYear) -> Result<i32, ForecastError> {
    match base_year {
        BaseYear::Latest => records
            .iter()
            .map(|record| record.year)
            .max()
            .ok_or(ForecastError::TooFewRows { rows: 0 }),
        BaseYear::Fixed(year) if records.iter().any(|record| record.year == year) => Ok(year),
        BaseYear::Fixed(year) => Err(ForecastError::InsufficientHistory { base_year: year }),
    }
}

/// Appends the predicted rows to the table's (year, temperature) pairs and averages per year.
fn combine(
    long: &LongFrame,
    forecast_year: i32,
    predictions: &[MonthlyPrediction],
) -> PolarsResult<Vec<YearlyTemperature>> {
    let predicted = df!(
        YEAR => vec![forecast_year; predictions.len()],
        TEMPERATURE => predictions.iter().map(|p| p.temperature).collect::<Vec<f64>>()
    )?;
    let combined = long.frame.select([YEAR, TEMPERATURE])?.vstack(&predicted)?;
    let means = combined
        .lazy()
        .group_by([col(YEAR)])
        .agg([col(TEMPERATURE).mean()])
        .collect()?;

    let mut series = yearly_series(&means)?;
    series.sort_by_key(|point| point.year);
    Ok(series)
}

/// Trains a regression tree on the long table and extrapolates one year ahead.
///
/// Features are the year plus a one-hot month label; the target is the temperature. Rows
/// without a finite temperature take no part in training or scoring. The rows are shuffled
/// and split by `options.test_fraction`, the tree is grown on the training side and scored
/// with R² on the rest.
///
/// Every row of the base year is then moved to `base_year + 1` and predicted. The predicted
/// rows are appended to the table and averaged per year into [`ForecastResult::series`].
///
/// # Errors
///
/// * [`ForecastError::TooFewRows`] with fewer than two usable rows, or when the split leaves
///   one side empty.
/// * [`ForecastError::InvalidTestFraction`] unless `0 < test_fraction < 1`.
/// * [`ForecastError::InsufficientHistory`] when a fixed base year has no rows.
pub fn forecast(long: &LongFrame, options: &ForecastOptions) -> Result<ForecastResult, ForecastError> {
    let records = long.records()?;
    let usable: Vec<&LongRecord> = records
        .iter()
        .filter(|record| record.temperature.is_finite())
        .collect();
    if usable.len() < 2 {
        return Err(ForecastError::TooFewRows { rows: usable.len() });
    }

    let base_year = resolve_base_year(&records, options.base_year)?;
    let forecast_year = base_year
        .checked_add(1)
        .ok_or(ForecastError::YearOverflow(base_year))?;

    let encoder = MonthEncoder::fit(usable.iter().map(|record| record.month.as_str()));
    let features = encoder.encode(usable.iter().map(|record| (record.year, record.month.as_str())));
    let targets: Vec<f64> = usable.iter().map(|record| record.temperature).collect();

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let split = train_test_split(usable.len(), options.test_fraction, &mut rng)?;

    let train_x = features.select(Axis(0), &split.train);
    let train_y: Vec<f64> = split.train.iter().map(|&i| targets[i]).collect();
    let tree = RegressionTree::fit(&train_x, &train_y, &options.tree)?;

    let test_x = features.select(Axis(0), &split.test);
    let test_y: Vec<f64> = split.test.iter().map(|&i| targets[i]).collect();
    let r2 = r2_score(&test_y, &tree.predict(&test_x));
    info!(
        "Fitted regression tree (depth {}, {} leaves) on {} rows; R² {:.4} on {} held-out rows",
        tree.depth(),
        tree.n_leaves(),
        train_y.len(),
        r2,
        test_y.len()
    );

    let base_rows: Vec<&LongRecord> = records.iter().filter(|record| record.year == base_year).collect();
    let next_x = encoder.encode(base_rows.iter().map(|record| (forecast_year, record.month.as_str())));
    let predictions: Vec<MonthlyPrediction> = base_rows
        .iter()
        .zip(tree.predict(&next_x))
        .map(|(record, temperature)| MonthlyPrediction {
            month: record.month.clone(),
            temperature,
        })
        .collect();

    let series = combine(long, forecast_year, &predictions)?;
    info!(
        "Forecast {} months of {} from base year {}",
        predictions.len(),
        forecast_year,
        base_year
    );

    Ok(ForecastResult {
        series,
        r2,
        base_year,
        forecast_year,
        predictions,
        train_rows: train_y.len(),
        test_rows: test_y.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{constant_csv, seasonal_csv};
    use crate::{load_bytes, reshape};

    fn seeded(base_year: BaseYear) -> ForecastOptions {
        ForecastOptions {
            base_year,
            seed: Some(11),
            ..ForecastOptions::default()
        }
    }

    #[test]
    fn test_forecast_constant_table() -> Result<(), Box<dyn std::error::Error>> {
        let long = reshape(&load_bytes(constant_csv(&[2015, 2016, 2017], 25.0).as_bytes())?)?;
        let result = forecast(&long, &seeded(BaseYear::Latest))?;

        assert_eq!(result.base_year, 2017);
        assert_eq!(result.forecast_year, 2018);
        assert_eq!(result.r2, 1.0);
        assert_eq!((result.train_rows, result.test_rows), (25, 11));
        assert_eq!(result.predictions.len(), 12);
        assert!(result.predictions.iter().all(|p| p.temperature == 25.0));

        let years: Vec<i32> = result.series.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2015, 2016, 2017, 2018]);
        assert_eq!(result.forecast_temperature(), Some(25.0));
        Ok(())
    }

    #[test]
    fn test_forecast_fixed_base_year() -> Result<(), Box<dyn std::error::Error>> {
        let long = reshape(&load_bytes(seasonal_csv(1901..=2017).as_bytes())?)?;
        let result = forecast(&long, &seeded(BaseYear::Fixed(2010)))?;

        assert_eq!(result.forecast_year, 2011);
        // 2011 already exists, so its mean blends observed and predicted months.
        assert_eq!(result.series.len(), 117);
        assert!(result.r2 <= 1.0);
        assert!(result.r2 > 0.9, "seasonal cycle should be learnable, got {}", result.r2);
        Ok(())
    }

    #[test]
    fn test_forecast_series_gains_one_year() -> Result<(), Box<dyn std::error::Error>> {
        let long = reshape(&load_bytes(seasonal_csv(1990..=2000).as_bytes())?)?;
        let result = forecast(&long, &ForecastOptions::default())?;

        assert_eq!(result.series.len(), 12);
        assert_eq!(result.series.last().map(|p| p.year), Some(2001));
        assert!(result.series.windows(2).all(|w| w[0].year < w[1].year));
        let forecast = result.forecast_temperature().ok_or("missing forecast year")?;
        assert!((15.0..35.0).contains(&forecast));
        Ok(())
    }

    #[test]
    fn test_forecast_unknown_base_year() -> Result<(), Box<dyn std::error::Error>> {
        let long = reshape(&load_bytes(constant_csv(&[2015, 2016], 25.0).as_bytes())?)?;
        match forecast(&long, &seeded(BaseYear::Fixed(1990))) {
            Err(ForecastError::InsufficientHistory { base_year }) => assert_eq!(base_year, 1990),
            other => panic!("expected InsufficientHistory, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_forecast_needs_two_rows() -> Result<(), Box<dyn std::error::Error>> {
        let long = reshape(&load_bytes(b"YEAR,JAN\n2001,5.0\n")?)?;
        assert!(matches!(
            forecast(&long, &ForecastOptions::default()),
            Err(ForecastError::TooFewRows { rows: 1 })
        ));
        Ok(())
    }

    #[test]
    fn test_forecast_skips_missing_temperatures_in_training(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let long = reshape(&load_bytes(b"YEAR,JAN,FEB\n2001,1.0,\n2002,1.0,2.0\n2003,1.0,2.0\n")?)?;
        let result = forecast(&long, &seeded(BaseYear::Latest))?;
        assert_eq!(result.train_rows + result.test_rows, 5);
        // The empty FEB 2001 cell keeps 2001's mean undefined.
        assert!(result.series[0].temperature.is_nan());
        Ok(())
    }
}
