//! Session façade over one uploaded temperature table.

use crate::analysis::aggregate::{
    histogram, monthly_box_stats, monthly_history, seasonal_mean, timeline, yearly_mean, BoxStats,
    Histogram, MonthHistory, Timeline,
};
use crate::analysis::cluster::{
    elbow_curve, labeled_clusters, ClusterSummary, ClusteredFrame, ElbowPoint, KMeansSettings,
};
use crate::analysis::describe::{describe, ColumnSummary};
use crate::analysis::error::{AggregateError, ClusterError};
use crate::analysis::trend::{seasonal_trends, SeasonTrend};
use crate::error::TempcastError;
use crate::forecast::error::ForecastError;
use crate::forecast::forecaster::{forecast, BaseYear, ForecastOptions, ForecastResult};
use crate::forecast::tree::TreeParams;
use crate::loader::csv_loader::{load_bytes, load_path};
use crate::reshape::reshape;
use crate::types::frames::long_frame::LongFrame;
use crate::types::frames::wide_frame::WideFrame;
use crate::types::records::{SeasonalTemperature, YearlyTemperature};
use bon::bon;
use log::warn;
use serde::Serialize;
use std::path::Path;

const DEFAULT_BINS: usize = 200;
const DEFAULT_MAX_CLUSTERS: usize = 9;
const DEFAULT_CLUSTERS: usize = 3;

/// Holds the wide table of one upload and its long form, and runs the analyses on them.
///
/// Both tables are built once when the explorer is created and are only ever borrowed
/// afterwards, so every analysis sees the table exactly as it was uploaded.
///
/// Options are passed through builders; anything not set falls back to its default.
///
/// # Examples
///
/// ```
/// use tempcast::{BaseYear, TemperatureExplorer, TempcastError};
///
/// # fn main() -> Result<(), TempcastError> {
/// let mut csv = String::from("YEAR,JAN,FEB,MAR,APR,MAY,JUN,JUL,AUG,SEP,OCT,NOV,DEC\n");
/// for year in 2015..=2017 {
///     csv.push_str(&format!("{year}{}\n", ",25.0".repeat(12)));
/// }
///
/// let explorer = TemperatureExplorer::from_bytes(csv.as_bytes())?;
/// assert_eq!(explorer.long().height(), 36);
///
/// let result = explorer
///     .forecast()
///     .base_year(BaseYear::Fixed(2017))
///     .seed(7)
///     .call()?;
/// assert_eq!(result.forecast_year, 2018);
/// assert_eq!(result.forecast_temperature(), Some(25.0));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TemperatureExplorer {
    wide: WideFrame,
    long: LongFrame,
}

/// Everything the explorer computes, in one serializable structure.
///
/// Views that do not apply to the upload are `None`: the seasonal views when a month column
/// is missing, the clustering views when there are too few distinct temperatures and the
/// forecast when there are too few rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub rows: usize,
    pub columns: Vec<String>,
    pub summary: Vec<ColumnSummary>,
    pub yearly_mean: Vec<YearlyTemperature>,
    pub seasonal_mean: Option<Vec<SeasonalTemperature>>,
    pub seasonal_trends: Option<Vec<SeasonTrend>>,
    pub histogram: Option<Histogram>,
    pub monthly_box_stats: Vec<BoxStats>,
    pub elbow_curve: Option<Vec<ElbowPoint>>,
    pub clusters: Option<ClusterSummary>,
    pub forecast: Option<ForecastResult>,
}

impl AnalysisReport {
    pub fn to_json(&self) -> Result<String, TempcastError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn kmeans_settings(
    seed: Option<u64>,
    max_iterations: Option<u64>,
    tolerance: Option<f64>,
    n_runs: Option<usize>,
) -> KMeansSettings {
    let defaults = KMeansSettings::default();
    KMeansSettings {
        max_iterations: max_iterations.unwrap_or(defaults.max_iterations),
        tolerance: tolerance.unwrap_or(defaults.tolerance),
        n_runs: n_runs.unwrap_or(defaults.n_runs),
        seed,
    }
}

#[bon]
impl TemperatureExplorer {
    /// Parses an upload and builds its long form.
    ///
    /// # Errors
    ///
    /// [`TempcastError::Load`] when the bytes are not a usable table and
    /// [`TempcastError::Reshape`] when a column is neither `YEAR` nor a month.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TempcastError> {
        Self::from_wide(load_bytes(bytes)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TempcastError> {
        Self::from_wide(load_path(path)?)
    }

    pub fn from_wide(wide: WideFrame) -> Result<Self, TempcastError> {
        let long = reshape(&wide)?;
        Ok(Self { wide, long })
    }

    pub fn wide(&self) -> &WideFrame {
        &self.wide
    }

    pub fn long(&self) -> &LongFrame {
        &self.long
    }

    /// The first `rows` rows of the uploaded table.
    pub fn preview(&self, rows: usize) -> WideFrame {
        self.wide.head(rows)
    }

    pub fn describe(&self) -> Result<Vec<ColumnSummary>, TempcastError> {
        Ok(describe(&self.wide)?)
    }

    pub fn yearly_mean(&self) -> Result<Vec<YearlyTemperature>, TempcastError> {
        Ok(yearly_mean(&self.wide)?)
    }

    pub fn seasonal_mean(&self) -> Result<Vec<SeasonalTemperature>, TempcastError> {
        Ok(seasonal_mean(&self.wide)?)
    }

    pub fn seasonal_trends(&self) -> Result<Vec<SeasonTrend>, TempcastError> {
        Ok(seasonal_trends(&seasonal_mean(&self.wide)?))
    }

    pub fn monthly_box_stats(&self) -> Result<Vec<BoxStats>, TempcastError> {
        Ok(monthly_box_stats(&self.long)?)
    }

    pub fn monthly_history(&self) -> Result<Vec<MonthHistory>, TempcastError> {
        Ok(monthly_history(&self.long)?)
    }

    pub fn timeline(&self) -> Result<Timeline, TempcastError> {
        Ok(timeline(&self.long)?)
    }

    /// Temperature histogram.
    ///
    /// * `.bins(usize)`: Optional. Number of equal-width bins. Defaults to `200`.
    #[builder]
    pub fn histogram(&self, bins: Option<usize>) -> Result<Histogram, TempcastError> {
        Ok(histogram(&self.long, bins.unwrap_or(DEFAULT_BINS))?)
    }

    /// K-Means inertia for each cluster count up to `max_clusters`.
    ///
    /// * `.max_clusters(usize)`: Optional. Defaults to `9`.
    /// * `.seed(u64)`: Optional. Makes the fits reproducible; unseeded by default.
    /// * `.max_iterations(u64)`, `.tolerance(f64)`, `.n_runs(usize)`: Optional. K-Means limits,
    ///   defaulting to `300`, `1e-4` and `10`.
    #[builder]
    pub fn elbow_curve(
        &self,
        max_clusters: Option<usize>,
        seed: Option<u64>,
        max_iterations: Option<u64>,
        tolerance: Option<f64>,
        n_runs: Option<usize>,
    ) -> Result<Vec<ElbowPoint>, TempcastError> {
        let settings = kmeans_settings(seed, max_iterations, tolerance, n_runs);
        Ok(elbow_curve(
            &self.long,
            max_clusters.unwrap_or(DEFAULT_MAX_CLUSTERS),
            &settings,
        )?)
    }

    /// The long table labeled by K-Means.
    ///
    /// * `.k(usize)`: Optional. Number of clusters. Defaults to `3`.
    /// * `.seed(u64)`, `.max_iterations(u64)`, `.tolerance(f64)`, `.n_runs(usize)`: Optional,
    ///   as for [`TemperatureExplorer::elbow_curve`].
    #[builder]
    pub fn labeled_clusters(
        &self,
        k: Option<usize>,
        seed: Option<u64>,
        max_iterations: Option<u64>,
        tolerance: Option<f64>,
        n_runs: Option<usize>,
    ) -> Result<ClusteredFrame, TempcastError> {
        let settings = kmeans_settings(seed, max_iterations, tolerance, n_runs);
        Ok(labeled_clusters(
            &self.long,
            k.unwrap_or(DEFAULT_CLUSTERS),
            &settings,
        )?)
    }

    /// Next-year forecast.
    ///
    /// * `.base_year(BaseYear)`: Optional. Defaults to [`BaseYear::Latest`].
    /// * `.test_fraction(f64)`: Optional. Held-out share of rows. Defaults to `0.3`.
    /// * `.seed(u64)`: Optional. Makes the split reproducible; unseeded by default.
    /// * `.max_depth(usize)`: Optional. Limits the tree depth; unlimited by default.
    #[builder]
    pub fn forecast(
        &self,
        base_year: Option<BaseYear>,
        test_fraction: Option<f64>,
        seed: Option<u64>,
        max_depth: Option<usize>,
    ) -> Result<ForecastResult, TempcastError> {
        let defaults = ForecastOptions::default();
        let options = ForecastOptions {
            test_fraction: test_fraction.unwrap_or(defaults.test_fraction),
            base_year: base_year.unwrap_or_default(),
            seed,
            tree: TreeParams {
                max_depth,
                ..TreeParams::default()
            },
        };
        Ok(forecast(&self.long, &options)?)
    }

    /// Runs every analysis with default options.
    ///
    /// * `.seed(u64)`: Optional. Seeds clustering and the forecast split.
    #[builder]
    pub fn report(&self, seed: Option<u64>) -> Result<AnalysisReport, TempcastError> {
        let seasonal = match seasonal_mean(&self.wide) {
            Ok(seasonal) => Some(seasonal),
            Err(AggregateError::MissingColumn(column)) => {
                warn!("Seasonal views skipped: column '{}' is missing", column);
                None
            }
            Err(e) => return Err(e.into()),
        };
        let histogram = match histogram(&self.long, DEFAULT_BINS) {
            Ok(histogram) => Some(histogram),
            Err(AggregateError::NoFiniteValues) => None,
            Err(e) => return Err(e.into()),
        };

        let settings = KMeansSettings {
            seed,
            ..KMeansSettings::default()
        };
        let elbow = match elbow_curve(&self.long, DEFAULT_MAX_CLUSTERS, &settings) {
            Ok(curve) => Some(curve),
            Err(ClusterError::InsufficientData { .. }) => None,
            Err(e) => return Err(e.into()),
        };
        let clusters = match labeled_clusters(&self.long, DEFAULT_CLUSTERS, &settings) {
            Ok(clustered) => Some(clustered.summary()?),
            Err(ClusterError::InsufficientData { required, distinct }) => {
                warn!(
                    "Clustering skipped: {} distinct temperatures for {} clusters",
                    distinct, required
                );
                None
            }
            Err(e) => return Err(e.into()),
        };

        let options = ForecastOptions {
            seed,
            ..ForecastOptions::default()
        };
        let forecast = match forecast(&self.long, &options) {
            Ok(result) => Some(result),
            Err(ForecastError::TooFewRows { rows }) => {
                warn!("Forecast skipped: only {} usable rows", rows);
                None
            }
            Err(e) => return Err(e.into()),
        };

        Ok(AnalysisReport {
            rows: self.wide.height(),
            columns: self.wide.column_names(),
            summary: describe(&self.wide)?,
            yearly_mean: yearly_mean(&self.wide)?,
            seasonal_trends: seasonal.as_deref().map(seasonal_trends),
            seasonal_mean: seasonal,
            histogram,
            monthly_box_stats: monthly_box_stats(&self.long)?,
            elbow_curve: elbow,
            clusters,
            forecast,
        })
    }
}
