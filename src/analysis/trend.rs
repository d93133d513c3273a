//! Ordinary least squares trend lines through the seasonal means.

use crate::forecast::metrics::r2_score;
use crate::types::records::SeasonalTemperature;
use crate::types::season::Season;
use serde::Serialize;

/// Fits `temperature = intercept + slope * year`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearTrend {
    /// Degrees per year.
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearTrend {
    /// Least squares fit; `None` with fewer than two points or a single distinct year.
    pub fn fit(points: &[(f64, f64)]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as f64;
        let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;
        let sxx: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
        let sxy: f64 = points
            .iter()
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();

        if sxx.abs() < f64::EPSILON {
            return None;
        }
        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let actual: Vec<f64> = points.iter().map(|&(_, y)| y).collect();
        let fitted: Vec<f64> = points.iter().map(|&(x, _)| intercept + slope * x).collect();
        Some(Self {
            slope,
            intercept,
            r_squared: r2_score(&actual, &fitted),
        })
    }

    pub fn predict(&self, year: f64) -> f64 {
        self.intercept + self.slope * year
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeasonTrend {
    pub season: Season,
    /// `None` when the season has too few finite points for a line.
    pub trend: Option<LinearTrend>,
}

/// One trend line per season, in [`Season::ALL`] order. Non-finite means are skipped.
pub fn seasonal_trends(seasonal: &[SeasonalTemperature]) -> Vec<SeasonTrend> {
    Season::ALL
        .into_iter()
        .map(|season| {
            let points: Vec<(f64, f64)> = seasonal
                .iter()
                .filter(|s| s.season == season && s.temperature.is_finite())
                .map(|s| (s.year as f64, s.temperature))
                .collect();
            SeasonTrend {
                season,
                trend: LinearTrend::fit(&points),
            }
        })
        .collect()
}
