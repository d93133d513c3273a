//! Plain row types collected out of the frames and returned by the analyses.

use crate::types::season::Season;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the long (tidy) table: a single month of a single year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRecord {
    pub year: i32,
    /// The month label exactly as it appeared in the wide table header (e.g. `"JAN"`).
    pub month: String,
    /// Temperature reading; `NaN` when the source cell was empty.
    pub temperature: f64,
    /// First day of the month, synthesized from `month` and `year`.
    pub date: NaiveDate,
}

/// Mean temperature of one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearlyTemperature {
    pub year: i32,
    pub temperature: f64,
}

/// Mean temperature of one season in one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalTemperature {
    pub year: i32,
    pub season: Season,
    pub temperature: f64,
}
