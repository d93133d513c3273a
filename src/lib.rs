mod analysis;
mod error;
mod explorer;
mod forecast;
mod loader;
mod reshape;
mod types;
mod utils;

#[cfg(test)]
mod test_support;

pub use error::TempcastError;
pub use explorer::*;

pub use loader::csv_loader::{load_bytes, load_path};
pub use loader::error::LoadError;

pub use reshape::error::ReshapeError;
pub use reshape::reshape;

pub use types::frames::long_frame::*;
pub use types::frames::wide_frame::*;
pub use types::month::{parse_month_date, MONTH_COLUMNS, YEAR_COLUMN};
pub use types::records::*;
pub use types::season::Season;

pub use analysis::aggregate::*;
pub use analysis::cluster::*;
pub use analysis::describe::*;
pub use analysis::error::{AggregateError, ClusterError};
pub use analysis::trend::*;

pub use forecast::encoding::MonthEncoder;
pub use forecast::error::ForecastError;
pub use forecast::forecaster::*;
pub use forecast::metrics::r2_score;
pub use forecast::split::{train_test_split, TrainTestSplit};
pub use forecast::tree::{RegressionTree, TreeParams};
