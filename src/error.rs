use crate::analysis::error::{AggregateError, ClusterError};
use crate::forecast::error::ForecastError;
use crate::loader::error::LoadError;
use crate::reshape::error::ReshapeError;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TempcastError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Reshape(#[from] ReshapeError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error("Failed processing DataFrame: {0}")]
    Polars(#[from] PolarsError),

    #[error("Failed to serialize the analysis report")]
    Json(#[from] serde_json::Error),
}
