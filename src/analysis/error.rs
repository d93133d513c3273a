use linfa_clustering::KMeansError;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Required column '{0}' not found")]
    MissingColumn(String),

    #[error("The table has no temperature columns to aggregate")]
    NoValueColumns,

    #[error("The table has no finite temperature values")]
    NoFiniteValues,

    #[error("A histogram needs at least one bin")]
    InvalidBinCount,

    #[error("Failed processing DataFrame: {0}")]
    Polars(#[from] PolarsError),
}

#[derive(Debug, Error)]
pub enum ClusterError {
    /// Fewer distinct finite temperatures than requested clusters.
    #[error("Clustering into {required} groups needs at least {required} distinct temperatures, found {distinct}")]
    InsufficientData { required: usize, distinct: usize },

    #[error("The number of clusters must be at least 1")]
    InvalidClusterCount,

    #[error("K-Means fitting failed")]
    KMeans(#[from] KMeansError),

    #[error("Failed processing DataFrame: {0}")]
    Polars(#[from] PolarsError),
}
