//! K-Means clustering of the monthly temperatures.

use crate::analysis::error::ClusterError;
use crate::types::frames::long_frame::LongFrame;
use crate::utils::distinct_finite_count;
use linfa::prelude::*;
use linfa_clustering::KMeans;
use linfa_nn::distance::L2Dist;
use log::{debug, info};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::{Column, DataFrame, PolarsResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

/// Column added by [`labeled_clusters`].
pub const CLUSTER: &str = "Cluster";

/// Fitting parameters shared by the elbow scan and the labeling run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansSettings {
    pub max_iterations: u64,
    pub tolerance: f64,
    /// Number of k-means++ restarts; the run with the lowest inertia is kept.
    pub n_runs: usize,
    /// `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for KMeansSettings {
    fn default() -> Self {
        Self {
            max_iterations: 300,
            tolerance: 1e-4,
            n_runs: 10,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ElbowPoint {
    pub k: usize,
    /// Within-cluster sum of squared distances.
    pub inertia: f64,
}

/// The long table with a cluster label per row.
#[derive(Debug, Clone)]
pub struct ClusteredFrame {
    /// Long table plus a `Cluster` (UInt32) column, null for rows without a finite temperature.
    pub frame: DataFrame,
    /// Cluster centres, indexed by label.
    pub centroids: Vec<f64>,
    pub inertia: f64,
    pub k: usize,
}

/// Serializable digest of a [`ClusteredFrame`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub k: usize,
    pub centroids: Vec<f64>,
    pub sizes: Vec<usize>,
    pub inertia: f64,
}

impl ClusteredFrame {
    pub fn labels(&self) -> PolarsResult<Vec<Option<u32>>> {
        Ok(self.frame.column(CLUSTER)?.u32()?.into_iter().collect())
    }

    /// Number of rows per label.
    pub fn cluster_sizes(&self) -> PolarsResult<Vec<usize>> {
        let mut sizes = vec![0; self.k];
        for label in self.labels()?.into_iter().flatten() {
            if let Some(size) = sizes.get_mut(label as usize) {
                *size += 1;
            }
        }
        Ok(sizes)
    }

    pub fn summary(&self) -> PolarsResult<ClusterSummary> {
        Ok(ClusterSummary {
            k: self.k,
            centroids: self.centroids.clone(),
            sizes: self.cluster_sizes()?,
            inertia: self.inertia,
        })
    }
}

struct FittedClusters {
    labels: Array1<usize>,
    centroids: Array2<f64>,
    inertia: f64,
}

fn rng_for(settings: &KMeansSettings, k: usize) -> StdRng {
    match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(k as u64)),
        None => StdRng::from_entropy(),
    }
}

/// Finite temperatures as an `n x 1` observation matrix, with the frame row of each.
fn finite_observations(long: &LongFrame) -> PolarsResult<(Array2<f64>, Vec<usize>)> {
    let (rows, values): (Vec<usize>, Vec<f64>) = long
        .temperatures()?
        .into_iter()
        .enumerate()
        .filter(|(_, t)| t.is_finite())
        .unzip();
    Ok((Array1::from_vec(values).insert_axis(Axis(1)), rows))
}

fn fit(
    observations: &Array2<f64>,
    k: usize,
    settings: &KMeansSettings,
) -> Result<FittedClusters, ClusterError> {
    let dataset = DatasetBase::from(observations.clone());
    let model = KMeans::params_with(k, rng_for(settings, k), L2Dist)
        .max_n_iterations(settings.max_iterations)
        .tolerance(settings.tolerance)
        .n_runs(settings.n_runs)
        .fit(&dataset)?;

    let labels: Array1<usize> = model.predict(observations);
    let centroids = model.centroids().clone();
    let inertia = compute_inertia(observations, &labels, &centroids);
    Ok(FittedClusters {
        labels,
        centroids,
        inertia,
    })
}

fn compute_inertia(features: &Array2<f64>, labels: &Array1<usize>, centroids: &Array2<f64>) -> f64 {
    labels
        .iter()
        .enumerate()
        .filter(|(_, cluster)| **cluster < centroids.nrows())
        .map(|(i, &cluster)| {
            features
                .row(i)
                .iter()
                .zip(centroids.row(cluster).iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
        })
        .sum()
}

/// Inertia of k-means fits for `k = 1..=max_clusters`, for choosing k by the elbow method.
///
/// Only finite temperatures take part. When `k` reaches the number of distinct temperatures
/// every value can sit on its own centre, so the inertia is reported as exactly `0.0`
/// without fitting.
///
/// # Errors
///
/// [`ClusterError::InvalidClusterCount`] when `max_clusters` is zero and
/// [`ClusterError::InsufficientData`] when there is no finite temperature at all.
pub fn elbow_curve(
    long: &LongFrame,
    max_clusters: usize,
    settings: &KMeansSettings,
) -> Result<Vec<ElbowPoint>, ClusterError> {
    if max_clusters == 0 {
        return Err(ClusterError::InvalidClusterCount);
    }
    let (observations, _) = finite_observations(long)?;
    let distinct = distinct_finite_count(&observations.column(0).to_vec());
    if distinct == 0 {
        return Err(ClusterError::InsufficientData {
            required: 1,
            distinct,
        });
    }

    let mut curve = Vec::with_capacity(max_clusters);
    for k in 1..=max_clusters {
        let inertia = if k >= distinct {
            0.0
        } else {
            fit(&observations, k, settings)?.inertia
        };
        debug!("k = {}: inertia {:.4}", k, inertia);
        curve.push(ElbowPoint { k, inertia });
    }
    Ok(curve)
}

/// Fits k-means with `k` clusters and labels every row of the long table.
///
/// Label numbers carry no ordering meaning; `0` is not necessarily the coldest group.
///
/// # Errors
///
/// [`ClusterError::InvalidClusterCount`] for `k == 0`, [`ClusterError::InsufficientData`] when
/// there are fewer than `k` distinct finite temperatures.
pub fn labeled_clusters(
    long: &LongFrame,
    k: usize,
    settings: &KMeansSettings,
) -> Result<ClusteredFrame, ClusterError> {
    if k == 0 {
        return Err(ClusterError::InvalidClusterCount);
    }
    let (observations, rows) = finite_observations(long)?;
    let distinct = distinct_finite_count(&observations.column(0).to_vec());
    if distinct < k {
        return Err(ClusterError::InsufficientData {
            required: k,
            distinct,
        });
    }

    let fitted = fit(&observations, k, settings)?;

    let mut labels: Vec<Option<u32>> = vec![None; long.height()];
    for (row, label) in rows.into_iter().zip(fitted.labels.iter()) {
        labels[row] = Some(*label as u32);
    }
    let mut frame = long.frame.clone();
    frame.with_column(Column::new(CLUSTER.into(), labels))?;

    info!(
        "Clustered {} temperatures into {} groups (inertia {:.4})",
        observations.nrows(),
        k,
        fitted.inertia
    );
    Ok(ClusteredFrame {
        frame,
        centroids: fitted.centroids.column(0).to_vec(),
        inertia: fitted.inertia,
        k,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{constant_csv, seasonal_csv};
    use crate::types::records::LongRecord;
    use crate::{load_bytes, reshape};
    use chrono::NaiveDate;

    fn seeded() -> KMeansSettings {
        KMeansSettings {
            seed: Some(42),
            ..KMeansSettings::default()
        }
    }

    /// Nine tight groups of readings far apart from each other.
    fn separated_groups() -> Result<LongFrame, Box<dyn std::error::Error>> {
        let mut records = Vec::new();
        for group in 0..9 {
            for offset in 0..4 {
                let year = 1900 + group * 4 + offset;
                records.push(LongRecord {
                    year,
                    month: "JAN".to_string(),
                    temperature: group as f64 * 10.0 + offset as f64 * 0.1,
                    date: NaiveDate::from_ymd_opt(year, 1, 1).ok_or("date")?,
                });
            }
        }
        Ok(LongFrame::from_records(&records)?)
    }

    #[test]
    fn test_elbow_curve_is_non_increasing() -> Result<(), Box<dyn std::error::Error>> {
        let curve = elbow_curve(&separated_groups()?, 9, &seeded())?;

        assert_eq!(curve.iter().map(|p| p.k).collect::<Vec<_>>(), (1..=9).collect::<Vec<_>>());
        for pair in curve.windows(2) {
            assert!(
                pair[1].inertia <= pair[0].inertia + 1e-9,
                "inertia rose from k={} to k={}",
                pair[0].k,
                pair[1].k
            );
        }
        assert!(curve[8].inertia < 1.0);
        Ok(())
    }

    #[test]
    fn test_elbow_curve_on_constant_data_is_zero() -> Result<(), Box<dyn std::error::Error>> {
        let long = reshape(&load_bytes(constant_csv(&[2015, 2016, 2017], 25.0).as_bytes())?)?;
        let curve = elbow_curve(&long, 9, &KMeansSettings::default())?;
        assert_eq!(curve.len(), 9);
        assert!(curve.iter().all(|p| p.inertia == 0.0));
        Ok(())
    }

    #[test]
    fn test_labeled_clusters_assigns_every_row() -> Result<(), Box<dyn std::error::Error>> {
        let long = reshape(&load_bytes(seasonal_csv(1950..=1970).as_bytes())?)?;
        let clustered = labeled_clusters(&long, 3, &seeded())?;

        assert_eq!(clustered.frame.height(), long.height());
        let labels = clustered.labels()?;
        assert!(labels.iter().all(|l| matches!(l, Some(label) if *label < 3)));
        assert_eq!(clustered.cluster_sizes()?.iter().sum::<usize>(), long.height());
        assert_eq!(clustered.centroids.len(), 3);
        assert!(long.frame.column(CLUSTER).is_err(), "input frame must stay unchanged");
        Ok(())
    }

    #[test]
    fn test_labeled_clusters_leaves_missing_rows_unlabeled(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let wide = load_bytes(b"YEAR,JAN,FEB\n2001,1.0,\n2002,10.0,20.0\n2003,30.0,40.0\n")?;
        let clustered = labeled_clusters(&reshape(&wide)?, 2, &seeded())?;
        let labels = clustered.labels()?;
        assert_eq!(labels.iter().filter(|l| l.is_none()).count(), 1);
        assert_eq!(labels.iter().flatten().count(), 5);
        Ok(())
    }

    #[test]
    fn test_labeled_clusters_rejects_too_few_distinct_values(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let long = reshape(&load_bytes(constant_csv(&[2015, 2016], 25.0).as_bytes())?)?;
        match labeled_clusters(&long, 3, &seeded()) {
            Err(ClusterError::InsufficientData { required, distinct }) => {
                assert_eq!((required, distinct), (3, 1));
            }
            other => panic!("expected InsufficientData, got {other:?}"),
        }
        assert!(matches!(
            labeled_clusters(&long, 0, &seeded()),
            Err(ClusterError::InvalidClusterCount)
        ));
        Ok(())
    }
}
