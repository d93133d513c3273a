//! Binary regression tree (CART) with the squared-error criterion.
//!
//! Every internal node compares a single feature against a threshold placed halfway between
//! two consecutive distinct values of that feature; rows with `x[feature] <= threshold` go
//! left. Leaves predict the mean target of the training rows that reached them.

use crate::forecast::error::ForecastError;
use ndarray::{Array2, ArrayView1};

/// Growth limits of a [`RegressionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeParams {
    /// `None` grows until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    /// Nodes with fewer rows than this become leaves.
    pub min_samples_split: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn n_leaves(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    root: Node,
    n_features: usize,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    /// `sum_left^2 / n_left + sum_right^2 / n_right`; larger means lower squared error.
    score: f64,
}

impl RegressionTree {
    /// Grows a tree on the rows of `x` with targets `y`.
    ///
    /// # Errors
    ///
    /// [`ForecastError::TooFewRows`] when there are no rows and
    /// [`ForecastError::ShapeMismatch`] when `x` and `y` disagree on the row count.
    pub fn fit(x: &Array2<f64>, y: &[f64], params: &TreeParams) -> Result<Self, ForecastError> {
        if x.nrows() != y.len() {
            return Err(ForecastError::ShapeMismatch {
                rows: x.nrows(),
                targets: y.len(),
            });
        }
        if y.is_empty() {
            return Err(ForecastError::TooFewRows { rows: 0 });
        }
        let indices: Vec<usize> = (0..y.len()).collect();
        Ok(Self {
            root: grow(x, y, indices, 0, params),
            n_features: x.ncols(),
        })
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Vec<f64> {
        x.rows().into_iter().map(|row| self.predict_row(row)).collect()
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn n_leaves(&self) -> usize {
        self.root.n_leaves()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

fn grow(x: &Array2<f64>, y: &[f64], indices: Vec<usize>, depth: usize, params: &TreeParams) -> Node {
    let n = indices.len() as f64;
    let sum: f64 = indices.iter().map(|&i| y[i]).sum();
    let mean = sum / n;
    let variance = indices.iter().map(|&i| (y[i] - mean).powi(2)).sum::<f64>() / n;

    let at_max_depth = params.max_depth.is_some_and(|max| depth >= max);
    if indices.len() < params.min_samples_split.max(2) || at_max_depth || variance <= f64::EPSILON {
        return Node::Leaf { value: mean };
    }

    let Some(best) = best_split(x, y, &indices) else {
        return Node::Leaf { value: mean };
    };
    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .into_iter()
        .partition(|&i| x[[i, best.feature]] <= best.threshold);

    Node::Split {
        feature: best.feature,
        threshold: best.threshold,
        left: Box::new(grow(x, y, left, depth + 1, params)),
        right: Box::new(grow(x, y, right, depth + 1, params)),
    }
}

/// Scans every feature for the threshold that minimises the children's squared error.
fn best_split(x: &Array2<f64>, y: &[f64], indices: &[usize]) -> Option<BestSplit> {
    let total: f64 = indices.iter().map(|&i| y[i]).sum();
    let n = indices.len();
    let mut best: Option<BestSplit> = None;

    for feature in 0..x.ncols() {
        let mut order = indices.to_vec();
        order.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

        let mut left_sum = 0.0;
        for pos in 0..n - 1 {
            left_sum += y[order[pos]];
            let here = x[[order[pos], feature]];
            let next = x[[order[pos + 1], feature]];
            if here == next {
                continue;
            }

            let n_left = (pos + 1) as f64;
            let n_right = (n - pos - 1) as f64;
            let right_sum = total - left_sum;
            let score = left_sum * left_sum / n_left + right_sum * right_sum / n_right;

            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(BestSplit {
                    feature,
                    threshold: here + (next - here) / 2.0,
                    score,
                });
            }
        }
    }
    best
}
