use ndarray::Array2;
use std::collections::BTreeSet;

/// Feature encoding for the forecaster: the year as a number followed by one indicator
/// column per month label.
///
/// Labels are the distinct labels seen while fitting, sorted lexicographically. A label that
/// was not seen while fitting encodes as all zeros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthEncoder {
    labels: Vec<String>,
}

impl MonthEncoder {
    pub fn fit<'a>(months: impl IntoIterator<Item = &'a str>) -> Self {
        let labels: BTreeSet<&str> = months.into_iter().collect();
        Self {
            labels: labels.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of feature columns: the year plus one per label.
    pub fn width(&self) -> usize {
        self.labels.len() + 1
    }

    pub fn encode_row(&self, year: i32, month: &str) -> Vec<f64> {
        std::iter::once(year as f64)
            .chain(
                self.labels
                    .iter()
                    .map(|label| if label == month { 1.0 } else { 0.0 }),
            )
            .collect()
    }

    /// Encodes `(year, month)` rows into an `n x width` matrix.
    pub fn encode<'a>(&self, rows: impl IntoIterator<Item = (i32, &'a str)>) -> Array2<f64> {
        let mut values = Vec::new();
        let mut n = 0;
        for (year, month) in rows {
            values.extend(self.encode_row(year, month));
            n += 1;
        }
        Array2::from_shape_vec((n, self.width()), values)
            .unwrap_or_else(|_| Array2::zeros((0, self.width())))
    }
}
