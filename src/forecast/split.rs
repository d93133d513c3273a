use crate::forecast::error::ForecastError;
use rand::seq::SliceRandom;
use rand::Rng;

/// Row indices of a shuffled train/evaluation split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffles `0..n_rows` and takes the first `ceil(test_fraction * n_rows)` indices for
/// evaluation and the rest for training.
///
/// # Errors
///
/// [`ForecastError::InvalidTestFraction`] unless `0 < test_fraction < 1`, and
/// [`ForecastError::TooFewRows`] when either side would be empty.
pub fn train_test_split<R: Rng + ?Sized>(
    n_rows: usize,
    test_fraction: f64,
    rng: &mut R,
) -> Result<TrainTestSplit, ForecastError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(ForecastError::InvalidTestFraction(test_fraction));
    }
    let n_test = (test_fraction * n_rows as f64).ceil() as usize;
    if n_test == 0 || n_test >= n_rows {
        return Err(ForecastError::TooFewRows { rows: n_rows });
    }

    let mut indices: Vec<usize> = (0..n_rows).collect();
    indices.shuffle(rng);
    let train = indices.split_off(n_test);
    Ok(TrainTestSplit {
        train,
        test: indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_split_sizes_round_the_test_side_up() -> Result<(), Box<dyn std::error::Error>> {
        let mut rng = StdRng::seed_from_u64(7);
        let split = train_test_split(36, 0.3, &mut rng)?;
        assert_eq!((split.train.len(), split.test.len()), (25, 11));

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..36).collect::<Vec<_>>());

        let split = train_test_split(2, 0.3, &mut rng)?;
        assert_eq!((split.train.len(), split.test.len()), (1, 1));
        Ok(())
    }

    #[test]
    fn test_split_is_reproducible_with_a_seed() -> Result<(), Box<dyn std::error::Error>> {
        let a = train_test_split(50, 0.3, &mut StdRng::seed_from_u64(1))?;
        let b = train_test_split(50, 0.3, &mut StdRng::seed_from_u64(1))?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn test_split_rejects_bad_input() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            train_test_split(1, 0.3, &mut rng),
            Err(ForecastError::TooFewRows { rows: 1 })
        ));
        for fraction in [0.0, 1.0, -0.2, f64::NAN] {
            assert!(matches!(
                train_test_split(10, fraction, &mut rng),
                Err(ForecastError::InvalidTestFraction(_))
            ));
        }
    }
}
