//! Cumulative distribution lookup used by roulette-wheel selection.

use crate::error::{Result, SweepError};

/// Tolerance accepted on the final cumulative probability.
pub const CDF_TOLERANCE: f64 = 1e-9;

/// A validated, non-decreasing cumulative distribution ending at 1.
///
/// Validation happens once on construction; [`CumulativeDistribution::index_of`]
/// is then a plain binary search.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeDistribution {
    qs: Vec<f64>,
}

impl CumulativeDistribution {
    pub fn new(qs: Vec<f64>) -> Result<Self> {
        validate(&qs)?;
        Ok(Self { qs })
    }

    /// Normalizes non-negative weights into cumulative probabilities.
    pub fn from_weights(weights: &[f64]) -> Result<Self> {
        if weights.is_empty() {
            return Err(SweepError::Precondition(
                "cannot build a distribution from zero weights".to_string(),
            ));
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(SweepError::Precondition(format!(
                "selection weights must be finite and non-negative, got {}",
                bad
            )));
        }

        let mut running = 0.0;
        let prefix: Vec<f64> = weights
            .iter()
            .map(|w| {
                running += w;
                running
            })
            .collect();
        let total = running;
        if total <= 0.0 || !total.is_finite() {
            return Err(SweepError::Precondition(format!(
                "selection weights must have a finite positive sum, got {}",
                total
            )));
        }

        // Dividing non-decreasing prefix sums by the last one stays sorted
        // and cannot exceed 1.
        let mut qs: Vec<f64> = prefix.iter().map(|p| (p / total).min(1.0)).collect();
        if let Some(last) = qs.last_mut() {
            *last = 1.0;
        }

        Self::new(qs)
    }

    /// Smallest index `i` with `qs[i] >= r`; draws above the last element
    /// select the last index.
    pub fn index_of(&self, r: f64) -> usize {
        let idx = self.qs.partition_point(|&q| q < r);
        idx.min(self.qs.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.qs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.qs.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.qs
    }
}

/// `GetCDFIndex(r, qs)`: validates `qs` and returns the smallest index whose
/// cumulative probability reaches `r`.
///
/// Validation is linear; hot loops should build a [`CumulativeDistribution`]
/// once and call [`CumulativeDistribution::index_of`].
pub fn get_cdf_index(r: f64, qs: &[f64]) -> Result<usize> {
    validate(qs)?;
    let idx = qs.partition_point(|&q| q < r);
    Ok(idx.min(qs.len() - 1))
}

fn validate(qs: &[f64]) -> Result<()> {
    let last = match qs.last() {
        Some(last) => *last,
        None => {
            return Err(SweepError::Precondition(
                "cumulative distribution is empty".to_string(),
            ))
        }
    };

    if qs.iter().any(|q| !q.is_finite()) {
        return Err(SweepError::Precondition(
            "cumulative distribution contains non-finite values".to_string(),
        ));
    }
    if let Some(pos) = qs.windows(2).position(|w| w[1] < w[0]) {
        return Err(SweepError::Precondition(format!(
            "cumulative distribution is not sorted at index {}",
            pos + 1
        )));
    }
    if (last - 1.0).abs() > CDF_TOLERANCE {
        return Err(SweepError::Precondition(format!(
            "cumulative distribution must end at 1, ends at {}",
            last
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_of_picks_first_reaching_bucket() {
        let cdf = CumulativeDistribution::new(vec![0.2, 0.5, 0.5, 1.0]).unwrap();
        assert_eq!(cdf.index_of(0.0), 0);
        assert_eq!(cdf.index_of(0.2), 0);
        assert_eq!(cdf.index_of(0.21), 1);
        assert_eq!(cdf.index_of(0.5), 1);
        assert_eq!(cdf.index_of(0.51), 3);
    }

    #[test]
    fn test_from_weights_normalizes() {
        let cdf = CumulativeDistribution::from_weights(&[1.0, 1.0, 2.0]).unwrap();
        let qs = cdf.as_slice();
        assert!((qs[0] - 0.25).abs() < 1e-12);
        assert!((qs[1] - 0.5).abs() < 1e-12);
        assert_eq!(qs[2], 1.0);
    }

    #[test]
    fn test_zero_weight_is_never_selected() {
        let cdf = CumulativeDistribution::from_weights(&[1.0, 0.0, 1.0]).unwrap();
        for i in 0..100 {
            let r = i as f64 / 100.0;
            assert_ne!(cdf.index_of(r), 1);
        }
    }

    #[test]
    fn test_tiny_trailing_weight_stays_sorted() {
        // Large weights followed by the worst individual's weight `d`.
        let mut weights: Vec<f64> = (0..89).map(|i| 1.0e10 + i as f64 * 7.3e7).collect();
        weights.push(0.001);
        let cdf = CumulativeDistribution::from_weights(&weights).unwrap();
        let qs = cdf.as_slice();
        assert!(qs.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(qs[qs.len() - 1], 1.0);
        assert_eq!(cdf.index_of(0.0), 0);
    }

    #[test]
    fn test_from_weights_rejects_bad_input() {
        assert!(CumulativeDistribution::from_weights(&[]).is_err());
        assert!(CumulativeDistribution::from_weights(&[0.0, 0.0]).is_err());
        assert!(CumulativeDistribution::from_weights(&[1.0, -1.0]).is_err());
        assert!(CumulativeDistribution::from_weights(&[1.0, f64::NAN]).is_err());
    }
}
