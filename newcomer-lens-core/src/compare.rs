use crate::stats::{cliffs_delta, mann_whitney, EffectMagnitude};
use crate::summary::{summarize, Summary};
use newcomer_lens_common::{NewcomerLensError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub delta: f64, // Cliff's delta of treatment against control
    pub magnitude: EffectMagnitude,
    pub p_value: f64,
    pub identical: bool,
    pub treatment: Summary,
    pub control: Summary,
}

/// Two-sample comparison: rank-sum p-value plus Cliff's delta.
#[derive(Debug, Clone, Copy)]
pub struct Comparator {
    significance_level: f64,
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Comparator {
    pub fn new(significance_level: f64) -> Self {
        Self { significance_level }
    }

    pub fn significance_level(&self) -> f64 {
        self.significance_level
    }

    /// `EmptyInput` when both samples are empty, `EmptyComparisonInput` when one is.
    pub fn try_compare<T: Copy + Into<f64>>(
        &self,
        treatment: &[T],
        control: &[T],
    ) -> Result<ComparisonResult> {
        match (treatment.is_empty(), control.is_empty()) {
            (true, true) => return Err(NewcomerLensError::EmptyInput),
            (true, false) | (false, true) => return Err(NewcomerLensError::EmptyComparisonInput),
            _ => {}
        }
        let t: Vec<f64> = treatment.iter().map(|&v| v.into()).collect();
        let c: Vec<f64> = control.iter().map(|&v| v.into()).collect();
        let test = mann_whitney(&t, &c).ok_or(NewcomerLensError::EmptyComparisonInput)?;
        let effect = cliffs_delta(&t, &c).ok_or(NewcomerLensError::EmptyComparisonInput)?;
        let identical = test.p_value >= self.significance_level;
        debug!(
            delta = effect.estimate,
            magnitude = %effect.magnitude,
            p_value = test.p_value,
            exact = test.exact,
            identical,
            "comparison"
        );
        Ok(ComparisonResult {
            delta: effect.estimate,
            magnitude: effect.magnitude,
            p_value: test.p_value,
            identical,
            treatment: summarize(&t)?,
            control: summarize(&c)?,
        })
    }

    /// `None` when either sample is empty (insufficient data, not a failure).
    pub fn compare<T: Copy + Into<f64>>(&self, treatment: &[T], control: &[T]) -> Option<ComparisonResult> {
        match self.try_compare(treatment, control) {
            Ok(r) => Some(r),
            Err(e) => {
                debug!("comparison skipped: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separated_samples_differ() {
        let r = Comparator::new(0.5).compare(&[4u32, 5, 6], &[1, 2, 3]).unwrap();
        assert_eq!(r.delta, 1.0);
        assert_eq!(r.magnitude, EffectMagnitude::Large);
        assert!((r.p_value - 0.1).abs() < 1e-12);
        assert!(!r.identical);
        assert_eq!(r.treatment.count, 3);
        assert_eq!(r.control.median, 2.0);
    }

    #[test]
    fn threshold_is_configurable() {
        let strict = Comparator::new(0.05).compare(&[4u32, 5, 6], &[1, 2, 3]).unwrap();
        assert!(strict.identical);
    }

    #[test]
    fn p_equal_to_threshold_counts_as_identical() {
        let r = Comparator::new(0.1).compare(&[4u32, 5, 6], &[1, 2, 3]).unwrap();
        assert!(r.identical);
    }

    #[test]
    fn empty_sides() {
        let c = Comparator::default();
        let empty: [u32; 0] = [];
        assert!(c.compare(&empty, &[1u32]).is_none());
        assert!(c.compare(&[1u32], &empty).is_none());
        assert!(matches!(c.try_compare(&empty, &empty), Err(NewcomerLensError::EmptyInput)));
        assert!(matches!(
            c.try_compare(&[1u32], &empty),
            Err(NewcomerLensError::EmptyComparisonInput)
        ));
    }

    #[test]
    fn swapping_sides_negates_delta() {
        let c = Comparator::default();
        let a = [3u32, 1, 4, 1, 5];
        let b = [9u32, 2, 6, 5, 3];
        let ab = c.compare(&a, &b).unwrap();
        let ba = c.compare(&b, &a).unwrap();
        assert_eq!(ab.delta, -ba.delta);
        assert_eq!(ab.p_value, ba.p_value);
    }

    #[test]
    fn default_threshold_is_half() {
        assert_eq!(Comparator::default().significance_level(), 0.5);
    }
}
