//! Nonparametric two-sample statistics.
//!
//! [`mann_whitney`] follows R's `wilcox.test` for unpaired samples: the exact
//! null distribution when both samples have fewer than 50 observations and no
//! ties, otherwise the normal approximation with tie and continuity correction.
//! [`cliffs_delta`] uses the magnitude thresholds of R's `effsize` package.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sample size below which the exact rank-sum distribution is used.
const EXACT_LIMIT: usize = 50;

// ── ranking ────────────────────────────────────────────────────────────────

/// 1-based ranks; tied values share the average of their ranks.
pub fn rank_average(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut indexed: Vec<(f64, usize)> = values.iter().copied().zip(0..n).collect();
    indexed.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && indexed[j].0.total_cmp(&indexed[i].0).is_eq() {
            j += 1;
        }
        // ranks i+1 ..= j share their mean
        let avg = (i + 1 + j) as f64 / 2.0;
        for item in &indexed[i..j] {
            ranks[item.1] = avg;
        }
        i = j;
    }
    ranks
}

/// Sizes of each group of tied values (only groups larger than one).
fn tie_groups(values: &[f64]) -> Vec<usize> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mut groups = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && sorted[j].total_cmp(&sorted[i]).is_eq() {
            j += 1;
        }
        if j - i > 1 {
            groups.push(j - i);
        }
        i = j;
    }
    groups
}

// ── Mann-Whitney / Wilcoxon rank-sum ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankSumTest {
    /// W = R₁ − m(m+1)/2 for the first sample.
    pub statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    pub exact: bool,
}

/// Unpaired Wilcoxon rank-sum test. `None` when either sample is empty.
pub fn mann_whitney(x: &[f64], y: &[f64]) -> Option<RankSumTest> {
    if x.is_empty() || y.is_empty() {
        return None;
    }
    let m = x.len();
    let n = y.len();
    let mut combined = Vec::with_capacity(m + n);
    combined.extend_from_slice(x);
    combined.extend_from_slice(y);
    let ranks = rank_average(&combined);
    let r1: f64 = ranks[..m].iter().sum();
    let w = r1 - (m * (m + 1)) as f64 / 2.0;
    let mn = (m * n) as f64;

    let ties = tie_groups(&combined);
    if m < EXACT_LIMIT && n < EXACT_LIMIT && ties.is_empty() {
        // untied, so w is integral
        let q = w.min(mn - w).round() as usize;
        let p = (2.0 * exact_lower_tail(q, m, n)).min(1.0);
        return Some(RankSumTest {
            statistic: w,
            p_value: p,
            exact: true,
        });
    }

    let total = (m + n) as f64;
    let tie_term: f64 = ties
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum::<f64>()
        / (total * (total - 1.0));
    let sigma = (mn / 12.0 * ((total + 1.0) - tie_term)).sqrt();
    let p = if sigma > 0.0 {
        let dz = w - mn / 2.0;
        let correction = 0.5 * sign(dz);
        let z = (dz - correction) / sigma;
        erfc(z.abs() / std::f64::consts::SQRT_2).min(1.0)
    } else {
        1.0 // every observation tied
    };
    Some(RankSumTest {
        statistic: w,
        p_value: p,
        exact: false,
    })
}

fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// P(W ≤ q) under the null for sample sizes `m`, `n`.
///
/// The counts of W are the coefficients of the Gaussian binomial
/// `[m+n choose m]_q`, built as ∏ (1 − q^(n+i)) / (1 − q^i) in exact integers.
fn exact_lower_tail(q: usize, m: usize, n: usize) -> f64 {
    let max = m * n;
    let mut coeffs = vec![0i128; max + 1];
    coeffs[0] = 1;
    for i in 1..=m {
        let up = n + i;
        for k in (up..=max).rev() {
            coeffs[k] -= coeffs[k - up];
        }
        for k in i..=max {
            coeffs[k] += coeffs[k - i];
        }
    }
    let total: i128 = coeffs.iter().sum();
    let below: i128 = coeffs[..=q.min(max)].iter().sum();
    below as f64 / total as f64
}

/// Complementary error function (Chebyshev fit, fractional error < 1.2e-7
/// everywhere, so small tail p-values keep their precision).
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.26551223
        + t * (1.00002368
            + t * (0.37409196
                + t * (0.09678418
                    + t * (-0.18628806
                        + t * (0.27886807
                            + t * (-1.13520398
                                + t * (1.48851587 + t * (-0.82215223 + t * 0.17087277))))))));
    let ans = t * poly.exp();
    if x >= 0.0 {
        ans
    } else {
        2.0 - ans
    }
}

// ── Cliff's delta ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectMagnitude {
    Negligible,
    Small,
    Medium,
    Large,
}

impl EffectMagnitude {
    pub fn from_delta(delta: f64) -> Self {
        let d = delta.abs();
        if d < 0.147 {
            Self::Negligible
        } else if d < 0.33 {
            Self::Small
        } else if d < 0.474 {
            Self::Medium
        } else {
            Self::Large
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negligible => "negligible",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl fmt::Display for EffectMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliffsDelta {
    pub estimate: f64,
    pub magnitude: EffectMagnitude,
}

/// Cliff's delta of `x` against `y`, in [-1, 1]. `None` when either sample is empty.
pub fn cliffs_delta(x: &[f64], y: &[f64]) -> Option<CliffsDelta> {
    if x.is_empty() || y.is_empty() {
        return None;
    }
    let mut greater = 0i64;
    let mut less = 0i64;
    for a in x {
        for b in y {
            if a > b {
                greater += 1;
            } else if a < b {
                less += 1;
            }
        }
    }
    let estimate = (greater - less) as f64 / (x.len() * y.len()) as f64;
    Some(CliffsDelta {
        estimate,
        magnitude: EffectMagnitude::from_delta(estimate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn ranks_average_ties() {
        assert_eq!(rank_average(&[10.0, 20.0, 20.0, 30.0]), vec![1.0, 2.5, 2.5, 4.0]);
        assert_eq!(rank_average(&[3.0, 1.0, 2.0]), vec![3.0, 1.0, 2.0]);
        assert!(rank_average(&[]).is_empty());
    }

    #[test]
    fn tie_groups_only_counts_repeats() {
        assert_eq!(tie_groups(&[1.0, 2.0, 2.0, 3.0, 3.0, 3.0]), vec![2, 3]);
        assert!(tie_groups(&[1.0, 2.0]).is_empty());
    }

    #[test]
    fn exact_fully_separated_three_by_three() {
        // R: wilcox.test(c(1,2,3), c(4,5,6)) -> W = 0, p-value = 0.1
        let t = mann_whitney(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap();
        assert!(t.exact);
        assert_eq!(t.statistic, 0.0);
        assert!(close(t.p_value, 0.1, 1e-12));
    }

    #[test]
    fn exact_fully_separated_five_by_five() {
        // 2 / C(10, 5)
        let t = mann_whitney(&[6.0, 7.0, 8.0, 9.0, 10.0], &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(t.statistic, 25.0);
        assert!(close(t.p_value, 2.0 / 252.0, 1e-12));
    }

    #[test]
    fn exact_interleaved_is_one() {
        let t = mann_whitney(&[1.0, 4.0], &[2.0, 3.0]).unwrap();
        assert!(close(t.p_value, 1.0, 1e-12));
    }

    #[test]
    fn exact_tail_sums_to_one() {
        assert!(close(exact_lower_tail(12, 4, 3), 1.0, 1e-12));
        assert!(close(exact_lower_tail(0, 4, 3), 1.0 / 35.0, 1e-12));
    }

    #[test]
    fn ties_use_normal_approximation() {
        let t = mann_whitney(&[1.0, 1.0, 2.0, 3.0], &[2.0, 4.0, 4.0, 5.0]).unwrap();
        assert!(!t.exact);
        assert!(t.p_value > 0.0 && t.p_value <= 1.0);
    }

    #[test]
    fn all_tied_gives_p_one() {
        let t = mann_whitney(&[1.0, 1.0], &[1.0, 1.0, 1.0]).unwrap();
        assert_eq!(t.p_value, 1.0);
    }

    #[test]
    fn large_samples_approximate() {
        let x: Vec<f64> = (0..60).map(|v| v as f64).collect();
        let y: Vec<f64> = (30..90).map(|v| v as f64).collect();
        let t = mann_whitney(&x, &y).unwrap();
        assert!(!t.exact);
        assert!(t.p_value < 1e-4);
    }

    #[test]
    fn empty_side_is_none() {
        assert!(mann_whitney(&[], &[1.0]).is_none());
        assert!(mann_whitney(&[1.0], &[]).is_none());
        assert!(cliffs_delta(&[], &[]).is_none());
    }

    #[test]
    fn erfc_reference_points() {
        assert!(close(erfc(0.0), 1.0, 1e-7));
        assert!(close(erfc(1.0), 0.157_299_207, 1e-7));
        assert!(close(erfc(-1.0), 1.842_700_793, 1e-7));
        assert!(erfc(10.0) < 1e-40);
    }

    #[test]
    fn cliffs_delta_extremes() {
        let d = cliffs_delta(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap();
        assert_eq!(d.estimate, -1.0);
        assert_eq!(d.magnitude, EffectMagnitude::Large);
        let d = cliffs_delta(&[1.0, 2.0], &[1.0, 2.0]).unwrap();
        assert_eq!(d.estimate, 0.0);
        assert_eq!(d.magnitude, EffectMagnitude::Negligible);
    }

    #[test]
    fn magnitude_thresholds() {
        assert_eq!(EffectMagnitude::from_delta(0.146), EffectMagnitude::Negligible);
        assert_eq!(EffectMagnitude::from_delta(-0.2), EffectMagnitude::Small);
        assert_eq!(EffectMagnitude::from_delta(0.4), EffectMagnitude::Medium);
        assert_eq!(EffectMagnitude::from_delta(0.474), EffectMagnitude::Large);
        assert_eq!(EffectMagnitude::Medium.to_string(), "medium");
    }
}
