use newcomer_lens_common::{NewcomerLensError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub min: f64,
    pub median: f64,
    pub mean: f64,
    pub max: f64,
    pub stddev: f64, // sample (n-1); 0 for a single value
    pub count: usize,
}

impl Summary {
    pub fn as_tuple(&self) -> (f64, f64, f64, f64, f64) {
        (self.min, self.median, self.mean, self.max, self.stddev)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Min={:.3};Median={:.3};Mean={:.3};Max={:.3};StdDev={:.3}",
            self.min, self.median, self.mean, self.max, self.stddev
        )
    }
}

fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

pub fn summarize(values: &[f64]) -> Result<Summary> {
    let n = values.len();
    if n == 0 {
        return Err(NewcomerLensError::EmptyInput);
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let stddev = if n > 1 {
        (sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    } else {
        0.0
    };
    Ok(Summary {
        min: sorted[0],
        median: median_sorted(&sorted),
        // clamp float noise so min <= mean <= max always holds
        mean: mean.clamp(sorted[0], sorted[n - 1]),
        max: sorted[n - 1],
        stddev,
        count: n,
    })
}

pub fn summarize_counts(values: &[u32]) -> Result<Summary> {
    let as_f64: Vec<f64> = values.iter().map(|&v| v as f64).collect();
    summarize(&as_f64)
}
