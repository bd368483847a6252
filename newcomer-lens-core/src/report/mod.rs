//! Tabular report emitters.
//!
//! Every report is a list of rows implementing [`CsvRow`]; [`write_csv`]
//! renders them with a header line and [`write_json`] writes the optional
//! JSON companion next to the CSV file.

pub mod label;
pub mod language;
pub mod median;
pub mod pre_post;

pub use label::{label_comparison, LabelComparisonRow};
pub use language::{language_comparison, language_summary, LanguageComparisonRow, LanguageSummaryRow};
pub use median::{median_report, MedianRow};
pub use pre_post::{pre_post_report, PrePostRow};

use crate::compare::ComparisonResult;
use crate::stats::EffectMagnitude;
use crate::summary::Summary;
use newcomer_lens_common::{NewcomerLensError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

// --- report kinds ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    LabelComparison,
    PrePost,
    MedianLabeled,
    MedianUnlabeled,
    MedianAll,
    LanguageComparison,
    LanguageSummary,
}

impl ReportKind {
    pub const ALL: [Self; 7] = [
        Self::LabelComparison,
        Self::PrePost,
        Self::MedianLabeled,
        Self::MedianUnlabeled,
        Self::MedianAll,
        Self::LanguageComparison,
        Self::LanguageSummary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LabelComparison => "label-comparison",
            Self::PrePost => "pre-post",
            Self::MedianLabeled => "median-labeled",
            Self::MedianUnlabeled => "median-unlabeled",
            Self::MedianAll => "median-all",
            Self::LanguageComparison => "language-comparison",
            Self::LanguageSummary => "language-summary",
        }
    }

    pub fn default_file_name(&self) -> &'static str {
        match self {
            Self::LabelComparison => "label_vs_no_label.csv",
            Self::PrePost => "pre_vs_post_label.csv",
            Self::MedianLabeled => "median_split_labeled.csv",
            Self::MedianUnlabeled => "median_split_unlabeled.csv",
            Self::MedianAll => "median_split_all.csv",
            Self::LanguageComparison => "language_comparison.csv",
            Self::LanguageSummary => "language_summary.csv",
        }
    }
}

impl FromStr for ReportKind {
    type Err = NewcomerLensError;
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
                NewcomerLensError::Config(format!("unknown report kind: {s} (use {})", known.join(", ")))
            })
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- cell formatting ---

/// Wrap in quotes if the value contains a comma, quote, or newline.
pub fn escape(raw: &str) -> Cow<'_, str> {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        Cow::Owned(format!("\"{}\"", raw.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(raw)
    }
}

/// Scientific notation with 3 significant digits and a signed two-digit
/// exponent, e.g. `1.23E-04`.
pub fn format_p_value(p: f64) -> String {
    let raw = format!("{p:.2e}");
    match raw.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}E{sign}{:02}", exp.abs())
        }
        None => raw,
    }
}

pub fn format_delta(delta: f64) -> String {
    format!("{delta:.4}")
}

/// Blank when undefined.
pub fn optional<T: fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// The four test columns shared by every comparison report:
/// `p_value,identical,delta,effect_size`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonCells {
    pub p_value: Option<f64>,
    pub identical: Option<bool>,
    pub delta: Option<f64>,
    pub effect_size: Option<EffectMagnitude>,
}

impl ComparisonCells {
    pub fn cells(&self) -> [String; 4] {
        [
            self.p_value.map(format_p_value).unwrap_or_default(),
            optional(self.identical),
            self.delta.map(format_delta).unwrap_or_default(),
            optional(self.effect_size),
        ]
    }
}

impl From<Option<&ComparisonResult>> for ComparisonCells {
    fn from(result: Option<&ComparisonResult>) -> Self {
        match result {
            Some(r) => Self {
                p_value: Some(r.p_value),
                identical: Some(r.identical),
                delta: Some(r.delta),
                effect_size: Some(r.magnitude),
            },
            None => Self::default(),
        }
    }
}

pub(crate) fn summary_cell(summary: Option<&Summary>) -> String {
    summary.map(|s| s.to_string()).unwrap_or_default()
}

// --- writers ---

pub trait CsvRow: Serialize {
    const HEADER: &'static [&'static str];
    /// Already formatted and escaped, in `HEADER` order.
    fn cells(&self) -> Vec<String>;
}

pub fn write_csv<R: CsvRow>(path: &Path, rows: &[R]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{}", R::HEADER.join(","))?;
    for row in rows {
        writeln!(out, "{}", row.cells().join(","))?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
