use super::{summary_cell, ComparisonCells, CsvRow};
use crate::compare::Comparator;
use crate::corpus::RecordMap;
use crate::partition::{median_split, MedianAttribute};
use crate::summary::{summarize_counts, Summary};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct MedianRow {
    pub attribute: MedianAttribute,
    #[serde(flatten)]
    pub comparison: ComparisonCells,
    pub summary_above: Option<Summary>,
    pub above_size: usize,
    pub summary_below: Option<Summary>,
    pub below_size: usize,
}

impl CsvRow for MedianRow {
    const HEADER: &'static [&'static str] = &[
        "attribute",
        "p_value",
        "identical",
        "delta",
        "effect_size",
        "summary_above",
        "above_size",
        "summary_below",
        "below_size",
    ];

    fn cells(&self) -> Vec<String> {
        let mut cells = vec![self.attribute.to_string()];
        cells.extend(self.comparison.cells());
        cells.push(summary_cell(self.summary_above.as_ref()));
        cells.push(self.above_size.to_string());
        cells.push(summary_cell(self.summary_below.as_ref()));
        cells.push(self.below_size.to_string());
        cells
    }
}

/// One row per attribute, in the order given: above-median (treatment)
/// against below-median (control) first-contribution counts.
pub fn median_report(
    records: &RecordMap,
    attributes: &[MedianAttribute],
    comparator: &Comparator,
) -> Vec<MedianRow> {
    attributes
        .iter()
        .map(|&attribute| {
            let split = median_split(records, attribute);
            let result = comparator.compare(&split.above, &split.below);
            MedianRow {
                attribute,
                comparison: result.as_ref().into(),
                summary_above: summarize_counts(&split.above).ok(),
                above_size: split.above.len(),
                summary_below: summarize_counts(&split.below).ok(),
                below_size: split.below.len(),
            }
        })
        .collect()
}
