use super::{summary_cell, ComparisonCells, CsvRow};
use crate::compare::Comparator;
use crate::corpus::Corpus;
use crate::partition::first_contribution_counts;
use crate::summary::{summarize_counts, Summary};
use serde::Serialize;

/// Labeled (treatment) against unlabeled (control) repositories.
#[derive(Debug, Clone, Serialize)]
pub struct LabelComparisonRow {
    #[serde(flatten)]
    pub comparison: ComparisonCells,
    pub summary_treatment: Option<Summary>,
    pub treatment_size: usize,
    pub summary_control: Option<Summary>,
    pub control_size: usize,
    // JSON only
    pub treatment_sample: Vec<u32>,
    pub control_sample: Vec<u32>,
}

impl CsvRow for LabelComparisonRow {
    const HEADER: &'static [&'static str] = &[
        "p_value",
        "identical",
        "delta",
        "effect_size",
        "summary_treatment",
        "treatment_size",
        "summary_control",
        "control_size",
    ];

    fn cells(&self) -> Vec<String> {
        let mut cells: Vec<String> = self.comparison.cells().into();
        cells.push(summary_cell(self.summary_treatment.as_ref()));
        cells.push(self.treatment_size.to_string());
        cells.push(summary_cell(self.summary_control.as_ref()));
        cells.push(self.control_size.to_string());
        cells
    }
}

/// Always exactly one row, with blank test cells when either side is empty.
pub fn label_comparison(corpus: &Corpus, comparator: &Comparator) -> Vec<LabelComparisonRow> {
    let treatment = first_contribution_counts(corpus.labeled());
    let control = first_contribution_counts(corpus.unlabeled());
    let result = comparator.compare(&treatment, &control);
    vec![LabelComparisonRow {
        comparison: result.as_ref().into(),
        summary_treatment: summarize_counts(&treatment).ok(),
        treatment_size: treatment.len(),
        summary_control: summarize_counts(&control).ok(),
        control_size: control.len(),
        treatment_sample: treatment,
        control_sample: control,
    }]
}
