use super::{escape, summary_cell, ComparisonCells, CsvRow};
use crate::compare::Comparator;
use crate::corpus::RecordMap;
use crate::partition::pre_post_entries;
use crate::summary::{summarize_counts, Summary};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PrePostRow {
    pub repository: String,
    pub owner: String,
    pub language: String, // upper-cased
    pub label: Option<String>,
    #[serde(flatten)]
    pub comparison: ComparisonCells,
    pub discard: bool,
    pub summary_pre: Option<Summary>,
    pub summary_post: Option<Summary>,
}

impl CsvRow for PrePostRow {
    const HEADER: &'static [&'static str] = &[
        "repository",
        "owner",
        "language",
        "label",
        "p_value",
        "identical",
        "delta",
        "effect_size",
        "discard",
        "summary_pre",
        "summary_post",
    ];

    fn cells(&self) -> Vec<String> {
        let mut cells = vec![
            escape(&self.repository).into_owned(),
            escape(&self.owner).into_owned(),
            escape(&self.language).into_owned(),
            self.label.as_deref().map(|l| escape(l).into_owned()).unwrap_or_default(),
        ];
        cells.extend(self.comparison.cells());
        cells.push(self.discard.to_string());
        cells.push(summary_cell(self.summary_pre.as_ref()));
        cells.push(summary_cell(self.summary_post.as_ref()));
        cells
    }
}

/// One row per labeled repository: post-label weeks (treatment) against
/// pre-label weeks (control). Discarded repositories are listed with blank
/// numeric fields.
pub fn pre_post_report(records: &RecordMap, comparator: &Comparator) -> Vec<PrePostRow> {
    pre_post_entries(records)
        .into_iter()
        .map(|e| {
            let (result, summary_pre, summary_post) = if e.discard {
                (None, None, None)
            } else {
                (
                    comparator.compare(e.post, e.pre),
                    summarize_counts(e.pre).ok(),
                    summarize_counts(e.post).ok(),
                )
            };
            PrePostRow {
                repository: e.repository.to_owned(),
                owner: e.owner.to_owned(),
                language: e.language.to_uppercase(),
                label: e.label.map(str::to_owned),
                comparison: result.as_ref().into(),
                discard: e.discard,
                summary_pre,
                summary_post,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;
    use crate::test_support::{rec, rec_split};

    #[test]
    fn discarded_row_is_blank_but_present() {
        let corpus = Corpus::from_records(vec![
            rec_split("a", vec![1, 2], vec![3, 4], true),
            rec("b", false),
        ]);
        let rows = pre_post_report(corpus.labeled(), &Comparator::default());
        assert_eq!(rows.len(), 1);
        let cells = rows[0].cells();
        assert_eq!(cells[0], "o/a");
        assert_eq!(cells[2], "GO");
        assert_eq!(cells[3], "good first issue");
        assert!(cells[4..8].iter().all(|c| c.is_empty()));
        assert_eq!(cells[8], "true");
        assert!(cells[9].is_empty() && cells[10].is_empty());
    }

    #[test]
    fn kept_row_compares_post_against_pre() {
        let corpus = Corpus::from_records(vec![rec_split("a", vec![0, 1, 0], vec![5, 6, 7], false)]);
        let rows = pre_post_report(corpus.all(), &Comparator::default());
        let row = &rows[0];
        assert_eq!(row.comparison.delta, Some(1.0));
        assert_eq!(row.comparison.identical, Some(false));
        assert_eq!(row.summary_post.map(|s| s.max), Some(7.0));
    }

    #[test]
    fn empty_side_leaves_comparison_blank() {
        let corpus = Corpus::from_records(vec![rec_split("a", vec![], vec![1], false)]);
        let rows = pre_post_report(corpus.all(), &Comparator::default());
        assert_eq!(rows[0].comparison, ComparisonCells::default());
        assert!(rows[0].summary_pre.is_none());
        assert!(rows[0].summary_post.is_some());
    }
}
