use super::{escape, summary_cell, ComparisonCells, CsvRow};
use crate::compare::Comparator;
use crate::corpus::RecordMap;
use crate::partition::{group_by_language, language_pairs};
use crate::summary::{summarize_counts, Summary};
use serde::Serialize;

// --- pairwise comparison ---

#[derive(Debug, Clone, Serialize)]
pub struct LanguageComparisonRow {
    pub language_a: String,
    pub language_b: String,
    #[serde(flatten)]
    pub comparison: ComparisonCells,
    pub summary_a: Option<Summary>,
    pub summary_b: Option<Summary>,
}

impl CsvRow for LanguageComparisonRow {
    const HEADER: &'static [&'static str] = &[
        "language_a",
        "language_b",
        "p_value",
        "identical",
        "delta",
        "effect_size",
        "summary_a",
        "summary_b",
    ];

    fn cells(&self) -> Vec<String> {
        let mut cells = vec![
            escape(&self.language_a).into_owned(),
            escape(&self.language_b).into_owned(),
        ];
        cells.extend(self.comparison.cells());
        cells.push(summary_cell(self.summary_a.as_ref()));
        cells.push(summary_cell(self.summary_b.as_ref()));
        cells
    }
}

/// One row per unordered pair of languages; `a` is the treatment.
pub fn language_comparison(records: &RecordMap, comparator: &Comparator) -> Vec<LanguageComparisonRow> {
    let groups = group_by_language(records);
    language_pairs(&groups)
        .into_iter()
        .map(|(a, b)| {
            let result = comparator.compare(&a.first_contributions, &b.first_contributions);
            LanguageComparisonRow {
                language_a: a.language.clone(),
                language_b: b.language.clone(),
                comparison: result.as_ref().into(),
                summary_a: summarize_counts(&a.first_contributions).ok(),
                summary_b: summarize_counts(&b.first_contributions).ok(),
            }
        })
        .collect()
}

// --- per-language summary ---

#[derive(Debug, Clone, Serialize)]
pub struct LanguageSummaryRow {
    pub language: String,
    pub summary: Option<Summary>,
    pub sample_size: usize,
    pub repositories: Vec<String>,
}

impl CsvRow for LanguageSummaryRow {
    const HEADER: &'static [&'static str] = &[
        "language",
        "min",
        "median",
        "mean",
        "max",
        "stddev",
        "sample_size",
        "repositories",
    ];

    fn cells(&self) -> Vec<String> {
        let mut cells = vec![escape(&self.language).into_owned()];
        match &self.summary {
            Some(s) => {
                let (min, median, mean, max, stddev) = s.as_tuple();
                cells.extend([min, median, mean, max, stddev].map(|v| format!("{v:.3}")));
            }
            None => cells.extend(std::iter::repeat(String::new()).take(5)),
        }
        cells.push(self.sample_size.to_string());
        cells.push(escape(&self.repositories.join(";")).into_owned());
        cells
    }
}

pub fn language_summary(records: &RecordMap) -> Vec<LanguageSummaryRow> {
    group_by_language(records)
        .into_iter()
        .map(|g| LanguageSummaryRow {
            summary: summarize_counts(&g.first_contributions).ok(),
            sample_size: g.first_contributions.len(),
            language: g.language,
            repositories: g.repositories,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;
    use crate::test_support::rec_with;

    fn corpus() -> Corpus {
        Corpus::from_records(vec![
            rec_with("a", "go", 1, 0),
            rec_with("b", "go", 3, 0),
            rec_with("c", "rust", 10, 0),
            rec_with("d", "c", 5, 0),
        ])
    }

    #[test]
    fn three_languages_give_three_pairs() {
        let rows = language_comparison(corpus().all(), &Comparator::default());
        assert_eq!(rows.len(), 3);
        let pairs: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.language_a.as_str(), r.language_b.as_str()))
            .collect();
        assert_eq!(pairs, vec![("c", "go"), ("c", "rust"), ("go", "rust")]);
        assert_eq!(rows[2].comparison.delta, Some(-1.0));
    }

    #[test]
    fn summary_lists_repositories() {
        let rows = language_summary(corpus().all());
        assert_eq!(rows.len(), 3);
        let go = &rows[1];
        assert_eq!(go.language, "go");
        assert_eq!(go.sample_size, 2);
        assert_eq!(
            go.cells(),
            vec!["go", "1.000", "2.000", "2.000", "3.000", "1.414", "2", "o/a;o/b"]
        );
    }

    #[test]
    fn empty_view_has_no_rows() {
        assert!(language_summary(&RecordMap::new()).is_empty());
        assert!(language_comparison(&RecordMap::new(), &Comparator::default()).is_empty());
    }
}
