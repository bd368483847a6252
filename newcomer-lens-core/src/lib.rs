pub mod compare;
pub mod corpus;
pub mod orchestrator;
pub mod partition;
pub mod record;
pub mod report;
pub mod scanner;
pub mod stats;
pub mod summary;
#[cfg(test)]
pub(crate) mod test_support;

pub use newcomer_lens_common::{NewcomerLensError, Result};
pub use compare::{Comparator, ComparisonResult};
pub use corpus::{load_corpus, Corpus, CorpusView, LoadReport, RecordMap};
pub use orchestrator::{parse_kinds, run_report, run_reports, ExecutionMode, ReportOutcome, ReportPlan};
pub use partition::{
    first_contribution_counts, group_by_language, language_pairs, median_split, pre_post_entries,
    split_at_median, LanguageGroup, MedianAttribute, MedianSplit, PrePostEntry,
};
pub use record::{
    load_record_file, parse_date, parse_record, LabelFilter, LanguageResolver, LanguageStrategy,
    LoaderOptions, RepositoryRecord,
};
pub use report::{ReportKind, write_csv, write_json, CsvRow};
pub use scanner::scan_corpus_dir;
pub use stats::{cliffs_delta, mann_whitney, CliffsDelta, EffectMagnitude, RankSumTest};
pub use summary::{summarize, summarize_counts, Summary};
