use crate::compare::Comparator;
use crate::corpus::{Corpus, CorpusView};
use crate::partition::MedianAttribute;
use crate::report::{self, CsvRow, ReportKind};
use newcomer_lens_common::{Config, NewcomerLensError, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Parallel,
    Sequential,
}

impl ExecutionMode {
    pub fn from_parallel(parallel: bool) -> Self {
        if parallel {
            Self::Parallel
        } else {
            Self::Sequential
        }
    }
}

/// What to write and where.
#[derive(Debug, Clone)]
pub struct ReportPlan {
    pub output_dir: PathBuf,
    pub kinds: Vec<ReportKind>,
    pub file_names: BTreeMap<ReportKind, String>,
    pub median_attributes: Vec<MedianAttribute>,
    pub comparator: Comparator,
    pub json: bool,
}

impl ReportPlan {
    /// Every report kind with default file names.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            kinds: ReportKind::ALL.to_vec(),
            file_names: BTreeMap::new(),
            median_attributes: MedianAttribute::ALL.to_vec(),
            comparator: Comparator::default(),
            json: false,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let kinds = if config.reports.enabled.is_empty() {
            ReportKind::ALL.to_vec()
        } else {
            parse_kinds(&config.reports.enabled)?
        };
        let mut file_names = BTreeMap::new();
        for (kind, name) in &config.reports.file_names {
            file_names.insert(kind.parse::<ReportKind>()?, name.clone());
        }
        let median_attributes = config
            .analysis
            .median_attributes
            .iter()
            .map(|a| a.parse::<MedianAttribute>())
            .collect::<Result<Vec<_>>>()?;
        let plan = Self {
            output_dir: PathBuf::from(&config.reports.output_dir),
            kinds,
            file_names,
            median_attributes,
            comparator: Comparator::new(config.analysis.significance_level),
            json: config.reports.json,
        };
        plan.check_paths()?;
        Ok(plan)
    }

    /// Every file a planned report writes: the CSV, then the JSON companion if enabled.
    pub fn outputs_for(&self, kind: ReportKind) -> Vec<PathBuf> {
        let csv = self.path_for(kind);
        let mut outputs = vec![csv.clone()];
        if self.json {
            outputs.push(csv.with_extension("json"));
        }
        outputs
    }

    /// Rejects plans where two outputs (of the same or different kinds) share a path.
    pub fn check_paths(&self) -> Result<()> {
        let mut seen: BTreeMap<PathBuf, ReportKind> = BTreeMap::new();
        for &kind in &self.kinds {
            for path in self.outputs_for(kind) {
                if let Some(prev) = seen.insert(path.clone(), kind) {
                    let owners = if prev == kind {
                        format!("{kind} writes its CSV and JSON")
                    } else {
                        format!("{prev} and {kind} both write")
                    };
                    return Err(NewcomerLensError::Config(format!(
                        "{owners} to {}; set distinct [reports.file_names]",
                        path.display()
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn path_for(&self, kind: ReportKind) -> PathBuf {
        let name = self
            .file_names
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_file_name());
        self.output_dir.join(name)
    }
}

/// Parses kind names, dropping duplicates while keeping first-seen order.
pub fn parse_kinds<S: AsRef<str>>(names: &[S]) -> Result<Vec<ReportKind>> {
    let mut kinds = Vec::new();
    for name in names {
        let kind: ReportKind = name.as_ref().parse()?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportOutcome {
    pub kind: ReportKind,
    pub path: PathBuf,
    pub rows: usize,
    pub elapsed: Duration,
}

/// Runs every planned report against the shared corpus. All tasks run to
/// completion; if any failed, the first failure in plan order is returned.
pub fn run_reports(corpus: &Corpus, plan: &ReportPlan, mode: ExecutionMode) -> Result<Vec<ReportOutcome>> {
    plan.check_paths()?;
    std::fs::create_dir_all(&plan.output_dir)?;
    let results: Vec<Result<ReportOutcome>> = match mode {
        ExecutionMode::Parallel => plan
            .kinds
            .par_iter()
            .map(|&kind| run_report(corpus, plan, kind))
            .collect(),
        ExecutionMode::Sequential => plan
            .kinds
            .iter()
            .map(|&kind| run_report(corpus, plan, kind))
            .collect(),
    };

    let mut outcomes = Vec::with_capacity(results.len());
    let mut first_err = None;
    for r in results {
        match r {
            Ok(o) => outcomes.push(o),
            Err(e) => {
                error!("{e}");
                first_err.get_or_insert(e);
            }
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(outcomes),
    }
}

pub fn run_report(corpus: &Corpus, plan: &ReportPlan, kind: ReportKind) -> Result<ReportOutcome> {
    let start = Instant::now();
    let path = plan.path_for(kind);
    let cmp = &plan.comparator;
    let written = match kind {
        ReportKind::LabelComparison => emit(&path, &report::label_comparison(corpus, cmp), plan.json),
        ReportKind::PrePost => emit(&path, &report::pre_post_report(corpus.labeled(), cmp), plan.json),
        ReportKind::MedianLabeled | ReportKind::MedianUnlabeled | ReportKind::MedianAll => {
            let view = match kind {
                ReportKind::MedianLabeled => CorpusView::Labeled,
                ReportKind::MedianUnlabeled => CorpusView::Unlabeled,
                _ => CorpusView::All,
            };
            emit(
                &path,
                &report::median_report(corpus.view(view), &plan.median_attributes, cmp),
                plan.json,
            )
        }
        ReportKind::LanguageComparison => {
            emit(&path, &report::language_comparison(corpus.all(), cmp), plan.json)
        }
        ReportKind::LanguageSummary => emit(&path, &report::language_summary(corpus.all()), plan.json),
    };
    let rows = written.map_err(|e| NewcomerLensError::Report {
        kind: kind.to_string(),
        message: format!("{}: {e}", path.display()),
    })?;
    let elapsed = start.elapsed();
    info!(
        report = %kind,
        path = %path.display(),
        rows,
        elapsed_ms = elapsed.as_millis() as u64,
        "report written"
    );
    Ok(ReportOutcome {
        kind,
        path,
        rows,
        elapsed,
    })
}

fn emit<R: CsvRow>(path: &Path, rows: &[R], json: bool) -> Result<usize> {
    report::write_csv(path, rows)?;
    if json {
        report::write_json(&path.with_extension("json"), rows)?;
    }
    Ok(rows.len())
}
