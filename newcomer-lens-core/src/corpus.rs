use crate::record::{load_record_file, LoaderOptions, RepositoryRecord};
use newcomer_lens_common::NewcomerLensError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Qualified repository name -> record.
pub type RecordMap = BTreeMap<String, Arc<RepositoryRecord>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CorpusView {
    All,
    Labeled,
    Unlabeled,
}

/// Read-only index built once at startup; the three views share the same records.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    all: RecordMap,
    labeled: RecordMap,
    unlabeled: RecordMap,
}

impl Corpus {
    pub fn from_records(records: Vec<RepositoryRecord>) -> Self {
        let mut corpus = Self::default();
        for record in records {
            let key = record.full_name.clone();
            let record = Arc::new(record);
            if let Some(prev) = corpus.all.insert(key.clone(), Arc::clone(&record)) {
                warn!(
                    repository = %key,
                    replaced = %prev.source.display(),
                    by = %record.source.display(),
                    "duplicate repository name; keeping the later record"
                );
                corpus.labeled.remove(&key);
                corpus.unlabeled.remove(&key);
            }
            if record.has_newcomer_label {
                corpus.labeled.insert(key, record);
            } else {
                corpus.unlabeled.insert(key, record);
            }
        }
        corpus
    }

    pub fn view(&self, view: CorpusView) -> &RecordMap {
        match view {
            CorpusView::All => &self.all,
            CorpusView::Labeled => &self.labeled,
            CorpusView::Unlabeled => &self.unlabeled,
        }
    }

    pub fn all(&self) -> &RecordMap {
        &self.all
    }

    pub fn labeled(&self) -> &RecordMap {
        &self.labeled
    }

    pub fn unlabeled(&self) -> &RecordMap {
        &self.unlabeled
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: Vec<PathBuf>,
}

/// `MalformedRecord` already names the file; other errors do not.
fn skip_reason(path: &Path, e: &NewcomerLensError) -> String {
    match e {
        NewcomerLensError::MalformedRecord { .. } => e.to_string(),
        _ => format!("{}: {e}", path.display()),
    }
}

/// Parse every record file in parallel; malformed files are logged and skipped.
pub fn load_corpus(paths: &[PathBuf], opts: &LoaderOptions) -> (Corpus, LoadReport) {
    let results: Vec<_> = paths
        .par_iter()
        .map(|p| (p, load_record_file(p, opts)))
        .collect();

    let mut records = Vec::with_capacity(results.len());
    let mut report = LoadReport::default();
    for (path, r) in results {
        match r {
            Ok(rec) => records.push(rec),
            Err(e) => {
                warn!("skipping record: {}", skip_reason(path, &e));
                report.skipped.push(path.clone());
            }
        }
    }
    report.loaded = records.len();
    let corpus = Corpus::from_records(records);
    info!(
        loaded = report.loaded,
        skipped = report.skipped.len(),
        labeled = corpus.labeled().len(),
        unlabeled = corpus.unlabeled().len(),
        "corpus loaded"
    );
    (corpus, report)
}
