use chrono::NaiveDate;
use newcomer_lens_common::{Config, NewcomerLensError, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

// The crawler wrote several keys misspelled; both spellings are accepted.
const KEY_FULL_NAME: &[&str] = &["nameconcat", "full_name", "qualified_name"];
const KEY_WEEKLY: &[&str] = &["weekly_distribuition", "weekly_distribution"];
const KEY_FIRST_CONTRIB: &[&str] = &["first_contribuitions", "first_contributions"];
const KEY_BEFORE: &[&str] = &["weekly_distribuition_before", "weekly_distribution_before"];
const KEY_AFTER: &[&str] = &["weekly_distribuition_after", "weekly_distribution_after"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub owner: String,
    pub name: String,
    pub full_name: String,
    pub language: String,
    pub created_at: NaiveDate,
    pub weekly_distribution: Vec<u32>,
    pub first_contributions: u32,
    pub stars: u64,
    pub subscribers: u64,
    pub has_newcomer_label: bool,
    pub newcomer_label: Option<String>,
    pub label_created_at: Option<NaiveDate>,
    pub pre_label: Vec<u32>,
    pub post_label: Vec<u32>,
    pub eligible_for_split: bool,
    pub discard: bool,
    pub source: PathBuf,
}

impl RepositoryRecord {
    pub fn number_weekly_dist(&self) -> usize {
        self.weekly_distribution.len()
    }
}

// --- language resolution ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LanguageStrategy {
    /// The record's own `language` key.
    ExplicitField,
    /// The name of the directory holding the record file (`<dir>/<language>/<repo>.json`).
    PathSegment,
}

impl FromStr for LanguageStrategy {
    type Err = NewcomerLensError;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "explicit-field" => Ok(Self::ExplicitField),
            "path-segment" => Ok(Self::PathSegment),
            other => Err(NewcomerLensError::Config(format!(
                "unknown language strategy: {other} (use explicit-field or path-segment)"
            ))),
        }
    }
}

/// Ordered list of strategies; the first one that yields a language wins.
#[derive(Debug, Clone)]
pub struct LanguageResolver {
    strategies: Vec<LanguageStrategy>,
}

impl LanguageResolver {
    pub fn new(strategies: Vec<LanguageStrategy>) -> Self {
        Self { strategies }
    }

    pub fn resolve(&self, obj: &Map<String, Value>, path: &Path) -> Option<String> {
        self.strategies.iter().find_map(|s| match s {
            LanguageStrategy::ExplicitField => obj
                .get("language")
                .and_then(Value::as_str)
                .filter(|l| !l.is_empty())
                .map(str::to_owned),
            LanguageStrategy::PathSegment => path
                .parent()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
                .filter(|l| !l.is_empty()),
        })
    }
}

impl Default for LanguageResolver {
    fn default() -> Self {
        Self::new(vec![LanguageStrategy::ExplicitField, LanguageStrategy::PathSegment])
    }
}

// --- label exclusion ---

#[derive(Debug, Clone, Default)]
pub struct LabelFilter {
    patterns: Vec<Regex>,
}

impl LabelFilter {
    pub fn from_patterns(patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| NewcomerLensError::Config(format!("bad label pattern {p:?}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_excluded(&self, label: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(label))
    }
}

#[derive(Debug, Clone)]
pub struct LoaderOptions {
    pub language: LanguageResolver,
    pub labels: LabelFilter,
    pub discard_window_days: i64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            language: LanguageResolver::default(),
            labels: LabelFilter::default(),
            discard_window_days: 180,
        }
    }
}

impl LoaderOptions {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let strategies = cfg
            .loader
            .language_strategies
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<LanguageStrategy>>>()?;
        Ok(Self {
            language: LanguageResolver::new(strategies),
            labels: LabelFilter::from_patterns(&cfg.loader.exclude_label_patterns)?,
            discard_window_days: cfg.analysis.discard_window_days,
        })
    }
}

// --- field extraction ---

fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k)).filter(|v| !v.is_null())
}

fn require<'a>(obj: &'a Map<String, Value>, keys: &[&str], path: &Path) -> Result<&'a Value> {
    lookup(obj, keys).ok_or_else(|| NewcomerLensError::malformed(path, keys[0], "is missing"))
}

fn require_str(obj: &Map<String, Value>, keys: &[&str], path: &Path) -> Result<String> {
    require(obj, keys, path)?
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| NewcomerLensError::malformed(path, keys[0], "is not a string"))
}

fn require_u64(obj: &Map<String, Value>, keys: &[&str], path: &Path) -> Result<u64> {
    require(obj, keys, path)?
        .as_u64()
        .ok_or_else(|| NewcomerLensError::malformed(path, keys[0], "is not a non-negative integer"))
}

fn require_bool(obj: &Map<String, Value>, keys: &[&str], path: &Path) -> Result<bool> {
    require(obj, keys, path)?
        .as_bool()
        .ok_or_else(|| NewcomerLensError::malformed(path, keys[0], "is not a boolean"))
}

fn require_array<'a>(obj: &'a Map<String, Value>, keys: &[&str], path: &Path) -> Result<&'a Vec<Value>> {
    require(obj, keys, path)?
        .as_array()
        .ok_or_else(|| NewcomerLensError::malformed(path, keys[0], "is not a list"))
}

/// ISO-8601 date or date-time, truncated to the date component.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let date_part = s.trim().split(['T', ' ']).next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn as_count(v: &Value) -> Option<u32> {
    v.as_u64().and_then(|n| u32::try_from(n).ok())
}

fn parse_weekly(obj: &Map<String, Value>, path: &Path) -> Result<Vec<u32>> {
    require_array(obj, KEY_WEEKLY, path)?
        .iter()
        .enumerate()
        .map(|(i, week)| {
            week.get("total").and_then(as_count).ok_or_else(|| {
                NewcomerLensError::malformed(
                    path,
                    KEY_WEEKLY[0],
                    format!("entry {i} has no non-negative integer `total`"),
                )
            })
        })
        .collect()
}

/// Optional list of weekly counts; `Err(())` when present but not a list of counts.
fn parse_counts(obj: &Map<String, Value>, keys: &[&str]) -> Option<std::result::Result<Vec<u32>, ()>> {
    let v = lookup(obj, keys)?;
    Some(
        v.as_array()
            .ok_or(())
            .and_then(|arr| arr.iter().map(|e| as_count(e).ok_or(())).collect()),
    )
}

#[derive(Debug, Clone, PartialEq)]
struct NewcomerLabel {
    name: String,
    created_at: Option<NaiveDate>,
}

/// Labels in file order.
fn parse_labels(obj: &Map<String, Value>) -> Vec<NewcomerLabel> {
    lookup(obj, &["newcomer_labels"])
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|l| {
                    let name = l.get("name")?.as_str()?.to_owned();
                    let created_at = l.get("created_at").and_then(Value::as_str).and_then(parse_date);
                    Some(NewcomerLabel { name, created_at })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Default)]
struct LabelData {
    has_label: bool,
    label: Option<String>,
    label_created_at: Option<NaiveDate>,
    pre: Vec<u32>,
    post: Vec<u32>,
    eligible: bool,
    discard: bool,
}

fn split_weekly_at(weekly: &[u32], created_at: NaiveDate, label_date: NaiveDate) -> (Vec<u32>, Vec<u32>) {
    let weeks = label_date.signed_duration_since(created_at).num_days().max(0) / 7;
    let split = (weeks as usize).min(weekly.len());
    (weekly[..split].to_vec(), weekly[split..].to_vec())
}

fn incomplete(full_name: &str, field: &str, data: LabelData) -> LabelData {
    let err = NewcomerLensError::IncompleteLabelData {
        repository: full_name.to_owned(),
        field: field.to_owned(),
    };
    warn!("{err}; pre/post treated as empty and the repository is discarded");
    LabelData {
        pre: Vec::new(),
        post: Vec::new(),
        eligible: false,
        discard: true,
        ..data
    }
}

fn resolve_labels(
    obj: &Map<String, Value>,
    full_name: &str,
    created_at: NaiveDate,
    weekly: &[u32],
    declared: bool,
    opts: &LoaderOptions,
) -> LabelData {
    if !declared {
        return LabelData::default();
    }
    let mut all = parse_labels(obj);
    // the stored before/after sequences were split at the first label as listed
    let split_label = all.first().cloned();
    // by creation date; undated labels sort last
    all.sort_by_key(|l| (l.created_at.is_none(), l.created_at));
    let kept: Vec<NewcomerLabel> = all
        .iter()
        .filter(|l| !opts.labels.is_excluded(&l.name))
        .cloned()
        .collect();
    let excluded_any = kept.len() != all.len();
    if excluded_any && kept.is_empty() {
        debug!(repository = full_name, "every newcomer label excluded; treating as unlabeled");
        return LabelData::default();
    }
    let Some(canonical) = kept.first().cloned() else {
        return incomplete(full_name, "newcomer_labels", LabelData { has_label: true, ..Default::default() });
    };
    let base = LabelData {
        has_label: true,
        label: Some(canonical.name.clone()),
        label_created_at: canonical.created_at,
        ..Default::default()
    };
    let Some(label_date) = canonical.created_at else {
        return incomplete(full_name, "newcomer_labels.created_at", base);
    };

    let (pre, post) = if split_label.as_ref() != Some(&canonical) {
        // canonical label is not the split label: re-split on its week
        split_weekly_at(weekly, created_at, label_date)
    } else {
        let pre = match parse_counts(obj, KEY_BEFORE) {
            Some(Ok(v)) => v,
            Some(Err(())) => return incomplete(full_name, "weekly_distribution_before (unparseable)", base),
            None => return incomplete(full_name, "weekly_distribution_before", base),
        };
        let post = match parse_counts(obj, KEY_AFTER) {
            Some(Ok(v)) => v,
            Some(Err(())) => return incomplete(full_name, "weekly_distribution_after (unparseable)", base),
            None => return incomplete(full_name, "weekly_distribution_after", base),
        };
        (pre, post)
    };

    let eligible = !pre.is_empty() && !post.is_empty();
    let too_early = label_date.signed_duration_since(created_at).num_days() <= opts.discard_window_days;
    LabelData {
        pre,
        post,
        eligible,
        discard: too_early || !eligible,
        ..base
    }
}

pub fn parse_record(value: &Value, path: &Path, opts: &LoaderOptions) -> Result<RepositoryRecord> {
    let obj = value
        .as_object()
        .ok_or_else(|| NewcomerLensError::malformed(path, "<document>", "is not a JSON object"))?;
    let owner = require_str(obj, &["owner"], path)?;
    let name = require_str(obj, &["name"], path)?;
    let full_name = require_str(obj, KEY_FULL_NAME, path)?;
    let created_raw = require_str(obj, &["created_at"], path)?;
    let created_at = parse_date(&created_raw).ok_or_else(|| {
        NewcomerLensError::malformed(path, "created_at", format!("is not an ISO-8601 date: {created_raw:?}"))
    })?;
    let weekly_distribution = parse_weekly(obj, path)?;
    let first_contributions = u32::try_from(require_array(obj, KEY_FIRST_CONTRIB, path)?.len())
        .map_err(|_| NewcomerLensError::malformed(path, KEY_FIRST_CONTRIB[0], "is too long"))?;
    let stars = require_u64(obj, &["stars"], path)?;
    let subscribers = require_u64(obj, &["subscribers"], path)?;
    let declared = require_bool(obj, &["has_newcomer_labels"], path)?;
    let language = opts
        .language
        .resolve(obj, path)
        .ok_or_else(|| NewcomerLensError::malformed(path, "language", "could not be resolved"))?;

    let labels = resolve_labels(obj, &full_name, created_at, &weekly_distribution, declared, opts);
    Ok(RepositoryRecord {
        owner,
        name,
        full_name,
        language,
        created_at,
        weekly_distribution,
        first_contributions,
        stars,
        subscribers,
        has_newcomer_label: labels.has_label,
        newcomer_label: labels.label,
        label_created_at: labels.label_created_at,
        pre_label: labels.pre,
        post_label: labels.post,
        eligible_for_split: labels.eligible,
        discard: labels.discard,
        source: path.to_path_buf(),
    })
}

pub fn load_record_file(path: &Path, opts: &LoaderOptions) -> Result<RepositoryRecord> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| NewcomerLensError::malformed(path, "<document>", format!("is not valid JSON: {e}")))?;
    parse_record(&value, path, opts)
}
