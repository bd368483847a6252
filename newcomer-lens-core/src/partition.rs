use crate::corpus::RecordMap;
use crate::record::RepositoryRecord;
use chrono::Datelike;
use newcomer_lens_common::{NewcomerLensError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub fn first_contribution_counts(records: &RecordMap) -> Vec<u32> {
    records.values().map(|r| r.first_contributions).collect()
}

// --- median split ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MedianAttribute {
    #[serde(rename = "created_at")]
    CreatedAt,
    #[serde(rename = "number_weekly_dist")]
    WeeklyDistributionLength,
    #[serde(rename = "stars")]
    Stars,
    #[serde(rename = "subs")]
    Subscribers,
}

impl MedianAttribute {
    pub const ALL: [Self; 4] = [
        Self::CreatedAt,
        Self::WeeklyDistributionLength,
        Self::Stars,
        Self::Subscribers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::WeeklyDistributionLength => "number_weekly_dist",
            Self::Stars => "stars",
            Self::Subscribers => "subs",
        }
    }

    fn key(&self, r: &RepositoryRecord) -> i64 {
        match self {
            Self::CreatedAt => r.created_at.num_days_from_ce() as i64,
            Self::WeeklyDistributionLength => r.number_weekly_dist() as i64,
            Self::Stars => r.stars as i64,
            Self::Subscribers => r.subscribers as i64,
        }
    }
}

impl FromStr for MedianAttribute {
    type Err = NewcomerLensError;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "created_at" => Ok(Self::CreatedAt),
            "number_weekly_dist" | "weekly_distribution_length" => Ok(Self::WeeklyDistributionLength),
            "stars" => Ok(Self::Stars),
            "subs" | "subscribers" => Ok(Self::Subscribers),
            other => Err(NewcomerLensError::Config(format!(
                "unknown median attribute: {other} (use created_at, number_weekly_dist, stars, subs)"
            ))),
        }
    }
}

impl fmt::Display for MedianAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort ascending by (attribute, qualified name) and cut at index `(n-1)/2`;
/// the midpoint record goes to `below`. Returns `(below, above)`.
pub fn split_at_median<'a, I>(records: I, attribute: MedianAttribute) -> (Vec<&'a RepositoryRecord>, Vec<&'a RepositoryRecord>)
where
    I: IntoIterator<Item = &'a RepositoryRecord>,
{
    let mut sorted: Vec<&RepositoryRecord> = records.into_iter().collect();
    sorted.sort_by(|a, b| {
        attribute
            .key(a)
            .cmp(&attribute.key(b))
            .then_with(|| a.full_name.cmp(&b.full_name))
    });
    let below_len = sorted.len().div_ceil(2);
    let above = sorted.split_off(below_len);
    (sorted, above)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedianSplit {
    pub attribute: MedianAttribute,
    pub above: Vec<u32>,
    pub below: Vec<u32>,
}

pub fn median_split(records: &RecordMap, attribute: MedianAttribute) -> MedianSplit {
    let (below, above) = split_at_median(records.values().map(|r| r.as_ref()), attribute);
    MedianSplit {
        attribute,
        above: above.iter().map(|r| r.first_contributions).collect(),
        below: below.iter().map(|r| r.first_contributions).collect(),
    }
}

// --- language grouping ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageGroup {
    pub language: String,
    pub first_contributions: Vec<u32>,
    pub repositories: Vec<String>,
}

/// Groups by exact (case-sensitive) language string, ordered by language.
pub fn group_by_language(records: &RecordMap) -> Vec<LanguageGroup> {
    let mut groups: BTreeMap<&str, LanguageGroup> = BTreeMap::new();
    for r in records.values() {
        let g = groups.entry(r.language.as_str()).or_insert_with(|| LanguageGroup {
            language: r.language.clone(),
            first_contributions: Vec::new(),
            repositories: Vec::new(),
        });
        g.first_contributions.push(r.first_contributions);
        g.repositories.push(r.full_name.clone());
    }
    groups.into_values().collect()
}

/// Every unordered pair of distinct groups, `(a, b)` with `a` before `b`.
pub fn language_pairs(groups: &[LanguageGroup]) -> Vec<(&LanguageGroup, &LanguageGroup)> {
    groups
        .iter()
        .enumerate()
        .flat_map(|(i, a)| groups[i + 1..].iter().map(move |b| (a, b)))
        .collect()
}

// --- pre/post label ---

#[derive(Debug, Clone, Serialize)]
pub struct PrePostEntry<'a> {
    pub repository: &'a str,
    pub owner: &'a str,
    pub language: &'a str,
    pub label: Option<&'a str>,
    pub pre: &'a [u32],
    pub post: &'a [u32],
    pub discard: bool,
}

/// One entry per labeled record; discarded records are kept and flagged.
pub fn pre_post_entries(records: &RecordMap) -> Vec<PrePostEntry<'_>> {
    records
        .values()
        .filter(|r| r.has_newcomer_label)
        .map(|r| PrePostEntry {
            repository: &r.full_name,
            owner: &r.owner,
            language: &r.language,
            label: r.newcomer_label.as_deref(),
            pre: &r.pre_label,
            post: &r.post_label,
            discard: r.discard,
        })
        .collect()
}
