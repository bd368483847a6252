use crate::record::RepositoryRecord;
use chrono::NaiveDate;
use std::path::PathBuf;

pub(crate) fn rec(name: &str, labeled: bool) -> RepositoryRecord {
    RepositoryRecord {
        owner: "o".into(),
        name: name.into(),
        full_name: format!("o/{name}"),
        language: "go".into(),
        created_at: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
        weekly_distribution: vec![1, 0, 2],
        first_contributions: 3,
        stars: 1,
        subscribers: 1,
        has_newcomer_label: labeled,
        newcomer_label: None,
        label_created_at: None,
        pre_label: Vec::new(),
        post_label: Vec::new(),
        eligible_for_split: false,
        discard: labeled,
        source: PathBuf::from(format!("r/go/{name}.json")),
    }
}

/// Unlabeled record with the given language, first-contribution count and stars.
pub(crate) fn rec_with(name: &str, language: &str, first: u32, stars: u64) -> RepositoryRecord {
    RepositoryRecord {
        language: language.into(),
        first_contributions: first,
        stars,
        ..rec(name, false)
    }
}

/// Labeled record with usable pre/post sequences.
pub(crate) fn rec_split(name: &str, pre: Vec<u32>, post: Vec<u32>, discard: bool) -> RepositoryRecord {
    RepositoryRecord {
        newcomer_label: Some("good first issue".into()),
        label_created_at: NaiveDate::from_ymd_opt(2016, 1, 1),
        eligible_for_split: !pre.is_empty() && !post.is_empty(),
        pre_label: pre,
        post_label: post,
        discard,
        ..rec(name, true)
    }
}
