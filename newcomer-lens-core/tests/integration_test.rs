use newcomer_lens_core::{
    load_corpus, run_reports, scan_corpus_dir, ExecutionMode, LoaderOptions, ReportKind, ReportPlan,
};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_record(dir: &Path, language: &str, value: serde_json::Value) {
    let name = value["name"].as_str().unwrap().to_owned();
    let sub = dir.join(language);
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join(format!("{name}.json")), value.to_string()).unwrap();
}

fn labeled_early() -> serde_json::Value {
    json!({
        "owner": "acme",
        "name": "widget",
        "nameconcat": "acme/widget",
        "created_at": "2020-01-01T00:00:00Z",
        "weekly_distribuition": [{"total": 1}, {"total": 2}, {"total": 3}, {"total": 4}],
        "first_contribuitions": [{"login": "a"}, {"login": "b"}, {"login": "c"}],
        "stars": 5,
        "subscribers": 2,
        "has_newcomer_labels": true,
        "newcomer_labels": [{"name": "good first issue", "created_at": "2020-01-11T00:00:00Z"}],
        "weekly_distribuition_before": [1, 2],
        "weekly_distribuition_after": [3, 4]
    })
}

fn unlabeled() -> serde_json::Value {
    json!({
        "owner": "acme",
        "name": "gadget",
        "nameconcat": "acme/gadget",
        "created_at": "2018-06-01T12:00:00Z",
        "weekly_distribuition": [{"total": 0}, {"total": 1}],
        "first_contribuitions": [{"login": "a"}],
        "stars": 50,
        "subscribers": 7,
        "has_newcomer_labels": false
    })
}

fn two_record_corpus() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_record(dir.path(), "go", labeled_early());
    write_record(dir.path(), "rust", unlabeled());
    dir
}

fn run_all(input: &Path, output: &Path, mode: ExecutionMode) {
    let paths = scan_corpus_dir(input).unwrap();
    let (corpus, report) = load_corpus(&paths, &LoaderOptions::default());
    assert_eq!(report.loaded, 2);
    let plan = ReportPlan::new(output);
    let outcomes = run_reports(&corpus, &plan, mode).unwrap();
    assert_eq!(outcomes.len(), ReportKind::ALL.len());
}

fn lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_owned)
        .collect()
}

#[test]
fn label_report_has_header_and_one_row() {
    let input = two_record_corpus();
    let out = tempfile::tempdir().unwrap();
    run_all(input.path(), out.path(), ExecutionMode::Sequential);

    let label = lines(&out.path().join("label_vs_no_label.csv"));
    assert_eq!(label.len(), 2);
    assert!(label[0].starts_with("p_value,identical,delta,effect_size"));
    // the discarded repository still counts toward the labeled side
    assert!(label[1].ends_with(",1"));
    assert!(label[1].contains(",1,Min=1.000"));
}

#[test]
fn discarded_repository_has_blank_pre_post_fields() {
    let input = two_record_corpus();
    let out = tempfile::tempdir().unwrap();
    run_all(input.path(), out.path(), ExecutionMode::Sequential);

    let pre_post = lines(&out.path().join("pre_vs_post_label.csv"));
    assert_eq!(pre_post.len(), 2);
    assert_eq!(
        pre_post[1],
        "acme/widget,acme,GO,good first issue,,,,,true,,"
    );
}

#[test]
fn language_reports_cover_both_languages() {
    let input = two_record_corpus();
    let out = tempfile::tempdir().unwrap();
    run_all(input.path(), out.path(), ExecutionMode::Parallel);

    let summary = lines(&out.path().join("language_summary.csv"));
    assert_eq!(summary.len(), 3);
    assert!(summary[1].starts_with("go,3.000,"));
    assert!(summary[1].ends_with(",1,acme/widget"));
    let pairs = lines(&out.path().join("language_comparison.csv"));
    assert_eq!(pairs.len(), 2);
    assert!(pairs[1].starts_with("go,rust,"));

    let medians = lines(&out.path().join("median_split_all.csv"));
    assert_eq!(medians.len(), 5);
    let attrs: Vec<&str> = medians[1..].iter().map(|l| l.split(',').next().unwrap()).collect();
    assert_eq!(attrs, vec!["created_at", "number_weekly_dist", "stars", "subs"]);
}

#[test]
fn parallel_and_sequential_write_identical_files() {
    let input = two_record_corpus();
    write_record(
        input.path(),
        "go",
        json!({
            "owner": "acme", "name": "sprocket", "nameconcat": "acme/sprocket",
            "created_at": "2015-01-01", "weekly_distribuition": [{"total": 2}],
            "first_contribuitions": [], "stars": 1, "subscribers": 1,
            "has_newcomer_labels": true,
            "newcomer_labels": [{"name": "beginner", "created_at": "2017-01-01T00:00:00Z"}],
            "weekly_distribuition_before": [0, 1, 0, 2],
            "weekly_distribuition_after": [3, 5, 4, 6]
        }),
    );
    let seq = tempfile::tempdir().unwrap();
    let par = tempfile::tempdir().unwrap();
    let paths = scan_corpus_dir(input.path()).unwrap();
    let (corpus, _) = load_corpus(&paths, &LoaderOptions::default());
    run_reports(&corpus, &ReportPlan::new(seq.path()), ExecutionMode::Sequential).unwrap();
    run_reports(&corpus, &ReportPlan::new(par.path()), ExecutionMode::Parallel).unwrap();
    for kind in ReportKind::ALL {
        let name = kind.default_file_name();
        assert_eq!(
            fs::read(seq.path().join(name)).unwrap(),
            fs::read(par.path().join(name)).unwrap(),
            "{name} differs"
        );
    }
}

#[test]
fn malformed_record_is_skipped_not_fatal() {
    let input = two_record_corpus();
    fs::write(input.path().join("go/broken.json"), "{ not json").unwrap();
    let paths = scan_corpus_dir(input.path()).unwrap();
    assert_eq!(paths.len(), 3);
    let (corpus, report) = load_corpus(&paths, &LoaderOptions::default());
    assert_eq!(corpus.len(), 2);
    assert_eq!(report.skipped.len(), 1);
}

#[test]
fn json_companion_holds_raw_samples() {
    let input = two_record_corpus();
    let out = tempfile::tempdir().unwrap();
    let paths = scan_corpus_dir(input.path()).unwrap();
    let (corpus, _) = load_corpus(&paths, &LoaderOptions::default());
    let mut plan = ReportPlan::new(out.path());
    plan.kinds = vec![ReportKind::LabelComparison];
    plan.json = true;
    run_reports(&corpus, &plan, ExecutionMode::Sequential).unwrap();
    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.path().join("label_vs_no_label.json")).unwrap()).unwrap();
    assert_eq!(doc[0]["treatment_sample"], json!([3]));
    assert_eq!(doc[0]["control_sample"], json!([1]));
    assert_eq!(doc[0]["effect_size"], json!("large"));
}
