use anyhow::{bail, Context};
use clap::Parser;
use newcomer_lens_common::Config;
use newcomer_lens_core::{
    load_corpus, run_reports, scan_corpus_dir, ExecutionMode, LoaderOptions,
    ReportOutcome, ReportPlan,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "newcomer-lens",
    version,
    about = "Compare first-time contributions across repositories with and without newcomer labels"
)]
struct Cli {
    /// Corpus directory laid out as <DIR>/<language>/<repo>.json
    #[arg(default_value = "resources")]
    dir: PathBuf,
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// Comma-separated report kinds (default: all)
    #[arg(short, long, value_delimiter = ',')]
    reports: Option<Vec<String>>,
    #[arg(long)]
    sequential: bool,
    /// Also write a JSON companion for every report
    #[arg(long)]
    json: bool,
    #[arg(long, value_parser = parse_significance)]
    significance: Option<f64>,
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
}

fn parse_significance(s: &str) -> Result<f64, String> { // validate at CLI parse time
    let v: f64 = s.parse().map_err(|_| format!("not a float: {s}"))?;
    if (0.0..=1.0).contains(&v) { Ok(v) } else { Err(format!("significance must be in [0, 1], got {v}")) }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load().context("loading config")?,
    };
    if let Some(dir) = &cli.output_dir {
        config.reports.output_dir = dir.to_string_lossy().into_owned();
    }
    if let Some(kinds) = &cli.reports {
        config.reports.enabled = kinds.clone();
    }
    if cli.sequential {
        config.reports.parallel = false;
    }
    if cli.json {
        config.reports.json = true;
    }
    if let Some(p) = cli.significance {
        config.analysis.significance_level = p;
    }
    config.validate()?;
    Ok(config)
}

fn print_outcomes(outcomes: &[ReportOutcome]) {
    for o in outcomes {
        println!(
            "{:<22} {:>6} rows  {:>8}  {}",
            o.kind.as_str(),
            o.rows,
            format!("{:.1?}", o.elapsed),
            o.path.display()
        );
    }
}

fn run(cli: &Cli, config: &Config) -> anyhow::Result<Vec<ReportOutcome>> {
    let plan = ReportPlan::from_config(config)?;
    let opts = LoaderOptions::from_config(config)?;
    let dir: &Path = &cli.dir;
    if !dir.is_dir() {
        bail!("corpus directory not found: {}", dir.display());
    }
    let paths = scan_corpus_dir(dir).with_context(|| format!("scanning {}", dir.display()))?;
    let (corpus, report) = load_corpus(&paths, &opts);
    if corpus.is_empty() {
        bail!(
            "no usable repository records under {} ({} skipped)",
            dir.display(),
            report.skipped.len()
        );
    }
    let mode = ExecutionMode::from_parallel(config.reports.parallel);
    Ok(run_reports(&corpus, &plan, mode)?)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(&cli)?;
    let start = Instant::now();
    let outcomes = run(&cli, &config)?;
    print_outcomes(&outcomes);
    info!(
        reports = outcomes.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "done"
    );
    Ok(())
}
