use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    // p >= significance_level means "identical populations"; 0.5 is the historical value
    #[serde(default = "default_significance")]
    pub significance_level: f64,
    #[serde(default = "default_discard_window")]
    pub discard_window_days: i64,
    #[serde(default = "default_median_attributes")]
    pub median_attributes: Vec<String>,
}

fn default_significance() -> f64 {
    0.5
}
fn default_discard_window() -> i64 {
    180
}
fn default_median_attributes() -> Vec<String> {
    ["created_at", "number_weekly_dist", "stars", "subs"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            significance_level: default_significance(),
            discard_window_days: default_discard_window(),
            median_attributes: default_median_attributes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Tried in order until one yields a language.
    #[serde(default = "default_language_strategies")]
    pub language_strategies: Vec<String>,
    /// Case-insensitive regexes; matching newcomer labels are ignored.
    #[serde(default)]
    pub exclude_label_patterns: Vec<String>,
}

fn default_language_strategies() -> Vec<String> {
    vec!["explicit-field".into(), "path-segment".into()]
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            language_strategies: default_language_strategies(),
            exclude_label_patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default)]
    pub json: bool,
    #[serde(default)]
    pub enabled: Vec<String>, // empty = every report kind
    #[serde(default)]
    pub file_names: BTreeMap<String, String>,
}

fn default_output_dir() -> String {
    ".".into()
}
fn default_parallel() -> bool {
    true
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            parallel: default_parallel(),
            json: false,
            enabled: Vec::new(),
            file_names: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
}

impl Config {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("newcomer-lens")
            .join("config.toml")
    }

    /// Loads from `$NEWCOMER_LENS_CONFIG` or the user config dir; a missing file yields defaults.
    pub fn load() -> crate::Result<Self> {
        let path = if let Ok(env_path) = std::env::var("NEWCOMER_LENS_CONFIG") {
            PathBuf::from(env_path)
        } else {
            Self::config_path()
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Loads an explicitly requested file; unlike [`Config::load`] a missing file is an error.
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let cfg: Self = toml::from_str(content)
            .map_err(|e| crate::NewcomerLensError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> crate::Result<()> {
        let p = self.analysis.significance_level;
        if !(0.0..=1.0).contains(&p) {
            return Err(crate::NewcomerLensError::Config(format!(
                "significance_level must be in [0, 1], got {p}"
            )));
        }
        if self.analysis.discard_window_days < 0 {
            return Err(crate::NewcomerLensError::Config(
                "discard_window_days must not be negative".into(),
            ));
        }
        if self.loader.language_strategies.is_empty() {
            return Err(crate::NewcomerLensError::Config(
                "language_strategies must name at least one strategy".into(),
            ));
        }
        Ok(())
    }
}
