use newcomer_lens_common::{NewcomerLensError, Result};
use std::path::{Path, PathBuf};

/// List `<base>/<category>/<repo>.json` record files, sorted for a reproducible scan order.
pub fn scan_corpus_dir(base: &Path) -> Result<Vec<PathBuf>> {
    if !base.is_dir() {
        return Err(NewcomerLensError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input directory not found: {}", base.display()),
        )));
    }
    // glob metacharacters in the base path must not be interpreted
    let escaped = glob::Pattern::escape(&base.to_string_lossy());
    let pattern = format!("{escaped}/*/*.json");
    let mut results: Vec<PathBuf> = glob::glob(&pattern)?
        .flatten()
        .filter(|p| p.is_file())
        .collect();
    results.sort();
    Ok(results)
}
