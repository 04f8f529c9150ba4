//! News-summary cache: one JSON file holding the latest summaries so a
//! restart can show news before the first refresh cycle lands.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use metrics::counter;

use crate::model::NewsSummary;

pub struct NewsCache {
    path: PathBuf,
}

impl NewsCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Persist the list, best effort. A failed write is logged and counted;
    /// it never disturbs the refresh cycle that triggered it.
    pub fn save(&self, summaries: &[NewsSummary]) {
        if let Err(e) = self.write_atomic(summaries) {
            counter!("cache_write_errors_total").increment(1);
            tracing::warn!(path = %self.path.display(), "news cache write failed: {e:#}");
        }
    }

    // Sibling tmp file + rename, so readers never observe a torn file.
    fn write_atomic(&self, summaries: &[NewsSummary]) -> Result<()> {
        let json = serde_json::to_string_pretty(summaries).context("encoding news summaries")?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        let mut f =
            fs::File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
        f.write_all(json.as_bytes()).context("writing news cache")?;
        fs::rename(&tmp, &self.path).context("renaming news cache into place")?;
        Ok(())
    }

    /// Read the persisted list back. A missing file is a normal cold start;
    /// a corrupt one is ignored with a warning. Both read as `None`.
    pub fn load(&self) -> Option<Vec<NewsSummary>> {
        let content = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(list) => Some(list),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "news cache is corrupt, ignoring");
                None
            }
        }
    }
}
