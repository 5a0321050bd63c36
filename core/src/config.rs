use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// How a duplicate `content` is turned into a timestamp refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictStrategy {
    /// One `INSERT ... ON CONFLICT DO UPDATE` statement per entry.
    #[default]
    Upsert,
    /// Plain insert, then a separate update when the insert hits the
    /// unique constraint.
    InsertThenTouch,
}

/// Seeding parameters. Every field has a default so a config file only
/// needs the keys it changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedConfig {
    /// Store location. `None` means the clippoo data directory.
    pub store_path: Option<PathBuf>,
    pub entry_count: usize,
    pub entry_prefix: String,
    pub recent_limit: usize,
    pub preview_width: usize,
    pub strategy: ConflictStrategy,
    /// Roll back the whole run if any entry fails.
    pub atomic: bool,
    pub busy_timeout_ms: u64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            entry_count: 60,
            entry_prefix: "Test clipboard entry".to_string(),
            recent_limit: 10,
            preview_width: 30,
            strategy: ConflictStrategy::Upsert,
            atomic: false,
            busy_timeout_ms: 0,
        }
    }
}

/// Values given on the command line. `None` (or `false` for `atomic`)
/// keeps whatever the config file or the defaults say.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub store_path: Option<PathBuf>,
    pub entry_count: Option<usize>,
    pub entry_prefix: Option<String>,
    pub recent_limit: Option<usize>,
    pub preview_width: Option<usize>,
    pub strategy: Option<ConflictStrategy>,
    pub atomic: bool,
    pub busy_timeout_ms: Option<u64>,
}

impl SeedConfig {
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(path) = overrides.store_path {
            self.store_path = Some(path);
        }
        if let Some(count) = overrides.entry_count {
            self.entry_count = count;
        }
        if let Some(prefix) = overrides.entry_prefix {
            self.entry_prefix = prefix;
        }
        if let Some(limit) = overrides.recent_limit {
            self.recent_limit = limit;
        }
        if let Some(width) = overrides.preview_width {
            self.preview_width = width;
        }
        if let Some(strategy) = overrides.strategy {
            self.strategy = strategy;
        }
        if let Some(ms) = overrides.busy_timeout_ms {
            self.busy_timeout_ms = ms;
        }
        // A flag can switch atomic mode on but never off.
        self.atomic |= overrides.atomic;
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("invalid seed config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Configured store path, falling back to the clippoo data directory.
    pub fn resolve_store_path(&self) -> Result<PathBuf> {
        match &self.store_path {
            Some(p) => Ok(p.clone()),
            None => default_store_path(),
        }
    }

    /// `"<prefix> 1"` through `"<prefix> <entry_count>"`.
    pub fn synthetic_entries(&self) -> Vec<String> {
        synthetic_entries(&self.entry_prefix, self.entry_count)
    }
}

/// `<local data dir>/clippoo/clipboard.db`, where the clippoo daemon keeps
/// its history.
pub fn default_store_path() -> Result<PathBuf> {
    let data_dir =
        dirs::data_local_dir().context("could not determine local data directory")?;
    Ok(data_dir.join("clippoo").join("clipboard.db"))
}

pub fn synthetic_entries(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("{prefix} {i}")).collect()
}

/// Read entries from a text file, one per line. Blank lines are skipped.
pub fn read_entries(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read entries from {}", path.display()))?;
    Ok(text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect())
}
