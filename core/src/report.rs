use std::fmt;

use serde::Serialize;

use crate::db::ClipboardEntry;

/// One row of the "latest entries" table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentEntry {
    pub id: i64,
    pub preview: String,
    pub is_default: bool,
    /// `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
}

impl RecentEntry {
    pub fn from_entry(entry: ClipboardEntry, preview_width: usize) -> Self {
        Self {
            id: entry.id,
            preview: preview(&entry.content, preview_width),
            is_default: entry.is_default,
            timestamp: entry.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    /// Entries of this run that created a new row.
    pub inserted: usize,
    /// Entries of this run that refreshed an existing row.
    pub refreshed: usize,
    /// All rows in the store, not only those touched by this run.
    pub total_count: i64,
    pub recent: Vec<RecentEntry>,
    #[serde(skip)]
    pub recent_limit: usize,
    #[serde(skip)]
    pub preview_width: usize,
}

/// First `width` characters of `content`.
pub fn preview(content: &str, width: usize) -> String {
    content.chars().take(width).collect()
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total entries: {}", self.total_count)?;
        writeln!(f)?;
        writeln!(f, "Latest {} entries:", self.recent_limit)?;
        for row in &self.recent {
            writeln!(
                f,
                "ID: {:>3} | {:<width$} | {}",
                row.id,
                row.preview,
                row.timestamp,
                width = self.preview_width
            )?;
        }
        Ok(())
    }
}
