use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::{ConflictStrategy, SeedConfig};
use crate::db::{Database, InsertOutcome, UpsertOutcome};
use crate::error::{Error, Result};
use crate::report::{RecentEntry, SeedReport};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy)]
struct SeedStats {
    inserted: usize,
    refreshed: usize,
}

// ---------------------------------------------------------------------------
// Seeder
// ---------------------------------------------------------------------------

/// Writes entries into the clipboard store, one statement per entry, and
/// builds the summary report afterwards.
pub struct Seeder<'a> {
    db: &'a Database,
    strategy: ConflictStrategy,
    atomic: bool,
    recent_limit: usize,
    preview_width: usize,
}

impl<'a> Seeder<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            strategy: ConflictStrategy::Upsert,
            atomic: false,
            recent_limit: 10,
            preview_width: 30,
        }
    }

    pub fn from_config(db: &'a Database, config: &SeedConfig) -> Self {
        Self::new(db)
            .with_strategy(config.strategy)
            .with_atomic(config.atomic)
            .with_recent_limit(config.recent_limit)
            .with_preview_width(config.preview_width)
    }

    pub fn with_strategy(mut self, strategy: ConflictStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Run the whole batch in one transaction so a failure leaves no rows behind.
    pub fn with_atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self
    }

    pub fn with_preview_width(mut self, width: usize) -> Self {
        self.preview_width = width;
        self
    }

    /// Insert each entry, or refresh the timestamp of the row that already
    /// holds it. `entries[0]` is inserted as the default entry.
    ///
    /// Outside atomic mode a storage error stops the run at the failing
    /// entry; rows written before it stay written.
    pub fn seed(&self, entries: &[String]) -> Result<SeedReport> {
        if let Some(index) = entries.iter().position(|e| e.is_empty()) {
            return Err(Error::EmptyEntry { index });
        }
        if !self.db.has_unique_content_constraint()? {
            return Err(Error::MissingUniqueConstraint);
        }

        debug!(
            entries = entries.len(),
            strategy = ?self.strategy,
            atomic = self.atomic,
            "seeding clipboard history"
        );

        let stats = if self.atomic {
            self.db.with_transaction(|| self.seed_entries(entries))?
        } else {
            self.seed_entries(entries)?
        };

        let report = self.report(stats)?;
        info!(
            inserted = report.inserted,
            refreshed = report.refreshed,
            total = report.total_count,
            "seeding complete"
        );
        Ok(report)
    }

    fn seed_entries(&self, entries: &[String]) -> Result<SeedStats> {
        let mut stats = SeedStats::default();
        for (index, content) in entries.iter().enumerate() {
            let outcome = self
                .seed_one(content, index == 0)
                .map_err(|e| match e {
                    Error::Storage(source) => Error::Entry { index, source },
                    other => other,
                })?;
            match outcome {
                UpsertOutcome::Inserted(_) => stats.inserted += 1,
                UpsertOutcome::Refreshed => stats.refreshed += 1,
            }
        }
        Ok(stats)
    }

    fn seed_one(&self, content: &str, is_default: bool) -> Result<UpsertOutcome> {
        match self.strategy {
            ConflictStrategy::Upsert => self.db.upsert_entry(content, is_default),
            ConflictStrategy::InsertThenTouch => {
                match self.db.insert_entry(content, is_default)? {
                    InsertOutcome::Inserted(id) => Ok(UpsertOutcome::Inserted(id)),
                    InsertOutcome::Duplicate => {
                        // Another writer may delete the row between the two statements.
                        if !self.db.touch_entry(content)? {
                            warn!("duplicate row vanished before its timestamp could be refreshed");
                        }
                        Ok(UpsertOutcome::Refreshed)
                    }
                }
            }
        }
    }

    fn report(&self, stats: SeedStats) -> Result<SeedReport> {
        let total_count = self.db.count_entries()?;
        let recent = self
            .db
            .recent_entries(self.recent_limit)?
            .into_iter()
            .map(|e| RecentEntry::from_entry(e, self.preview_width))
            .collect();
        Ok(SeedReport {
            inserted: stats.inserted,
            refreshed: stats.refreshed,
            total_count,
            recent,
            recent_limit: self.recent_limit,
            preview_width: self.preview_width,
        })
    }
}

/// Open the store at `store_path`, seed `entries` with default settings, and
/// close the store again whether or not seeding succeeded.
pub fn seed(entries: &[String], store_path: &Path) -> Result<SeedReport> {
    let db = Database::open(store_path)?;
    info!(db = %store_path.display(), "opened clipboard store");
    Seeder::new(&db).seed(entries)
}
