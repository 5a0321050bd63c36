use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use clippoo_seed::config::{read_entries, ConflictStrategy, Overrides, SeedConfig};
use clippoo_seed::db::Database;
use clippoo_seed::Seeder;

#[derive(Parser)]
#[command(
    name = "clippoo-seed",
    about = "Fill a clippoo clipboard history database with test entries"
)]
struct Cli {
    /// Clipboard database path (default: the clippoo data directory)
    #[arg(long)]
    db: Option<PathBuf>,

    /// TOML file with seeding options; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of synthetic entries to generate
    #[arg(long)]
    count: Option<usize>,

    /// Text before the sequence number of each synthetic entry
    #[arg(long)]
    prefix: Option<String>,

    /// Read entries from a file, one per line, instead of generating them
    #[arg(long, conflicts_with_all = ["count", "prefix"])]
    from: Option<PathBuf>,

    /// How many of the most recent rows to list
    #[arg(long)]
    limit: Option<usize>,

    /// Characters of content shown per row
    #[arg(long)]
    preview_width: Option<usize>,

    #[arg(long, value_enum)]
    strategy: Option<ConflictStrategy>,

    /// Roll back every row of the run if any entry fails
    #[arg(long)]
    atomic: bool,

    /// How long to wait on a locked database before failing
    #[arg(long)]
    busy_timeout_ms: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<(SeedConfig, Option<PathBuf>, bool)> {
        let mut config = match &self.config {
            Some(path) => SeedConfig::load(path)?,
            None => SeedConfig::default(),
        };
        config.apply_overrides(Overrides {
            store_path: self.db,
            entry_count: self.count,
            entry_prefix: self.prefix,
            recent_limit: self.limit,
            preview_width: self.preview_width,
            strategy: self.strategy,
            atomic: self.atomic,
            busy_timeout_ms: self.busy_timeout_ms,
        });
        Ok((config, self.from, self.json))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clippoo_seed=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let (config, from, json) = Cli::parse().into_config()?;

    let entries = match &from {
        Some(path) => read_entries(path)?,
        None => config.synthetic_entries(),
    };

    let db_path = config.resolve_store_path()?;
    tracing::info!(db = %db_path.display(), entries = entries.len(), "opening clipboard store");
    let db = Database::open(&db_path)?;
    db.set_busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;

    let report = Seeder::from_config(&db, &config).seed(&entries)?;
    drop(db);

    if json {
        let out = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{out}");
    } else {
        print!("{report}");
    }

    Ok(())
}
