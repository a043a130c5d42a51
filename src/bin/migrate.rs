//! Migration tool to convert legacy start-date records to the current format
//!
//! Usage: migrate-legacy [STORE_DIR]
//!
//! If no directory is provided, uses the configured storage directory.

use std::io::Write;
use std::path::PathBuf;

use period_tracker::store::{migrate_legacy, LEGACY_RECORDS_KEY, RECORDS_KEY};
use period_tracker::{Config, FileStore, KeyValueStore};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
        .with_target(false)
        .init();

    let store_dir = match std::env::args().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => Config::load()?.storage_path()?,
    };

    let mut store = FileStore::at(&store_dir)?;

    if store.get(LEGACY_RECORDS_KEY)?.is_none() {
        eprintln!("Error: no legacy records found in {}", store_dir.display());
        std::process::exit(1);
    }

    if store.get(RECORDS_KEY)?.is_some() {
        eprintln!("Warning: current-format history already exists in {}", store_dir.display());
        eprint!("Overwrite it with the legacy records? [y/N] ");
        std::io::stderr().flush()?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            eprintln!("Aborted.");
            std::process::exit(0);
        }
    }

    println!("Migrating legacy records");
    println!("  Store: {}", store_dir.display());
    println!("  From:  {LEGACY_RECORDS_KEY}");
    println!("  To:    {RECORDS_KEY}");

    let Some(history) = migrate_legacy(&mut store)? else {
        eprintln!("Error: legacy records disappeared during migration");
        std::process::exit(1);
    };

    println!("\nMigrated {} period(s):", history.len());
    for record in &history {
        println!("  {}  ({})", record.span(), record.length());
    }
    println!("\nThe legacy records were left in place.");

    Ok(())
}
