//! Period Tracker - Main entry point
//!
//! Terminal front end over the tracker core: show the current week and
//! cycle day, list history and statistics, apply taps, or stay running to
//! follow date rollovers.

use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use period_tracker::display;
use period_tracker::{
    Config, Day, FileStore, LoadStatus, PeriodTracker, PersistenceGateway, Result, SystemClock,
};

type Tracker = PeriodTracker<FileStore, SystemClock>;

#[derive(Parser)]
#[command(name = "period-tracker")]
#[command(author, version, about = "Period and cycle tracking from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PERIOD_TRACKER_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the week around a day and where it falls in the cycle
    Status {
        /// Day to inspect (YYYY-MM-DD or "today")
        #[arg(value_parser = parse_day)]
        date: Option<Day>,
    },

    /// List recorded periods
    History,

    /// Show cycle and period statistics
    Stats,

    /// Tap days in an editing session, then commit
    Edit {
        /// Start from an empty draft instead of the recorded days
        #[arg(long)]
        fresh: bool,

        /// Show the resulting history without saving it
        #[arg(long)]
        dry_run: bool,

        /// Days to tap, in order (YYYY-MM-DD or "today")
        #[arg(required = true, value_parser = parse_day)]
        dates: Vec<Day>,
    },

    /// Stay running and follow date rollovers
    Watch,

    /// Show or edit configuration
    Config {
        /// Print current configuration
        #[arg(long)]
        show: bool,

        /// Create default configuration file
        #[arg(long)]
        init: bool,
    },
}

fn parse_day(s: &str) -> std::result::Result<Day, String> {
    if s.eq_ignore_ascii_case("today") {
        return Ok(Day::today());
    }
    s.parse().map_err(|e: period_tracker::Error| e.to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load and validate configuration
    let config = if let Some(ref path) = cli.config {
        Config::load_from(path)?
    } else {
        Config::load()?
    };
    config.validate()?;

    // Initialize logging; RUST_LOG wins over the configured level
    let level = if cli.verbose {
        "debug"
    } else {
        config.general.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Some(Commands::Status { date }) => {
            let mut tracker = open_tracker(&config)?;
            if let Some(day) = date {
                tracker.select_day(day);
            }
            print_status(&tracker);
            Ok(())
        }

        Some(Commands::History) => {
            let tracker = open_tracker(&config)?;
            display::print_section_simple("RECORDED PERIODS");
            display::display_history(tracker.history());
            Ok(())
        }

        Some(Commands::Stats) => {
            let tracker = open_tracker(&config)?;
            print_stats(&tracker);
            Ok(())
        }

        Some(Commands::Edit {
            fresh,
            dry_run,
            dates,
        }) => {
            let tracker = open_tracker(&config)?;
            run_edit(tracker, fresh, dry_run, &dates);
            Ok(())
        }

        Some(Commands::Watch) => {
            let tracker = open_tracker(&config)?;
            run_watch(tracker, config.schedule.rollover_interval()?).await
        }

        Some(Commands::Config { show, init }) => {
            if init {
                let default_config = Config::default();
                default_config.save()?;
                println!(
                    "Created default configuration at {}",
                    Config::config_path()?.display()
                );
            } else if show {
                let contents = toml::to_string_pretty(&config)?;
                println!("{contents}");
            } else {
                println!("Configuration path: {}", Config::config_path()?.display());
                println!("Storage directory:  {}", config.storage_path()?.display());
            }
            Ok(())
        }

        None => {
            // Default: show today
            let tracker = open_tracker(&config)?;
            print_status(&tracker);
            Ok(())
        }
    }
}

fn open_tracker(config: &Config) -> Result<Tracker> {
    let store = FileStore::open(config)?;
    debug!(dir = %store.dir().display(), "Opened store");
    let tracker = PeriodTracker::new(
        PersistenceGateway::new(store),
        SystemClock,
        config.prediction.clone(),
    );

    match tracker.load_status() {
        LoadStatus::Migrated => println!("Migrated legacy period records."),
        LoadStatus::Corrupted => println!("Stored history was unreadable and has been reset."),
        LoadStatus::Empty | LoadStatus::Loaded => {}
    }
    Ok(tracker)
}

fn print_status(tracker: &Tracker) {
    let day = tracker.selected_day();

    println!("\n{}", "=".repeat(50));
    println!("  {}", day.date().format("%A, %B %-d %Y"));
    println!("{}\n", "=".repeat(50));

    display::display_week(tracker.visible_week(), day, |d| tracker.calendar_mark(d));
    println!("\n  {}", display::describe_status(&tracker.classify(day)));
    display::display_prediction(tracker.predict_next_period().as_ref());
}

fn print_stats(tracker: &Tracker) {
    display::print_section("CYCLE STATISTICS");

    if tracker.history().is_empty() {
        println!("No periods recorded yet.");
        println!("Record one with `period-tracker edit YYYY-MM-DD`.");
        return;
    }

    display::print_section_simple("CYCLES");
    display::display_cycles(&tracker.statistics());

    display::print_section_simple("PERIODS");
    display::display_period_lengths(&tracker.period_length_stats());
    display::display_prediction(tracker.predict_next_period().as_ref());

    println!("\n{}\n", "=".repeat(50));
}

fn run_edit(mut tracker: Tracker, fresh: bool, dry_run: bool, dates: &[Day]) {
    tracker.begin_edit(!fresh);

    display::print_section_simple("TAPS");
    for &day in dates {
        if let Some(outcome) = tracker.tap(day) {
            println!("  {day}: {}", display::describe_outcome(&outcome));
        }
    }

    if dry_run {
        display::print_section_simple("RESULT (not saved)");
        if let Some(editor) = tracker.editor() {
            display::display_history(editor.implied_history());
        }
        tracker.cancel();
    } else {
        tracker.commit();
        display::print_section_simple("RECORDED PERIODS");
        display::display_history(tracker.history());
    }
}

async fn run_watch(mut tracker: Tracker, period: Duration) -> Result<()> {
    tracker.subscribe(|event| debug!(?event, "Tracker event"));

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        interval = %humantime::format_duration(period),
        "Watching for date rollover"
    );
    print_status(&tracker);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if tracker.on_possible_date_rollover() {
                    print_status(&tracker);
                }
            }
            result = &mut shutdown => {
                result?;
                info!("Received shutdown signal");
                break;
            }
        }
    }

    Ok(())
}
