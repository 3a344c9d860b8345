//! CLI for the ridstore beacon store.
//!
//! Replays recorded beacon captures into a store and runs the same queries a
//! receiver's display loop and upload path use: ranking, freshness, per-source
//! history and bounded JSON export.

mod replay;

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use ridstore::{Entry, Store, StoreConfig};
use tracing_subscriber::EnvFilter;

/// ridstore — Remote ID beacon store CLI.
#[derive(Parser)]
#[command(name = "ridstore", version, about)]
struct Cli {
    /// JSON store configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Target identifier; overrides the configuration file.
    #[arg(long, global = true)]
    target: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// List sources ranked by their latest signal strength.
    Rank {
        /// Path to a JSON-lines beacon capture.
        capture: PathBuf,
    },

    /// List sources heard within a trailing window.
    Active {
        /// Path to a JSON-lines beacon capture.
        capture: PathBuf,

        /// Reference time in seconds (defaults to the newest observation).
        #[arg(long)]
        now: Option<i64>,

        /// Window length in seconds (defaults to the configured window).
        #[arg(long)]
        window: Option<i64>,
    },

    /// Print the retained history of one source.
    Show {
        /// Path to a JSON-lines beacon capture.
        capture: PathBuf,

        /// Source identifier.
        rid: String,

        /// Newest entries to print (0 = all).
        #[arg(long, default_value = "0")]
        max: usize,

        /// Output format.
        #[arg(long, default_value = "csv")]
        format: OutputFormat,
    },

    /// Write the bounded JSON export to stdout.
    Export {
        /// Path to a JSON-lines beacon capture.
        capture: PathBuf,

        /// Export the source whose latest entry carries this registration
        /// instead of the strongest source.
        #[arg(long)]
        registration: Option<String>,

        /// Newest entries to include (defaults to the configured length).
        #[arg(long)]
        max: Option<usize>,
    },

    /// Display the configuration and per-source buffer usage.
    Info {
        /// Path to a JSON-lines beacon capture.
        capture: PathBuf,
    },
}

/// Output format for source history.
#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Comma-separated values.
    Csv,
    /// JSON array of entries.
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = load_config(cli.config.as_deref(), cli.target).and_then(|config| match cli.command {
        Commands::Rank { capture } => cmd_rank(&config, &capture),
        Commands::Active {
            capture,
            now,
            window,
        } => cmd_active(&config, &capture, now, window),
        Commands::Show {
            capture,
            rid,
            max,
            format,
        } => cmd_show(&config, &capture, &rid, max, &format),
        Commands::Export {
            capture,
            registration,
            max,
        } => cmd_export(&config, &capture, registration.as_deref(), max),
        Commands::Info { capture } => cmd_info(&config, &capture),
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Loads the configuration file (or defaults) and applies `--target`.
fn load_config(
    path: Option<&Path>,
    target: Option<String>,
) -> Result<StoreConfig, Box<dyn std::error::Error>> {
    let mut config = match path {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    };

    if let Some(target) = target {
        config.target_identifier = target;
    }

    Ok(config)
}

/// Builds a store from `config` and replays `capture` into it.
fn open_capture(config: &StoreConfig, capture: &Path) -> Result<Store, Box<dyn std::error::Error>> {
    let mut store = config.build_store()?;
    replay::replay_file(capture, &mut store)?;
    Ok(store)
}

/// Implements `ridstore rank <capture>`.
fn cmd_rank(config: &StoreConfig, capture: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_capture(config, capture)?;

    println!("rank,rssi,rid");
    for (rank, source) in store.ranked_identifiers().iter().enumerate() {
        println!("{rank},{},{}", source.signal_strength, source.identifier);
    }

    Ok(())
}

/// Implements `ridstore active <capture>`.
fn cmd_active(
    config: &StoreConfig,
    capture: &Path,
    now: Option<i64>,
    window: Option<i64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_capture(config, capture)?;

    let window = window.unwrap_or(config.active_window_secs);
    if window < 0 {
        return Err(format!("window must not be negative (got {window})").into());
    }

    let now = now.unwrap_or_else(|| newest_observation(&store));
    let active = store.active_since(now, window);

    println!("# now={now}, window={window}s, active={}", active.len());
    for identifier in active {
        println!("{identifier}");
    }

    Ok(())
}

/// Implements `ridstore show <capture> <rid>`.
fn cmd_show(
    config: &StoreConfig,
    capture: &Path,
    rid: &str,
    max: usize,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_capture(config, capture)?;

    if !store.contains(rid) {
        return Err(format!("Source '{rid}' not found").into());
    }

    let entries = store.entries_for(rid, max).collect_all();

    match format {
        OutputFormat::Csv => {
            println!("# rid={rid}, entries={}", entries.len());
            println!("ts,rssi,ch,bTs,reg,lat,lon,pAlt,gAlt");
            for entry in &entries {
                println!("{}", csv_row(entry));
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "rid": rid,
                "count": entries.len(),
                "entries": entries,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Implements `ridstore export <capture>`.
fn cmd_export(
    config: &StoreConfig,
    capture: &Path,
    registration: Option<&str>,
    max: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_capture(config, capture)?;
    let max = max.unwrap_or(config.default_export_entries);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match registration {
        Some(registration) => store.export_by_registration(registration, max, &mut out)?,
        None => store.export_top_signal(1, max, &mut out)?,
    }
    writeln!(out)?;

    Ok(())
}

/// Implements `ridstore info <capture>`.
fn cmd_info(config: &StoreConfig, capture: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_capture(config, capture)?;

    println!("Capture: {}", capture.display());
    println!();
    println!("Target: {}", display_target(&config.target_identifier));
    println!("  Target capacity: {}", config.target_capacity);
    println!("  Other capacity: {}", config.other_capacity);
    println!("  Active window: {}s", config.active_window_secs);
    println!("  Export entries: {}", config.default_export_entries);
    println!();
    println!("Sources: {}", store.len());
    println!("Total entries: {}", store.total_entries());

    for (identifier, source) in store.sources() {
        let latest = source
            .latest()
            .map(|e| format!("rssi={}, ts={}, ch={}", e.signal_strength, e.observed_at, e.channel))
            .unwrap_or_else(|| "empty".to_string());

        println!(
            "  - {identifier}: {}/{} entries, {latest}",
            source.len(),
            source.capacity()
        );
    }

    Ok(())
}

/// Returns the newest `observed_at` across all sources, or 0 for an empty store.
fn newest_observation(store: &Store) -> i64 {
    store
        .sources()
        .filter(|(_, source)| !source.is_empty())
        .map(|(_, source)| source.latest_observed_at())
        .max()
        .unwrap_or(0)
}

fn display_target(target: &str) -> &str {
    if target.is_empty() { "(none)" } else { target }
}

fn csv_row(entry: &Entry) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{}",
        entry.observed_at,
        entry.signal_strength,
        entry.channel,
        entry.source_clock,
        entry.registration,
        entry.latitude,
        entry.longitude,
        entry.pressure_altitude,
        entry.gps_altitude,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const CAPTURE: &str = concat!(
        r#"{"rid":"alpha","rssi":-70,"ts":100,"bTs":"1","ch":1,"lat":0,"lon":0,"pAlt":0,"gAlt":0}"#,
        "\n",
        r#"{"rid":"bravo","rssi":-40,"ts":160,"bTs":"2","ch":6,"reg":"JA-7","lat":1,"lon":2,"pAlt":3,"gAlt":4}"#,
        "\n",
    );

    #[test]
    fn test_load_config_target_override() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("ridstore.json");
        std::fs::write(&path, r#"{"target_identifier": "from-file", "other_capacity": 4}"#).unwrap();

        let config = load_config(Some(&path), Some("from-flag".to_string())).unwrap();
        assert_eq!(config.target_identifier, "from-flag");
        assert_eq!(config.other_capacity, 4);

        let config = load_config(None, None).unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_open_capture_and_newest_observation() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("capture.jsonl");
        std::fs::write(&path, CAPTURE).unwrap();

        let config = load_config(None, Some("bravo".to_string())).unwrap();
        let store = open_capture(&config, &path).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.identifier_at_rank(0), Some("bravo"));
        assert_eq!(newest_observation(&store), 160);
        assert_eq!(store.active_since(160, 59), vec!["bravo"]);
    }

    #[test]
    fn test_open_capture_missing_file() {
        let temp_dir = tempdir().unwrap();
        let config = StoreConfig::default();
        assert!(open_capture(&config, &temp_dir.path().join("missing.jsonl")).is_err());
    }

    #[test]
    fn test_csv_row_omits_nothing() {
        let entry = Entry {
            signal_strength: -40,
            observed_at: 160,
            source_clock: 2,
            channel: 6,
            registration: "JA-7".to_string(),
            latitude: 1.0,
            longitude: 2.5,
            pressure_altitude: 3.0,
            gps_altitude: 4.0,
        };
        assert_eq!(csv_row(&entry), "160,-40,6,2,JA-7,1,2.5,3,4");
    }
}
