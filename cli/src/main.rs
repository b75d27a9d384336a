use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use snippets_core::{DEFAULT_CONFIG_FILE, SnippetsConfig, validate_name};
use snippets_sqlite::{Migration, SnippetStore, StoreError};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable overriding the configured log filter.
const LOG_ENV: &str = "SNIPPETS_LOG";

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CliOutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "snippets", version)]
#[command(about = "Store and retrieve snippets of text")]
struct Cli {
    /// YAML configuration file (default: ./snippets.yml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Database file path, overriding the configuration.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Snippet table name, overriding the configuration.
    #[arg(long, global = true)]
    table: Option<String>,
    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    format: CliOutputFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Store a snippet, replacing any snippet with the same name.
    Put(PutArgs),
    /// Retrieve a snippet by name.
    Get(GetArgs),
    /// List the names of all stored snippets.
    Catalog,
    /// Find snippets whose text contains a substring.
    Search(SearchArgs),
    /// Write every snippet to a JSON bundle.
    Export(ExportArgs),
    /// Snippet table setup and seeding operations.
    Migrate(MigrateArgs),
}

#[derive(Debug, Args)]
struct PutArgs {
    /// The name of the snippet.
    name: String,
    /// The snippet text.
    text: String,
}

#[derive(Debug, Args)]
struct GetArgs {
    /// The name of the snippet.
    name: String,
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Case-sensitive text to look for.
    substring: String,
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Output JSON file (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct MigrateArgs {
    #[command(subcommand)]
    operation: MigrateOperation,
}

#[derive(Debug, Subcommand)]
enum MigrateOperation {
    /// Create the snippet table.
    Up,
    /// Drop the snippet table and every snippet in it.
    Down,
    /// Upsert snippets from a JSON bundle.
    Seed(MigrateSeedArgs),
    /// Show table status.
    Status,
}

#[derive(Debug, Args)]
struct MigrateSeedArgs {
    /// JSON bundle with a top-level "snippets" array.
    #[arg(long)]
    source: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };
    init_logging(&config);
    debug!(?cli, ?config, "parsed arguments");

    let format = cli.format;
    let result = match cli.command {
        Command::Put(args) => run_put(&config, args, format),
        Command::Get(args) => run_get(&config, args, format),
        Command::Catalog => run_catalog(&config, format),
        Command::Search(args) => run_search(&config, args, format),
        Command::Export(args) => run_export(&config, args),
        Command::Migrate(args) => run_migrate(&config, args),
    };

    if let Err(err) = result {
        error!(%err, "command failed");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Layers defaults, the YAML file, and command-line overrides.
fn resolve_config(cli: &Cli) -> Result<SnippetsConfig, String> {
    let mut config = match &cli.config {
        Some(path) => SnippetsConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        None => SnippetsConfig::load_or_default(DEFAULT_CONFIG_FILE)
            .map_err(|e| format!("Failed to load config '{DEFAULT_CONFIG_FILE}': {e}"))?,
    };
    if let Some(db) = &cli.db {
        config.database = db.clone();
    }
    if let Some(table) = &cli.table {
        config.table = table.clone();
    }
    Ok(config)
}

/// Sends tracing output to the configured log file.
///
/// Logging is diagnostic only; an unwritable log file costs a warning, not
/// the command.
fn init_logging(config: &SnippetsConfig) {
    let Some(path) = &config.log_file else {
        return;
    };
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("warning: cannot open log file '{}': {err}", path.display());
            return;
        }
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    if let Err(err) = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .try_init()
    {
        eprintln!("warning: cannot install logger: {err}");
    }
}

/// Opens the store for `put`, creating the database and table on first use
/// when `auto_migrate` is set.
fn open_store_for_write(config: &SnippetsConfig) -> Result<SnippetStore, String> {
    let timeout = Duration::from_millis(config.busy_timeout_ms);
    if !config.auto_migrate {
        return SnippetStore::open(&config.database, &config.table, timeout)
            .map_err(|e| e.to_string());
    }

    let mut migration = open_migration(config)?;
    migration
        .connection()
        .busy_timeout(timeout)
        .map_err(|e| format!("Failed to configure database: {e}"))?;
    migration
        .up()
        .map_err(|e| format!("Failed to prepare table '{}': {e}", config.table))?;
    SnippetStore::from_connection(migration.into_connection(), config.table.as_str())
        .map_err(|e| e.to_string())
}

/// Opens an existing store for the read-only commands. Never creates files
/// or tables.
fn open_store_for_read(config: &SnippetsConfig) -> Result<SnippetStore, String> {
    let timeout = Duration::from_millis(config.busy_timeout_ms);
    SnippetStore::open_existing(&config.database, &config.table, timeout)
        .map_err(|e| e.to_string())
}

fn open_migration(config: &SnippetsConfig) -> Result<Migration, String> {
    let conn = rusqlite::Connection::open(&config.database).map_err(|source| {
        StoreError::Unavailable {
            path: config.database.clone(),
            source,
        }
        .to_string()
    })?;
    Migration::new(conn, config.table.as_str())
        .map_err(|e| format!("Failed to initialize migration: {e}"))
}

fn run_put(config: &SnippetsConfig, args: PutArgs, format: CliOutputFormat) -> Result<(), String> {
    validate_name(&args.name).map_err(|e| e.to_string())?;

    let store = open_store_for_write(config)?;
    let snippet = store
        .put(&args.name, &args.text)
        .map_err(|e| format!("Failed to store '{}': {e}", args.name))?;
    close_store(store)?;
    info!(name = %snippet.name, "stored snippet");

    match format {
        CliOutputFormat::Text => println!("Stored {:?} as {:?}", snippet.text, snippet.name),
        CliOutputFormat::Json => print_json(&snippet)?,
    }
    Ok(())
}

fn run_get(config: &SnippetsConfig, args: GetArgs, format: CliOutputFormat) -> Result<(), String> {
    let store = open_store_for_read(config)?;
    let text = store
        .get(&args.name)
        .map_err(|e| format!("Failed to retrieve '{}': {e}", args.name))?;
    close_store(store)?;

    match format {
        CliOutputFormat::Text => match &text {
            Some(text) => println!("{text}"),
            None => println!("No snippet found for {:?}", args.name),
        },
        CliOutputFormat::Json => print_json(&serde_json::json!({
            "name": args.name,
            "text": text,
        }))?,
    }
    Ok(())
}

fn run_catalog(config: &SnippetsConfig, format: CliOutputFormat) -> Result<(), String> {
    let store = open_store_for_read(config)?;
    let names = store
        .catalog()
        .map_err(|e| format!("Failed to list snippets: {e}"))?;
    close_store(store)?;

    match format {
        CliOutputFormat::Text if names.is_empty() => println!("No snippets stored."),
        CliOutputFormat::Text => {
            for name in &names {
                println!("{name}");
            }
        }
        CliOutputFormat::Json => print_json(&names)?,
    }
    Ok(())
}

fn run_search(
    config: &SnippetsConfig,
    args: SearchArgs,
    format: CliOutputFormat,
) -> Result<(), String> {
    let store = open_store_for_read(config)?;
    let matches = store
        .search(&args.substring)
        .map_err(|e| format!("Failed to search for {:?}: {e}", args.substring))?;
    close_store(store)?;

    match format {
        CliOutputFormat::Text if matches.is_empty() => {
            println!("No snippets match {:?}", args.substring)
        }
        CliOutputFormat::Text => {
            for snippet in &matches {
                println!("{}: {}", snippet.name, snippet.text);
            }
        }
        CliOutputFormat::Json => print_json(&matches)?,
    }
    Ok(())
}

fn run_export(config: &SnippetsConfig, args: ExportArgs) -> Result<(), String> {
    let store = open_store_for_read(config)?;
    let bundle = store
        .export()
        .map_err(|e| format!("Failed to export snippets: {e}"))?;
    close_store(store)?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|err| {
                        format!(
                            "Failed to create output directory '{}': {err}",
                            parent.display()
                        )
                    })?;
                }
            }
            let file = fs::File::create(path)
                .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
            bundle
                .to_writer(io::BufWriter::new(file))
                .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
            println!(
                "Exported {} snippet(s) to '{}'.",
                bundle.len(),
                path.display()
            );
        }
        None => bundle
            .to_writer(io::stdout().lock())
            .map_err(|err| format!("Failed to write bundle: {err}"))?,
    }
    Ok(())
}

fn run_migrate(config: &SnippetsConfig, args: MigrateArgs) -> Result<(), String> {
    let mut migration = open_migration(config)?;
    migration
        .connection()
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|e| format!("Failed to configure database: {e}"))?;

    match args.operation {
        MigrateOperation::Up => {
            migration
                .up()
                .map_err(|e| format!("Migration up failed: {e}"))?;
            println!(
                "Migration up complete. Table '{}' ready in '{}'.",
                config.table,
                config.database.display()
            );
        }
        MigrateOperation::Down => {
            migration
                .down()
                .map_err(|e| format!("Migration down failed: {e}"))?;
            println!(
                "Migration down complete. Table '{}' dropped from '{}'.",
                config.table,
                config.database.display()
            );
        }
        MigrateOperation::Seed(seed) => {
            let report = migration
                .seed(&seed.source)
                .map_err(|e| format!("Seed failed: {e}"))?;
            println!("Seed complete:");
            println!("  Snippets inserted: {}", report.inserted);
            println!("  Snippets updated: {}", report.updated);
        }
        MigrateOperation::Status => {
            let status = migration
                .status()
                .map_err(|e| format!("Failed to get migration status: {e}"))?;
            println!("Migration Status:");
            println!(
                "  Table exists: {}",
                if status.table_exists { "yes" } else { "no" }
            );
            println!("  Snippet count: {}", status.snippet_count);
        }
    }
    Ok(())
}

fn close_store(store: SnippetStore) -> Result<(), String> {
    store
        .close()
        .map_err(|e| format!("Failed to close database: {e}"))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), String> {
    let raw = serde_json::to_string_pretty(value)
        .map_err(|e| format!("JSON serialization failed: {e}"))?;
    println!("{raw}");
    Ok(())
}
