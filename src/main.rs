//! Leakwatch main entry point
//!
//! This is the command-line interface for the Leakwatch scanner.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use leakwatch::config::{load_config_with_hash, Config};
use leakwatch::output::{write_json_report, write_markdown_summary};
use leakwatch::scan::{ScanProfile, ScanRequest, ScanService};
use leakwatch::storage::{SeedStatus, SeedStore, Setting, SettingRange, SettingsStore, SqliteStorage};
use leakwatch::PolitenessGate;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Leakwatch: a polite keyword and leak-indicator scanner
///
/// Leakwatch crawls seed sites while respecting robots.txt and a global
/// rate limit, follows the most promising links first, and reports keyword
/// hits and leak indicators found along the way.
#[derive(Parser, Debug)]
#[command(name = "leakwatch")]
#[command(version)]
#[command(about = "A polite keyword and leak-indicator scanner", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scan and wait for it to finish
    Scan(ScanArgs),

    /// Manage seed URLs
    Seeds {
        #[command(subcommand)]
        action: SeedsAction,
    },

    /// Show or change scan settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(clap::Args, Debug)]
struct ScanArgs {
    /// Comma-separated keywords
    #[arg(short, long)]
    keywords: String,

    /// URL to scan instead of the enabled seeds (repeatable)
    #[arg(long = "url", value_name = "URL")]
    urls: Vec<String>,

    #[arg(long)]
    max_pages: Option<i64>,

    #[arg(long)]
    max_depth: Option<i64>,

    /// Per-seed time budget in seconds
    #[arg(long)]
    time_limit: Option<i64>,

    /// Minimum link score for a page to be expanded
    #[arg(long, allow_negative_numbers = true)]
    min_priority: Option<i64>,

    #[arg(long)]
    include_subdomains: Option<bool>,

    /// Preset budget: efficiency, balanced or accuracy
    #[arg(long)]
    profile: Option<ScanProfile>,

    /// Status poll interval in milliseconds
    #[arg(long, default_value_t = 500)]
    poll_ms: u64,
}

#[derive(Subcommand, Debug)]
enum SeedsAction {
    /// List all seeds
    List,
    /// Add a seed
    Add {
        url: String,
        name: String,
        /// Store the seed disabled
        #[arg(long)]
        disabled: bool,
    },
    /// Remove a seed
    Remove { id: String },
    /// Flip a seed between enabled and disabled
    Toggle { id: String },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Print stored settings
    Show,
    /// Store a {min, max, default} range for one tunable
    Set {
        name: String,
        min: i64,
        max: i64,
        default: i64,
    },
    /// Set the default for following subdomain links
    Subdomains {
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let mut storage = SqliteStorage::new(Path::new(&config.storage.database_path))
        .context("failed to open database")?;
    bootstrap_seeds(&mut storage, &config)?;

    match cli.command {
        Command::Scan(args) => handle_scan(config, storage, args).await,
        Command::Seeds { action } => handle_seeds(&mut storage, action),
        Command::Settings { action } => handle_settings(config, storage, action),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("leakwatch=info,warn"),
            1 => EnvFilter::new("leakwatch=debug,info"),
            2 => EnvFilter::new("leakwatch=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Registers the configured seeds the first time the database is used
fn bootstrap_seeds(storage: &mut SqliteStorage, config: &Config) -> anyhow::Result<()> {
    if config.seeds.is_empty() || !storage.list_seeds()?.is_empty() {
        return Ok(());
    }

    for seed in &config.seeds {
        storage.add_seed(&seed.url, &seed.name, SeedStatus::Enabled)?;
    }
    tracing::info!("Registered {} seed(s) from configuration", config.seeds.len());
    Ok(())
}

fn build_service(config: &Config, storage: SqliteStorage) -> anyhow::Result<ScanService> {
    let gate = Arc::new(PolitenessGate::from_config(config).context("failed to build HTTP client")?);
    let service = ScanService::new(gate, Arc::new(Mutex::new(storage)));
    service.apply_settings()?;
    Ok(service)
}

async fn handle_scan(config: Config, storage: SqliteStorage, args: ScanArgs) -> anyhow::Result<()> {
    let service = build_service(&config, storage)?;

    let request = ScanRequest {
        keywords: args.keywords,
        urls: args.urls,
        max_pages: args.max_pages,
        max_depth: args.max_depth,
        time_limit_seconds: args.time_limit,
        min_priority_to_expand: args.min_priority,
        include_subdomains: args.include_subdomains,
        profile: args.profile,
    };

    let job_id = match service.submit(request) {
        Ok(id) => id,
        Err(e) if e.is_client_error() => bail!("{}", e),
        Err(e) => return Err(e.into()),
    };

    let poll = Duration::from_millis(args.poll_ms.max(10));
    let mut last_seen = 0;
    let job = loop {
        let job = service.status(&job_id)?;
        if job.is_complete() {
            break job;
        }
        if job.progress.current != last_seen {
            last_seen = job.progress.current;
            eprintln!(
                "[{}/{}] {}",
                job.progress.current,
                job.progress.total,
                job.progress.current_url.as_deref().unwrap_or("")
            );
        }
        tokio::time::sleep(poll).await;
    };

    println!("{}", serde_json::to_string_pretty(&job)?);

    if let Some(path) = &config.output.summary_path {
        write_markdown_summary(&job, Path::new(path))?;
        tracing::info!("Summary written to {}", path);
    }
    if let Some(path) = &config.output.json_path {
        write_json_report(&job, Path::new(path))?;
        tracing::info!("JSON report written to {}", path);
    }

    Ok(())
}

fn handle_seeds(storage: &mut SqliteStorage, action: SeedsAction) -> anyhow::Result<()> {
    match action {
        SeedsAction::List => {
            let seeds = storage.list_seeds()?;
            let enabled = seeds
                .iter()
                .filter(|seed| seed.status == SeedStatus::Enabled)
                .count();
            for seed in &seeds {
                println!("{}  [{}]  {}  {}", seed.id, seed.status, seed.name, seed.url);
            }
            println!("\n{} seed(s), {} enabled", seeds.len(), enabled);
        }
        SeedsAction::Add {
            url,
            name,
            disabled,
        } => {
            let status = if disabled {
                SeedStatus::Disabled
            } else {
                SeedStatus::Enabled
            };
            let seed = storage.add_seed(&url, &name, status)?;
            println!("Added seed {}", seed.id);
        }
        SeedsAction::Remove { id } => {
            storage.delete_seed(&id)?;
            println!("Removed seed {}", id);
        }
        SeedsAction::Toggle { id } => {
            let seed = storage.toggle_seed(&id)?;
            println!("Seed {} is now {}", seed.id, seed.status);
        }
    }
    Ok(())
}

fn handle_settings(
    config: Config,
    mut storage: SqliteStorage,
    action: SettingsAction,
) -> anyhow::Result<()> {
    match action {
        SettingsAction::Show => {
            let settings = storage.load_settings()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsAction::Set {
            name,
            min,
            max,
            default,
        } => {
            let setting: Setting = name.parse()?;
            let service = build_service(&config, storage)?;
            let stored = service.update_setting(setting, SettingRange::new(min, max, default))?;
            println!(
                "{} = {{ min: {}, max: {}, default: {} }}",
                setting, stored.min, stored.max, stored.default
            );
        }
        SettingsAction::Subdomains { value } => {
            storage.set_include_subdomains(value)?;
            println!("include_subdomains = {}", value);
        }
    }
    Ok(())
}
