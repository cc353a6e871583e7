//! multisite-report - plugin and theme usage across a multisite network
//!
//! A CLI tool that counts, for every installed plugin or theme, the sites
//! of a network where it is active, then filters and sorts the result
//! into a report.
//!
//! Exit codes:
//!   0 - Report printed, or nothing matched
//!   1 - Error (not a multisite network, no sites, bad config or snapshot)

mod analysis;
mod cli;
mod config;
mod models;
mod network;
mod report;

use anyhow::{anyhow, Context, Result};
use cli::Args;
use config::Config;
use network::NetworkSnapshot;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so [general].verbose can apply
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&args, &config);

    info!("multisite-report v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    match run_report(&args, &config) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Report failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .multisite-report.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE);
    println!("   Set [network].snapshot to skip passing --snapshot every time.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so that reports on stdout can be piped.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Generate the requested report. Returns the exit code.
fn run_report(args: &Args, config: &Config) -> Result<i32> {
    let (kind, filters) = args
        .report()
        .ok_or_else(|| anyhow!("A report is required: 'plugins' or 'themes'"))?;

    let snapshot_path = config.network.snapshot.as_ref().ok_or_else(|| {
        anyhow!(
            "No network snapshot given. Use --snapshot or set [network].snapshot in {}",
            config::CONFIG_FILE
        )
    })?;

    let mut snapshot = NetworkSnapshot::load(snapshot_path)?;
    let criteria = config.filter_criteria(filters.site_id());

    let outcome = report::generate(&mut snapshot, kind, criteria, config.general.format)?;
    report::write_output(outcome, args.output.as_deref())?;

    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location; a broken default file is not fatal
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Failed to load {}: {:#}", config::CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}
