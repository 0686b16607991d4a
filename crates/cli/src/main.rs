//! Command-line interface for the Go toolchain updater.
//!
//! `gup` with no command updates the toolchain in place. `check` only reports
//! versions, and `extract` runs the safe extractor on a local archive.

use clap::{Args, Parser, Subcommand};
use extractor::{ArchiveFormat, ExtractionPlan};
use std::path::{Path, PathBuf};
use std::process;
use updater::config::{DEFAULT_DOWNLOAD_BASE_URL, DEFAULT_RELEASE_FEED_URL, DEFAULT_TOP_LEVEL_PREFIX};
use updater::{GoToolchain, HttpClient, Logger, Orchestrator, Outcome, UpdaterConfig};

#[derive(Parser)]
#[command(name = "gup")]
#[command(version, about = "Update the Go toolchain to the latest stable release", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct GlobalArgs {
    /// Go binary used to query the local toolchain
    #[arg(long = "go", env = "GUP_GO", default_value = "go", global = true)]
    go: PathBuf,

    /// Release feed listing published versions
    #[arg(long, env = "GUP_FEED_URL", default_value = DEFAULT_RELEASE_FEED_URL, global = true)]
    feed_url: String,

    /// Base URL release archives are downloaded from
    #[arg(long, env = "GUP_DOWNLOAD_BASE", default_value = DEFAULT_DOWNLOAD_BASE_URL, global = true)]
    download_base: String,

    /// Directory receiving info.log and error.log
    #[arg(long, env = "GUP_LOG_DIR", default_value = ".", global = true)]
    log_dir: PathBuf,

    /// Do not mirror progress to the console
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the installed toolchain with the latest stable release (default)
    Update,

    /// Report the local and latest versions without changing anything
    Check,

    /// Extract a local release archive
    Extract {
        /// Archive file (.tar.gz, .tgz or .zip)
        archive: PathBuf,

        /// Output directory
        #[arg(short, long)]
        out: PathBuf,

        /// Top-level folder to strip from entry names
        #[arg(long, default_value = DEFAULT_TOP_LEVEL_PREFIX)]
        prefix: String,

        /// Print extraction statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult {
    let logger = Logger::open(&cli.global.log_dir, !cli.global.quiet)?;
    let config = UpdaterConfig {
        toolchain: cli.global.go.clone(),
        release_feed_url: cli.global.feed_url.clone(),
        download_base_url: cli.global.download_base.clone(),
        ..UpdaterConfig::default()
    };

    match cli.command.unwrap_or(Commands::Update) {
        Commands::Update => handle_update(&config, &logger),
        Commands::Check => handle_check(&config, &logger),
        Commands::Extract {
            archive,
            out,
            prefix,
            json,
        } => handle_extract(&archive, &out, &prefix, json, &logger),
    }
}

fn handle_update(config: &UpdaterConfig, logger: &Logger) -> CliResult {
    let toolchain = GoToolchain::new(&config.toolchain);
    let client = HttpClient::new()?;

    let outcome = Orchestrator::new(config, &toolchain, &client, logger).run()?;
    logger.in_scope(|| match &outcome {
        Outcome::UpToDate { version } => tracing::debug!(%version, "nothing to do"),
        Outcome::Updated { stats, .. } => tracing::debug!(
            files = stats.files_extracted,
            bytes = stats.bytes_written,
            duration_ms = stats.duration.as_millis() as u64,
            "update finished"
        ),
    });

    Ok(())
}

fn handle_check(config: &UpdaterConfig, logger: &Logger) -> CliResult {
    let toolchain = GoToolchain::new(&config.toolchain);
    let client = HttpClient::new()?;

    let check = Orchestrator::new(config, &toolchain, &client, logger).check()?;

    println!("local:  {} ({})", check.local.version, check.local.os_arch);
    println!("latest: {}", check.latest);
    if check.needs_update() {
        println!("update available");
    } else {
        println!("up to date");
    }

    Ok(())
}

fn handle_extract(
    archive: &Path,
    out: &Path,
    prefix: &str,
    json: bool,
    logger: &Logger,
) -> CliResult {
    let format = ArchiveFormat::from_path(archive)?;
    let plan = ExtractionPlan::new(archive, prefix, out);

    let stats = logger.in_scope(|| extractor::extract(&plan, format))?;

    let summary = format!(
        "extracted {} files, {} directories ({} bytes) from {} into {}",
        stats.files_extracted,
        stats.directories_created,
        stats.bytes_written,
        archive.display(),
        out.display()
    );

    // Keep stdout machine-readable: the summary goes to the log files only
    if json {
        logger.in_scope(|| tracing::info!("{}", summary));
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        logger.info(&summary);
    }

    Ok(())
}
