//! Scroll-Scribe main entry point
//!
//! This is the command-line interface for Scroll-Scribe.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use scroll_scribe::config::{load_config_with_hash, validate, ScribeConfig};
use scroll_scribe::discovery::{read_urls_from_file, save_links};
use scroll_scribe::fetch::HttpFetcher;
use scroll_scribe::output::{MarkdownSummaryReporter, RunInfo, TracingReporter};
use scroll_scribe::persist::FsPersister;
use scroll_scribe::pipeline::{BatchSummary, Orchestrator, ShutdownSignal};
use scroll_scribe::transform::MarkdownTransformer;
use scroll_scribe::{LinkDiscoverer, ScribeError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Scroll-Scribe: turns documentation sites into clean Markdown files
///
/// Discover the pages linked from a start page, then fetch, clean up and
/// save each of them. Failed pages are listed in the run summary and never
/// stop the batch.
#[derive(Parser, Debug)]
#[command(name = "scroll-scribe")]
#[command(version)]
#[command(about = "Turns documentation sites into clean Markdown files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lists the same-site pages linked from a start page
    Discover {
        /// Page to collect links from
        #[arg(value_name = "URL")]
        url: String,

        /// Write links to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Converts every page listed in a URL file
    Process {
        /// Text file with one URL per line
        #[arg(value_name = "URL_FILE")]
        url_file: PathBuf,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Discovers the pages linked from a start page and converts them
    Run {
        /// Page to collect links from
        #[arg(value_name = "START_URL")]
        start_url: String,

        #[command(flatten)]
        batch: BatchArgs,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Page timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout: Option<u64>,

    /// Page readiness condition
    #[arg(long, value_name = "COND")]
    wait: Option<String>,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Skip this many URLs from the start of the list
    #[arg(long, value_name = "N")]
    start_at: Option<usize>,

    /// Directory for the generated files
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// LLM model identifier (provider/model)
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,

    /// Exit with a failure status if any page failed
    #[arg(long)]
    strict: bool,

    #[command(flatten)]
    common: CommonArgs,
}

impl BatchArgs {
    /// Applies the batch overrides and re-validates
    fn apply(&self, mut config: ScribeConfig) -> anyhow::Result<ScribeConfig> {
        if let Some(start_at) = self.start_at {
            config.pipeline.start_at = start_at;
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        if let Some(model) = &self.model {
            config.transform.model = model.clone();
        }
        validate(&config).context("Invalid command-line options")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let common = match &cli.command {
        Command::Discover { common, .. } => common,
        Command::Process { batch, .. } | Command::Run { batch, .. } => &batch.common,
    };

    let (config, config_hash) = load(common)?;

    // `verbose = true` in the config acts like a single -v
    let verbosity = if config.verbose { cli.verbose.max(1) } else { cli.verbose };
    setup_logging(verbosity, cli.quiet);

    if let Some(hash) = &config_hash {
        tracing::info!("Configuration loaded (hash: {})", hash);
    }

    match cli.command {
        Command::Discover { url, output, .. } => handle_discover(config, &url, output).await,
        Command::Process { url_file, batch } => {
            let config = batch.apply(config)?;
            handle_process(config, config_hash, &url_file, batch.strict).await
        }
        Command::Run { start_url, batch } => {
            let config = batch.apply(config)?;
            handle_run(config, config_hash, &start_url, batch.strict).await
        }
    }
}

/// Loads the config file (or defaults) and applies the shared CLI overrides
fn load(common: &CommonArgs) -> anyhow::Result<(ScribeConfig, Option<String>)> {
    let (mut config, hash) = match &common.config {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            (config, Some(hash))
        }
        None => (ScribeConfig::default(), None),
    };

    if let Some(timeout) = common.timeout {
        config.fetch.timeout_ms = timeout;
    }
    if let Some(wait) = &common.wait {
        config.fetch.wait_until = wait.clone();
    }
    validate(&config).context("Invalid command-line options")?;

    Ok((config, hash))
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("scroll_scribe=info,warn"),
            1 => EnvFilter::new("scroll_scribe=debug,info"),
            2 => EnvFilter::new("scroll_scribe=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles `discover`: prints or saves the links found on one page
async fn handle_discover(
    config: ScribeConfig,
    url: &str,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let fetcher = Arc::new(HttpFetcher::new(&config.fetch).context("Failed to build HTTP client")?);
    let discoverer = LinkDiscoverer::new(fetcher, config.fetch);

    let links = discoverer
        .discover(url)
        .await
        .with_context(|| format!("Link discovery failed for {}", url))?;

    match output {
        Some(path) => save_links(&links, &path)?,
        None => {
            for link in &links {
                println!("{}", link);
            }
        }
    }

    Ok(())
}

/// Handles `process`: runs the batch over the URL file
async fn handle_process(
    config: ScribeConfig,
    config_hash: Option<String>,
    url_file: &Path,
    strict: bool,
) -> anyhow::Result<()> {
    let all_urls = read_urls_from_file(url_file)?;
    let start_at = config.pipeline.start_at;

    let urls = match all_urls.get(start_at..) {
        Some(urls) if !urls.is_empty() => urls,
        _ => {
            tracing::warn!(
                "Nothing to process: {} URLs in {}, starting at {}",
                all_urls.len(),
                url_file.display(),
                start_at
            );
            return Ok(());
        }
    };

    let fetcher = Arc::new(HttpFetcher::new(&config.fetch).context("Failed to build HTTP client")?);
    let orchestrator = build_orchestrator(config, config_hash, fetcher).await?;

    finish(orchestrator.process(urls).await, strict)
}

/// Handles `run`: discovers the links of one page, then runs the batch over them
async fn handle_run(
    config: ScribeConfig,
    config_hash: Option<String>,
    start_url: &str,
    strict: bool,
) -> anyhow::Result<()> {
    let fetcher = Arc::new(HttpFetcher::new(&config.fetch).context("Failed to build HTTP client")?);
    let discoverer = LinkDiscoverer::new(fetcher.clone(), config.fetch.clone());
    let orchestrator = build_orchestrator(config, config_hash, fetcher).await?;

    finish(
        orchestrator.discover_and_process(&discoverer, start_url).await,
        strict,
    )
}

/// Creates the output directory, wires Ctrl-C and attaches the reporters
async fn build_orchestrator(
    config: ScribeConfig,
    config_hash: Option<String>,
    fetcher: Arc<HttpFetcher>,
) -> anyhow::Result<Orchestrator> {
    tokio::fs::create_dir_all(&config.output.directory)
        .await
        .with_context(|| {
            format!(
                "Failed to create output directory {}",
                config.output.directory.display()
            )
        })?;

    let shutdown = ShutdownSignal::new();
    install_ctrl_c(shutdown.clone());

    let summary_reporter = Arc::new(MarkdownSummaryReporter::new(
        config.output.directory.join("summary.md"),
        RunInfo {
            config_hash,
            model: Some(config.transform.model.clone()),
        },
    ));

    Ok(Orchestrator::new(
        config,
        fetcher,
        Arc::new(MarkdownTransformer::new()),
        Arc::new(FsPersister),
    )
    .with_shutdown(shutdown)
    .with_reporter(Arc::new(TracingReporter))
    .with_reporter(summary_reporter))
}

/// First Ctrl-C stops the batch before its next item; a second one exits
fn install_ctrl_c(shutdown: ShutdownSignal) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if !shutdown.request() {
                tracing::warn!("Interrupted again, exiting without finishing the current item");
                std::process::exit(130);
            }
        }
    });
}

/// Maps the batch result onto the process outcome
fn finish(result: scroll_scribe::Result<BatchSummary>, strict: bool) -> anyhow::Result<()> {
    let summary = match result {
        Ok(summary) => summary,
        Err(ScribeError::Config(e)) => bail!("{}", e.help_message()),
        Err(e) => return Err(e.into()),
    };

    if summary.interrupted {
        tracing::warn!("Interrupted after {} pages", summary.total());
    }

    if strict && summary.has_failures() {
        bail!("{} of {} pages failed", summary.failed.len(), summary.total());
    }

    Ok(())
}
