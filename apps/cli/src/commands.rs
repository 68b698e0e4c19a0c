//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tubedigest_catalog::{MetadataClient, SearchClient, TranscriptClient};
use tubedigest_core::fetch::FetchClients;
use tubedigest_core::progress::ProgressReporter;
use tubedigest_core::transform::TransformOptions;
use tubedigest_inference::ChatClient;
use tubedigest_report::MarkdownRenderer;
use tubedigest_shared::{
    AppConfig, SortOrder, TubeDigestError, catalog_api_key, inference_api_key, init_config,
    load_config, load_config_from,
};
use tubedigest_store::{DocumentDir, FailureList, ListingCache};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// tubedigest — turn a channel's transcripts into a digest.
#[derive(Parser)]
#[command(
    name = "tubedigest",
    version,
    about = "Fetch channel transcripts, transform them with a model, and build a digest.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Path to an alternate config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// List the channel's completed videos without fetching anything.
    List {
        /// Cap how many video ids discovery accumulates.
        #[arg(long)]
        max_results: Option<u32>,
    },

    /// Download transcripts for the channel's completed videos.
    Fetch {
        /// Cap how many video ids discovery accumulates.
        #[arg(long)]
        max_results: Option<u32>,
    },

    /// Run raw transcripts through the model.
    Transform {
        /// Offset into the sorted document listing.
        #[arg(long, default_value_t = 0)]
        start: usize,

        /// Maximum documents to transform this run.
        #[arg(long)]
        limit: Option<usize>,

        /// Sweep oldest documents first instead of newest.
        #[arg(long)]
        oldest_first: bool,

        /// Override the configured model.
        #[arg(long)]
        model: Option<String>,

        /// Override the configured provider.
        #[arg(long)]
        provider: Option<String>,
    },

    /// Aggregate transformed documents into one digest.
    Report {
        /// Output file stem; the renderer appends its extension.
        #[arg(short, long, default_value = "digest")]
        output: String,

        /// Digest title.
        #[arg(long)]
        title: Option<String>,

        /// Short description printed under the title.
        #[arg(long)]
        description: Option<String>,
    },

    /// Prefix raw documents with their publish date.
    RenameDates,

    /// Join all raw documents into a single file.
    Concat {
        /// Output file path.
        #[arg(short, long, default_value = "transcriptions_concat.md")]
        output: String,

        /// Join oldest documents first instead of newest.
        #[arg(long)]
        oldest_first: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the application config, honoring the global `--config` override.
pub(crate) fn load_cli_config(cli: &Cli) -> Result<AppConfig> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
///
/// Logs go to stderr (text or JSON) and to a daily `log_<date>.txt` file
/// under the storage root. The file is opened once; a long-running process
/// keeps writing to the date it started on.
pub(crate) fn init_tracing(cli: &Cli, config: &AppConfig) -> Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "tubedigest=info",
        1 => "tubedigest=debug",
        _ => "tubedigest=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    let log_dir = config.storage.log_dir();
    std::fs::create_dir_all(&log_dir).map_err(|e| TubeDigestError::io(&log_dir, e))?;
    let log_path = log_dir.join(format!("log_{}.txt", chrono::Local::now().format("%Y-%m-%d")));
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| TubeDigestError::io(&log_path, e))?;

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    match cli.log_format {
        LogFormat::Text => {
            registry
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Json => {
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    match cli.command {
        Command::List { max_results } => cmd_list(config, max_results).await,
        Command::Fetch { max_results } => cmd_fetch(config, max_results).await,
        Command::Transform {
            start,
            limit,
            oldest_first,
            model,
            provider,
        } => cmd_transform(config, start, limit, oldest_first, model, provider).await,
        Command::Report {
            output,
            title,
            description,
        } => cmd_report(config, &output, title, description).await,
        Command::RenameDates => cmd_rename_dates(config).await,
        Command::Concat {
            output,
            oldest_first,
        } => cmd_concat(config, &output, oldest_first).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config).await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_list(config: AppConfig, max_results: Option<u32>) -> Result<()> {
    let api_key = catalog_api_key(&config)?;
    let http = tubedigest_catalog::build_client(config.catalog.timeout_secs)?;
    let search = SearchClient::new(http, &config.catalog.api_base, api_key);
    let cache = ListingCache::new(config.storage.cache_dir());
    let max = max_results.or(config.defaults.max_results);

    info!(channel_id = %config.defaults.channel_id, "listing completed videos");

    let result = tubedigest_core::discovery::list_items(&config, &search, &cache, max).await?;

    for id in &result.ids {
        println!("{id}");
    }

    println!();
    println!("  Videos:  {}", result.ids.len());
    println!(
        "  Source:  {}",
        if result.from_cache { "cache" } else { "network" }
    );
    println!();

    Ok(())
}

async fn cmd_fetch(config: AppConfig, max_results: Option<u32>) -> Result<()> {
    let api_key = catalog_api_key(&config)?;
    let http = tubedigest_catalog::build_client(config.catalog.timeout_secs)?;
    let search = SearchClient::new(http.clone(), &config.catalog.api_base, api_key.clone());
    let cache = ListingCache::new(config.storage.cache_dir());
    let max = max_results.or(config.defaults.max_results);

    let discovered = tubedigest_core::discovery::list_items(&config, &search, &cache, max).await?;
    info!(
        videos = discovered.ids.len(),
        from_cache = discovered.from_cache,
        "discovery complete"
    );

    let clients = FetchClients {
        metadata: MetadataClient::new(http.clone(), &config.catalog.api_base, api_key),
        transcript: TranscriptClient::new(http, &config.catalog.transcript_base),
    };
    let raw_docs = DocumentDir::new(config.storage.transcriptions_dir());
    let failures = FailureList::new(config.storage.failures_path());

    let reporter = CliProgress::new();
    let report = tubedigest_core::fetch::fetch_all(
        &config,
        &discovered.ids,
        &clients,
        &raw_docs,
        &failures,
        &reporter,
    )
    .await?;
    reporter.finish();

    println!();
    println!("  Downloaded:   {}", report.downloaded);
    println!("  Old:          {}", report.skipped_old);
    println!("  Duplicates:   {}", report.skipped_duplicate);
    println!("  Unavailable:  {}", report.unavailable);
    println!("  Failed:       {}", report.failed);
    println!("  Time:         {:.1}s", report.elapsed.as_secs_f64());
    if report.failed > 0 {
        println!();
        println!("  Failed ids recorded in {}", failures.path().display());
    }
    println!();

    Ok(())
}

async fn cmd_transform(
    mut config: AppConfig,
    start: usize,
    limit: Option<usize>,
    oldest_first: bool,
    model: Option<String>,
    provider: Option<String>,
) -> Result<()> {
    if let Some(model) = model {
        config.inference.model = model;
    }
    if let Some(provider) = provider {
        config.inference.provider = provider;
    }

    let api_key = inference_api_key(&config)?;
    let http = tubedigest_inference::build_client(config.inference.timeout_secs)?;
    let client = ChatClient::new(http, &config.inference.api_base, api_key);

    let raw_docs = DocumentDir::new(config.storage.transcriptions_dir());
    let generated = DocumentDir::new(config.storage.generated_dir());
    let options = TransformOptions {
        start,
        limit,
        order: if oldest_first {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        },
    };

    info!(
        model = %config.inference.model,
        provider = %config.inference.provider,
        "transforming documents"
    );

    let reporter = CliProgress::new();
    let report = tubedigest_core::transform::transform_all(
        &config,
        &options,
        &client,
        &raw_docs,
        &generated,
        &reporter,
    )
    .await?;
    reporter.finish();

    println!();
    println!("  Transformed:    {}", report.transformed);
    println!("  Skipped:        {}", report.skipped);
    println!("  Failed:         {}", report.failed);
    println!("  Input tokens:   {}", report.input_tokens);
    println!("  Output tokens:  {}", report.output_tokens);
    println!("  Time:           {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_report(
    config: AppConfig,
    output: &str,
    title: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let generated = DocumentDir::new(config.storage.generated_dir());
    let options = tubedigest_core::aggregate::DigestOptions { title, description };

    info!(output, "building digest");

    let report = tubedigest_core::aggregate::build_digest(
        &config,
        &options,
        &generated,
        &MarkdownRenderer,
        Path::new(output),
    )?;

    println!();
    println!("  Included:  {}", report.included);
    println!("  Skipped:   {}", report.skipped);
    println!("  Output:    {}", report.output_path.display());
    println!("  Time:      {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_rename_dates(config: AppConfig) -> Result<()> {
    let raw_docs = DocumentDir::new(config.storage.transcriptions_dir());

    info!(dir = %raw_docs.path().display(), "renaming documents with date prefixes");

    let report = tubedigest_core::maintenance::rename_with_date(&raw_docs)?;

    println!();
    println!("  Renamed:           {}", report.renamed);
    println!("  Already prefixed:  {}", report.already_prefixed);
    println!("  No date:           {}", report.skipped_no_date);
    println!("  Collisions:        {}", report.skipped_collision);
    println!("  Time:              {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_concat(config: AppConfig, output: &str, oldest_first: bool) -> Result<()> {
    let raw_docs = DocumentDir::new(config.storage.transcriptions_dir());
    let order = if oldest_first {
        SortOrder::Ascending
    } else {
        SortOrder::Descending
    };

    info!(output, "joining raw documents");

    let report = tubedigest_core::maintenance::concat(&raw_docs, Path::new(output), order)?;

    println!();
    println!("  Files:   {}", report.files);
    println!("  Output:  {}", report.output_path.display());
    println!("  Time:    {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config: AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn item_processed(&self, name: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("[{current}/{total}] {name}"));
    }
}
