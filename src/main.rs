use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use mutual_graph::app::ViewerExport;
use mutual_graph::avatar::{
    AvatarCache, AvatarResolver, DEFAULT_FALLBACK_BASE, FallbackAvatars, FetchConfig, HttpSource, ImageFetcher,
};
use mutual_graph::dataset::load_people;
use mutual_graph::export::{ExportOptions, GraphExport, JsonExport, load_options};
use mutual_graph::pipeline::build_social_graph;

/// Draws who shares servers with whom, with everyone's avatar cut into a circle.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON object keyed by person id: {"name", "avatar", "mutual": [server ids]}
    input: PathBuf,

    /// Directory for processed circular avatars
    #[arg(long, default_value = "avatars")]
    cache_dir: PathBuf,

    /// Write the graph and layout options as JSON here
    #[arg(long)]
    output: Option<PathBuf>,

    /// Skip the interactive window
    #[arg(long)]
    no_viewer: bool,

    /// Layout options file; defaults apply when absent
    #[arg(long)]
    options: Option<PathBuf>,

    /// Download attempts per avatar
    #[arg(long, default_value_t = 3)]
    attempts: u32,

    /// Per-request timeout
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Pause between download attempts
    #[arg(long, default_value_t = 0)]
    retry_delay_ms: u64,

    /// Base URL of the default avatar set
    #[arg(long, default_value = DEFAULT_FALLBACK_BASE)]
    fallback_base: String,

    /// Number of default avatars under the base URL
    #[arg(long, default_value_t = 5)]
    fallback_count: u32,

    /// Worker threads for avatar resolution and graph building
    #[arg(long)]
    threads: Option<usize>,

    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(log_level: &str) -> anyhow::Result<()> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
        tracing::subscriber::set_global_default(subscriber)?;
        return Ok(());
    }

    let level = match log_level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure the worker pool")?;
    }

    let people = load_people(&args.input)?;
    let options = match &args.options {
        Some(path) => load_options(path)?,
        None => ExportOptions::default(),
    };

    let fetch = FetchConfig {
        attempts: args.attempts,
        timeout: Duration::from_secs(args.timeout_secs),
        retry_delay: Duration::from_millis(args.retry_delay_ms),
        ..FetchConfig::default()
    };
    let source = HttpSource::new(&fetch).context("failed to build the HTTP client")?;
    let cache = AvatarCache::open(&args.cache_dir)
        .with_context(|| format!("failed to open avatar cache {}", args.cache_dir.display()))?;
    let resolver = AvatarResolver::new(
        ImageFetcher::new(source, fetch.retry()),
        cache,
        FallbackAvatars::new(args.fallback_base.clone(), args.fallback_count),
    );

    info!(people = people.len(), cache = %args.cache_dir.display(), "building mutual server graph");
    let (graph, report) = build_social_graph(&people, &resolver);
    println!(
        "{} people, {} connections; avatars: {} fetched or cached, {} default, {} missing",
        report.people, report.edges, report.avatars, report.fallback_avatars, report.missing_avatars
    );

    if let Some(output) = &args.output {
        JsonExport::new(output).export(&graph, &options)?;
        println!("Graph written to {}", output.display());
    }

    if !args.no_viewer {
        ViewerExport::new("Mutual servers graph").export(&graph, &options)?;
    }

    Ok(())
}
