use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use aspect_cluster::extract::tagger::{Lexicon, LexiconTagger};
use aspect_cluster::summary::OllamaClient;
use aspect_cluster::{parse_review_batch, EngineConfig, Error, ReviewAnalyzer};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Cbor,
}

/// Cluster review aspect phrases and report their share of the batch
#[derive(Debug, Parser)]
#[command(name = "aspect-cluster")]
#[command(version = VERSION)]
struct Cli {
    /// JSON array of review strings (stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// TOML engine configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extra tagger dictionary, one `word [tag]` per line
    #[arg(long)]
    user_dict: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Add sentiment tags and a prose summary
    #[arg(long)]
    summarize: bool,

    /// Generation endpoint used with --summarize
    #[arg(long, env = "OLLAMA_ENDPOINT")]
    ollama_endpoint: Option<String>,

    #[arg(long, env = "OLLAMA_MODEL")]
    ollama_model: Option<String>,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_env("ASPECT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_input(path: Option<&PathBuf>) -> Result<String, Error> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn build_analyzer(cli: &Cli) -> Result<ReviewAnalyzer, Error> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(endpoint) = &cli.ollama_endpoint {
        config.summary.endpoint = endpoint.clone();
    }
    if let Some(model) = &cli.ollama_model {
        config.summary.model = model.clone();
    }

    let mut builder = ReviewAnalyzer::builder(config.clone());
    if let Some(path) = &cli.user_dict {
        let mut lexicon = Lexicon::builtin();
        lexicon.load_user_dict(path)?;
        info!(entries = lexicon.len(), "user dictionary merged");
        builder = builder.tagger(Arc::new(LexiconTagger::new(lexicon)));
    }
    if cli.summarize {
        builder = builder.generator(Arc::new(OllamaClient::new(&config.summary)?));
    }
    builder.build()
}

fn write_output<T: serde::Serialize>(value: &T, format: OutputFormat) -> Result<(), Error> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            out.write_all(b"\n")?;
        }
        OutputFormat::Cbor => serde_cbor::to_writer(&mut out, value)?,
    }
    out.flush()?;
    Ok(())
}

fn run(cli: &Cli) -> Result<(), Error> {
    let raw = read_input(cli.input.as_ref())?;
    let reviews = parse_review_batch(&raw)?;
    let analyzer = build_analyzer(cli)?;

    let started = Instant::now();
    if cli.summarize {
        let report = analyzer.analyze_batch(&reviews);
        info!(reviews = report.total_reviews, aspects = report.phrase_stats.len(), elapsed_ms = started.elapsed().as_millis() as u64, "batch analyzed");
        write_output(&report, cli.format)
    } else {
        let report = analyzer.cluster_reviews(&reviews);
        info!(reviews = report.total_reviews, aspects = report.records.len(), elapsed_ms = started.elapsed().as_millis() as u64, "batch clustered");
        write_output(&report, cli.format)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Input(e)) => {
            error!(error = %e, "rejected input");
            ExitCode::from(2)
        }
        Err(e) => {
            error!(error = %e, "analysis failed");
            ExitCode::FAILURE
        }
    }
}
