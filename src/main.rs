use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use finsent::{
    load_request, load_tokenizer, AnalyzerConfig, ClassifierConfig, ErrorKind, ErrorPayload,
    HttpClassifier, Report, SentimentAnalyzer, SentimentClassifier,
};

#[derive(Parser)]
#[command(name = "finsent")]
#[command(author, version, about = "Financial sentiment scoring for earnings calls and transcripts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a JSON analysis request and print the JSON result
    Run {
        /// Request file or inline JSON (reads stdin when omitted)
        input: Option<String>,

        /// Hugging Face tokenizer.json for token-window chunking
        #[arg(long)]
        tokenizer: Option<PathBuf>,

        /// Character budget for sentence chunking
        #[arg(long, default_value = "1000")]
        max_chars: usize,

        /// Tokens shared between consecutive windows
        #[arg(long, default_value = "50")]
        overlap: usize,

        /// Classifier endpoint (overrides FINSENT_CLASSIFIER_URL)
        #[arg(long)]
        endpoint: Option<String>,

        /// Timeout for a single classifier call in seconds
        #[arg(long, default_value = "30")]
        timeout_secs: u64,

        /// Skip financial vocabulary intensification
        #[arg(long)]
        no_preprocess: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show speaker segments, roles and chunking without classifying
    Inspect {
        /// Plain-text transcript file
        input: PathBuf,

        /// Hugging Face tokenizer.json for token-window chunking
        #[arg(long)]
        tokenizer: Option<PathBuf>,

        /// Character budget for sentence chunking
        #[arg(long, default_value = "1000")]
        max_chars: usize,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            tokenizer,
            max_chars,
            overlap,
            endpoint,
            timeout_secs,
            no_preprocess,
            verbose,
        } => {
            setup_logging(verbose);

            let mut config = AnalyzerConfig::default();
            config.chunker.max_chars = max_chars;
            config.chunker.overlap_tokens = overlap;
            config.chunk_timeout = Duration::from_secs(timeout_secs);
            config.preprocess = !no_preprocess;

            let report = run_request(input.as_deref(), tokenizer.as_deref(), endpoint, config).await;
            report.write_json(std::io::stdout().lock())?;

            if report.is_error() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Inspect {
            input,
            tokenizer,
            max_chars,
            verbose,
        } => {
            setup_logging(verbose);
            inspect_transcript(&input, tokenizer.as_deref(), max_chars)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn run_request(
    input: Option<&str>,
    tokenizer: Option<&Path>,
    endpoint: Option<String>,
    config: AnalyzerConfig,
) -> Report {
    let request = match load_request(input) {
        Ok(request) => request,
        Err(e) => return Report::Error(ErrorPayload::new(format!("{:#}", e), ErrorKind::InputError)),
    };

    let analyzer = match build_analyzer(tokenizer, endpoint, config) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            return Report::Error(ErrorPayload::new(format!("{:#}", e), ErrorKind::StartupError))
        }
    };

    info!("Running {:?} request", request.action);
    analyzer.run(&request).await
}

fn build_analyzer(
    tokenizer: Option<&Path>,
    endpoint: Option<String>,
    config: AnalyzerConfig,
) -> Result<SentimentAnalyzer> {
    let mut classifier_config = ClassifierConfig::from_env();
    if let Some(endpoint) = endpoint {
        classifier_config.endpoint = endpoint;
    }
    classifier_config.timeout = config.chunk_timeout;

    let classifier: Arc<dyn SentimentClassifier> =
        Arc::new(HttpClassifier::new(classifier_config).context("Failed to create classifier")?);
    info!("Using classifier model {}", classifier.model_name());

    Ok(match tokenizer {
        Some(path) => SentimentAnalyzer::with_tokenizer(classifier, load_tokenizer(path)?, config),
        None => SentimentAnalyzer::new(classifier, config),
    })
}

fn inspect_transcript(input: &Path, tokenizer: Option<&Path>, max_chars: usize) -> Result<()> {
    info!("Inspecting transcript from {:?}", input);
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read transcript: {:?}", input))?;

    let mut config = AnalyzerConfig::default();
    config.chunker.max_chars = max_chars;

    // Not called during inspection
    let classifier: Arc<dyn SentimentClassifier> =
        Arc::new(HttpClassifier::new(ClassifierConfig::default())?);
    let analyzer = match tokenizer {
        Some(path) => SentimentAnalyzer::with_tokenizer(classifier, load_tokenizer(path)?, config),
        None => SentimentAnalyzer::new(classifier, config),
    };

    print!("{}", analyzer.inspect(&text).format());
    Ok(())
}
