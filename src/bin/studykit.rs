//! CLI binary for studykit.
//!
//! `studykit serve` runs the HTTP API. The other subcommands run a single
//! task on a file (or stdin) and print the same envelope the API would
//! return, exiting non-zero on failure.

use anyhow::{Context, Result};
use clap::builder::FalseyValueParser;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use studykit::pipeline::input;
use studykit::{server, Generator, LinkPolicy, ResultEnvelope, ServiceConfig, ServiceError};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the API on port 5000
  studykit serve

  # One-shot generation from a file or stdin
  studykit flashcards chapter.txt
  cat chapter.txt | studykit mindmap
  studykit topics chapter.txt --model gpt-4.1-mini

  # Structure a textbook chapter straight from its PDF
  studykit pdf chapter1.pdf

  # Any OpenAI-compatible endpoint
  BASE_URL=http://localhost:11434/v1 MODEL=llama3.2 studykit serve

ENVIRONMENT VARIABLES:
  API_KEY                    Bearer key for the model provider
  BASE_URL                   OpenAI-compatible base URL (default https://api.openai.com/v1)
  MODEL                      Model ID (default gpt-4.1-nano)
  STUDYKIT_TEMPERATURE       Sampling temperature, 0.0–2.0
  STUDYKIT_MAX_TOKENS        Max output tokens per call
  STUDYKIT_TIMEOUT           Model call timeout in seconds
  STUDYKIT_STRICT_LINKS      1/true/yes/on: fail mind maps with dangling links
  STUDYKIT_HOST              Listen address for `serve`
  STUDYKIT_PORT              Listen port for `serve`
  STUDYKIT_MAX_UPLOAD_BYTES  Request body cap for `serve`
  PDFIUM_LIB_PATH            Path to libpdfium; the system library is used otherwise

A .env file in the working directory is loaded before arguments are parsed.
"#;

/// Flashcards, mind maps and topic datasets from study text, via an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "studykit",
    version,
    about = "Generate flashcards, mind maps and topic datasets from study text using an LLM",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// OpenAI-compatible API base URL.
    #[arg(long, env = "BASE_URL", global = true)]
    base_url: Option<String>,

    /// Bearer key for the model provider.
    #[arg(long, env = "API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Model ID (e.g. gpt-4.1-nano, gpt-4.1-mini).
    #[arg(long, env = "MODEL", global = true)]
    model: Option<String>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "STUDYKIT_TEMPERATURE", global = true)]
    temperature: Option<f32>,

    /// Max output tokens per model call.
    #[arg(long, env = "STUDYKIT_MAX_TOKENS", global = true)]
    max_tokens: Option<u32>,

    /// Model call timeout in seconds.
    #[arg(long, env = "STUDYKIT_TIMEOUT", default_value_t = 120, global = true)]
    timeout: u64,

    /// Reject mind maps with dangling links instead of pruning them.
    #[arg(
        long,
        env = "STUDYKIT_STRICT_LINKS",
        value_parser = FalseyValueParser::new(),
        global = true
    )]
    strict_links: bool,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH", global = true)]
    pdfium_lib_path: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(
        short,
        long,
        env = "STUDYKIT_VERBOSE",
        value_parser = FalseyValueParser::new(),
        global = true
    )]
    verbose: bool,

    /// Suppress all logs except errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API.
    Serve {
        #[arg(long, env = "STUDYKIT_HOST", default_value = "0.0.0.0")]
        host: String,

        #[arg(long, env = "STUDYKIT_PORT", default_value_t = 5000)]
        port: u16,

        /// Request body cap in bytes.
        #[arg(long, env = "STUDYKIT_MAX_UPLOAD_BYTES", default_value_t = 20 * 1024 * 1024)]
        max_upload_bytes: usize,
    },
    /// Generate flashcards.
    Flashcards(TextInput),
    /// Generate a mind map.
    Mindmap(TextInput),
    /// Split a chapter into {topic, content} entries.
    Topics(TextInput),
    /// Rewrite text for young learners.
    Simplify(TextInput),
    /// Extract a PDF's text and split it into topics.
    Pdf {
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
struct TextInput {
    /// Text file to read; stdin when omitted.
    file: Option<PathBuf>,
}

impl Cli {
    fn service_config(&self) -> Result<ServiceConfig> {
        let mut builder = ServiceConfig::builder().request_timeout_secs(self.timeout);
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url);
        }
        if let Some(key) = &self.api_key {
            builder = builder.api_key(key);
        }
        if let Some(model) = &self.model {
            builder = builder.model(model);
        }
        if let Some(t) = self.temperature {
            builder = builder.temperature(t);
        }
        if let Some(n) = self.max_tokens {
            builder = builder.max_tokens(n);
        }
        if self.strict_links {
            builder = builder.link_policy(LinkPolicy::Reject);
        }
        if let Some(path) = &self.pdfium_lib_path {
            builder = builder.pdfium_lib_path(path);
        }
        if let Command::Serve {
            max_upload_bytes, ..
        } = &self.command
        {
            builder = builder.max_upload_bytes(*max_upload_bytes);
        }
        builder.build().context("Invalid configuration")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = cli.service_config()?;
    if config.gateway.api_key.is_none() {
        info!("No API_KEY set; requests will be sent without authorization");
    }
    let generator = Arc::new(Generator::from_config(&config).context("Failed to set up the model gateway")?);

    let ok = match cli.command {
        Command::Serve { host, port, .. } => {
            serve(generator, &host, port, config.max_upload_bytes).await?;
            true
        }
        Command::Flashcards(src) => {
            let text = read_text(src.file.as_deref())?;
            emit(generator.flashcards(&text).await, ResultEnvelope::DEFAULT_SUCCESS)?
        }
        Command::Mindmap(src) => {
            let text = read_text(src.file.as_deref())?;
            emit(generator.mindmap(&text).await, ResultEnvelope::DEFAULT_SUCCESS)?
        }
        Command::Topics(src) => {
            let text = read_text(src.file.as_deref())?;
            emit(generator.topic_dataset(&text).await, ResultEnvelope::TOPICS_STRUCTURED)?
        }
        Command::Simplify(src) => {
            let text = read_text(src.file.as_deref())?;
            emit(generator.simplify(&text).await, ResultEnvelope::TEXT_SIMPLIFIED)?
        }
        Command::Pdf { file } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let name = file.file_name().map(|n| n.to_string_lossy().into_owned());
            let result = match input::require_pdf(name.as_deref(), Some(bytes)) {
                Ok(upload) => generator.topic_dataset_from_pdf(upload).await,
                Err(e) => Err(e),
            };
            emit(result, ResultEnvelope::PDF_PROCESSED)?
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

async fn serve(generator: Arc<Generator>, host: &str, port: u16, max_upload_bytes: usize) -> Result<()> {
    let app = server::router(generator, max_upload_bytes);
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {host}:{port}"))?;
    info!("studykit listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, starting graceful shutdown"),
    }
}

fn read_text(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => io::read_to_string(io::stdin()).context("Failed to read stdin"),
    }
}

/// Print the envelope for `result`; returns whether it was a success.
fn emit<T: Serialize>(result: Result<T, ServiceError>, message: &str) -> Result<bool> {
    let envelope = match result {
        Ok(data) => ResultEnvelope::success(&data, message)?,
        Err(e) => {
            error!("{}", e);
            ResultEnvelope::error(e.to_string())
        }
    };
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(envelope.is_success())
}
