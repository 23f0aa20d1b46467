//! docscan CLI
//!
//! Command-line access to the extraction pipeline for a single local image:
//! classify it, or extract its text as HTML, raw text, or a JSON record.
//!
//! Copyright (c) 2025 Michael A Wright

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use core_pipeline::{prepare_upload, PreparedImage, ResultRecord, ResultStore};
use llm_bridge::{Classification, DocumentClassifier, Extractor, OllamaConfig, VisionModel};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod build_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("BUILT_GIT_COMMIT_HASH"),
    "\nbuilt:  ",
    env!("BUILT_TIME_UTC"),
    "\nhost:   ",
    env!("BUILT_HOST"),
);

#[derive(Parser)]
#[command(name = "docscan")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "Extract text from document images with a vision-language model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the text of an image
    Extract {
        /// Image file
        #[arg(short, long)]
        input: PathBuf,

        /// Prompt to use instead of classifying the document
        #[arg(short, long)]
        prompt: Option<String>,

        /// Write the JSON record to this file
        #[arg(long)]
        json: Option<PathBuf>,

        /// Print the raw model output instead of HTML
        #[arg(long)]
        raw: bool,

        #[command(flatten)]
        ollama: OllamaArgs,
    },

    /// Report which kind of document an image shows
    Classify {
        /// Image file
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        ollama: OllamaArgs,
    },
}

#[derive(Args)]
struct OllamaArgs {
    /// Base URL of the Ollama server
    #[arg(long, env = "OLLAMA_URL", default_value = "http://localhost:11434")]
    ollama_url: String,

    /// Vision model to use
    #[arg(long, env = "DOCSCAN_MODEL", default_value = "qwen2.5vl:7b")]
    model: String,

    /// Timeout for a single model call, in seconds
    #[arg(long, env = "OLLAMA_TIMEOUT_SECS", default_value_t = 300)]
    timeout_secs: u64,

    /// Keep-alive passed to Ollama (e.g. "5m", "0")
    #[arg(long, env = "OLLAMA_KEEP_ALIVE")]
    keep_alive: Option<String>,
}

impl OllamaArgs {
    fn into_config(self) -> OllamaConfig {
        OllamaConfig {
            base_url: self.ollama_url,
            model: self.model,
            timeout_secs: self.timeout_secs,
            keep_alive: self.keep_alive,
        }
    }
}

fn load_image(path: &Path) -> Result<PreparedImage> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    prepare_upload(&bytes).with_context(|| format!("Failed to decode {}", path.display()))
}

async fn connect(ollama: OllamaArgs) -> Result<VisionModel> {
    let config = ollama.into_config();
    let model = config.model.clone();
    VisionModel::connect(config)
        .await
        .with_context(|| format!("Failed to load vision model '{}'", model))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();
    tracing::debug!(
        version = build_info::PKG_VERSION,
        rustc = build_info::RUSTC_VERSION,
        target = build_info::TARGET,
        profile = build_info::PROFILE,
        "docscan starting"
    );

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            input,
            prompt,
            json,
            raw,
            ollama,
        } => {
            let image = load_image(&input)?;
            let model = connect(ollama).await?;
            let extractor = Extractor::new(Arc::new(model), Arc::new(ResultStore::new(1)));

            let result = extractor
                .extract(&image, prompt.as_deref())
                .await
                .context("Extraction failed")?;

            if let Some(path) = json {
                let record = serde_json::to_string_pretty(&ResultRecord::from(&result))?;
                std::fs::write(&path, record)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::info!(path = %path.display(), "Wrote JSON record");
            }

            if raw {
                println!("{}", result.raw_text);
            } else {
                println!("{}", result.html);
            }
            Ok(())
        }
        Commands::Classify { input, ollama } => {
            let image = load_image(&input)?;
            let model = connect(ollama).await?;

            match DocumentClassifier::new().classify(&model, &image).await {
                Classification::Detected { category, answer } => {
                    println!("{} ({})", category, answer);
                }
                Classification::Fallback { reason } => {
                    println!("unknown (classification failed: {})", reason);
                }
            }
            Ok(())
        }
    }
}
