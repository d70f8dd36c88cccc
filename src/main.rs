//! # Askmydocs CLI (`ask`)
//!
//! The `ask` binary is the shell around the retrieval-augmented answering
//! engine. It loads documents, drives ingestion, and relays questions.
//!
//! ## Usage
//!
//! ```bash
//! ask --config ./config/ask.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ask ask -f doc.pdf "question"` | Ingest the given files and answer one question |
//! | `ask chat -f docs/` | Ingest, then answer questions interactively |
//! | `ask verify-key` | Check the API key against the identity endpoint |
//!
//! The generation API key comes from `--api-key` or the `HF_API_TOKEN`
//! environment variable. Directories passed to `--file` are walked for
//! `.pdf` and `.txt` files.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use askmydocs::config::{load_config, Config};
use askmydocs::engine::RagEngine;
use askmydocs::models::{ChatTurn, ContentType, UploadedFile};

/// Identity endpoint used to check a key before any generation call.
const WHOAMI_ENDPOINT: &str = "https://huggingface.co/api/whoami-v2";

/// Askmydocs — ask natural-language questions over your own documents.
#[derive(Parser)]
#[command(
    name = "ask",
    about = "Ask natural-language questions over your own documents",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Optional; defaults apply without it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Ingest documents and answer a single question.
    Ask {
        /// The question to answer.
        question: String,

        /// Files or directories to ingest (`.pdf`, `.txt`).
        #[arg(short, long = "file", required = true)]
        files: Vec<PathBuf>,

        /// Generation API key (falls back to `HF_API_TOKEN`).
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Ingest documents, then answer questions interactively.
    ///
    /// Type a question per line; `exit` or an empty line quits. The chat
    /// history is kept for the session and printed on exit.
    Chat {
        /// Files or directories to ingest (`.pdf`, `.txt`).
        #[arg(short, long = "file", required = true)]
        files: Vec<PathBuf>,

        /// Generation API key (falls back to `HF_API_TOKEN`).
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Verify an API key against the identity endpoint.
    VerifyKey {
        /// Key to verify (falls back to `HF_API_TOKEN`).
        #[arg(long)]
        api_key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "askmydocs=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Ask {
            question,
            files,
            api_key,
        } => run_ask(config, &question, &files, api_key).await,
        Commands::Chat { files, api_key } => run_chat(config, &files, api_key).await,
        Commands::VerifyKey { api_key } => run_verify_key(api_key).await,
    }
}

async fn run_ask(
    config: Config,
    question: &str,
    paths: &[PathBuf],
    api_key: Option<String>,
) -> Result<()> {
    let mut engine = build_engine(config, api_key)?;
    ingest(&mut engine, paths).await?;

    let answer = engine.ask_question(question).await;
    println!("{}", answer);
    Ok(())
}

async fn run_chat(config: Config, paths: &[PathBuf], api_key: Option<String>) -> Result<()> {
    let mut engine = build_engine(config, api_key)?;
    ingest(&mut engine, paths).await?;

    println!("Ask a question per line. Empty line or 'exit' quits.");
    let mut history: Vec<ChatTurn> = Vec::new();
    let stdin = std::io::stdin();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() || question == "exit" || question == "quit" {
            break;
        }

        let answer = engine.ask_question(question).await;
        println!("{}", answer);
        history.push(ChatTurn::new(question, answer));
    }

    if !history.is_empty() {
        println!();
        println!("{} questions answered this session", history.len());
    }
    Ok(())
}

async fn run_verify_key(api_key: Option<String>) -> Result<()> {
    let Some(key) = resolve_key(api_key) else {
        bail!("No API key given. Pass --api-key or set HF_API_TOKEN.");
    };

    let client = reqwest::Client::new();
    let resp = client
        .get(WHOAMI_ENDPOINT)
        .header("Authorization", format!("Bearer {}", key))
        .send()
        .await
        .context("identity endpoint unreachable")?;

    if resp.status().is_success() {
        println!("API key is valid");
        Ok(())
    } else {
        bail!("API key rejected (HTTP {})", resp.status());
    }
}

fn build_engine(config: Config, api_key: Option<String>) -> Result<RagEngine> {
    let mut engine = RagEngine::new(config)?;
    if let Some(key) = resolve_key(api_key) {
        engine.set_credential(key);
    }
    Ok(engine)
}

fn resolve_key(flag: Option<String>) -> Option<String> {
    flag.or_else(|| std::env::var("HF_API_TOKEN").ok())
        .filter(|k| !k.is_empty())
}

async fn ingest(engine: &mut RagEngine, paths: &[PathBuf]) -> Result<()> {
    let files = load_files(paths)?;
    if files.is_empty() {
        bail!("No .pdf or .txt files found under the given paths");
    }

    match engine.process_documents(&files).await {
        Ok(report) => {
            println!("{}", report);
            Ok(())
        }
        Err(e) => bail!("{}", e),
    }
}

/// Read the given paths into uploaded files. Directories are walked for
/// supported extensions; unsupported files are skipped with a notice.
fn load_files(paths: &[PathBuf]) -> Result<Vec<UploadedFile>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
                if entry.file_type().is_file() {
                    if let Some(file) = load_file(entry.path())? {
                        files.push(file);
                    }
                }
            }
        } else if let Some(file) = load_file(path)? {
            files.push(file);
        } else {
            eprintln!("skipping {} (unsupported type)", path.display());
        }
    }

    Ok(files)
}

fn load_file(path: &Path) -> Result<Option<UploadedFile>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let Some(content_type) = ContentType::from_extension(&ext) else {
        return Ok(None);
    };

    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    Ok(Some(UploadedFile::new(name, content_type, bytes)))
}
