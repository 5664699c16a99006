use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use parlo::config::Config;
use parlo::error::ErrorReport;
use parlo::languages::Language;
use parlo::llm::LlmClient;
use parlo::manager::ConversationManager;
use parlo::providers::{RemoteDetector, RemoteSummarizer, RemoteTranslator};
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parlo")]
#[command(version)]
#[command(about = "Detect, translate and summarize text from your terminal", long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.parlo/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat (default)
    Chat,
    /// Process a single text and print the resulting message as JSON
    Process {
        text: String,
        /// Also translate into this language code
        #[arg(long)]
        to: Option<String>,
        /// Also summarize, regardless of language and length
        #[arg(long)]
        summarize: bool,
    },
    /// List supported target languages
    Languages,
}

#[derive(Serialize)]
struct ProcessOutput {
    message: Option<parlo::Message>,
    errors: Vec<ErrorReport>,
}

enum LogTarget {
    Stderr,
    File(PathBuf),
}

fn init_tracing(config: &Config, target: LogTarget) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
    }
    Ok(())
}

fn build_manager(config: &Config) -> Result<Arc<ConversationManager>> {
    let client = LlmClient::new(config.clone()).context("Failed to create HTTP client")?;

    Ok(Arc::new(ConversationManager::new(
        Arc::new(RemoteDetector::new(client.clone())),
        Arc::new(RemoteTranslator::new(client.clone())),
        Arc::new(RemoteSummarizer::new(client)),
        config.chat_settings(),
    )))
}

async fn process(config: &Config, text: String, to: Option<String>, summarize: bool) -> Result<()> {
    let manager = build_manager(config)?;
    let mut errors = Vec::new();

    let id = match manager.submit(text).await {
        Ok(id) => Some(id),
        Err(err) => {
            errors.push(ErrorReport::from(&err));
            err.message_id()
        }
    };

    if let Some(id) = id {
        if let Some(target) = to {
            if let Err(err) = manager.translate(id, &target).await {
                errors.push(ErrorReport::from(&err));
            }
        }
        let already_summarized = manager
            .snapshot()
            .conversation
            .get(id)
            .is_some_and(|message| message.summary.is_some());
        if summarize && !already_summarized {
            if let Err(err) = manager.summarize(id).await {
                errors.push(ErrorReport::from(&err));
            }
        }
    }

    let output = ProcessOutput {
        message: id.and_then(|id| manager.snapshot().conversation.get(id).cloned()),
        errors,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn list_languages(config: &Config) {
    let settings = config.chat_settings();
    println!("Supported target languages:\n");
    for language in Language::all() {
        if settings.languages.contains(&language) {
            println!("  {}  {}", language.code(), language.display_name());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            init_tracing(&config, LogTarget::File(config.log_path()))?;
            if !config.has_api_key() {
                eprintln!(
                    "No API key configured. Set {} or add api_key to {}.",
                    config.api_key_env,
                    config.parlo_home.join("config.toml").display()
                );
            }
            let manager = build_manager(&config)?;
            parlo::ui::run_chat(manager).await
        }
        Commands::Process { text, to, summarize } => {
            init_tracing(&config, LogTarget::Stderr)?;
            process(&config, text, to, summarize).await
        }
        Commands::Languages => {
            list_languages(&config);
            Ok(())
        }
    }
}
