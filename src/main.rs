use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use insighthub::{
    constants, AssistantConfig, ChatPanel, ChatRole, GeminiClient, KnowledgeBase, PromptOrchestrator,
    Settings,
};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// API key for the Gemini API.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Model id to query.
    #[arg(long, env = "INSIGHTHUB_MODEL", global = true)]
    model: Option<String>,

    /// Base URL of the generative API.
    #[arg(long, env = "INSIGHTHUB_BASE_URL", global = true)]
    base_url: Option<String>,

    /// TOML settings file.
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Knowledge-base index (.json or .toml). Defaults to the bundled index.
    #[arg(long, value_name = "FILE", global = true)]
    knowledge_base: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Open the terminal UI with the assistant panel.
    Start,
    /// Chat with the assistant line by line on stdin/stdout.
    Chat,
    /// Ask a single question and print the answer.
    Ask {
        /// The question to send.
        question: String,
    },
    /// Print the knowledge-base summary sent with every question.
    Index {
        #[arg(long, help = "Print the full system instruction instead of the summary.")]
        system: bool,
    },
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            temperature: None,
            top_p: None,
            knowledge_base: self.knowledge_base.clone(),
        }
    }
}

fn init_stderr_logging() {
    // Reads log level from RUST_LOG environment variable (e.g., RUST_LOG=info,insighthub=debug)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

fn init_file_logging() -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::never(".", constants::LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("insighthub=info")),
        )
        .init();
    guard
}

fn resolve_config(cli: &Cli) -> Result<AssistantConfig> {
    let file_settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let config = AssistantConfig::try_from(cli.settings().or(file_settings))
        .context("Invalid assistant configuration")?;
    if config.api_key.is_none() {
        warn!("No API key configured; the assistant will answer with an error message");
    }
    Ok(config)
}

fn load_knowledge_base(config: &AssistantConfig) -> Result<KnowledgeBase> {
    match &config.knowledge_base {
        Some(path) => KnowledgeBase::load(path).context("Failed to load knowledge base"),
        None => Ok(KnowledgeBase::builtin()),
    }
}

fn build_orchestrator(config: &AssistantConfig, knowledge_base: &KnowledgeBase) -> PromptOrchestrator {
    let client = GeminiClient::new(config.api_key.clone(), config.base_url.clone());
    PromptOrchestrator::new(Arc::new(client), knowledge_base, config.model.clone(), config.sampling)
}

async fn run_line_chat(orchestrator: &PromptOrchestrator) -> Result<()> {
    let mut panel = ChatPanel::new();
    panel.open();

    let mut stdout = tokio::io::stdout();
    let mut printed = 0;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        for msg in &panel.state.history()[printed..] {
            if msg.role == ChatRole::Assistant {
                stdout
                    .write_all(format!("[{}] Assistant: {}\n", msg.time_label(), msg.content).as_bytes())
                    .await?;
            }
        }
        printed = panel.state.history().len();
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("Failed to read from stdin")? else {
            break;
        };
        if matches!(line.trim(), "/quit" | "/exit") {
            break;
        }
        panel.submit(orchestrator, &line).await;
    }

    panel.close();
    stdout.write_all(b"\n").await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for environment variables like API keys)
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // The terminal UI owns stdout, so it logs to a file instead
    let _guard = match cli.command {
        Commands::Start => Some(init_file_logging()),
        _ => {
            init_stderr_logging();
            None
        }
    };

    info!("InsightHub starting with command: {:?}", cli.command);

    let config = resolve_config(&cli)?;
    let knowledge_base = load_knowledge_base(&config)?;

    match &cli.command {
        Commands::Start => {
            let orchestrator = build_orchestrator(&config, &knowledge_base);
            insighthub::tui::run(orchestrator, Arc::new(knowledge_base))
                .await
                .context("Terminal UI failed")?;
        }
        Commands::Chat => {
            let orchestrator = build_orchestrator(&config, &knowledge_base);
            run_line_chat(&orchestrator).await.context("Chat session failed")?;
            info!("Chat session finished.");
        }
        Commands::Ask { question } => {
            if question.trim().is_empty() {
                anyhow::bail!("question must not be blank");
            }
            let orchestrator = build_orchestrator(&config, &knowledge_base);
            let answer = orchestrator.get_response(question).await;
            println!("{}", answer);
        }
        Commands::Index { system } => {
            if *system {
                let orchestrator = build_orchestrator(&config, &knowledge_base);
                println!("{}", orchestrator.system_instruction());
            } else {
                println!("{}", knowledge_base.summary());
            }
        }
    }

    Ok(())
}
