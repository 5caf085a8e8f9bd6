// KnowledgeBot - terminal client for the question-answering service
// Ask questions, see whether the live model or the mock path answered, retry live

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use knowledgebot::api::{BackendMode, HttpBackend, PromptStyle};
use knowledgebot::config::{ClientConfig, API_URL_ENV, DEFAULT_API_URL};
use knowledgebot::controller::{Controller, SessionState};
use knowledgebot::ui::{self, App};

#[derive(Parser, Debug)]
#[command(name = "knowledgebot")]
#[command(author = "KnowledgeBot Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Terminal client for the KnowledgeBot question-answering service", long_about = None)]
struct Args {
    /// Base address of the KnowledgeBot backend
    #[arg(long, global = true, env = API_URL_ENV, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Do not fetch or show server banners
    #[arg(long, global = true)]
    no_banners: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the interactive terminal interface
    Interactive,

    /// Ask a single question and print the answer
    Ask {
        /// Question text (may be empty)
        question: String,

        /// Answer style: concise, detailed or bullet
        #[arg(short, long, default_value = "concise")]
        style: PromptStyle,

        /// Retry with the live model when the answer came from the mock path
        #[arg(short, long)]
        retry_live: bool,
    },

    /// Show the backend mode and banners
    Status,
}

#[tokio::main]
async fn main() {
    // Best-effort .env load; ignore if missing
    let _ = dotenvy::dotenv();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = ClientConfig::new(&args.api_url, !args.no_banners)?;
    tracing::debug!(base_url = %config.base_url, banners = config.banners, "configuration resolved");

    let backend = HttpBackend::new(&config).context("failed to set up HTTP client")?;
    let (controller, rx) = Controller::new(Arc::new(backend), config.banners);

    match args.command {
        Commands::Interactive => {
            ui::run_ui_loop(App::new(), controller, rx)
                .await
                .context("terminal UI failed")?;
        }
        Commands::Ask { question, style, retry_live } => {
            drop(rx);
            controller.initialize().await;
            controller.ask(&question, style).await;

            let state = controller.snapshot().await;
            if retry_live && state.backend_mode == Some(BackendMode::Mock) {
                println!("🔁 Mock answer received, retrying with the live model...");
                controller.retry_with_live_model().await;
            }

            print_session(&controller.snapshot().await);
        }
        Commands::Status => {
            drop(rx);
            controller.initialize().await;

            let state = controller.snapshot().await;
            let mode = state.backend_mode.unwrap_or(BackendMode::Unknown);
            println!("🛰️  Backend: {} (mode: {})", config.base_url, mode);
            print_footer(&state);
        }
    }

    Ok(())
}

fn print_session(state: &SessionState) {
    println!("{}", state.current_answer);
    println!();
    print_footer(state);
}

fn print_footer(state: &SessionState) {
    if let Some(top) = &state.top_banner {
        println!("📣 {}", top);
    }
    if let Some(status) = ui::status_line(state.backend_mode) {
        println!("{}", status);
    }
    if let Some(bottom) = &state.bottom_banner {
        println!("{}", bottom);
    }
}
