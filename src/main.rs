use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use dusturia_chat::connector::web;
use dusturia_chat::{Commands, Container, ContainerConfig, LlmProvider, PipelineProfile, Router};

#[derive(Parser)]
#[command(name = "dusturia-chat")]
#[command(author, version, about = "Chat with a MySQL database of court decisions", long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Prompt profile: decisions or dusturia
    #[arg(long, global = true, env = "CHAT_PROFILE", default_value = "decisions")]
    profile: String,

    /// LLM provider to use instead of inferring it from the API keys set
    #[arg(long, global = true, env = "LLM_PROVIDER", value_parser = parse_provider)]
    provider: Option<LlmProvider>,

    /// Timeout for each LLM request, in seconds
    #[arg(long, global = true, default_value = "120")]
    llm_timeout_secs: u64,

    /// Timeout for acquiring a database connection, in seconds
    #[arg(long, global = true, default_value = "30")]
    db_timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

fn parse_provider(s: &str) -> Result<LlmProvider, String> {
    LlmProvider::parse(s).ok_or_else(|| format!("unknown provider '{s}' (expected openai or groq)"))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let profile = PipelineProfile::from_str(&cli.profile);
    debug!("Using {} profile", profile);

    let container = Arc::new(Container::new(ContainerConfig {
        profile,
        provider: cli.provider,
        llm_timeout: Duration::from_secs(cli.llm_timeout_secs),
        db_acquire_timeout: Duration::from_secs(cli.db_timeout_secs),
    }));

    match cli.command {
        Commands::Serve {
            bind,
            session_idle_secs,
            max_sessions,
        } => {
            info!("Starting chat server on {}", bind);
            let sessions =
                web::SessionStore::new(Duration::from_secs(session_idle_secs), max_sessions);
            web::serve(container, &bind, sessions).await?;
        }
        command => {
            let router = Router::new(&container);
            let output = router.route(command).await?;
            println!("{}", output);
        }
    }

    Ok(())
}
