use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use newsdesk::config::{Config, ConfigStore};
use newsdesk::gateway::GatewayServer;
use newsdesk::news::{FetchOrchestrator, FetchState, FetchStatus};

/// newsdesk - headlines through CORS relays, plus the chat/news gateway
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/newsdesk/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP gateway
    Serve {
        /// Bind address, overriding gateway.bind_addr
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print top headlines
    Headlines {
        /// Category filter ("all" for none)
        #[arg(short = 'C', long, default_value = "all")]
        category: String,
        /// Language for the request
        #[arg(short, long)]
        language: Option<String>,
        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
    /// Search all articles
    Search {
        query: String,
        #[arg(short, long)]
        language: Option<String>,
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    newsdesk::init_tracing();
    let cli = Cli::parse();

    let path = cli.config.unwrap_or_else(Config::config_path);
    let store = ConfigStore::open(path.clone())
        .with_context(|| format!("failed to load config from {}", path.display()))?;

    match cli.command {
        Command::Serve { bind } => serve(store, bind).await,
        Command::Headlines {
            category,
            language,
            pages,
        } => {
            let orchestrator = orchestrator(&store, language)?;
            let state = orchestrator.switch_category(&category).await;
            paginate(&orchestrator, state, pages).await
        }
        Command::Search {
            query,
            language,
            pages,
        } => {
            let orchestrator = orchestrator(&store, language)?;
            let state = orchestrator.search(&query).await;
            paginate(&orchestrator, state, pages).await
        }
    }
}

async fn serve(store: ConfigStore, bind: Option<String>) -> Result<()> {
    let server = match bind {
        Some(addr) => {
            let addr = addr
                .parse()
                .with_context(|| format!("invalid bind address '{}'", addr))?;
            GatewayServer::bind_to(store, addr).await?
        }
        None => GatewayServer::bind(store).await?,
    };
    server.run().await?;
    Ok(())
}

fn orchestrator(store: &ConfigStore, language: Option<String>) -> Result<FetchOrchestrator> {
    let mut config = store.get();
    if let Some(language) = language {
        config.news.language = language;
    }
    let observer = Arc::new(|state: &FetchState| {
        tracing::debug!(status = ?state.status(), articles = state.articles().len(), "State changed");
    });
    FetchOrchestrator::from_config(&config, observer).context("failed to build HTTP client")
}

async fn paginate(orchestrator: &FetchOrchestrator, mut state: FetchState, pages: u32) -> Result<()> {
    for _ in 1..pages {
        if !state.has_more() {
            break;
        }
        state = orchestrator.load_more().await;
    }
    render(&state)
}

fn render(state: &FetchState) -> Result<()> {
    match state.status() {
        FetchStatus::Success => {
            for (i, article) in state.articles().iter().enumerate() {
                let published = article
                    .published_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("{:>3}. {}", i + 1, article.title);
                println!("     {} {}", article.source.name, published);
                println!("     {}", article.url);
            }
            if state.has_more() {
                println!("(more available)");
            }
            Ok(())
        }
        FetchStatus::Empty => {
            println!("No articles found.");
            Ok(())
        }
        FetchStatus::Error => anyhow::bail!("{}", state.error().unwrap_or("request failed")),
        FetchStatus::Idle | FetchStatus::Loading => anyhow::bail!("request did not complete"),
    }
}
