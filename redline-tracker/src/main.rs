use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use redline_tracker::cache::{CacheConfig, CachedFeed};
use redline_tracker::config::TrackerConfig;
use redline_tracker::dashboard::{AppState, DashboardState, create_router, spawn_refresher};
use redline_tracker::mbta::{MbtaClient, MbtaConfig, MbtaFeed, MockMbtaClient};
use redline_tracker::report::{OllamaClient, OllamaConfig, ReportOptions, run_report};

#[derive(Parser)]
#[command(name = "redline-tracker", about = "MBTA Red Line dashboard and commute reporter")]
struct Cli {
    /// MBTA V3 API key.
    #[arg(long, env = "MBTA_API_KEY", hide_env_values = true, global = true)]
    mbta_api_key: Option<String>,

    /// Serve captured fixtures from this directory instead of the live API.
    #[arg(long, value_name = "DIR", global = true)]
    mock_data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the live dashboard.
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: SocketAddr,

        /// Auto-refresh interval in minutes; 0 turns it off.
        #[arg(long, default_value_t = 0.0)]
        refresh_minutes: f64,

        #[arg(long, default_value = "static")]
        static_dir: String,
    },

    /// Write a commute report.
    Report {
        /// Output file. Defaults to a timestamped file under `reports/`.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Replace the built-in instructions with this file's contents.
        #[arg(long)]
        prompt_file: Option<PathBuf>,

        #[arg(long, env = "OLLAMA_API_KEY", hide_env_values = true)]
        ollama_api_key: Option<String>,
    },
}

fn build_feed(api_key: Option<String>, mock_data: Option<PathBuf>) -> anyhow::Result<MbtaFeed> {
    let feed = match mock_data {
        Some(dir) => {
            let mock = MockMbtaClient::new(&dir)
                .with_context(|| format!("loading fixtures from {}", dir.display()))?;
            tracing::info!(dir = %dir.display(), fixtures = ?mock.available(), "using mock MBTA data");
            MbtaFeed::Mock(mock)
        }
        None => MbtaFeed::Live(MbtaClient::new(MbtaConfig::new(api_key))?),
    };

    if !feed.is_configured() {
        tracing::warn!("MBTA_API_KEY not set. API calls will fail.");
    }
    Ok(feed)
}

async fn serve(
    feed: MbtaFeed,
    bind: SocketAddr,
    refresh_minutes: f64,
    static_dir: &str,
) -> anyhow::Result<()> {
    let config = Arc::new(TrackerConfig::default());
    let feed = Arc::new(CachedFeed::new(feed, &CacheConfig::default()));
    let dashboard = Arc::new(DashboardState::new());
    let period = config.refresh_period(refresh_minutes);

    let (refresher, _task) = spawn_refresher(feed.clone(), config.clone(), dashboard.clone(), period);
    if let Err(e) = refresher.refresh_now().await {
        tracing::warn!(error = %e, "initial refresh failed");
    }

    let app = create_router(AppState::new(feed, config, dashboard, refresher), static_dir);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    tracing::info!("Red Line dashboard listening on http://{bind}");
    match period {
        Some(p) => tracing::info!(secs = p.as_secs(), "auto-refresh on"),
        None => tracing::info!("auto-refresh off"),
    }

    axum::serve(listener, app).await?;
    Ok(())
}

async fn report(
    feed: MbtaFeed,
    output: Option<PathBuf>,
    prompt_file: Option<PathBuf>,
    ollama_api_key: Option<String>,
) -> anyhow::Result<()> {
    let mut options = ReportOptions {
        output,
        ..ReportOptions::default()
    };
    if let Some(path) = prompt_file {
        options.instructions = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading prompt file {}", path.display()))?;
    }

    let ollama = OllamaClient::new(OllamaConfig::new(ollama_api_key))?;
    let path = run_report(&feed, &ollama, &TrackerConfig::default(), &options).await?;
    println!("Report saved to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let feed = build_feed(cli.mbta_api_key, cli.mock_data)?;

    match cli.command {
        Command::Serve {
            bind,
            refresh_minutes,
            static_dir,
        } => serve(feed, bind, refresh_minutes, &static_dir).await,
        Command::Report {
            output,
            prompt_file,
            ollama_api_key,
        } => report(feed, output, prompt_file, ollama_api_key).await,
    }
}
