use std::path::PathBuf;

use cancha::config::{AppConfig, create_app, make_pool, run_migrations};
use cancha::state::AppState;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about = "Serves the tournament administration dashboard")]
struct Args {
    /// TOML configuration file. Environment variables take precedence.
    #[arg(long, short)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?;
    let bind_addr = config.bind_addr.clone();

    let pool = make_pool(&config.database_url)?;
    run_migrations(&pool)?;
    let state = AppState::new(pool, config)?;

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "listening");
    axum::serve(listener, create_app(state)).await?;

    Ok(())
}
