use clap::Parser;
use formgate::utils::logger;
use formgate::{build_state, create_router, AppConfig, Cli};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_logger(cli.verbose);
    }

    tracing::info!("Starting formgate");
    if cli.verbose {
        tracing::debug!("CLI flags: {:?}", cli);
    }

    // Fail fast: a missing credential or bad endpoint must never surface
    // mid-pipeline on a live submission.
    let config = match AppConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {e}");
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    let state = Arc::new(build_state(&config)?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "formgate listening");
    axum::serve(listener, app).await?;

    Ok(())
}
