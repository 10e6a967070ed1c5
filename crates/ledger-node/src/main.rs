use anyhow::Context;
use clap::Parser;
use ledger_node::{api, Args, NodeConfig, NodeState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = NodeConfig::from_args(Args::parse())?;
    let addr = config.listen;
    info!(
        difficulty = config.difficulty,
        peers = config.bootstrap_peers.len(),
        reward = config.reward.is_some(),
        "starting ledger-node"
    );

    let state = NodeState::new(config).context("failed to initialise node state")?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("ledger-node listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
