use anyhow::Result;
use clap::Parser;
use itembox_notify::NotifyConfig;
use itembox_server::ServerConfig;
use itembox_store::StoreConfig;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();
    let state = itembox_server::build_state(
        &config,
        &StoreConfig::from_env(),
        &NotifyConfig::from_env(),
    )?;

    let addr = config.addr();
    let listener = TcpListener::bind(addr).await?;
    info!("itembox-server listening on http://{addr}");
    info!("health check: http://{addr}/health");

    itembox_server::serve(listener, state).await
}
