pub mod config;
pub mod cors;
pub mod error;
pub mod routes;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use std::sync::Arc;

use anyhow::{Context, Result};
use itembox_db::SqliteDatabase;
use itembox_notify::NotifyConfig;
use itembox_service::LocalService;
use itembox_store::StoreConfig;
use tokio::net::TcpListener;
use tracing::info;

pub use config::{Mode, ServerConfig};
pub use routes::{build_router, AppState, InnerAppState};

/// Open every backend named by the configuration.
pub fn build_state(
    config: &ServerConfig,
    store_config: &StoreConfig,
    notify_config: &NotifyConfig,
) -> Result<AppState> {
    let allowed_origins = cors::parse_origins(&config.allowed_origins)?;
    info!(origins = ?config.allowed_origins, mode = ?config.mode, "cors allow-list");

    let db_config = config.db_config();
    let db = SqliteDatabase::open(&db_config).context("failed to open item table")?;
    info!(table = %db.table(), "item table ready");

    let store = itembox_store::create_store(store_config).context("failed to create object store")?;
    info!(
        backend = if store_config.is_s3() { "s3" } else { "local" },
        bucket = %store.bucket(),
        "object store ready"
    );

    let notifier = itembox_notify::create_notifier(notify_config)
        .context("failed to create notifier")?;
    info!(topic = %notifier.topic(), webhook = notify_config.is_webhook(), "notifier ready");

    Ok(Arc::new(InnerAppState {
        service: LocalService::new(Arc::new(db), store, notifier),
        mode: config.mode,
        allowed_origins,
    }))
}

/// Serve until ctrl-c.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let app = build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn build_state_opens_file_backed_table() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("items.db");
        let config = ServerConfig::try_parse_from([
            "itembox-server",
            "--db-path",
            db_path.to_str().unwrap(),
            "--table",
            "DummyItems",
        ])
        .unwrap();
        let store_config = StoreConfig {
            local_data_dir: Some(dir.path().join("files").to_string_lossy().to_string()),
            ..StoreConfig::default()
        };
        let state = build_state(&config, &store_config, &NotifyConfig::default()).unwrap();
        assert_eq!(state.mode, Mode::Production);
        assert_eq!(state.allowed_origins.len(), 1);
        assert!(db_path.exists());
    }

    #[test]
    fn build_state_rejects_bad_table_name() {
        let config =
            ServerConfig::try_parse_from(["itembox-server", "--table", "items; drop"]).unwrap();
        assert!(build_state(&config, &StoreConfig::default(), &NotifyConfig::default()).is_err());
    }
}
