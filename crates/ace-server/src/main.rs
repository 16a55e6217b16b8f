use std::net::SocketAddr;
use std::sync::Arc;

use ace_ai::MockSummarizer;
use ace_notify::plugin::ChannelRegistry;
use ace_notify::{NotificationChannel, PassthroughRenderer};
use ace_storage::{CachedStore, DbStore, MemoryStore, RecordStore};
use anyhow::Result;
use chrono::Utc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use ace_server::app;
use ace_server::config::ServerConfig;
use ace_server::demo_seed;
use ace_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    ace_common::id::init(1, 1);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ace=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("config/server.toml");
    let config = ServerConfig::load(config_path)?;

    tracing::info!(
        http_port = config.http_port,
        backend = %config.database.backend,
        "ace-server starting"
    );

    let store: Arc<dyn RecordStore> = match config.database.backend.as_str() {
        "memory" => Arc::new(MemoryStore::new()),
        _ => {
            std::fs::create_dir_all(&config.database.data_dir)?;
            let db = DbStore::new(&config.database.connection_url()).await?;
            Arc::new(CachedStore::new(db))
        }
    };

    // SMTP absent means all outgoing mail goes to the mock channel.
    let registry = ChannelRegistry::default();
    let notifier: Arc<dyn NotificationChannel> = match &config.smtp {
        Some(smtp) => {
            let channel_config = serde_json::to_value(smtp)?;
            if let Some(plugin) = registry.get_plugin("email") {
                tracing::info!(
                    config = %plugin.redact_config(&channel_config),
                    "Email channel configured"
                );
            }
            Arc::from(registry.create_channel("email", &channel_config)?)
        }
        None => {
            tracing::warn!("No [smtp] section in config, using mock delivery channel");
            Arc::from(registry.create_channel("mock", &serde_json::json!({}))?)
        }
    };

    if config.demo.seed {
        if let Err(e) = demo_seed::seed_demo_data(store.as_ref()).await {
            tracing::error!(error = %e, "Failed to seed demo data");
        }
    }

    let state = AppState {
        store,
        notifier,
        summarizer: Arc::new(MockSummarizer::new()),
        renderer: Arc::new(PassthroughRenderer),
        start_time: Utc::now(),
        config: Arc::new(config.clone()),
    };

    let http_addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let app = app::build_http_app(state);
    let listener = tokio::net::TcpListener::bind(http_addr).await?;

    tracing::info!(http = %http_addr, "Server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
            tracing::info!("Shutting down gracefully");
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
