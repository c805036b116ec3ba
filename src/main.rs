/*****************************************************************************************
 *
 *  message-service – HTTP message cache over Redis
 *  -----------------------------------------------
 *
 *  POST /{key} saves a timestamped message with a fixed expiration,
 *  GET /{key} reads it back, GET /health answers liveness probes.
 *
 *****************************************************************************************/

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::FmtSubscriber;

use message_cache::app::{build_app, Timeouts};
use message_cache::config::{AppConfig, StoreBackend};
use message_cache::errors::ServiceError;
use message_cache::services::{MemoryStore, MessageStore, RedisStore};
use message_cache::shutdown::{os_signal, phase_channel, run_until_stopped};
use message_cache::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        tracing::error!("{}", e);
        eprintln!("message-service: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ServiceError> {
    //
    // ────────────────────────────────────────────────────────
    //  Load configuration
    // ────────────────────────────────────────────────────────
    //
    let cfg = AppConfig::from_env()?;

    //
    // ────────────────────────────────────────────────────────
    //  Configure logging
    // ────────────────────────────────────────────────────────
    //
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cfg.level_filter())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to set tracing subscriber: {}", e);
    }

    tracing::info!("Loaded configuration: {:?}", cfg);

    //
    // ────────────────────────────────────────────────────────
    //  Connect to the store and check it is alive
    // ────────────────────────────────────────────────────────
    //
    let store: Arc<dyn MessageStore> = match cfg.store_backend {
        StoreBackend::Redis => {
            let addr = cfg.redis_addr();
            let store = connect_redis(&addr).await?;
            tracing::info!("Connected with Redis server {:?}", addr);
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    //
    // ────────────────────────────────────────────────────────
    //  Build Axum app
    // ────────────────────────────────────────────────────────
    //
    let state = AppState::new(store, cfg.message_ttl);
    let timeouts = Timeouts {
        read: cfg.read_timeout,
        write: cfg.write_timeout,
    };
    let app = build_app(state, timeouts);

    //
    // ────────────────────────────────────────────────────────
    //  Bind server and serve until a shutdown signal
    // ────────────────────────────────────────────────────────
    //
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServiceError::Bind { addr, source })?;

    let signal = os_signal().map_err(ServiceError::Signal)?;
    let (phase, _) = phase_channel();

    tracing::info!(
        "Listening and serving HTTP on {} (idle timeout {:?})",
        addr,
        cfg.idle_timeout
    );

    run_until_stopped(listener, app, signal, cfg.shutdown_grace, phase).await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn connect_redis(addr: &str) -> Result<RedisStore, ServiceError> {
    let unreachable = |source| ServiceError::StoreUnreachable {
        addr: addr.to_string(),
        source,
    };

    let store = RedisStore::connect(addr).await.map_err(unreachable)?;
    store.ping().await.map_err(unreachable)?;
    Ok(store)
}
