use tokio::io::BufReader;
use tracing::info;

use playslot::backend::{FileBackend, KvBackend, MemoryBackend};
use playslot::config::{Config, StoreKind};
use playslot::engine::{BookingStore, Engine};
use playslot::session::run_session;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let config = Config::from_env()?;
    playslot::observability::init(config.metrics_port)?;

    info!("playslot starting");
    info!("  store: {:?}", config.store);
    info!("  storage_key: {}", config.storage_key);
    if let Some(today) = config.today {
        info!("  today pinned to {today}");
    }

    match config.store {
        StoreKind::File => {
            info!("  data_dir: {}", config.data_dir.display());
            let backend = FileBackend::open(&config.data_dir)?;
            serve(backend, &config).await?;
        }
        StoreKind::Memory => serve(MemoryBackend::new(), &config).await?,
    }

    info!("playslot stopped");
    Ok(())
}

/// Run the controller loop on stdin/stdout until input ends or a shutdown
/// signal arrives.
async fn serve<B: KvBackend>(backend: B, config: &Config) -> std::io::Result<()> {
    let store = BookingStore::with_key(backend, config.storage_key.clone());
    let mut engine = Engine::new(store);
    if let Some(today) = config.today {
        engine = engine.with_today(today);
    }

    let shutdown = async {
        let ctrl_c = tokio::signal::ctrl_c();
        #[cfg(unix)]
        {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => {}
                        _ = sigterm.recv() => {}
                    }
                }
                Err(e) => {
                    tracing::warn!("failed to register SIGTERM handler: {e}");
                    ctrl_c.await.ok();
                }
            }
        }
        #[cfg(not(unix))]
        {
            ctrl_c.await.ok();
        }
    };

    let session = run_session(&mut engine, BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    tokio::select! {
        result = session => result,
        _ = shutdown => {
            info!("shutdown signal received");
            Ok(())
        }
    }
}
