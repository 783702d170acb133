mod config;
mod error;
mod logging;
mod models;
mod observer;
mod rest;

use error::ServerError;
use models::PgReadingStore;
use observer::WeatherObserver;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info};

static TERMINATED: AtomicUsize = AtomicUsize::new(0);

/// First SIGINT stops the server gracefully, a second one kills the process
fn register_sigint_handler() -> Result<oneshot::Receiver<()>, ServerError> {
    let (tx, rx) = oneshot::channel();
    let tx = Mutex::new(Some(tx));
    ctrlc::set_handler(move || {
        let count = TERMINATED.fetch_add(1, Ordering::Relaxed);
        if count >= 1 {
            info!("Force killing");
            std::process::exit(1);
        }

        info!("Shutting down, waiting for open requests");
        if let Some(tx) = tx.lock().take() {
            let _ = tx.send(());
        }
    })?;
    Ok(rx)
}

async fn run() -> Result<(), ServerError> {
    let db_conn = models::establish_db_connection().await?;
    models::ensure_schema(&db_conn).await?;

    let store = Arc::new(PgReadingStore::new(db_conn));
    let observer = WeatherObserver::new(store);
    info!("Database state: {}", observer.check_db().await);

    let shutdown = register_sigint_handler()?;
    rest::dispatch_server_daemon(observer, async {
        let _ = shutdown.await;
    })
    .await
}

#[tokio::main]
pub async fn main() {
    logging::init();
    info!("Starting weather station v{}", weather_core::CORE_VERSION);

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}
