use std::sync::Arc;

use axum::{routing::get, Router};

use suvbot_core::{
    config::Config,
    repo::{ClientRepo, OrderRepo},
};
use suvbot_store::Db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    suvbot_core::logging::init("suvbot")?;

    let cfg = Arc::new(Config::load()?);

    let db = Db::open(&cfg.database_path).await?;
    let clients: Arc<dyn ClientRepo> = Arc::new(db.clone());
    let orders: Arc<dyn OrderRepo> = Arc::new(db);

    spawn_health_probe(cfg.health_addr.clone());

    suvbot_telegram::router::run_polling(cfg, clients, orders).await?;

    Ok(())
}

/// Tiny liveness endpoint so the hosting platform sees an open port.
fn spawn_health_probe(addr: String) {
    tokio::spawn(async move {
        let app = Router::new().route("/health", get(|| async { "OK" }));
        let listener = match tokio::net::TcpListener::bind(&addr).await {
            Ok(l) => l,
            Err(err) => {
                tracing::warn!(%addr, %err, "health probe disabled, bind failed");
                return;
            }
        };
        tracing::info!(%addr, "health probe listening");
        if let Err(err) = axum::serve(listener, app).await {
            tracing::warn!(%err, "health probe stopped");
        }
    });
}
