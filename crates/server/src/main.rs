//! Aduan host process.
//!
//! Prepares the store (migrations, bootstrap administrator), then keeps the
//! administrator's complaint snapshot fresh and logs complaint events until
//! shut down.

use std::sync::Arc;

use aduan_common::{Config, init_tracing};
use aduan_core::{AdminRefresher, BroadcastEventPublisher, Caller, Services};
use anyhow::Context;
use tokio::{signal, sync::broadcast::error::RecvError};
use tracing::{info, warn};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    init_tracing(&config.logging)?;

    info!("Starting aduan...");

    let db = aduan_db::init(&config).await?;
    info!("Connected to database");

    aduan_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);
    let publisher = BroadcastEventPublisher::default();
    let mut events = publisher.subscribe();
    let services = Services::with_local_storage(&db, &config, Arc::new(publisher));

    let admin = services
        .accounts
        .ensure_bootstrap_admin(config.bootstrap_admin.as_ref())
        .await?;

    let refresher = match admin {
        Some(admin) => {
            let refresher = AdminRefresher::new(
                services.complaints.clone(),
                Caller::from_user(&admin),
                config.refresh.admin_interval(),
            )?;
            Some(refresher.spawn())
        }
        None => {
            info!("No bootstrap administrator configured; admin refresh disabled");
            None
        }
    };
    let mut snapshots = refresher.as_ref().map(|(rx, _)| rx.clone());

    let event_log = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => info!(complaint_id = event.complaint_id(), ?event, "Complaint event"),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event log fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let snapshot_log = tokio::spawn(async move {
        let Some(rx) = snapshots.as_mut() else {
            return;
        };
        while rx.changed().await.is_ok() {
            let stats = rx.borrow_and_update().stats;
            info!(
                total = stats.total,
                new = stats.new,
                read = stats.read,
                processing = stats.processing,
                done = stats.done,
                "Admin snapshot refreshed"
            );
        }
    });

    info!("aduan ready");
    shutdown_signal().await;

    snapshot_log.abort();
    event_log.abort();
    if let Some((rx, handle)) = refresher {
        drop(rx);
        handle.abort();
    }

    info!("aduan stopped");
    Ok(())
}
