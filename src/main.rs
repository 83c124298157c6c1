use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tokio::sync::broadcast;

use meridian_client::api::ApiClient;
use meridian_client::config::Settings;
use meridian_client::realtime::{events, RealtimeClient};
use meridian_client::session::{Role, SessionCache};
use meridian_client::storage::create_storage;
use meridian_client::tasks::{ReservePoller, SnapshotOrigin};
use meridian_client::telemetry::{init_tracing, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(LogFormat::from_env());

    // Fails fast in production without a real API URL
    let settings = Settings::new()?;
    tracing::info!(run_mode = %settings.run_mode, api = %settings.api_base_url(), "Configuration loaded");

    let storage = create_storage(&settings.storage);
    let sessions = SessionCache::new(storage);
    let api = ApiClient::new(settings.api_base_url())?;

    if !sessions.is_authenticated() && !settings.is_production() {
        sessions.create_mock_session(&settings.run_mode, Role::Viewer)?;
    }

    let realtime = RealtimeClient::new(settings.ws_url.clone(), &settings.realtime, sessions.clone());
    let subscriptions = [
        events::RESERVE_UPDATE,
        events::PRICE_UPDATE,
        events::ATTESTATION_UPDATE,
    ]
    .into_iter()
    .map(|event_type| {
        realtime.subscribe_to_event(event_type, move |data| {
            tracing::info!(event_type = %event_type, data = %data, "Realtime update");
        })
    })
    .chain([
        realtime.subscribe_to_event(events::WS_OPEN, |_| tracing::info!("Realtime feed live")),
        realtime.subscribe_to_event(events::WS_CLOSE, |_| {
            tracing::info!("Realtime feed lost, relying on polling")
        }),
    ])
    .collect::<Vec<_>>();

    realtime.connect();

    // Polling runs alongside the socket; the client itself never signals staleness.
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let poller = ReservePoller::new(
        &settings.polling,
        Arc::new(api.clone()),
        shutdown_tx.subscribe(),
        |update| {
            let snapshot = &update.snapshot;
            let fallback = update.origin == SnapshotOrigin::Fallback;
            tracing::info!(
                currency = %snapshot.currency,
                reserve_ratio = snapshot.reserve_ratio,
                fallback,
                "Reserve snapshot"
            );
        },
    );
    let poller_handle = tokio::spawn(poller.run());

    shutdown_signal_handler(shutdown_tx).await;

    realtime.disconnect();
    for subscription in subscriptions {
        subscription.unsubscribe();
    }

    tracing::info!("Waiting for background tasks to finish...");
    let _ = poller_handle.await;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal_handler(shutdown_tx: broadcast::Sender<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, shutting down");
        }
    }

    let _ = shutdown_tx.send(());
}
