use axum::{routing::get, Router};
use std::future::IntoFuture;
use roomcast::{websockets::websocket_handler, AppError, AppState, Hub, ServerConfig};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roomcast=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    info!(
        bind_addr = %config.bind_addr,
        outbox_capacity = config.outbox_capacity,
        write_timeout = ?config.write_timeout,
        "Starting room broadcast server"
    );

    // The dispatcher runs for the life of the process
    let (hub, dispatcher) = Hub::new(config.hub_config());
    let dispatcher_handle = dispatcher.start();

    let app_state = AppState::new(hub, config.clone());

    // Any origin may connect
    let app = Router::new()
        .route("/ws", get(websocket_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|source| AppError::Bind {
            addr: config.bind_addr.clone(),
            source,
        })?;
    info!("Server running on {}", config.bind_addr);

    tokio::select! {
        served = axum::serve(listener, app).into_future() => served.map_err(AppError::Serve),
        finished = dispatcher_handle => {
            error!(panicked = finished.is_err(), "Hub dispatcher exited, shutting down");
            Err(AppError::DispatcherStopped)
        }
    }
}
