use enroll::telemetry;
use opentelemetry::global;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // OTLP export is opt-in.
    let otlp = std::env::var(telemetry::OTLP_ENDPOINT_ENV).ok();
    let otlp_logs = match otlp.as_deref() {
        Some(endpoint) => Some(telemetry::setup_logging(endpoint)?),
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "enroll=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(otlp_logs)
        .init();

    if otlp.is_some() {
        global::set_tracer_provider(telemetry::setup_tracer()?);
    }

    let state = enroll::initialize_state()?;
    let addr = state.config.socket_addr()?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        version = state.config.version(),
        %addr,
        "server listening"
    );

    axum::serve(listener, enroll::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(err) => {
                tracing::error!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received terminate signal, shutting down"),
    }
}
