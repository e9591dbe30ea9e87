use anyhow::Context;
use art_recommendation_service::{
    AppState, ServiceConfig, build_generator, build_router,
    config::{GeneratorConfig, LogFormat},
    credentials,
};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize JSON or human-readable tracing depending on configuration
fn init_tracing(format: &LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "art_recommendation_service=debug,tower_http=debug".into());

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.log_format);

    info!("Starting art recommendation service");

    let credentials_file =
        credentials::bootstrap(&config).context("Failed to set up Google credentials")?;

    match &config.generator {
        GeneratorConfig::Gemini { model, .. } => {
            info!(provider = "gemini", model = %model, "Initializing text generator")
        }
        GeneratorConfig::Vertex {
            project_id,
            location,
            model,
            ..
        } => info!(
            provider = "vertex",
            project_id = %project_id,
            location = %location,
            model = %model,
            "Initializing text generator"
        ),
    }
    let generator = build_generator(&config.generator, credentials_file.as_deref())
        .await
        .context("Failed to initialize text generator")?;

    let app = build_router(AppState::new(generator));

    let addr = config.bind_address()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Server running on http://{}", listener.local_addr()?);
    info!("  POST /get-recommendations  - Recommend art for a mood");
    info!("  GET  /health               - Health check");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
