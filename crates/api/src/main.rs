use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use prodscore_core::scoring::ModelHandle;
use prodscore_core::visualization::SvgChartRenderer;
use prodscore_pipeline::{
    BatchJobManager, CsvResultSink, CsvSource, JobRegistry, ManagerConfig,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prodscore_api::config::ServerConfig;
use prodscore_api::router::build_app_router;
use prodscore_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "prodscore_api=debug,prodscore_pipeline=debug,tower_http=debug".into()
    });
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    for dir in [&config.upload_dir, &config.results_dir] {
        std::fs::create_dir_all(dir)
            .unwrap_or_else(|e| panic!("Failed to create directory {}: {e}", dir.display()));
    }

    // --- Model ---
    let model = ModelHandle::load(&config.model_path);
    match model.unavailable_reason() {
        None => tracing::info!(path = %config.model_path.display(), "Scoring model loaded"),
        Some(reason) => tracing::error!(
            path = %config.model_path.display(),
            error = %reason,
            "Scoring model not loaded; scoring endpoints will answer 503",
        ),
    }

    // --- Batch jobs ---
    let jobs = BatchJobManager::new(
        Arc::new(JobRegistry::new()),
        model.clone(),
        Arc::new(CsvSource),
        Arc::new(CsvResultSink::new(config.results_dir.clone())),
        ManagerConfig {
            max_concurrent_jobs: config.max_concurrent_jobs,
        },
    );
    tracing::info!(
        max_concurrent_jobs = config.max_concurrent_jobs,
        "Batch job manager started"
    );

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        model,
        visualizer: Arc::new(SvgChartRenderer),
        jobs: jobs.clone(),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, draining batch jobs");

    let drained = jobs
        .shutdown(Duration::from_secs(config.shutdown_timeout_secs))
        .await;
    if drained {
        tracing::info!("Batch jobs drained");
    } else {
        tracing::warn!(
            timeout_secs = config.shutdown_timeout_secs,
            "Batch jobs still running at shutdown timeout"
        );
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
