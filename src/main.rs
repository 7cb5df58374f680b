// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use axum::{routing::get, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::application::chart_service::ChartService;
use crate::application::refresh_service::RefreshService;
use crate::application::run_service::RunService;
use crate::infrastructure::config::load_config;
use crate::infrastructure::fs_repository::FsLogRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    chart_tooltip, charts, events, health_check, item, list_runs, snapshot,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(FsLogRepository::new(&config.server.log_dir, config.limits));

    // Create services (application layer)
    let run_service = RunService::new(repository.clone());
    let chart_service = ChartService::new(config.plot);
    let refresh_service = RefreshService::new(repository);
    refresh_service.load_initial().await?;
    refresh_service.spawn_polling(Duration::from_secs(config.server.poll_interval_secs));

    // Create application state
    let state = Arc::new(AppState {
        run_service,
        chart_service,
        refresh_service,
    });

    // Build router (presentation layer)
    // Note: Responses are compressed manually in the response builders, so no
    // CompressionLayer here to avoid double compression.
    let mut router = Router::new()
        .route("/healthz", get(health_check))
        .route("/api/runs", get(list_runs))
        .route("/api/all", get(snapshot))
        .route("/api/charts", get(charts))
        .route("/api/charts/tooltip", get(chart_tooltip))
        .route("/api/:kind/:name/:step/*category", get(item))
        .route("/events", get(events))
        .nest_service("/data", ServeDir::new(&config.server.log_dir))
        .with_state(state);
    if let Some(frontend_dir) = &config.server.frontend_dir {
        router = router.fallback_service(ServeDir::new(frontend_dir));
    }
    let router = router.layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    println!("Starting runboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
