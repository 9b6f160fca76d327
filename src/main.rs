//! Action Plans API
//!
//! A thin HTTP layer in front of the action plan stored procedures: every
//! request is parsed, forwarded as a single routine call on a pooled
//! PostgreSQL connection, and the result is relayed as JSON.

mod config;
mod db;
mod error;
mod models;
mod routes;
mod state;

use crate::config::Settings;
use crate::db::service::PgActionPlanService;
use crate::routes::{create_router, ACTION_PLANS_BASE};
use crate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("🚀 Starting Action Plans API...");

    // Load configuration
    let settings = Settings::load()?;
    info!("📋 Configuration loaded successfully");

    // The pool lives for the whole process and is closed after shutdown
    let pool = db::create_pool(&settings.database)?;
    db::verify_pool(&pool).await?;
    info!(
        "✅ Database pool ready ({}:{}/{}, TLS: {})",
        settings.database.host,
        settings.database.port,
        settings.database.database,
        settings.database.require_tls
    );

    let service = PgActionPlanService::new(pool.clone());
    let state = Arc::new(AppState::new(Arc::new(service)));

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   GET    /health");
    info!("   GET    {}/listar", ACTION_PLANS_BASE);
    info!("   GET    {}/listarDetalles/:id", ACTION_PLANS_BASE);
    info!("   GET    {}/buscar/:id", ACTION_PLANS_BASE);
    info!("   POST   {}/agregar", ACTION_PLANS_BASE);
    info!("   POST   {}/agregarConDetalle", ACTION_PLANS_BASE);
    info!("   POST   {}/editar", ACTION_PLANS_BASE);
    info!("   DELETE {}/eliminar/:id", ACTION_PLANS_BASE);
    info!("");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close();
    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,action_plans_api=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
