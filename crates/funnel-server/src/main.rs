//! Lead Funnel HTTP Server
//!
//! Axum-based intake endpoint: captures leads into the document store,
//! hands back the pre-provisioned payment link, and pushes a LINE
//! notification to operators.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{Router, routing::any};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use funnel_core::config::FunnelConfig;
use funnel_runtime::{LineNotifier, NotionLeadStore};

use crate::handlers::root;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Missing configuration fails fast here, before any listener exists.
    let config = FunnelConfig::from_env()?;
    tracing::info!("✓ Configuration loaded ({} LINE recipients)", config.line.recipients.len());

    // Build application state
    let state = AppState {
        store: Arc::new(NotionLeadStore::new(config.notion.clone())),
        notifier: Arc::new(LineNotifier::new(config.line.clone())),
        links: Arc::new(config.links.clone()),
        pricing: config.pricing,
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router: one route, method dispatch inside the handler so any
    // non-POST method answers the liveness probe.
    let app = Router::new()
        .route("/", any(root))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 funnel-server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  POST /  - Lead intake (returns checkout_url)");
    tracing::info!("  *    /  - Liveness probe");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
