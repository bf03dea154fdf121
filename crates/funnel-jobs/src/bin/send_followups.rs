//! Follow-up Email Job
//!
//! Emails every uncontacted lead once and sets the contacted flag. Per-lead
//! failures are logged and skipped; only a failed store query aborts the run.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use funnel_core::config::{NotionConfig, ResendConfig};
use funnel_core::followup::FollowUp;
use funnel_runtime::{NotionLeadStore, ResendMailer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let store = Arc::new(NotionLeadStore::new(NotionConfig::from_env()?));
    let mailer = Arc::new(ResendMailer::new(ResendConfig::from_env()?));

    let summary = FollowUp::new(store, mailer).run().await?;
    tracing::info!(
        "Done: {} sent, {} skipped, {} failed",
        summary.sent,
        summary.skipped,
        summary.failed
    );

    Ok(())
}
