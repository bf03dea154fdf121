//! KPI Digest Job
//!
//! Computes funnel metrics over every lead in the store and pushes the
//! digest to the configured LINE recipients.

use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use funnel_core::config::{LineConfig, NotionConfig};
use funnel_core::kpi::{DEFAULT_MONTH_TARGET, KpiReport};
use funnel_core::outreach::PushNotifier;
use funnel_core::store::LeadStore;
use funnel_runtime::{LineNotifier, NotionLeadStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let store = NotionLeadStore::new(NotionConfig::from_env()?);
    let notifier = LineNotifier::new(LineConfig::from_env()?);
    let month_target = std::env::var("KPI_MONTH_TARGET")
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_MONTH_TARGET);

    let leads = store.list_all().await?;
    let report = KpiReport::from_leads(&leads);
    let message = report.to_message(Utc::now(), month_target);

    tracing::info!(
        "KPI: {} leads, {} conversions, revenue {}",
        report.total_leads,
        report.conversions,
        report.revenue
    );
    notifier.push(&message).await?;

    Ok(())
}
