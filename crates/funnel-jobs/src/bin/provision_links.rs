//! Payment-Link Provisioning Job
//!
//! Ensures a Stripe product, price, and payment link exist for every SKU and
//! prints the link URLs for operators to copy into the intake server's
//! configuration. Safe to re-run: product and price are reused, only the
//! link is minted fresh each time.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use funnel_core::config::PricingConfig;
use funnel_core::lead::ProductCode;
use funnel_payments::{ProductSpec, Provisioner, StripeGateway};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let pricing = PricingConfig::from_env()?;
    let thanks_url = std::env::var("THANKS_URL")
        .map_err(|_| anyhow::anyhow!("Configuration error: THANKS_URL not set"))?;
    let gateway = Arc::new(StripeGateway::from_env()?);
    let provisioner = Provisioner::new(gateway, thanks_url);

    tracing::info!("=== Provisioning payment links ===");
    for product in [ProductCode::Guide, ProductCode::ConsultDeposit] {
        let spec = ProductSpec {
            name: product.display_name().to_string(),
            sku: product.sku().to_string(),
            unit_amount: pricing.amount_for(product),
        };
        // Any API error aborts the whole run; re-running is always safe.
        let provisioned = provisioner.ensure_payment_link(&spec).await?;
        println!(
            "{} ({} jpy): {}",
            spec.sku, spec.unit_amount, provisioned.link.url
        );
    }
    tracing::info!("=== Done ===");

    Ok(())
}
