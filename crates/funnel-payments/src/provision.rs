//! Payment Link Provisioner
//!
//! Find-or-create upsert over the payments gateway: resolve the product by
//! SKU, resolve a matching one-time price by exact amount, then always mint a
//! fresh payment link. Safe to re-run: product and price resolution is
//! idempotent, and at worst a re-run leaves one extra (unused) link behind.

use std::sync::Arc;

use crate::error::{PaymentError, Result};
use crate::gateway::{PaymentLinkRecord, PaymentsGateway, PriceRecord, ProductRecord};

/// Fixed target currency for all prices (JPY is zero-decimal)
pub const TARGET_CURRENCY: &str = "jpy";

/// What to do when the product search call itself fails.
///
/// `FailOpen` favors availability: a transient search outage falls through to
/// creation and may leave a duplicate product behind. `FailClosed` aborts the
/// run instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LookupPolicy {
    #[default]
    FailOpen,
    FailClosed,
}

/// One SKU to provision
#[derive(Clone, Debug)]
pub struct ProductSpec {
    /// Display name for the product
    pub name: String,
    /// Stable dedup key for product/price resolution (not for links)
    pub sku: String,
    /// Unit amount in minor currency units
    pub unit_amount: i64,
}

/// Output of one provisioning pass
#[derive(Clone, Debug)]
pub struct ProvisionedLink {
    pub product: ProductRecord,
    pub price: PriceRecord,
    pub link: PaymentLinkRecord,
}

/// Idempotent provisioner over a payments gateway
pub struct Provisioner {
    gateway: Arc<dyn PaymentsGateway>,
    /// Post-checkout "thanks" page base URL
    thanks_url: String,
    policy: LookupPolicy,
}

impl Provisioner {
    pub fn new(gateway: Arc<dyn PaymentsGateway>, thanks_url: impl Into<String>) -> Self {
        Self {
            gateway,
            thanks_url: thanks_url.into(),
            policy: LookupPolicy::default(),
        }
    }

    /// Override the lookup-failure policy
    pub fn with_policy(mut self, policy: LookupPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Ensure product, price, and a fresh payment link exist for `spec`.
    ///
    /// Any error other than a fail-open search failure propagates unwrapped;
    /// there are no retries. Re-running after a failure is always safe.
    pub async fn ensure_payment_link(&self, spec: &ProductSpec) -> Result<ProvisionedLink> {
        let product = self.resolve_product(spec).await?;
        let price = self.resolve_price(&product, spec).await?;

        let redirect_url = format!(
            "{}?session_id={{CHECKOUT_SESSION_ID}}&sku={}",
            self.thanks_url, spec.sku
        );
        let link = self
            .gateway
            .create_payment_link(&price.id, &redirect_url, &spec.sku)
            .await?;
        tracing::info!("Created payment link {} for {}: {}", link.id, spec.sku, link.url);

        Ok(ProvisionedLink { product, price, link })
    }

    async fn resolve_product(&self, spec: &ProductSpec) -> Result<ProductRecord> {
        match self.gateway.find_product_by_sku(&spec.sku).await {
            Ok(Some(product)) => {
                tracing::info!("Reusing product {} for sku {}", product.id, spec.sku);
                Ok(product)
            }
            Ok(None) => self.create_product(spec).await,
            Err(PaymentError::LookupFailed(msg)) if self.policy == LookupPolicy::FailOpen => {
                tracing::warn!(
                    "Product search for {} failed ({}); creating without dedup",
                    spec.sku,
                    msg
                );
                self.create_product(spec).await
            }
            Err(e) => Err(e),
        }
    }

    async fn create_product(&self, spec: &ProductSpec) -> Result<ProductRecord> {
        let product = self.gateway.create_product(&spec.name, &spec.sku).await?;
        tracing::info!("Created product {} for sku {}", product.id, spec.sku);
        Ok(product)
    }

    async fn resolve_price(&self, product: &ProductRecord, spec: &ProductSpec) -> Result<PriceRecord> {
        let prices = self.gateway.list_active_prices(&product.id).await?;
        if let Some(price) = prices.into_iter().find(|p| {
            p.currency == TARGET_CURRENCY && p.unit_amount == spec.unit_amount && !p.recurring
        }) {
            tracing::info!(
                "Reusing price {} ({} {})",
                price.id,
                price.unit_amount,
                price.currency
            );
            return Ok(price);
        }

        let price = self
            .gateway
            .create_price(&product.id, TARGET_CURRENCY, spec.unit_amount)
            .await?;
        tracing::info!("Created price {} ({} {})", price.id, spec.unit_amount, TARGET_CURRENCY);
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGateway;

    fn guide_spec() -> ProductSpec {
        ProductSpec {
            name: "AGA Complete Roadmap (PDF)".into(),
            sku: "aga_guide".into(),
            unit_amount: 1480,
        }
    }

    #[tokio::test]
    async fn test_two_runs_reuse_product_and_price_but_not_link() {
        let gateway = Arc::new(MockGateway::new());
        let provisioner = Provisioner::new(gateway.clone(), "https://example.com/thanks");

        let first = provisioner.ensure_payment_link(&guide_spec()).await.unwrap();
        let second = provisioner.ensure_payment_link(&guide_spec()).await.unwrap();

        assert_eq!(first.product.id, second.product.id);
        assert_eq!(first.price.id, second.price.id);
        assert_ne!(first.link.id, second.link.id);
        assert_eq!(gateway.product_count(), 1);
        assert_eq!(gateway.price_count(), 1);
        assert_eq!(gateway.link_count(), 2);
    }

    #[tokio::test]
    async fn test_amount_change_creates_new_price_then_reuses_it() {
        let gateway = Arc::new(MockGateway::new());
        let provisioner = Provisioner::new(gateway.clone(), "https://example.com/thanks");

        provisioner.ensure_payment_link(&guide_spec()).await.unwrap();

        let mut raised = guide_spec();
        raised.unit_amount = 1980;
        let second = provisioner.ensure_payment_link(&raised).await.unwrap();
        let third = provisioner.ensure_payment_link(&raised).await.unwrap();

        assert_eq!(gateway.price_count(), 2);
        assert_eq!(second.price.id, third.price.id);
        assert_eq!(second.price.unit_amount, 1980);
    }

    #[tokio::test]
    async fn test_recurring_and_wrong_currency_prices_are_ignored() {
        let gateway = Arc::new(MockGateway::new());
        let provisioner = Provisioner::new(gateway.clone(), "https://example.com/thanks");

        let product = gateway.create_product("Guide", "aga_guide").await.unwrap();
        gateway.seed_price(&product.id, "usd", 1480, false);
        gateway.seed_price(&product.id, "jpy", 1480, true);

        let out = provisioner.ensure_payment_link(&guide_spec()).await.unwrap();
        assert_eq!(out.price.currency, "jpy");
        assert!(!out.price.recurring);
        // The two seeded prices did not match, so a third was created.
        assert_eq!(gateway.price_count(), 3);
    }

    #[tokio::test]
    async fn test_fail_open_search_outage_creates_duplicate_product() {
        let gateway = Arc::new(MockGateway::with_failing_search());
        let provisioner = Provisioner::new(gateway.clone(), "https://example.com/thanks");

        provisioner.ensure_payment_link(&guide_spec()).await.unwrap();
        provisioner.ensure_payment_link(&guide_spec()).await.unwrap();

        // Fail-open: every run creates a product when search is down.
        assert_eq!(gateway.product_count(), 2);
    }

    #[tokio::test]
    async fn test_fail_closed_aborts_on_search_outage() {
        let gateway = Arc::new(MockGateway::with_failing_search());
        let provisioner = Provisioner::new(gateway.clone(), "https://example.com/thanks")
            .with_policy(LookupPolicy::FailClosed);

        let err = provisioner.ensure_payment_link(&guide_spec()).await.unwrap_err();
        assert!(matches!(err, PaymentError::LookupFailed(_)));
        assert_eq!(gateway.product_count(), 0);
    }

    #[tokio::test]
    async fn test_redirect_url_carries_session_placeholder_and_sku() {
        let gateway = Arc::new(MockGateway::new());
        let provisioner = Provisioner::new(gateway.clone(), "https://example.com/thanks");

        let out = provisioner.ensure_payment_link(&guide_spec()).await.unwrap();
        assert!(out.link.url.contains("session_id={CHECKOUT_SESSION_ID}"));
        assert!(out.link.url.contains("sku=aga_guide"));
    }
}
