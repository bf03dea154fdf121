//! Payments Gateway
//!
//! Thin abstraction over the payment processor, narrowed to exactly the
//! calls provisioning needs. Records carry only the fields the upsert
//! algorithm inspects plus the ids/URLs operators copy out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A product held in the processor account
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
}

/// A price attached to a product
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub id: String,
    /// Lowercase ISO currency code
    pub currency: String,
    /// Amount in minor currency units
    pub unit_amount: i64,
    /// Whether the price carries recurring-billing configuration
    pub recurring: bool,
}

/// A hosted payment link
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLinkRecord {
    pub id: String,
    /// Public checkout URL
    pub url: String,
}

/// Payment processor seam (Strategy pattern)
#[async_trait]
pub trait PaymentsGateway: Send + Sync {
    /// Search active products for one whose metadata SKU equals `sku`.
    ///
    /// Returns `Ok(None)` when no product matches. A failure of the search
    /// call itself is the distinguished [`PaymentError::LookupFailed`], so
    /// callers can decide between fail-open and fail-closed.
    ///
    /// [`PaymentError::LookupFailed`]: crate::PaymentError::LookupFailed
    async fn find_product_by_sku(&self, sku: &str) -> Result<Option<ProductRecord>>;

    /// Create a product carrying the SKU in its metadata
    async fn create_product(&self, name: &str, sku: &str) -> Result<ProductRecord>;

    /// Every active price for the product, following pagination cursors
    /// until exhausted.
    async fn list_active_prices(&self, product_id: &str) -> Result<Vec<PriceRecord>>;

    /// Create a one-time price on the product
    async fn create_price(
        &self,
        product_id: &str,
        currency: &str,
        unit_amount: i64,
    ) -> Result<PriceRecord>;

    /// Create a payment link for one unit of the price, redirecting to
    /// `redirect_url` after completion and storing the SKU in metadata.
    async fn create_payment_link(
        &self,
        price_id: &str,
        redirect_url: &str,
        sku: &str,
    ) -> Result<PaymentLinkRecord>;
}
