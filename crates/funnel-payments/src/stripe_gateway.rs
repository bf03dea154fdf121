//! Stripe Gateway
//!
//! [`PaymentsGateway`] implementation over the Stripe API.
//!
//! Product lookup uses the search endpoint with a metadata query; search
//! failures surface as the distinguished `LookupFailed` variant so the
//! provisioner's policy decides what happens next. Price listing follows
//! pagination cursors until exhausted rather than trusting one page.

use async_trait::async_trait;
use std::collections::HashMap;
use std::str::FromStr;
use stripe::{
    Client, CreatePaymentLink, CreatePaymentLinkAfterCompletion,
    CreatePaymentLinkAfterCompletionRedirect, CreatePaymentLinkAfterCompletionType,
    CreatePaymentLinkLineItems, CreatePrice, CreateProduct, Currency, IdOrCreate, ListPrices,
    PaymentLink, Price, PriceId, Product, ProductSearchParams,
};

use crate::error::{PaymentError, Result};
use crate::gateway::{PaymentLinkRecord, PaymentsGateway, PriceRecord, ProductRecord};

/// Page size for price listing; cursors continue past it
const PRICE_PAGE_SIZE: u64 = 100;

/// Stripe-backed payments gateway
pub struct StripeGateway {
    client: Client,
}

impl StripeGateway {
    /// Create a new gateway with the given secret key
    pub fn new(secret_key: &str) -> Self {
        Self { client: Client::new(secret_key) }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .map_err(|_| PaymentError::Config("STRIPE_SECRET_KEY not set".into()))?;
        Ok(Self::new(&secret_key))
    }

    fn currency(code: &str) -> Result<Currency> {
        Currency::from_str(code)
            .map_err(|e| PaymentError::Config(format!("unknown currency {}: {}", code, e)))
    }

    fn price_record(price: Price) -> PriceRecord {
        PriceRecord {
            id: price.id.to_string(),
            currency: price.currency.map(|c| c.to_string()).unwrap_or_default(),
            unit_amount: price.unit_amount.unwrap_or_default(),
            recurring: price.recurring.is_some(),
        }
    }

    fn product_record(product: Product) -> ProductRecord {
        ProductRecord {
            id: product.id.to_string(),
            name: product.name.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl PaymentsGateway for StripeGateway {
    async fn find_product_by_sku(&self, sku: &str) -> Result<Option<ProductRecord>> {
        let mut params = ProductSearchParams::new();
        params.query = format!("active:'true' AND metadata['sku']:'{}'", sku);
        params.limit = Some(1);
        let found = Product::search(&self.client, params)
            .await
            .map_err(|e| PaymentError::LookupFailed(e.to_string()))?;
        Ok(found.data.into_iter().next().map(Self::product_record))
    }

    async fn create_product(&self, name: &str, sku: &str) -> Result<ProductRecord> {
        let mut params = CreateProduct::new(name);
        params.metadata = Some(HashMap::from([("sku".to_string(), sku.to_string())]));
        let product = Product::create(&self.client, params)
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))?;
        Ok(Self::product_record(product))
    }

    async fn list_active_prices(&self, product_id: &str) -> Result<Vec<PriceRecord>> {
        let mut out = Vec::new();
        let mut cursor: Option<PriceId> = None;
        loop {
            let mut params = ListPrices::new();
            params.active = Some(true);
            params.product = Some(IdOrCreate::Id(product_id));
            params.limit = Some(PRICE_PAGE_SIZE);
            params.starting_after = cursor.take();

            let page = Price::list(&self.client, &params)
                .await
                .map_err(|e| PaymentError::Stripe(e.to_string()))?;
            let has_more = page.has_more;
            cursor = page.data.last().map(|p| p.id.clone());
            out.extend(page.data.into_iter().map(Self::price_record));
            if !has_more || cursor.is_none() {
                break;
            }
        }
        Ok(out)
    }

    async fn create_price(
        &self,
        product_id: &str,
        currency: &str,
        unit_amount: i64,
    ) -> Result<PriceRecord> {
        let mut params = CreatePrice::new(Self::currency(currency)?);
        params.product = Some(IdOrCreate::Id(product_id));
        params.unit_amount = Some(unit_amount);
        let price = Price::create(&self.client, params)
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))?;
        Ok(Self::price_record(price))
    }

    async fn create_payment_link(
        &self,
        price_id: &str,
        redirect_url: &str,
        sku: &str,
    ) -> Result<PaymentLinkRecord> {
        let mut params = CreatePaymentLink::new(vec![CreatePaymentLinkLineItems {
            price: price_id.to_string(),
            quantity: 1,
            ..Default::default()
        }]);
        params.after_completion = Some(CreatePaymentLinkAfterCompletion {
            hosted_confirmation: None,
            redirect: Some(CreatePaymentLinkAfterCompletionRedirect {
                url: redirect_url.to_string(),
            }),
            type_: CreatePaymentLinkAfterCompletionType::Redirect,
        });
        params.metadata = Some(HashMap::from([("sku".to_string(), sku.to_string())]));

        let link = PaymentLink::create(&self.client, params)
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))?;
        Ok(PaymentLinkRecord { id: link.id.to_string(), url: link.url })
    }
}
