//! Mock Payments Gateway
//!
//! In-memory gateway for provisioning tests. Assigns sequential ids and can
//! simulate a failing product search.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::{PaymentError, Result};
use crate::gateway::{PaymentLinkRecord, PaymentsGateway, PriceRecord, ProductRecord};

#[derive(Default)]
struct State {
    products: Vec<(String, ProductRecord)>, // (sku, record)
    prices: Vec<(String, PriceRecord)>,     // (product_id, record)
    links: Vec<PaymentLinkRecord>,
    next_id: u64,
}

/// Mock gateway with in-memory account state
#[derive(Default)]
pub struct MockGateway {
    state: Mutex<State>,
    fail_search: bool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose product search always fails (simulated outage)
    pub fn with_failing_search() -> Self {
        Self { state: Mutex::new(State::default()), fail_search: true }
    }

    pub fn product_count(&self) -> usize {
        self.state.lock().expect("lock poisoned").products.len()
    }

    pub fn price_count(&self) -> usize {
        self.state.lock().expect("lock poisoned").prices.len()
    }

    pub fn link_count(&self) -> usize {
        self.state.lock().expect("lock poisoned").links.len()
    }

    /// Seed an existing price on a product (tests)
    pub fn seed_price(&self, product_id: &str, currency: &str, unit_amount: i64, recurring: bool) {
        let mut state = self.state.lock().expect("lock poisoned");
        let record = PriceRecord {
            id: Self::next(&mut state, "price"),
            currency: currency.to_string(),
            unit_amount,
            recurring,
        };
        state.prices.push((product_id.to_string(), record));
    }

    fn next(state: &mut State, prefix: &str) -> String {
        state.next_id += 1;
        format!("{}_{}", prefix, state.next_id)
    }
}

#[async_trait]
impl PaymentsGateway for MockGateway {
    async fn find_product_by_sku(&self, sku: &str) -> Result<Option<ProductRecord>> {
        if self.fail_search {
            return Err(PaymentError::LookupFailed("search unavailable".into()));
        }
        let state = self.state.lock().expect("lock poisoned");
        Ok(state
            .products
            .iter()
            .find(|(s, _)| s == sku)
            .map(|(_, record)| record.clone()))
    }

    async fn create_product(&self, name: &str, sku: &str) -> Result<ProductRecord> {
        let mut state = self.state.lock().expect("lock poisoned");
        let record = ProductRecord {
            id: Self::next(&mut state, "prod"),
            name: name.to_string(),
        };
        state.products.push((sku.to_string(), record.clone()));
        Ok(record)
    }

    async fn list_active_prices(&self, product_id: &str) -> Result<Vec<PriceRecord>> {
        let state = self.state.lock().expect("lock poisoned");
        Ok(state
            .prices
            .iter()
            .filter(|(pid, _)| pid == product_id)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn create_price(
        &self,
        product_id: &str,
        currency: &str,
        unit_amount: i64,
    ) -> Result<PriceRecord> {
        let mut state = self.state.lock().expect("lock poisoned");
        let record = PriceRecord {
            id: Self::next(&mut state, "price"),
            currency: currency.to_string(),
            unit_amount,
            recurring: false,
        };
        state.prices.push((product_id.to_string(), record.clone()));
        Ok(record)
    }

    async fn create_payment_link(
        &self,
        price_id: &str,
        redirect_url: &str,
        _sku: &str,
    ) -> Result<PaymentLinkRecord> {
        let mut state = self.state.lock().expect("lock poisoned");
        let id = Self::next(&mut state, "plink");
        let record = PaymentLinkRecord {
            url: format!(
                "https://buy.stripe.test/{}?price={}&redirect={}",
                id, price_id, redirect_url
            ),
            id,
        };
        state.links.push(record.clone());
        Ok(record)
    }
}
