//! Application State

use std::sync::Arc;

use funnel_core::config::{PaymentLinkTable, PricingConfig};
use funnel_core::outreach::PushNotifier;
use funnel_core::store::LeadStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Lead store (Notion in production)
    pub store: Arc<dyn LeadStore>,

    /// Operator notification channel (LINE in production)
    pub notifier: Arc<dyn PushNotifier>,

    /// Static product-code → payment-link mapping
    pub links: Arc<PaymentLinkTable>,

    /// Unit amounts per product
    pub pricing: PricingConfig,
}
