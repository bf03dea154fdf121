//! # funnel-payments
//!
//! Idempotent payment-link provisioning against Stripe.
//!
//! For each configured SKU the provisioner ensures a product, a price, and a
//! payment link exist, reusing anything already provisioned:
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────────┐
//! │   Product    │───▶│    Price     │───▶│   Payment Link   │
//! │ (by SKU in   │    │ (by currency │    │ (always created  │
//! │  metadata)   │    │  + amount)   │    │  fresh)          │
//! └──────────────┘    └──────────────┘    └──────────────────┘
//! ```
//!
//! Product and price resolution is idempotent; payment links are cheap and
//! never deduplicated — operators use the most recently printed link.
//!
//! The [`PaymentsGateway`] trait is the seam: [`StripeGateway`] talks to the
//! real API, [`MockGateway`] backs the provisioning tests.

mod error;
mod gateway;
mod mock;
mod provision;
mod stripe_gateway;

pub use error::{PaymentError, Result};
pub use gateway::{PaymentLinkRecord, PaymentsGateway, PriceRecord, ProductRecord};
pub use mock::MockGateway;
pub use provision::{
    LookupPolicy, ProductSpec, ProvisionedLink, Provisioner, TARGET_CURRENCY,
};
pub use stripe_gateway::StripeGateway;
