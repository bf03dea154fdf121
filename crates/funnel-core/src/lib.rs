//! # funnel-core
//!
//! Domain model and funnel logic for the lead-generation pipeline.
//!
//! The crate owns the `Lead` model, the typed configuration loaded once at
//! startup, and the seams the rest of the workspace plugs into:
//!
//! - [`LeadStore`] — the external document store holding leads,
//! - [`PushNotifier`] — operator chat notifications,
//! - [`Mailer`] — transactional email.
//!
//! Vendor implementations (Notion, LINE, Resend) live in `funnel-runtime`;
//! this crate ships in-memory/recording implementations for tests and demos.

pub mod config;
pub mod error;
pub mod followup;
pub mod kpi;
pub mod lead;
pub mod outreach;
pub mod store;

pub use config::{
    FunnelConfig, LineConfig, NotionConfig, PaymentLinkTable, PricingConfig, ResendConfig,
};
pub use error::{FunnelError, Result};
pub use followup::{FollowUp, FollowUpSummary};
pub use kpi::KpiReport;
pub use lead::{Lead, LeadStatus, NewLead, PaymentStatus, ProductCode};
pub use outreach::{Mailer, PushNotifier, RecordingMailer, RecordingNotifier};
pub use store::{LeadStore, MemoryLeadStore};
