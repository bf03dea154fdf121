//! # funnel-runtime
//!
//! Production implementations of the `funnel-core` seams:
//!
//! - [`NotionLeadStore`] — leads as rows in a Notion database,
//! - [`LineNotifier`] — operator pushes over the LINE Messaging API,
//! - [`ResendMailer`] — transactional email over Resend.
//!
//! All three are plain `reqwest` clients with no retry policy; errors map
//! into the corresponding `FunnelError` variants and propagate to callers.

mod line;
mod notion;
mod resend;

pub use line::LineNotifier;
pub use notion::NotionLeadStore;
pub use resend::ResendMailer;
