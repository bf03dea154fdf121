//! Follow-up Engine
//!
//! Batch pass over uncontacted leads: send one templated email per lead and
//! set the contacted flag after a successful send. One lead's failure never
//! aborts the remainder of the batch; each failure is logged individually.
//!
//! The contacted flag is the only dedup gate. Send and flag update are two
//! uncoordinated calls, so a crash between them can produce one duplicate
//! email on the next run.

use chrono::Utc;
use std::sync::Arc;

use crate::error::Result;
use crate::lead::Lead;
use crate::outreach::Mailer;
use crate::store::LeadStore;

/// Fixed subject line for the follow-up email
pub const FOLLOWUP_SUBJECT: &str = "Thanks for your interest — your next step";

/// Outcome counts for one follow-up run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FollowUpSummary {
    /// Emails sent and flagged
    pub sent: usize,
    /// Leads skipped for lacking an email address
    pub skipped: usize,
    /// Leads whose send or flag update failed
    pub failed: usize,
}

/// Follow-up batch runner
pub struct FollowUp {
    store: Arc<dyn LeadStore>,
    mailer: Arc<dyn Mailer>,
}

impl FollowUp {
    pub fn new(store: Arc<dyn LeadStore>, mailer: Arc<dyn Mailer>) -> Self {
        Self { store, mailer }
    }

    /// Fetch every uncontacted lead and process each in turn.
    ///
    /// Only the initial store query can fail the run; per-lead errors are
    /// absorbed into the summary.
    pub async fn run(&self) -> Result<FollowUpSummary> {
        let leads = self.store.list_uncontacted().await?;
        tracing::info!("Fetched {} uncontacted leads", leads.len());

        let mut summary = FollowUpSummary::default();
        for lead in leads {
            let Some(email) = lead.email.clone() else {
                tracing::warn!("Skipping lead {} ({}): no email address", lead.id, lead.name);
                summary.skipped += 1;
                continue;
            };

            match self.contact(&lead, &email).await {
                Ok(()) => summary.sent += 1,
                Err(e) => {
                    tracing::error!("Follow-up for lead {} failed: {}", lead.id, e);
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            "Follow-up run complete: {} sent, {} skipped, {} failed",
            summary.sent,
            summary.skipped,
            summary.failed
        );
        Ok(summary)
    }

    async fn contact(&self, lead: &Lead, email: &str) -> Result<()> {
        self.mailer
            .send(email, FOLLOWUP_SUBJECT, &followup_body(&lead.name))
            .await?;
        // Flag immediately after the send succeeds so a later run will not
        // email this lead again.
        self.store.mark_contacted(&lead.id, Utc::now()).await?;
        tracing::info!("Contacted lead {} at {}", lead.id, email);
        Ok(())
    }
}

/// Name-interpolated HTML body for the follow-up email
pub fn followup_body(name: &str) -> String {
    format!(
        "<p>Hi {},</p>\
         <p>Thanks for reaching out. Your guide and checkout link are ready — \
         if anything is unclear, just reply to this email and we'll help you \
         pick the right next step.</p>\
         <p>— The team</p>",
        name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lead::{LeadStatus, PaymentStatus, ProductCode};
    use crate::outreach::RecordingMailer;
    use crate::store::MemoryLeadStore;
    use chrono::{Duration, Utc};

    fn lead(id: &str, email: Option<&str>, contacted: bool, offset_secs: i64) -> Lead {
        Lead {
            id: id.into(),
            name: format!("Lead {}", id),
            external_id: format!("ext-{}", id),
            email: email.map(Into::into),
            phone: None,
            product: ProductCode::Guide,
            price: 1480,
            expected_cvr: 0.05,
            status: LeadStatus::New,
            payment_status: PaymentStatus::Pending,
            payment_date: None,
            notes: String::new(),
            contacted,
            contacted_at: contacted.then(Utc::now),
            created_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[tokio::test]
    async fn test_sends_once_skips_no_email_never_recontacts() {
        let store = Arc::new(MemoryLeadStore::new());
        store.insert(lead("A", Some("a@example.com"), false, 0));
        store.insert(lead("B", None, false, 1));
        store.insert(lead("C", Some("c@example.com"), true, 2));
        let mailer = Arc::new(RecordingMailer::new());

        let summary = FollowUp::new(store.clone(), mailer.clone()).run().await.unwrap();

        assert_eq!(summary, FollowUpSummary { sent: 1, skipped: 1, failed: 0 });
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@example.com");
        assert_eq!(sent[0].subject, FOLLOWUP_SUBJECT);
        assert!(sent[0].html.contains("Lead A"));

        // A is now flagged; a second run contacts nobody.
        let again = FollowUp::new(store, mailer.clone()).run().await.unwrap();
        assert_eq!(again.sent, 0);
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_leaves_flag_unset_and_continues() {
        let store = Arc::new(MemoryLeadStore::new());
        store.insert(lead("A", Some("a@example.com"), false, 0));
        store.insert(lead("D", Some("d@example.com"), false, 1));
        let mailer = Arc::new(RecordingMailer::failing_for(["a@example.com"]));

        let summary = FollowUp::new(store.clone(), mailer.clone()).run().await.unwrap();

        assert_eq!(summary, FollowUpSummary { sent: 1, skipped: 0, failed: 1 });
        assert_eq!(mailer.sent()[0].to, "d@example.com");

        // A's flag stayed unset, so it remains eligible next run.
        let pending = store.list_uncontacted().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "A");
    }
}
