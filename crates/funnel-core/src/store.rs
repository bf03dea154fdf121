//! Lead Store
//!
//! Abstraction over the external document store holding lead rows.
//! The production implementation (Notion) lives in `funnel-runtime`;
//! [`MemoryLeadStore`] backs tests and demos.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::RwLock;

use crate::error::{FunnelError, Result};
use crate::lead::{Lead, LeadStatus, NewLead, PaymentStatus};

/// Document store seam for lead rows
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Create one lead row, returning the store-assigned id.
    ///
    /// No dedup is enforced: duplicate submissions create duplicate rows.
    async fn create(&self, lead: NewLead) -> Result<String>;

    /// All leads with the contacted flag unset, ordered by creation time
    /// ascending, fully accumulated across pages before returning.
    async fn list_uncontacted(&self) -> Result<Vec<Lead>>;

    /// Every lead in the store (for KPI reporting)
    async fn list_all(&self) -> Result<Vec<Lead>>;

    /// Set the contacted flag and timestamp on one lead
    async fn mark_contacted(&self, id: &str, at: DateTime<Utc>) -> Result<()>;
}

/// In-memory lead store for tests and demos
#[derive(Default)]
pub struct MemoryLeadStore {
    leads: RwLock<Vec<Lead>>,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing lead row (tests)
    pub fn insert(&self, lead: Lead) {
        self.leads.write().expect("lock poisoned").push(lead);
    }

    /// Snapshot of all rows (tests)
    pub fn snapshot(&self) -> Vec<Lead> {
        self.leads.read().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn create(&self, lead: NewLead) -> Result<String> {
        let mut leads = self.leads.write().expect("lock poisoned");
        let id = format!("mem-{}", leads.len() + 1);
        leads.push(Lead {
            id: id.clone(),
            name: lead.name,
            external_id: lead.external_id,
            email: lead.email,
            phone: lead.phone,
            product: lead.product,
            price: lead.price,
            expected_cvr: lead.expected_cvr,
            status: LeadStatus::New,
            payment_status: PaymentStatus::Pending,
            payment_date: None,
            notes: lead.notes,
            contacted: false,
            contacted_at: None,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_uncontacted(&self) -> Result<Vec<Lead>> {
        let mut out: Vec<Lead> = self
            .leads
            .read()
            .expect("lock poisoned")
            .iter()
            .filter(|l| !l.contacted)
            .cloned()
            .collect();
        out.sort_by_key(|l| l.created_at);
        Ok(out)
    }

    async fn list_all(&self) -> Result<Vec<Lead>> {
        Ok(self.snapshot())
    }

    async fn mark_contacted(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        let mut leads = self.leads.write().expect("lock poisoned");
        let lead = leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| FunnelError::Store(format!("no such lead: {}", id)))?;
        lead.contacted = true;
        lead.contacted_at = Some(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lead::ProductCode;

    fn sample_new_lead(external_id: &str) -> NewLead {
        NewLead::from_intake(
            Some("Taro".into()),
            external_id.into(),
            Some("taro@example.com".into()),
            None,
            ProductCode::Guide,
            1480,
            None,
        )
    }

    #[tokio::test]
    async fn test_create_and_mark_contacted() {
        let store = MemoryLeadStore::new();
        let id = store.create(sample_new_lead("ext-1")).await.unwrap();

        let pending = store.list_uncontacted().await.unwrap();
        assert_eq!(pending.len(), 1);

        store.mark_contacted(&id, Utc::now()).await.unwrap();
        assert!(store.list_uncontacted().await.unwrap().is_empty());

        let all = store.list_all().await.unwrap();
        assert!(all[0].contacted);
        assert!(all[0].contacted_at.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_external_ids_create_duplicate_rows() {
        let store = MemoryLeadStore::new();
        store.create(sample_new_lead("same")).await.unwrap();
        store.create(sample_new_lead("same")).await.unwrap();
        assert_eq!(store.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_mark_contacted_unknown_id_is_store_error() {
        let store = MemoryLeadStore::new();
        let err = store.mark_contacted("nope", Utc::now()).await.unwrap_err();
        assert!(matches!(err, FunnelError::Store(_)));
    }
}
