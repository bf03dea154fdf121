//! Lead Model
//!
//! A `Lead` is a prospective customer captured from an intake form and tracked
//! through a sales lifecycle in the external document store. The process never
//! owns the record; this is the in-memory mirror of one store row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sellable products, keyed by SKU
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCode {
    /// Guide PDF purchase
    #[default]
    Guide,
    /// Deposit for a one-on-one consultation
    ConsultDeposit,
}

impl ProductCode {
    /// Stable SKU string, the dedup anchor for product/price provisioning
    pub fn sku(&self) -> &'static str {
        match self {
            ProductCode::Guide => "aga_guide",
            ProductCode::ConsultDeposit => "consult_deposit",
        }
    }

    /// Customer-facing product name
    pub fn display_name(&self) -> &'static str {
        match self {
            ProductCode::Guide => "AGA Complete Roadmap (PDF)",
            ProductCode::ConsultDeposit => "Consultation Deposit",
        }
    }

    /// Static expected conversion rate per product
    pub fn expected_cvr(&self) -> f64 {
        match self {
            ProductCode::Guide => 0.05,
            ProductCode::ConsultDeposit => 0.15,
        }
    }

    /// Parse a product code, defaulting to the guide for unknown input
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "consult_deposit" => ProductCode::ConsultDeposit,
            _ => ProductCode::Guide,
        }
    }
}

/// Sales lifecycle status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Interested,
    Purchased,
    Closed,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::Interested => "Interested",
            LeadStatus::Purchased => "Purchased",
            LeadStatus::Closed => "Closed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Contacted" => LeadStatus::Contacted,
            "Interested" => LeadStatus::Interested,
            "Purchased" => LeadStatus::Purchased,
            "Closed" => LeadStatus::Closed,
            _ => LeadStatus::New,
        }
    }
}

/// Payment status tracked alongside the lead
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Failed => "Failed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Completed" => PaymentStatus::Completed,
            "Failed" => PaymentStatus::Failed,
            _ => PaymentStatus::Pending,
        }
    }
}

/// A lead row as read back from the store
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lead {
    /// Store-assigned page/record id
    pub id: String,

    /// Display name
    pub name: String,

    /// External correlation id (advisory dedup key, not enforced)
    pub external_id: String,

    /// Email address, if the form provided one
    pub email: Option<String>,

    /// Phone number, if the form provided one
    pub phone: Option<String>,

    /// Product the lead asked about
    pub product: ProductCode,

    /// Price in minor currency units, derived from the product
    pub price: i64,

    /// Static expected conversion rate at capture time
    pub expected_cvr: f64,

    /// Sales lifecycle status
    pub status: LeadStatus,

    /// Payment status
    pub payment_status: PaymentStatus,

    /// When payment completed, if it did
    pub payment_date: Option<DateTime<Utc>>,

    /// Free-text notes
    pub notes: String,

    /// Dedup gate for the follow-up notifier
    pub contacted: bool,

    /// When the follow-up email went out
    pub contacted_at: Option<DateTime<Utc>>,

    /// Record creation time
    pub created_at: DateTime<Utc>,
}

impl Lead {
    /// Whether the follow-up notifier may email this lead
    pub fn awaiting_contact(&self) -> bool {
        !self.contacted
    }
}

/// Fields for a lead about to be written to the store
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewLead {
    pub name: String,
    pub external_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub product: ProductCode,
    pub price: i64,
    pub expected_cvr: f64,
    pub notes: String,
}

impl NewLead {
    /// Build a new lead for an intake submission, deriving price and CVR
    /// from the product code.
    pub fn from_intake(
        name: Option<String>,
        external_id: String,
        email: Option<String>,
        phone: Option<String>,
        product: ProductCode,
        price: i64,
        notes: Option<String>,
    ) -> Self {
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| external_id.clone());
        Self {
            name,
            external_id,
            email: email.filter(|e| !e.trim().is_empty()),
            phone: phone.filter(|p| !p.trim().is_empty()),
            product,
            price,
            expected_cvr: product.expected_cvr(),
            notes: notes.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_code_parse_defaults_to_guide() {
        assert_eq!(ProductCode::parse("consult_deposit"), ProductCode::ConsultDeposit);
        assert_eq!(ProductCode::parse("aga_guide"), ProductCode::Guide);
        assert_eq!(ProductCode::parse("nonsense"), ProductCode::Guide);
        assert_eq!(ProductCode::parse(""), ProductCode::Guide);
    }

    #[test]
    fn test_status_round_trip() {
        for s in [
            LeadStatus::New,
            LeadStatus::Contacted,
            LeadStatus::Interested,
            LeadStatus::Purchased,
            LeadStatus::Closed,
        ] {
            assert_eq!(LeadStatus::parse(s.as_str()), s);
        }
        assert_eq!(PaymentStatus::parse("Completed"), PaymentStatus::Completed);
        assert_eq!(PaymentStatus::parse("weird"), PaymentStatus::Pending);
    }

    #[test]
    fn test_new_lead_falls_back_to_external_id_for_name() {
        let lead = NewLead::from_intake(
            Some("  ".into()),
            "ext-123".into(),
            Some(String::new()),
            None,
            ProductCode::Guide,
            1480,
            None,
        );
        assert_eq!(lead.name, "ext-123");
        assert!(lead.email.is_none());
        assert_eq!(lead.expected_cvr, ProductCode::Guide.expected_cvr());
    }
}
