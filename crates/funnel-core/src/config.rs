//! Configuration
//!
//! All configuration comes from environment variables, read exactly once at
//! startup into typed structs and passed by parameter from there on. Missing
//! required variables fail fast with a named [`FunnelError::Config`] instead
//! of leaking absent values into API calls.

use crate::error::{FunnelError, Result};
use crate::lead::ProductCode;

/// Default guide price in JPY (zero-decimal: minor units == yen)
pub const DEFAULT_GUIDE_PRICE: i64 = 1480;

/// Default consultation deposit price in JPY
pub const DEFAULT_CONSULT_PRICE: i64 = 3000;

fn require(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(FunnelError::Config(format!("{} not set", name))),
    }
}

fn optional_i64(name: &'static str, default: i64) -> Result<i64> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .map_err(|_| FunnelError::Config(format!("{} is not a valid integer", name))),
        _ => Ok(default),
    }
}

/// Notion document store credentials
#[derive(Clone, Debug)]
pub struct NotionConfig {
    /// Integration token
    pub token: String,

    /// Database holding lead rows
    pub database_id: String,
}

impl NotionConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            token: require("NOTION_TOKEN")?,
            database_id: require("NOTION_DB_ID")?,
        })
    }
}

/// LINE Messaging API credentials and recipients
#[derive(Clone, Debug)]
pub struct LineConfig {
    /// Channel access token
    pub channel_token: String,

    /// Push recipients, deduplicated preserving order
    pub recipients: Vec<String>,
}

impl LineConfig {
    pub fn from_env() -> Result<Self> {
        let channel_token = require("LINE_BOT_TOKEN")?;
        let recipients = parse_recipients(&require("LINE_USER_ID")?);
        if recipients.is_empty() {
            return Err(FunnelError::Config("LINE_USER_ID has no usable ids".into()));
        }
        Ok(Self { channel_token, recipients })
    }
}

/// Split a comma-separated recipient list, dropping blanks and duplicates
/// while preserving first-seen order.
pub fn parse_recipients(raw: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !seen.iter().any(|s| s == id) {
            seen.push(id.to_string());
        }
    }
    seen
}

/// Resend transactional email credentials
#[derive(Clone, Debug)]
pub struct ResendConfig {
    /// API key
    pub api_key: String,

    /// Fixed sender address
    pub from_address: String,
}

impl ResendConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_key: require("RESEND_API_KEY")?,
            from_address: require("MAIL_FROM")?,
        })
    }
}

/// Unit amounts per product, in minor currency units
#[derive(Clone, Copy, Debug)]
pub struct PricingConfig {
    pub guide_amount: i64,
    pub consult_amount: i64,
}

impl PricingConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            guide_amount: optional_i64("GUIDE_PRICE", DEFAULT_GUIDE_PRICE)?,
            consult_amount: optional_i64("CONSULT_PRICE", DEFAULT_CONSULT_PRICE)?,
        })
    }

    pub fn amount_for(&self, product: ProductCode) -> i64 {
        match product {
            ProductCode::Guide => self.guide_amount,
            ProductCode::ConsultDeposit => self.consult_amount,
        }
    }
}

/// Pre-provisioned payment-link URLs, one per product.
///
/// The mapping is static: the intake endpoint never looks links up against
/// the payment processor, it serves whatever the provisioner run printed and
/// an operator copied here.
#[derive(Clone, Debug)]
pub struct PaymentLinkTable {
    pub guide_url: String,
    pub consult_url: String,
}

impl PaymentLinkTable {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            guide_url: require("GUIDE_PAYMENT_LINK")?,
            consult_url: require("CONSULT_PAYMENT_LINK")?,
        })
    }

    pub fn url_for(&self, product: ProductCode) -> &str {
        match product {
            ProductCode::Guide => &self.guide_url,
            ProductCode::ConsultDeposit => &self.consult_url,
        }
    }
}

/// Everything the intake server needs, validated eagerly
#[derive(Clone, Debug)]
pub struct FunnelConfig {
    pub notion: NotionConfig,
    pub line: LineConfig,
    pub links: PaymentLinkTable,
    pub pricing: PricingConfig,
    pub bind_addr: String,
}

impl FunnelConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            notion: NotionConfig::from_env()?,
            line: LineConfig::from_env()?,
            links: PaymentLinkTable::from_env()?,
            pricing: PricingConfig::from_env()?,
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recipients_dedups_preserving_order() {
        let ids = parse_recipients("U1, U2 ,U1,,U3");
        assert_eq!(ids, vec!["U1", "U2", "U3"]);
        assert!(parse_recipients("  , ,").is_empty());
    }

    #[test]
    fn test_link_table_selects_by_product() {
        let links = PaymentLinkTable {
            guide_url: "https://buy.stripe.com/guide".into(),
            consult_url: "https://buy.stripe.com/consult".into(),
        };
        assert_eq!(links.url_for(ProductCode::Guide), "https://buy.stripe.com/guide");
        assert_eq!(
            links.url_for(ProductCode::ConsultDeposit),
            "https://buy.stripe.com/consult"
        );
    }

    #[test]
    fn test_pricing_amount_for() {
        let pricing = PricingConfig { guide_amount: 1480, consult_amount: 3000 };
        assert_eq!(pricing.amount_for(ProductCode::Guide), 1480);
        assert_eq!(pricing.amount_for(ProductCode::ConsultDeposit), 3000);
    }
}
