//! Resend Mailer
//!
//! [`Mailer`] over the Resend transactional email API. Single send call with
//! the fixed configured sender; no retries.

use async_trait::async_trait;
use serde_json::{Value, json};

use funnel_core::config::ResendConfig;
use funnel_core::error::{FunnelError, Result};
use funnel_core::outreach::Mailer;

const RESEND_SEND_URL: &str = "https://api.resend.com/emails";

/// Resend-backed mailer
pub struct ResendMailer {
    http: reqwest::Client,
    config: ResendConfig,
}

impl ResendMailer {
    pub fn new(config: ResendConfig) -> Self {
        Self { http: reqwest::Client::new(), config }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        let resp = self
            .http
            .post(RESEND_SEND_URL)
            .bearer_auth(&self.config.api_key)
            .json(&send_payload(&self.config.from_address, to, subject, html))
            .send()
            .await
            .map_err(|e| FunnelError::Mail(format!("send request failed: {}", e)))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(FunnelError::Mail(format!("send rejected: {} {}", status, body)));
        }
        tracing::info!("Sent email to {}", to);
        Ok(())
    }
}

/// Resend send-email wire payload
fn send_payload(from: &str, to: &str, subject: &str, html: &str) -> Value {
    json!({
        "from": from,
        "to": [to],
        "subject": subject,
        "html": html,
    })
}
