//! LINE Notifier
//!
//! [`PushNotifier`] over the LINE Messaging API. One push call per configured
//! recipient; a recipient failure is logged and does not stop the rest. The
//! push as a whole only errors when no recipient could be reached.

use async_trait::async_trait;
use serde_json::{Value, json};

use funnel_core::config::LineConfig;
use funnel_core::error::{FunnelError, Result};
use funnel_core::outreach::PushNotifier;

const LINE_PUSH_URL: &str = "https://api.line.me/v2/bot/message/push";

/// LINE Messaging API notifier
pub struct LineNotifier {
    http: reqwest::Client,
    config: LineConfig,
}

impl LineNotifier {
    pub fn new(config: LineConfig) -> Self {
        Self { http: reqwest::Client::new(), config }
    }

    async fn push_to(&self, user_id: &str, text: &str) -> Result<()> {
        let resp = self
            .http
            .post(LINE_PUSH_URL)
            .bearer_auth(&self.config.channel_token)
            .json(&push_payload(user_id, text))
            .send()
            .await
            .map_err(|e| FunnelError::Notify(format!("push request failed: {}", e)))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(FunnelError::Notify(format!("push rejected: {} {}", status, body)));
        }
        tracing::info!("Sent LINE message to {}", user_id);
        Ok(())
    }
}

#[async_trait]
impl PushNotifier for LineNotifier {
    async fn push(&self, text: &str) -> Result<()> {
        let mut delivered = 0usize;
        let mut last_error = None;
        for user_id in &self.config.recipients {
            match self.push_to(user_id, text).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::error!("LINE push to {} failed: {}", user_id, e);
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) if delivered == 0 => Err(e),
            _ => Ok(()),
        }
    }
}

/// LINE push-message wire payload
fn push_payload(to: &str, text: &str) -> Value {
    json!({
        "to": to,
        "messages": [{"type": "text", "text": text}],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_payload_wire_format() {
        let payload = push_payload("U12345", "New lead registered");
        assert_eq!(payload["to"], "U12345");
        assert_eq!(payload["messages"][0]["type"], "text");
        assert_eq!(payload["messages"][0]["text"], "New lead registered");
        assert_eq!(payload["messages"].as_array().unwrap().len(), 1);
    }
}
