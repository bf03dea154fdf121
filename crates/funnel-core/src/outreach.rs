//! Outreach Seams
//!
//! Traits for the two outbound side-effect channels: operator chat
//! notifications and transactional email. Production implementations (LINE,
//! Resend) live in `funnel-runtime`; the recording variants here back tests.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::{FunnelError, Result};

/// Operator push-notification channel
#[async_trait]
pub trait PushNotifier: Send + Sync {
    /// Deliver one plain-text message to every configured recipient
    async fn push(&self, text: &str) -> Result<()>;
}

/// Transactional email channel
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one HTML email
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()>;
}

/// Notifier that records pushed messages (tests and demos)
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every push fails
    pub fn failing() -> Self {
        Self { messages: Mutex::new(Vec::new()), fail: true }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl PushNotifier for RecordingNotifier {
    async fn push(&self, text: &str) -> Result<()> {
        if self.fail {
            return Err(FunnelError::Notify("push rejected".into()));
        }
        self.messages.lock().expect("lock poisoned").push(text.to_string());
        Ok(())
    }
}

/// One captured outbound email
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Mailer that records sends and can fail selected recipients (tests)
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    fail_for: Vec<String>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every send addressed to one of the given recipients
    pub fn failing_for(addresses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_for: addresses.into_iter().map(Into::into).collect(),
        }
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        if self.fail_for.iter().any(|a| a == to) {
            return Err(FunnelError::Mail(format!("send rejected for {}", to)));
        }
        self.sent.lock().expect("lock poisoned").push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        Ok(())
    }
}
