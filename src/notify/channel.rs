use std::time::Duration;
use ureq::Agent;

use crate::config::{MailSettings, WebhookSettings};

/// A composed reminder, ready for any channel.
#[derive(Debug, Clone)]
pub struct Reminder {
    pub subject: String,
    pub body: String,
}

/// One best-effort delivery channel. Failures are reported as a reason
/// string and never panic; the dispatcher records them per channel.
pub trait DeliveryChannel {
    fn name(&self) -> &'static str;
    fn deliver(&self, reminder: &Reminder) -> Result<(), String>;
}

fn agent_with_timeout(timeout_secs: u64) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(timeout_secs)))
        .build()
        .into()
}

/// Mail delivery through an HTTP relay gateway. The gateway owns SMTP; this
/// channel hands it (from, to, subject, body) and treats anything but a 2xx
/// within the timeout as a failure.
pub struct MailChannel {
    settings: MailSettings,
    agent: Agent,
}

impl MailChannel {
    pub fn new(settings: MailSettings, timeout_secs: u64) -> Self {
        Self {
            settings,
            agent: agent_with_timeout(timeout_secs),
        }
    }
}

impl DeliveryChannel for MailChannel {
    fn name(&self) -> &'static str {
        "mail"
    }

    fn deliver(&self, reminder: &Reminder) -> Result<(), String> {
        let payload = serde_json::json!({
            "from": self.settings.from,
            "to": self.settings.to,
            "subject": reminder.subject,
            "body": reminder.body,
        });

        self.agent
            .post(self.settings.gateway_url.as_str())
            .header("content-type", "application/json")
            .send(payload.to_string().as_str())
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// Chat webhook delivery (Teams-style incoming webhook).
pub struct WebhookChannel {
    settings: WebhookSettings,
    agent: Agent,
}

impl WebhookChannel {
    pub fn new(settings: WebhookSettings, timeout_secs: u64) -> Self {
        Self {
            settings,
            agent: agent_with_timeout(timeout_secs),
        }
    }
}

impl DeliveryChannel for WebhookChannel {
    fn name(&self) -> &'static str {
        "webhook"
    }

    fn deliver(&self, reminder: &Reminder) -> Result<(), String> {
        let payload = serde_json::json!({
            "text": format!("{}\n\n{}", reminder.subject, reminder.body),
        });

        self.agent
            .post(self.settings.url.as_str())
            .header("content-type", "application/json")
            .send(payload.to_string().as_str())
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}
