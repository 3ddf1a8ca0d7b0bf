use log::warn;

use super::action::FollowUpAction;
use super::channel::{DeliveryChannel, MailChannel, Reminder, WebhookChannel};
use crate::config::NotifierSettings;
use crate::error::{DunningError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    Ok,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overall {
    Sent,
    PartiallySent,
    Failed,
}

#[derive(Debug)]
pub struct DispatchResult {
    pub outcomes: Vec<(&'static str, ChannelOutcome)>,
    pub overall: Overall,
    primary_ok: bool,
}

impl DispatchResult {
    /// Whether the action may be marked sent: the primary channel got the
    /// reminder out, whatever the best-effort channels did.
    pub fn should_mark_sent(&self) -> bool {
        self.primary_ok
    }
}

/// Fans a reminder out to every configured channel. The first channel is the
/// primary one; the rest are best-effort.
pub struct Dispatcher {
    channels: Vec<Box<dyn DeliveryChannel>>,
}

impl Dispatcher {
    pub fn new(channels: Vec<Box<dyn DeliveryChannel>>) -> Result<Self> {
        if channels.is_empty() {
            return Err(DunningError::NoChannels);
        }
        Ok(Self { channels })
    }

    /// Mail first (primary), then the chat webhook.
    pub fn from_settings(settings: &NotifierSettings) -> Result<Self> {
        let mut channels: Vec<Box<dyn DeliveryChannel>> = Vec::new();
        if let Some(mail) = &settings.mail {
            channels.push(Box::new(MailChannel::new(mail.clone(), settings.timeout_secs)));
        }
        if let Some(webhook) = &settings.webhook {
            channels.push(Box::new(WebhookChannel::new(
                webhook.clone(),
                settings.timeout_secs,
            )));
        }
        Self::new(channels)
    }

    /// Attempt every channel independently; one channel failing never stops
    /// the others from being tried.
    pub fn dispatch(&self, reminder: &Reminder) -> DispatchResult {
        let mut outcomes = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            let outcome = match channel.deliver(reminder) {
                Ok(()) => ChannelOutcome::Ok,
                Err(reason) => {
                    warn!("{} delivery failed: {reason}", channel.name());
                    ChannelOutcome::Failed(reason)
                }
            };
            outcomes.push((channel.name(), outcome));
        }

        let ok_count = outcomes
            .iter()
            .filter(|(_, o)| *o == ChannelOutcome::Ok)
            .count();
        let overall = if ok_count == outcomes.len() {
            Overall::Sent
        } else if ok_count > 0 {
            Overall::PartiallySent
        } else {
            Overall::Failed
        };
        let primary_ok = outcomes
            .first()
            .map(|(_, o)| *o == ChannelOutcome::Ok)
            .unwrap_or(false);

        DispatchResult {
            outcomes,
            overall,
            primary_ok,
        }
    }
}

/// Compose the reminder text for an action. Mirrors the reminder mail the
/// consultants receive: the action kind is the instructed channel, the
/// invoice reference identifies the ledger line.
pub fn compose(action: &FollowUpAction, client_name: Option<&str>) -> Reminder {
    let subject = format!(
        "[Dunning] Action ({}) - Client {}",
        action.kind, action.client
    );

    let client_line = match client_name {
        Some(name) => format!("{} ({})", name, action.client),
        None => format!("Client {}", action.client),
    };

    let mut lines = vec![
        "A scheduled follow-up action is due.".to_string(),
        String::new(),
        format!("- Action kind (channel): {}", action.kind),
        format!("- Client: {client_line}"),
        format!("- Invoice reference: {}", action.reference()),
        format!(
            "- Description: {}",
            action.description.as_deref().unwrap_or("(none)")
        ),
    ];
    if let Some(remind_at) = action.remind_at {
        lines.push(format!("- Reminder set for: {remind_at}"));
    }
    lines.push(format!(
        "- Registered by: {} on {}",
        action.author.as_deref().unwrap_or("system"),
        action.created_at
    ));

    Reminder {
        subject,
        body: lines.join("\n"),
    }
}
