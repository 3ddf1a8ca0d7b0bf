use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A scheduled commercial follow-up action tied to a client and one of its
/// invoices. Created elsewhere; this system only ever flips the sent flag.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FollowUpAction {
    pub id: u64,
    pub client: String,
    #[serde(rename = "type")]
    pub invoice_type: String,
    pub entry: String,
    /// Free-form channel instruction: "Email", "Llamada", "Teams", ...
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Absent means no reminder was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remind_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub sent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<NaiveDateTime>,
}

impl FollowUpAction {
    pub fn due(&self, now: NaiveDateTime) -> bool {
        !self.sent && self.remind_at.map_or(false, |t| t <= now)
    }

    pub fn reference(&self) -> String {
        format!("{}-{}", self.invoice_type, self.entry)
    }
}

/// Read-only due scan: reminder set, elapsed, not yet sent. Mutation is the
/// dispatcher's side, so a scan doubles as a dry run.
pub fn scan_due(actions: &[FollowUpAction], now: NaiveDateTime) -> Vec<FollowUpAction> {
    actions.iter().filter(|a| a.due(now)).cloned().collect()
}
