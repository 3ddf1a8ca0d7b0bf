use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Traffic-light escalation status derived from the reclamation level.
/// Ordered by severity: Green < Yellow < Red.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Green,
    Yellow,
    Red,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Green => write!(f, "GREEN"),
            Status::Yellow => write!(f, "YELLOW"),
            Status::Red => write!(f, "RED"),
        }
    }
}

/// Map a reclamation level to its status. Total: absent levels count as
/// never-reclaimed.
pub fn classify(level: Option<u32>) -> Status {
    match level {
        Some(l) if l >= 3 => Status::Red,
        Some(2) => Status::Yellow,
        _ => Status::Green,
    }
}

/// One open accounts-receivable line, sourced read-only from the ledger.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Invoice {
    #[serde(rename = "type")]
    pub invoice_type: String,
    pub entry: String,
    pub company: String,
    pub plant: String,
    pub currency: String,
    pub collective: String,
    pub client: String,
    pub due_date: NaiveDate,
    pub payment_method: String,
    pub sign: i32,
    pub amount: f64,
    #[serde(default)]
    pub paid: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reclamation_level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reclamation_date: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<bool>,
}

impl Invoice {
    /// Outstanding balance. Positive: the client owes the group; negative:
    /// the group owes the client.
    pub fn outstanding(&self) -> f64 {
        self.amount - self.paid
    }

    pub fn status(&self) -> Status {
        classify(self.reclamation_level)
    }

    /// Ledger reference shown on reminders and reports, e.g. "FAC-SE0025001972".
    pub fn reference(&self) -> String {
        format!("{}-{}", self.invoice_type, self.entry)
    }
}

/// Client ids arrive zero-padded from the ledger ("00542") but the client
/// master is keyed by the trimmed form ("542").
pub fn trim_client_id(id: &str) -> &str {
    let trimmed = id.trim_start_matches('0');
    if trimmed.is_empty() {
        "0"
    } else {
        trimmed
    }
}
