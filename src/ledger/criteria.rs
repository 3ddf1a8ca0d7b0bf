use chrono::NaiveDate;

use super::invoice::{trim_client_id, Invoice};
use crate::config::Config;
use crate::error::{DunningError, Result};

/// Immutable filter over the ledger. The fixed predicates (excluded types,
/// collective, pending flag) come from config and cannot be bypassed; the
/// optional predicates narrow further. Every reader of the ledger takes a
/// `Criteria` value, so the dashboard and the export can never disagree on
/// what "the same report" means.
#[derive(Debug, Clone)]
pub struct Criteria {
    excluded_types: Vec<String>,
    collective: String,
    companies: Vec<String>,
    client: Option<String>,
    due_from: Option<NaiveDate>,
    due_to: Option<NaiveDate>,
    reclamation_level: Option<u32>,
    overdue_before: Option<NaiveDate>,
}

impl Criteria {
    /// The only way to obtain the fixed predicates.
    pub fn for_config(config: &Config) -> Self {
        Self {
            excluded_types: config.filters.excluded_types.clone(),
            collective: config.filters.collective.clone(),
            companies: Vec::new(),
            client: None,
            due_from: None,
            due_to: None,
            reclamation_level: None,
            overdue_before: None,
        }
    }

    /// Restrict to one company code. May be called repeatedly to widen the set.
    pub fn company(mut self, code: impl Into<String>) -> Self {
        self.companies.push(code.into());
        self
    }

    pub fn client(mut self, id: impl Into<String>) -> Self {
        self.client = Some(id.into());
        self
    }

    /// Inclusive due-date range. Rejected before any query runs if inverted.
    pub fn due_between(
        mut self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Self> {
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(DunningError::InvalidDateRange { from: f, to: t });
            }
        }
        self.due_from = from;
        self.due_to = to;
        Ok(self)
    }

    pub fn reclamation_level(mut self, level: u32) -> Self {
        self.reclamation_level = Some(level);
        self
    }

    /// Keep only invoices already past due on the given date.
    pub fn overdue_as_of(mut self, today: NaiveDate) -> Self {
        self.overdue_before = Some(today);
        self
    }

    pub fn matches(&self, invoice: &Invoice) -> bool {
        if self.excluded_types.iter().any(|t| *t == invoice.invoice_type) {
            return false;
        }
        if invoice.collective != self.collective {
            return false;
        }
        if invoice.pending != Some(true) {
            return false;
        }
        if !self.companies.is_empty() && !self.companies.iter().any(|c| *c == invoice.company) {
            return false;
        }
        if let Some(client) = &self.client {
            if trim_client_id(client) != trim_client_id(&invoice.client) {
                return false;
            }
        }
        if let Some(from) = self.due_from {
            if invoice.due_date < from {
                return false;
            }
        }
        if let Some(to) = self.due_to {
            if invoice.due_date > to {
                return false;
            }
        }
        if let Some(level) = self.reclamation_level {
            if invoice.reclamation_level != Some(level) {
                return false;
            }
        }
        if let Some(today) = self.overdue_before {
            if invoice.due_date >= today {
                return false;
            }
        }
        true
    }
}
