use std::cmp::Ordering;
use std::collections::HashMap;

use crate::ledger::{Invoice, Status};

/// Per-client rollup: invoice count, outstanding sum, most severe status.
#[derive(Debug, Clone)]
pub struct ClientAggregate {
    pub client: String,
    pub invoices: usize,
    pub amount: f64,
    pub worst_status: Status,
}

/// Per-company rollup. Summing these double-counts clients that appear under
/// more than one company; the grand total never does.
#[derive(Debug, Clone)]
pub struct CompanyAggregate {
    pub company: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct GrandTotal {
    pub clients: usize,
    pub amount: f64,
}

#[derive(Debug)]
pub struct Aggregation {
    pub by_client: HashMap<String, ClientAggregate>,
    pub by_company: HashMap<String, CompanyAggregate>,
    pub grand: GrandTotal,
}

/// Single pass over an already-filtered invoice set. The grand total is the
/// sum over per-client aggregates, each client exactly once, regardless of
/// how many companies it has invoices under.
pub fn aggregate(invoices: &[Invoice]) -> Aggregation {
    let mut by_client: HashMap<String, ClientAggregate> = HashMap::new();
    let mut by_company: HashMap<String, CompanyAggregate> = HashMap::new();

    for invoice in invoices {
        let entry = by_client
            .entry(invoice.client.clone())
            .or_insert_with(|| ClientAggregate {
                client: invoice.client.clone(),
                invoices: 0,
                amount: 0.0,
                worst_status: Status::Green,
            });
        entry.invoices += 1;
        entry.amount += invoice.outstanding();
        entry.worst_status = entry.worst_status.max(invoice.status());

        let company = by_company
            .entry(invoice.company.clone())
            .or_insert_with(|| CompanyAggregate {
                company: invoice.company.clone(),
                amount: 0.0,
            });
        company.amount += invoice.outstanding();
    }

    let grand = GrandTotal {
        clients: by_client.len(),
        amount: by_client.values().map(|c| c.amount).sum(),
    };

    Aggregation {
        by_client,
        by_company,
        grand,
    }
}

/// Descending amount, ties by key ascending so rendered output is stable.
fn by_amount_desc(a_amount: f64, b_amount: f64, a_key: &str, b_key: &str) -> Ordering {
    b_amount
        .partial_cmp(&a_amount)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a_key.cmp(b_key))
}

impl Aggregation {
    pub fn clients_by_amount(&self) -> Vec<&ClientAggregate> {
        let mut sorted: Vec<&ClientAggregate> = self.by_client.values().collect();
        sorted.sort_by(|a, b| by_amount_desc(a.amount, b.amount, &a.client, &b.client));
        sorted
    }

    pub fn companies_by_amount(&self) -> Vec<&CompanyAggregate> {
        let mut sorted: Vec<&CompanyAggregate> = self.by_company.values().collect();
        sorted.sort_by(|a, b| by_amount_desc(a.amount, b.amount, &a.company, &b.company));
        sorted
    }
}
