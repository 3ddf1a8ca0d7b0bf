use serde::Serialize;
use std::collections::HashMap;

use super::aggregate::aggregate;
use crate::config::{Client, StatsSettings};
use crate::ledger::{trim_client_id, Invoice, Status};

/// One row of the top-debtors list: a client-level aggregate enriched with
/// master data where available.
#[derive(Debug, Serialize, Clone)]
pub struct TopCompanyLine {
    pub client: String,
    pub name: Option<String>,
    pub invoices: usize,
    pub amount: f64,
    pub worst_status: Status,
}

/// Dashboard snapshot. "Companies" here are the debtor companies (clients),
/// not the group's legal entities. Every numeric field derives from one
/// aggregation pass over one filtered invoice set.
#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub total_companies_pending: usize,
    pub total_invoices_pending: usize,
    pub total_amount_owed: f64,
    pub top_companies: Vec<TopCompanyLine>,
    pub most_overdue: Vec<Invoice>,
}

/// Assemble the snapshot from an already-filtered invoice set. `invoices`
/// must arrive sorted most overdue first (the ledger scan order); the
/// overdue page reuses it as-is.
pub fn assemble(
    invoices: &[Invoice],
    clients: &HashMap<String, Client>,
    settings: &StatsSettings,
) -> Snapshot {
    let agg = aggregate(invoices);

    let top_companies = agg
        .clients_by_amount()
        .into_iter()
        .take(settings.top_clients)
        .map(|c| TopCompanyLine {
            client: c.client.clone(),
            name: clients
                .get(trim_client_id(&c.client))
                .map(|cl| cl.name.clone()),
            invoices: c.invoices,
            amount: c.amount,
            worst_status: c.worst_status,
        })
        .collect();

    let most_overdue = invoices
        .iter()
        .take(settings.overdue_page_size)
        .cloned()
        .collect();

    Snapshot {
        total_companies_pending: agg.grand.clients,
        total_invoices_pending: invoices.len(),
        total_amount_owed: agg.grand.amount,
        top_companies,
        most_overdue,
    }
}
