use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

use crate::config::{Client, Config};
use crate::error::DunningError;
use crate::ledger::{trim_client_id, Invoice, Status};

/// Balances within half a cent of zero count as settled.
const BALANCE_EPS: f64 = 0.005;

/// Per-invoice sign test applied before any aggregation. Positive: the
/// client owes the group; negative: the group owes the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceFilter {
    All,
    Positive,
    Negative,
}

impl BalanceFilter {
    pub fn admits(&self, invoice: &Invoice) -> bool {
        let balance = invoice.outstanding();
        match self {
            BalanceFilter::All => balance.abs() > BALANCE_EPS,
            BalanceFilter::Positive => balance > BALANCE_EPS,
            BalanceFilter::Negative => balance < -BALANCE_EPS,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BalanceFilter::All => "all",
            BalanceFilter::Positive => "positive",
            BalanceFilter::Negative => "negative",
        }
    }
}

impl FromStr for BalanceFilter {
    type Err = DunningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(BalanceFilter::All),
            "positive" => Ok(BalanceFilter::Positive),
            "negative" => Ok(BalanceFilter::Negative),
            other => Err(DunningError::InvalidBalanceFilter(other.to_string())),
        }
    }
}

/// One client line inside a company section. The same client reappears in
/// every section it has balances under.
#[derive(Debug, Serialize, Clone)]
pub struct ClientLine {
    pub client: String,
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub invoices: usize,
    pub amount: f64,
    pub worst_status: Status,
}

#[derive(Debug, Serialize)]
pub struct CompanySection {
    pub company: String,
    pub company_name: Option<String>,
    pub clients: Vec<ClientLine>,
    pub total: f64,
}

/// Deduped bottom line: each client exactly once, however many sections it
/// appears in.
#[derive(Debug, Serialize)]
pub struct ReportTotal {
    pub unique_clients: usize,
    pub total_amount: f64,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub generated_at: NaiveDateTime,
    pub balance: BalanceFilter,
    pub sections: Vec<CompanySection>,
    pub grand_total: ReportTotal,
}

/// Build the company-grouped report from the same filtered invoice set the
/// snapshot consumes. With `BalanceFilter::All` the grand total matches the
/// snapshot's owed amount to the cent: both are the per-client sum of one
/// aggregation pass.
pub fn build(
    invoices: &[Invoice],
    clients: &HashMap<String, Client>,
    config: &Config,
    balance: BalanceFilter,
    generated_at: NaiveDateTime,
) -> Report {
    let admitted: Vec<&Invoice> = invoices.iter().filter(|i| balance.admits(i)).collect();

    // Section accumulation keyed by (company, client); client totals for the
    // deduped grand total accumulate separately, scoped to this one call.
    let mut per_section: HashMap<(String, String), ClientLine> = HashMap::new();
    let mut per_client: HashMap<String, f64> = HashMap::new();

    for invoice in &admitted {
        let line = per_section
            .entry((invoice.company.clone(), invoice.client.clone()))
            .or_insert_with(|| ClientLine {
                client: invoice.client.clone(),
                name: None,
                tax_id: None,
                invoices: 0,
                amount: 0.0,
                worst_status: Status::Green,
            });
        line.invoices += 1;
        line.amount += invoice.outstanding();
        line.worst_status = line.worst_status.max(invoice.status());

        *per_client.entry(invoice.client.clone()).or_insert(0.0) += invoice.outstanding();
    }

    let mut sections: HashMap<String, CompanySection> = HashMap::new();
    for ((company, _), mut line) in per_section {
        if let Some(master) = clients.get(trim_client_id(&line.client)) {
            line.name = Some(master.name.clone());
            line.tax_id = master.tax_id.clone();
        }
        let section = sections
            .entry(company.clone())
            .or_insert_with(|| CompanySection {
                company_name: config.company_name(&company).map(str::to_string),
                company,
                clients: Vec::new(),
                total: 0.0,
            });
        section.total += line.amount;
        section.clients.push(line);
    }

    let mut sections: Vec<CompanySection> = sections.into_values().collect();
    for section in &mut sections {
        section.clients.sort_by(|a, b| {
            b.amount
                .partial_cmp(&a.amount)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.client.cmp(&b.client))
        });
    }
    sections.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.company.cmp(&b.company))
    });

    let grand_total = ReportTotal {
        unique_clients: per_client.len(),
        total_amount: per_client.values().sum(),
    };

    Report {
        generated_at,
        balance,
        sections,
        grand_total,
    }
}
