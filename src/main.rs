mod config;
mod error;
mod ledger;
mod notify;
mod report;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

use crate::config::{
    config_dir, load_config, Config, ACTIONS_TEMPLATE, CLIENTS_TEMPLATE, CONFIG_TEMPLATE,
    INVOICES_TEMPLATE,
};
use crate::error::{DunningError, Result};
use crate::ledger::{trim_client_id, Criteria, Store};
use crate::notify::{run_once, scan_due, Dispatcher};
use crate::report::{aggregate, assemble, build, write_report_csv, BalanceFilter};

#[derive(Parser)]
#[command(name = "dunning")]
#[command(version, about = "CLI receivables dashboard and reminder system", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.dunning or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FilterArgs {
    /// Restrict to one company code from config.toml
    #[arg(long)]
    company: Option<String>,

    /// Restrict to one client id
    #[arg(long)]
    client: Option<String>,

    /// Due on or after this date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,

    /// Due on or before this date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,

    /// Exact reclamation level
    #[arg(long)]
    level: Option<u32>,

    /// Only invoices already past due
    #[arg(long)]
    overdue: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with template files
    Init,

    /// Show the pending-receivables dashboard snapshot
    Stats,

    /// List per-client aggregates (count, outstanding amount, status)
    Clients {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// List pending invoices with derived status
    Invoices {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Build the company-grouped report and export it as a spreadsheet
    Report {
        /// Balance filter: all, positive (client owes), negative (group owes)
        #[arg(long, default_value = "all")]
        balance: String,

        /// Custom output file path (default: <output_dir>/REPORT-<balance>-<date>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// List follow-up actions
    Actions {
        /// Only actions whose reminder has come due
        #[arg(long)]
        due: bool,

        /// Cut-off timestamp (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS, default: now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Dispatch reminders for due follow-up actions
    Notify {
        /// Cut-off timestamp (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS, default: now)
        #[arg(long)]
        at: Option<String>,

        /// List due actions without dispatching or marking anything
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Stats => cmd_stats(&cfg_dir),
        Commands::Clients { filter } => cmd_clients(&cfg_dir, &filter),
        Commands::Invoices { filter } => cmd_invoices(&cfg_dir, &filter),
        Commands::Report {
            balance,
            output,
            filter,
        } => cmd_report(&cfg_dir, &balance, output, &filter),
        Commands::Actions { due, at } => cmd_actions(&cfg_dir, due, at),
        Commands::Notify { at, dry_run } => cmd_notify(&cfg_dir, at, dry_run),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &PathBuf) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(DunningError::AlreadyInitialized(cfg_dir.clone()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;

    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    fs::write(cfg_dir.join("clients.toml"), CLIENTS_TEMPLATE)?;
    fs::write(cfg_dir.join("invoices.toml"), INVOICES_TEMPLATE)?;
    fs::write(cfg_dir.join("actions.toml"), ACTIONS_TEMPLATE)?;

    println!("Initialized dunning config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Review companies and filters:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!(
        "  2. Load your client master:       $EDITOR {}/clients.toml",
        cfg_dir.display()
    );
    println!(
        "  3. Point invoices.toml at your ledger export, then run: dunning stats"
    );

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct ClientAggRow {
    #[tabled(rename = "CLIENT")]
    client: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "INVOICES")]
    invoices: usize,
    #[tabled(rename = "OUTSTANDING")]
    outstanding: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "REFERENCE")]
    reference: String,
    #[tabled(rename = "COMPANY")]
    company: String,
    #[tabled(rename = "CLIENT")]
    client: String,
    #[tabled(rename = "DUE")]
    due: String,
    #[tabled(rename = "OUTSTANDING")]
    outstanding: String,
    #[tabled(rename = "LEVEL")]
    level: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

#[derive(Tabled)]
struct ActionRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "CLIENT")]
    client: String,
    #[tabled(rename = "REFERENCE")]
    reference: String,
    #[tabled(rename = "KIND")]
    kind: String,
    #[tabled(rename = "REMIND AT")]
    remind_at: String,
    #[tabled(rename = "SENT")]
    sent: String,
}

fn format_grouped_int(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// Format a money amount with two decimal places and thousands separators
fn format_amount(value: f64) -> String {
    let rounded = format!("{:.2}", value.abs());
    let parts: Vec<&str> = rounded.split('.').collect();
    let grouped = format_grouped_int(parts[0].parse::<i64>().unwrap_or(0));

    if value < -0.005 {
        format!("-{}.{}", grouped, parts[1])
    } else {
        format!("{}.{}", grouped, parts[1])
    }
}

fn parse_date(s: &str) -> Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| DunningError::InvalidDate(s.to_string()))
}

/// Cut-off timestamps accept a bare date, meaning the whole of that day.
fn parse_cutoff(s: &str) -> Result<chrono::NaiveDateTime> {
    if let Ok(ts) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ts);
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(ts) = date.and_hms_opt(23, 59, 59) {
            return Ok(ts);
        }
    }
    Err(DunningError::InvalidTimestamp(s.to_string()))
}

/// Build the criteria for one invocation: fixed predicates from config,
/// optional predicates from the CLI flags.
fn build_criteria(config: &Config, filter: &FilterArgs) -> Result<Criteria> {
    let mut criteria = Criteria::for_config(config);

    if let Some(company) = &filter.company {
        if !config.is_known_company(company) {
            return Err(DunningError::UnknownCompany(company.clone()));
        }
        criteria = criteria.company(company.clone());
    }
    if let Some(client) = &filter.client {
        criteria = criteria.client(client.clone());
    }

    let from = filter.from.as_deref().map(parse_date).transpose()?;
    let to = filter.to.as_deref().map(parse_date).transpose()?;
    criteria = criteria.due_between(from, to)?;

    if let Some(level) = filter.level {
        criteria = criteria.reclamation_level(level);
    }
    if filter.overdue {
        criteria = criteria.overdue_as_of(chrono::Local::now().date_naive());
    }

    Ok(criteria)
}

fn default_filter() -> FilterArgs {
    FilterArgs {
        company: None,
        client: None,
        from: None,
        to: None,
        level: None,
        overdue: false,
    }
}

/// Show the dashboard snapshot
fn cmd_stats(cfg_dir: &PathBuf) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let criteria = build_criteria(&config, &default_filter())?;

    let mut store = Store::open(cfg_dir)?;
    let invoices = store.invoices(&criteria)?;
    let clients = store.clients(invoices.iter().map(|i| i.client.as_str()))?;

    let snapshot = assemble(&invoices, &clients, &config.stats);

    println!("Pending Receivables");
    println!("{}", "-".repeat(50));
    println!(
        "Companies pending: {}",
        format_grouped_int(snapshot.total_companies_pending as i64)
    );
    println!(
        "Invoices pending:  {}",
        format_grouped_int(snapshot.total_invoices_pending as i64)
    );
    println!("Amount owed:       {}", format_amount(snapshot.total_amount_owed));

    if !snapshot.top_companies.is_empty() {
        println!();
        println!("Top debtors (max {}):", config.stats.top_clients);
        let rows: Vec<ClientAggRow> = snapshot
            .top_companies
            .iter()
            .map(|t| ClientAggRow {
                client: t.client.clone(),
                name: t.name.clone().unwrap_or_else(|| "(unknown)".to_string()),
                invoices: t.invoices,
                outstanding: format_amount(t.amount),
                status: t.worst_status.to_string(),
            })
            .collect();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{table}");
    }

    if !snapshot.most_overdue.is_empty() {
        println!();
        println!("Most overdue (max {}):", config.stats.overdue_page_size);
        let rows: Vec<InvoiceRow> = snapshot
            .most_overdue
            .iter()
            .map(invoice_row)
            .collect();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{table}");
    }

    Ok(())
}

fn invoice_row(invoice: &crate::ledger::Invoice) -> InvoiceRow {
    InvoiceRow {
        reference: invoice.reference(),
        company: invoice.company.clone(),
        client: invoice.client.clone(),
        due: invoice.due_date.to_string(),
        outstanding: format_amount(invoice.outstanding()),
        level: invoice
            .reclamation_level
            .map(|l| l.to_string())
            .unwrap_or_default(),
        status: invoice.status().to_string(),
    }
}

/// List per-client aggregates
fn cmd_clients(cfg_dir: &PathBuf, filter: &FilterArgs) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let criteria = build_criteria(&config, filter)?;

    let mut store = Store::open(cfg_dir)?;
    let invoices = store.invoices(&criteria)?;
    let clients = store.clients(invoices.iter().map(|i| i.client.as_str()))?;

    if invoices.is_empty() {
        println!("No pending invoices match the given filters.");
        return Ok(());
    }

    let agg = aggregate(&invoices);
    let rows: Vec<ClientAggRow> = agg
        .clients_by_amount()
        .iter()
        .map(|c| ClientAggRow {
            client: c.client.clone(),
            name: clients
                .get(trim_client_id(&c.client))
                .map(|cl| cl.name.clone())
                .unwrap_or_else(|| "(unknown)".to_string()),
            invoices: c.invoices,
            outstanding: format_amount(c.amount),
            status: c.worst_status.to_string(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    println!();
    println!(
        "Total: {} clients, {} outstanding",
        agg.grand.clients,
        format_amount(agg.grand.amount)
    );

    Ok(())
}

/// List pending invoices
fn cmd_invoices(cfg_dir: &PathBuf, filter: &FilterArgs) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let criteria = build_criteria(&config, filter)?;

    let mut store = Store::open(cfg_dir)?;
    let invoices = store.invoices(&criteria)?;

    if invoices.is_empty() {
        println!("No pending invoices match the given filters.");
        return Ok(());
    }

    let rows: Vec<InvoiceRow> = invoices.iter().map(invoice_row).collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    println!();
    println!("Total: {} invoices", invoices.len());

    Ok(())
}

/// Build the report and export it as a spreadsheet
fn cmd_report(
    cfg_dir: &PathBuf,
    balance: &str,
    output: Option<PathBuf>,
    filter: &FilterArgs,
) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let balance: BalanceFilter = balance.parse()?;
    let criteria = build_criteria(&config, filter)?;

    let mut store = Store::open(cfg_dir)?;
    let invoices = store.invoices(&criteria)?;
    let clients = store.clients(invoices.iter().map(|i| i.client.as_str()))?;

    let generated_at = chrono::Local::now().naive_local();
    let report = build(&invoices, &clients, &config, balance, generated_at);

    // Resolve the sink path before writing anything
    let csv_path = match output {
        Some(path) => path,
        None => {
            let export = config.export.as_ref().ok_or(DunningError::ExportUnavailable)?;
            let output_dir = config::resolve_output_dir(&export.output_dir, cfg_dir);
            std::fs::create_dir_all(&output_dir)?;
            let today = chrono::Local::now().format("%Y-%m-%d");
            output_dir.join(format!("REPORT-{}-{}.csv", balance.label(), today))
        }
    };

    write_report_csv(&report, &csv_path)?;

    println!("Generated {} balance report", balance.label());
    for section in &report.sections {
        println!(
            "  {} {}: {} clients, {}",
            section.company,
            section.company_name.as_deref().unwrap_or(""),
            section.clients.len(),
            format_amount(section.total)
        );
    }
    println!(
        "  Grand total: {} unique clients, {}",
        report.grand_total.unique_clients,
        format_amount(report.grand_total.total_amount)
    );
    println!("  Saved: {}", csv_path.display());

    Ok(())
}

/// List follow-up actions
fn cmd_actions(cfg_dir: &PathBuf, due_only: bool, at: Option<String>) -> Result<()> {
    // Config is loaded for validation even though actions need none of it
    load_config(cfg_dir)?;
    let cutoff = match at {
        Some(s) => parse_cutoff(&s)?,
        None => chrono::Local::now().naive_local(),
    };

    let mut store = Store::open(cfg_dir)?;
    let actions = store.actions()?;
    let shown = if due_only {
        scan_due(&actions, cutoff)
    } else {
        actions
    };

    if shown.is_empty() {
        println!("No follow-up actions.");
        return Ok(());
    }

    let rows: Vec<ActionRow> = shown
        .iter()
        .map(|a| ActionRow {
            id: a.id,
            client: a.client.clone(),
            reference: a.reference(),
            kind: a.kind.clone(),
            remind_at: a.remind_at.map(|t| t.to_string()).unwrap_or_default(),
            sent: if a.sent { "yes" } else { "no" }.to_string(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Dispatch reminders for due follow-up actions
fn cmd_notify(cfg_dir: &PathBuf, at: Option<String>, dry_run: bool) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let now = match at {
        Some(s) => parse_cutoff(&s)?,
        None => chrono::Local::now().naive_local(),
    };

    let mut store = Store::open(cfg_dir)?;

    if dry_run {
        let due = scan_due(&store.actions()?, now);
        println!("Would send {} reminder(s):", due.len());
        for action in &due {
            println!(
                "  #{} {} {} ({}) due {}",
                action.id,
                action.client,
                action.reference(),
                action.kind,
                action.remind_at.map(|t| t.to_string()).unwrap_or_default()
            );
        }
        return Ok(());
    }

    let notifier = config.notifier.as_ref().ok_or(DunningError::NoChannels)?;
    let dispatcher = Dispatcher::from_settings(notifier)?;

    let summary = run_once(&mut store, &dispatcher, now)?;

    println!("Notifier run complete");
    println!("  Attempted: {}", summary.attempted);
    println!("  Sent:      {}", summary.sent);
    println!("  Failed:    {}", summary.failed);

    if summary.failed > 0 {
        println!("  Failed actions stay queued and retry on the next run.");
    }

    Ok(())
}
