mod client;
mod settings;

pub use client::Client;
pub use settings::{
    CompanyEntry, Config, ExportSettings, FilterSettings, MailSettings, NotifierSettings,
    StatsSettings, WebhookSettings,
};

use crate::error::{DunningError, Result};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.dunning/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "dunning") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.dunning/
    let home = dirs_home().ok_or_else(|| {
        DunningError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".dunning"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if path.starts_with("~/") {
        if let Some(home) = dirs_home() {
            return home.join(&path[2..]);
        }
    }
    PathBuf::from(path)
}

/// Resolve a configured output directory relative to the config dir
pub fn resolve_output_dir(configured: &str, config_dir: &PathBuf) -> PathBuf {
    let expanded = expand_path(configured);
    if expanded.is_absolute() {
        expanded
    } else {
        config_dir.join(expanded)
    }
}

/// Load the main config.toml
pub fn load_config(config_dir: &PathBuf) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(DunningError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| DunningError::ConfigParse { path, source: e })
}

/// Load clients.toml as a HashMap keyed by client id
pub fn load_clients(config_dir: &PathBuf) -> Result<HashMap<String, Client>> {
    let path = config_dir.join("clients.toml");
    if !path.exists() {
        return Err(DunningError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| DunningError::ConfigParse { path, source: e })
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"# Legal entities of the group. Invoices under any other company code are
# rejected by the --company filter; the ledger itself is not trusted to
# define this set.
[[companies]]
code = "S005"
name = "Grupo Atisa BPO"

[[companies]]
code = "S001"
name = "Asesores Titulados"

[[companies]]
code = "S010"
name = "Selier by Atisa"

# Fixed ledger predicates. Every dashboard and report query applies these.
[filters]
excluded_types = ["AA", "ZZ"]
collective = "4300"

[stats]
top_clients = 50
overdue_page_size = 50

[export]
output_dir = "~/.dunning/output"

# Reminder delivery. Mail is the primary channel: an action is marked sent
# only once the mail gateway accepted it. The webhook is best-effort.
# [notifier]
# timeout_secs = 15
#
# [notifier.mail]
# gateway_url = "https://mail-relay.example.com/send"
# from = "cobros@example.com"
# to = "consultores@example.com"
#
# [notifier.webhook]
# url = "https://example.webhook.office.com/webhookb2/..."
"#;

/// Template content for clients.toml
pub const CLIENTS_TEMPLATE: &str = r#"# Client master data, keyed by zero-trimmed client id. Missing entries are
# tolerated: invoices for unknown clients still aggregate, with no name.

[542]
name = "Example Client S.L."
tax_id = "B12345678"
"#;

/// Template content for invoices.toml
pub const INVOICES_TEMPLATE: &str = r#"# Ledger snapshot of open receivables, re-read on every query and never
# mutated by this tool. Client ids keep their ledger form (leading zeros).

[[invoices]]
type = "FAC"
entry = "SE0025001972"
company = "S005"
plant = "P01"
currency = "EUR"
collective = "4300"
client = "00542"
due_date = "2026-06-30"
payment_method = "TRF"
sign = 1
amount = 1500.50
paid = 0.0
reclamation_level = 1
pending = true
"#;

/// Template content for actions.toml
pub const ACTIONS_TEMPLATE: &str = r#"# Scheduled commercial follow-up actions. The notifier only ever flips
# `sent`/`sent_at`; it never deletes entries.

[[actions]]
id = 1
client = "00542"
type = "FAC"
entry = "SE0025001972"
kind = "Llamada"
description = "Second payment chase before escalation"
remind_at = "2026-06-01T09:00:00"
author = "mgarcia"
created_at = "2026-05-20T12:00:00"
sent = false
"#;
