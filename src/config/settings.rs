use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub companies: Vec<CompanyEntry>,
    pub filters: FilterSettings,
    #[serde(default)]
    pub stats: StatsSettings,
    #[serde(default)]
    pub export: Option<ExportSettings>,
    #[serde(default)]
    pub notifier: Option<NotifierSettings>,
}

/// One legal entity of the group. The recognized set is configuration,
/// never inferred from ledger data.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CompanyEntry {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FilterSettings {
    pub excluded_types: Vec<String>,
    pub collective: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StatsSettings {
    pub top_clients: usize,
    pub overdue_page_size: usize,
}

impl Default for StatsSettings {
    fn default() -> Self {
        Self {
            top_clients: 50,
            overdue_page_size: 50,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ExportSettings {
    pub output_dir: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct NotifierSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub mail: Option<MailSettings>,
    #[serde(default)]
    pub webhook: Option<WebhookSettings>,
}

fn default_timeout_secs() -> u64 {
    15
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MailSettings {
    pub gateway_url: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebhookSettings {
    pub url: String,
}

impl Config {
    pub fn is_known_company(&self, code: &str) -> bool {
        self.companies.iter().any(|c| c.code == code)
    }

    pub fn company_name(&self, code: &str) -> Option<&str> {
        self.companies
            .iter()
            .find(|c| c.code == code)
            .map(|c| c.name.as_str())
    }
}
