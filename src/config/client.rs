use serde::{Deserialize, Serialize};

/// Client master record, keyed by zero-trimmed client id in clients.toml.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Client {
    pub name: String,
    #[serde(default)]
    pub tax_id: Option<String>,
}
