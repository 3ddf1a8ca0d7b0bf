use chrono::NaiveDateTime;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::criteria::Criteria;
use super::invoice::{trim_client_id, Invoice};
use crate::config::Client;
use crate::error::{DunningError, Result};
use crate::notify::FollowUpAction;

#[derive(Debug, Deserialize, Serialize)]
struct InvoiceFile {
    #[serde(default)]
    invoices: Vec<Invoice>,
}

#[derive(Debug, Deserialize, Serialize)]
struct ActionFile {
    #[serde(default)]
    actions: Vec<FollowUpAction>,
}

/// File-backed storage collaborator. Every query takes `&mut self` and hands
/// back a fully materialized result, so two logical queries can never
/// interleave on one handle: the previous result is drained before the next
/// call can borrow the store again.
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn open(dir: &Path) -> Result<Self> {
        if !dir.exists() {
            return Err(DunningError::ConfigNotFound(dir.to_path_buf()));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Filtered ledger scan, most overdue first. The ledger file is re-read on
    /// every call; this store never caches or mutates invoices.
    pub fn invoices(&mut self, criteria: &Criteria) -> Result<Vec<Invoice>> {
        let file: InvoiceFile = self.read_store_file("invoices.toml")?;
        let mut matched: Vec<Invoice> = file
            .invoices
            .into_iter()
            .filter(|i| criteria.matches(i))
            .collect();
        matched.sort_by(|a, b| a.due_date.cmp(&b.due_date));
        debug!("ledger scan matched {} invoices", matched.len());
        Ok(matched)
    }

    /// Look up client master data for the given ledger ids. Missing clients
    /// are simply absent from the result; enrichment degrades, it never fails
    /// the query.
    pub fn clients<'a>(
        &mut self,
        ids: impl IntoIterator<Item = &'a str>,
    ) -> Result<HashMap<String, Client>> {
        let path = self.dir.join("clients.toml");
        if !path.exists() {
            warn!("client master {} missing, serving unenriched", path.display());
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| DunningError::StorageUnavailable(format!("{}: {e}", path.display())))?;
        let all: HashMap<String, Client> = toml::from_str(&content)
            .map_err(|e| DunningError::StorageUnavailable(format!("{}: {e}", path.display())))?;

        let mut found = HashMap::new();
        for id in ids {
            let key = trim_client_id(id);
            if let Some(client) = all.get(key) {
                found.insert(key.to_string(), client.clone());
            }
        }
        Ok(found)
    }

    /// All follow-up actions, unfiltered. Due selection is the scanner's job
    /// so a scan can be inspected without touching storage again.
    pub fn actions(&mut self) -> Result<Vec<FollowUpAction>> {
        let file: ActionFile = self.read_store_file("actions.toml")?;
        Ok(file.actions)
    }

    /// Flip one action's sent flag and persist immediately. Called after each
    /// successful dispatch, before the next action is attempted, so a crashed
    /// run re-sends at most the in-flight action.
    pub fn mark_action_sent(&mut self, id: u64, at: NaiveDateTime) -> Result<()> {
        let mut file: ActionFile = self.read_store_file("actions.toml")?;
        let action = file
            .actions
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(DunningError::ActionNotFound(id))?;
        action.sent = true;
        action.sent_at = Some(at);

        let path = self.dir.join("actions.toml");
        let content = toml::to_string_pretty(&file).map_err(|e| {
            DunningError::StorageUnavailable(format!("{}: {e}", path.display()))
        })?;
        fs::write(&path, content)
            .map_err(|e| DunningError::StorageUnavailable(format!("{}: {e}", path.display())))?;
        debug!("action {id} marked sent");
        Ok(())
    }

    fn read_store_file<T: for<'de> Deserialize<'de>>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Err(DunningError::StorageUnavailable(format!(
                "store file not found: {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| DunningError::StorageUnavailable(format!("{}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| DunningError::StorageUnavailable(format!("{}: {e}", path.display())))
    }
}
