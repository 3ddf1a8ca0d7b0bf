use chrono::NaiveDateTime;
use log::{info, warn};

use super::action::scan_due;
use super::dispatch::{compose, Dispatcher};
use crate::ledger::{trim_client_id, Store};
use crate::error::Result;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct JobSummary {
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
}

/// One notifier run: scan due actions, dispatch each, persist outcomes.
/// Safe to invoke on a fixed schedule: a rerun only ever sees actions the
/// previous run failed to get out. One bad action never blocks the batch.
pub fn run_once(
    store: &mut Store,
    dispatcher: &Dispatcher,
    now: NaiveDateTime,
) -> Result<JobSummary> {
    let actions = store.actions()?;
    let due = scan_due(&actions, now);
    info!("{} follow-up actions due", due.len());

    let clients = store.clients(due.iter().map(|a| a.client.as_str()))?;

    let mut summary = JobSummary::default();
    for action in &due {
        summary.attempted += 1;

        let client_name = clients
            .get(trim_client_id(&action.client))
            .map(|c| c.name.as_str());
        let reminder = compose(action, client_name);
        let result = dispatcher.dispatch(&reminder);

        if result.should_mark_sent() {
            summary.sent += 1;
            // Persist before touching the next action; a crash here re-sends
            // at most this one reminder on the next run.
            if let Err(e) = store.mark_action_sent(action.id, now) {
                warn!("action {} dispatched but not marked sent: {e}", action.id);
            }
        } else {
            summary.failed += 1;
            warn!(
                "action {} not delivered, will retry on the next run",
                action.id
            );
        }
    }

    info!(
        "notifier run complete: attempted={} sent={} failed={}",
        summary.attempted, summary.sent, summary.failed
    );
    Ok(summary)
}
