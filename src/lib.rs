pub mod config;
pub mod error;
pub mod ledger;
pub mod notify;
pub mod report;

pub use config::{Client, Config};
pub use error::{DunningError, Result};
pub use ledger::{classify, Criteria, Invoice, Status, Store};
pub use notify::{run_once, Dispatcher, FollowUpAction, JobSummary};
pub use report::{aggregate, assemble, build, BalanceFilter, Report, Snapshot};
