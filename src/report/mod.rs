mod aggregate;
mod builder;
mod sheet;
mod stats;

pub use aggregate::{aggregate, Aggregation, ClientAggregate, CompanyAggregate, GrandTotal};
pub use builder::{build, BalanceFilter, ClientLine, CompanySection, Report, ReportTotal};
pub use sheet::write_report_csv;
pub use stats::{assemble, Snapshot, TopCompanyLine};
