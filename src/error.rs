use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DunningError {
    #[error("Config directory not found at {0}. Run 'dunning init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Invalid date range: 'from' ({from}) is after 'to' ({to})")]
    InvalidDateRange {
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    },

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Invalid timestamp '{0}'. Expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS.")]
    InvalidTimestamp(String),

    #[error("Company '{0}' is not in the configured company set")]
    UnknownCompany(String),

    #[error("Invalid balance filter '{0}'. Use 'all', 'positive', or 'negative'.")]
    InvalidBalanceFilter(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Follow-up action {0} not found")]
    ActionNotFound(u64),

    #[error("Report export is not configured. Add an [export] section to config.toml.")]
    ExportUnavailable,

    #[error("No delivery channels configured. Add a [notifier] section to config.toml.")]
    NoChannels,

    #[error("Failed to write report: {0}")]
    ReportWrite(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DunningError>;
