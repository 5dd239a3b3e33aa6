pub mod activity;
pub mod app_config;
pub mod config;
pub mod humanize;
pub mod session;
pub mod subject;

use thiserror::Error;

pub use activity::{
    aggregate_contributions, parse_commit_day, parse_commit_timestamp, trailing_window,
    ActivitySeries, CommitRecord, DayBucket, DroppedCommits, SeverityTier,
};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use humanize::{relative_age, relative_age_raw};
pub use session::{Credentials, Session};
pub use subject::{SubjectTicket, SubjectTracker};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
