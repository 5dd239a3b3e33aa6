pub mod activity;
pub mod client;
pub mod error;
mod issues;
pub(crate) mod retry;
pub mod types;
mod users;

pub use activity::{load_activity, load_activity_tracked, ActivityReport, RepoFetchFailure};
pub use client::ApiClient;
pub use error::ApiError;
pub use types::{
    AuthorRef, Commit, CommitDetail, CommitFile, Connections, Issue, IssueStatus, IssueUpdate,
    NewIssue, NewRepository, Repository, RepositoryRef, StarToggle, UserProfile, UserSummary,
};
