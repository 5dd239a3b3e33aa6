//! Loads a user's contribution activity from the service.
//!
//! Lists the subject's repositories, fetches every repository's commits
//! concurrently, and aggregates them into an [`ActivitySeries`]. Nothing in
//! here fails outright: a missing identity, a missing token, or a failed
//! listing all produce an all-zero series, and each failed commit fetch only
//! removes that repository's contributions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use codehub_core::{
    aggregate_contributions, ActivitySeries, CommitRecord, Session, SubjectTracker,
};
use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::client::ApiClient;
use crate::types::{Commit, Repository};

/// A repository whose commits could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoFetchFailure {
    pub repository_id: String,
    pub repository_name: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityReport {
    /// Subject the activity was loaded for; `None` when no identity resolved.
    pub user_id: Option<String>,
    pub repositories: Vec<Repository>,
    pub series: ActivitySeries,
    /// Per-repository commit fetch failures, sorted by repository id.
    pub failures: Vec<RepoFetchFailure>,
    /// Set when the repository listing itself failed.
    pub listing_error: Option<String>,
}

impl ActivityReport {
    fn empty(user_id: Option<&str>, reference: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.map(str::to_owned),
            repositories: Vec::new(),
            series: ActivitySeries::empty(reference),
            failures: Vec::new(),
            listing_error: None,
        }
    }

    /// `true` when every repository was listed and fetched.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.listing_error.is_none()
    }
}

/// Load the activity of `subject` (or of the session's user when `None`)
/// for the window ending at `reference`.
///
/// At most `max_concurrent` commit requests are in flight at once.
pub async fn load_activity(
    client: &ApiClient,
    session: &Session,
    subject: Option<&str>,
    reference: DateTime<Utc>,
    max_concurrent: usize,
) -> ActivityReport {
    let Some(user_id) = subject.or(session.user_id()) else {
        tracing::debug!("no subject user; activity is empty");
        return ActivityReport::empty(None, reference);
    };

    if session.token().is_none() {
        tracing::info!(user_id, "no session token; activity is empty");
        return ActivityReport::empty(Some(user_id), reference);
    }

    let mut report = ActivityReport::empty(Some(user_id), reference);

    let repositories = match client.list_user_repositories(session, user_id).await {
        Ok(repositories) => repositories,
        Err(e) => {
            tracing::warn!(user_id, error = %e, "failed to list repositories");
            report.listing_error = Some(e.to_string());
            return report;
        }
    };

    let results: Vec<_> = stream::iter(&repositories)
        .map(|repo| async move { (repo, client.list_commits(session, &repo.id).await) })
        .buffer_unordered(max_concurrent.max(1))
        .collect()
        .await;

    let mut commits_by_repository: BTreeMap<String, Vec<CommitRecord>> = BTreeMap::new();
    for (repo, result) in results {
        match result {
            Ok(commits) => {
                let records = commits.iter().map(Commit::to_record).collect();
                commits_by_repository.insert(repo.id.clone(), records);
            }
            Err(e) => {
                tracing::warn!(
                    repo_id = %repo.id,
                    repo = %repo.name,
                    error = %e,
                    "failed to fetch commits; repository skipped"
                );
                report.failures.push(RepoFetchFailure {
                    repository_id: repo.id.clone(),
                    repository_name: repo.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    report
        .failures
        .sort_by(|a, b| a.repository_id.cmp(&b.repository_id));

    report.series = aggregate_contributions(
        repositories.iter().map(|r| r.id.as_str()),
        &commits_by_repository,
        reference,
    );

    let dropped = report.series.dropped();
    if dropped.malformed > 0 {
        tracing::debug!(
            user_id,
            malformed = dropped.malformed,
            "commits with unparseable timestamps were skipped"
        );
    }

    report.repositories = repositories;
    report
}

/// [`load_activity`] keyed by subject: returns `None` when another
/// activation on `tracker` started before this one finished.
pub async fn load_activity_tracked(
    tracker: &SubjectTracker,
    client: &ApiClient,
    session: &Session,
    subject: Option<&str>,
    reference: DateTime<Utc>,
    max_concurrent: usize,
) -> Option<ActivityReport> {
    let ticket = tracker.activate(subject.or(session.user_id()));
    let report = load_activity(client, session, subject, reference, max_concurrent).await;
    let settled = tracker.settle(&ticket, report);
    if settled.is_none() {
        tracing::debug!(
            user_id = ticket.user_id(),
            "discarding activity for superseded subject"
        );
    }
    settled
}
