//! Issue tracker endpoints.

use codehub_core::Session;
use reqwest::Method;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::{Issue, IssueUpdate, NewIssue};

fn to_payload<T: serde::Serialize>(
    body: &T,
    context: &str,
) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Encode {
        context: context.to_string(),
        source: e,
    })
}

impl ApiClient {
    /// Lists the issues of a repository (`GET /issue/repo/{repoId}`).
    /// A `null` body is treated as no issues.
    ///
    /// # Errors
    ///
    /// - [`ApiError::NotFound`] if the repository does not exist.
    /// - [`ApiError::Unauthorized`] when the session token is missing or rejected.
    /// - [`ApiError::Http`] / [`ApiError::UnexpectedStatus`] on transport or server failure.
    /// - [`ApiError::Deserialize`] if the body does not match the expected shape.
    pub async fn list_issues(
        &self,
        session: &Session,
        repo_id: &str,
    ) -> Result<Vec<Issue>, ApiError> {
        let issues: Option<Vec<Issue>> = self.get_json(session, &["issue", "repo", repo_id]).await?;
        Ok(issues.unwrap_or_default())
    }

    /// Fetches one issue (`GET /issue/{issueId}`).
    ///
    /// # Errors
    ///
    /// As [`ApiClient::list_issues`].
    pub async fn get_issue(&self, session: &Session, issue_id: &str) -> Result<Issue, ApiError> {
        self.get_json(session, &["issue", issue_id]).await
    }

    /// Opens an issue on `repo_id` (`POST /issue/create/{repoId}`).
    ///
    /// # Errors
    ///
    /// As [`ApiClient::list_issues`].
    pub async fn create_issue(
        &self,
        session: &Session,
        repo_id: &str,
        issue: &NewIssue,
    ) -> Result<(), ApiError> {
        let payload = to_payload(issue, "new issue")?;
        tracing::info!(repo_id, title = %issue.title, "creating issue");
        self.request_discarding(
            session,
            Method::POST,
            &["issue", "create", repo_id],
            Some(&payload),
        )
        .await
    }

    /// Applies `update` to an issue (`PUT /issue/update/{issueId}`).
    ///
    /// # Errors
    ///
    /// As [`ApiClient::list_issues`].
    pub async fn update_issue(
        &self,
        session: &Session,
        issue_id: &str,
        update: &IssueUpdate,
    ) -> Result<(), ApiError> {
        let payload = to_payload(update, "issue update")?;
        tracing::info!(issue_id, "updating issue");
        self.request_discarding(
            session,
            Method::PUT,
            &["issue", "update", issue_id],
            Some(&payload),
        )
        .await
    }

    /// Deletes an issue (`DELETE /issue/delete/{issueId}`).
    ///
    /// # Errors
    ///
    /// As [`ApiClient::list_issues`].
    pub async fn delete_issue(&self, session: &Session, issue_id: &str) -> Result<(), ApiError> {
        tracing::info!(issue_id, "deleting issue");
        self.request_discarding(session, Method::DELETE, &["issue", "delete", issue_id], None)
            .await
    }
}
