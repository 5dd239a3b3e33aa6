//! HTTP client for the code-hosting REST service.
//!
//! Wraps `reqwest` with bearer authentication taken from an explicit
//! [`Session`], percent-encoded path building, typed error mapping, and
//! retries on transient failures. Repository and commit endpoints live here;
//! user-centric endpoints are in `users.rs` and issue endpoints in
//! `issues.rs`.

use std::time::Duration;

use codehub_core::{AppConfig, Session};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::retry::retry_with_backoff;
use crate::types::{
    Commit, CommitDetail, CommitListResponse, NewRepository, Repository, RepositoryListResponse,
};

/// Client for the REST service.
///
/// Holds no identity of its own: every call takes the [`Session`] whose
/// token should authorize it.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl ApiClient {
    /// Creates a client for `base_url` with retries disabled.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`ApiError::InvalidBaseUrl`] if `base_url` does not
    /// parse as an http(s) URL.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("'{base_url}': {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(format!(
                "'{base_url}': scheme must be http or https"
            )));
        }

        Ok(Self {
            client,
            base_url,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Creates a client from application configuration, including its
    /// retry policy.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        Ok(
            Self::new(&config.api_url, config.request_timeout_secs, &config.user_agent)?
                .with_retry_policy(config.max_retries, config.retry_backoff_base_ms),
        )
    }

    /// Retry transient failures up to `max_retries` times, starting at
    /// `backoff_base_ms` and doubling.
    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Lists repositories owned by `user_id` (`GET /repo/user/{userId}`).
    ///
    /// # Errors
    ///
    /// - [`ApiError::Unauthorized`] when the session token is missing or rejected.
    /// - [`ApiError::Http`] / [`ApiError::UnexpectedStatus`] on transport or server failure.
    /// - [`ApiError::Deserialize`] if the body does not match the expected shape.
    pub async fn list_user_repositories(
        &self,
        session: &Session,
        user_id: &str,
    ) -> Result<Vec<Repository>, ApiError> {
        let response: RepositoryListResponse = self
            .get_json(session, &["repo", "user", user_id])
            .await?;
        Ok(response.repositories)
    }

    /// Fetches a single repository (`GET /repo/{repoId}`).
    ///
    /// # Errors
    ///
    /// - [`ApiError::NotFound`] if the repository does not exist.
    /// - Otherwise as [`ApiClient::list_user_repositories`].
    pub async fn get_repository(
        &self,
        session: &Session,
        repo_id: &str,
    ) -> Result<Repository, ApiError> {
        self.get_json(session, &["repo", repo_id]).await
    }

    /// Lists commits of a repository (`GET /repo/{repoId}/commits`), in the
    /// order the service returns them.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::get_repository`].
    pub async fn list_commits(
        &self,
        session: &Session,
        repo_id: &str,
    ) -> Result<Vec<Commit>, ApiError> {
        let response: CommitListResponse =
            self.get_json(session, &["repo", repo_id, "commits"]).await?;
        Ok(response.commits)
    }

    /// Fetches a commit and its files (`GET /commit/{commitId}`).
    ///
    /// # Errors
    ///
    /// As [`ApiClient::get_repository`].
    pub async fn get_commit(
        &self,
        session: &Session,
        commit_id: &str,
    ) -> Result<CommitDetail, ApiError> {
        self.get_json(session, &["commit", commit_id]).await
    }

    /// Lists every repository on the service (`GET /repo/all`).
    ///
    /// # Errors
    ///
    /// As [`ApiClient::list_user_repositories`].
    pub async fn list_all_repositories(
        &self,
        session: &Session,
    ) -> Result<Vec<Repository>, ApiError> {
        let repositories: Option<Vec<Repository>> =
            self.get_json(session, &["repo", "all"]).await?;
        Ok(repositories.unwrap_or_default())
    }

    /// Searches public repositories by name (`GET /repo/search?query=`).
    ///
    /// # Errors
    ///
    /// As [`ApiClient::list_user_repositories`].
    pub async fn search_repositories(
        &self,
        session: &Session,
        query: &str,
    ) -> Result<Vec<Repository>, ApiError> {
        let mut url = self.endpoint(&["repo", "search"])?;
        url.query_pairs_mut().append_pair("query", query);
        let repositories: Option<Vec<Repository>> =
            self.request_json(session, Method::GET, &url, None).await?;
        Ok(repositories.unwrap_or_default())
    }

    /// Creates a repository owned by the signed-in user (`POST /repo/create`).
    ///
    /// # Errors
    ///
    /// - [`ApiError::Unauthorized`] if the session is anonymous or rejected.
    /// - Otherwise as [`ApiClient::list_user_repositories`].
    pub async fn create_repository(
        &self,
        session: &Session,
        repository: &NewRepository,
    ) -> Result<(), ApiError> {
        let owner = session.user_id().ok_or_else(|| ApiError::Unauthorized {
            url: format!("{}repo/create", self.base_url),
        })?;
        let payload = serde_json::json!({
            "owner": owner,
            "name": repository.name,
            "description": repository.description.as_deref().unwrap_or_default(),
            "visibility": repository.visibility,
            "content": [],
            "issues": [],
        });
        tracing::info!(owner, name = %repository.name, "creating repository");
        self.request_discarding(session, Method::POST, &["repo", "create"], Some(&payload))
            .await
    }

    /// Builds an endpoint URL from raw path segments, percent-encoding each.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET `segments` and decode the JSON body as `T`.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        segments: &[&str],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        self.request_json(session, Method::GET, &url, None).await
    }

    /// Send `payload` to `url` and decode the JSON body as `T`.
    pub(crate) async fn request_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        method: Method,
        url: &Url,
        payload: Option<&serde_json::Value>,
    ) -> Result<T, ApiError> {
        let body = self.send(session, method.clone(), url, payload).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
            context: format!("{method} {url}"),
            source: e,
        })
    }

    /// Send `payload` to `segments`, discarding the response body.
    pub(crate) async fn request_discarding(
        &self,
        session: &Session,
        method: Method,
        segments: &[&str],
        payload: Option<&serde_json::Value>,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(segments)?;
        self.send(session, method, &url, payload).await.map(drop)
    }

    /// Sends one request and maps the status to [`ApiError`]. Returns the raw
    /// response body on 2xx.
    ///
    /// POST creates documents or toggles stars and is never retried.
    async fn send(
        &self,
        session: &Session,
        method: Method,
        url: &Url,
        payload: Option<&serde_json::Value>,
    ) -> Result<String, ApiError> {
        let max_retries = if method == Method::POST {
            0
        } else {
            self.max_retries
        };
        retry_with_backoff(max_retries, self.backoff_base_ms, || {
            let method = method.clone();
            async move {
                tracing::debug!(%method, %url, "api request");
                let mut request = self.client.request(method, url.clone());
                if let Some(token) = session.token() {
                    request = request.bearer_auth(token);
                }
                if let Some(payload) = payload {
                    request = request.json(payload);
                }

                let response = request.send().await?;
                let status = response.status();
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                    return Err(ApiError::Unauthorized {
                        url: url.to_string(),
                    });
                }
                if status == StatusCode::NOT_FOUND {
                    return Err(ApiError::NotFound {
                        url: url.to_string(),
                    });
                }
                if !status.is_success() {
                    return Err(ApiError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }
                Ok(response.text().await?)
            }
        })
        .await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
