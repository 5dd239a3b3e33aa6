//! Profile, starring and connection endpoints.

use codehub_core::Session;
use reqwest::Method;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::{Connections, Repository, StarToggle, UserProfile};

impl ApiClient {
    /// Fetches a user's profile (`GET /userProfile/{userId}`).
    ///
    /// # Errors
    ///
    /// - [`ApiError::NotFound`] if the user does not exist.
    /// - [`ApiError::Unauthorized`] when the session token is missing or rejected.
    /// - [`ApiError::Http`] / [`ApiError::UnexpectedStatus`] on transport or server failure.
    /// - [`ApiError::Deserialize`] if the body does not match the expected shape.
    pub async fn get_user_profile(
        &self,
        session: &Session,
        user_id: &str,
    ) -> Result<UserProfile, ApiError> {
        self.get_json(session, &["userProfile", user_id]).await
    }

    /// Lists repositories starred by `user_id` (`GET /starred/{userId}`).
    /// A `null` body is treated as no stars.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::get_user_profile`].
    pub async fn list_starred(
        &self,
        session: &Session,
        user_id: &str,
    ) -> Result<Vec<Repository>, ApiError> {
        let starred: Option<Vec<Repository>> =
            self.get_json(session, &["starred", user_id]).await?;
        Ok(starred.unwrap_or_default())
    }

    /// Fetches followers and followed users (`GET /connections/{userId}`).
    ///
    /// # Errors
    ///
    /// As [`ApiClient::get_user_profile`].
    pub async fn get_connections(
        &self,
        session: &Session,
        user_id: &str,
    ) -> Result<Connections, ApiError> {
        self.get_json(session, &["connections", user_id]).await
    }

    /// Stars `repo_id` for the signed-in user, or unstars it if already
    /// starred (`POST /star/{userId}/{repoId}`). The reply says which.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Unauthorized`] if the session is anonymous or rejected.
    /// - Otherwise as [`ApiClient::get_user_profile`].
    pub async fn toggle_star(
        &self,
        session: &Session,
        repo_id: &str,
    ) -> Result<StarToggle, ApiError> {
        let user_id = session.user_id().ok_or_else(|| ApiError::Unauthorized {
            url: format!("{}star", self.base_url()),
        })?;
        tracing::info!(user_id, repo_id, "toggling star");
        let url = self.endpoint(&["star", user_id, repo_id])?;
        let payload = serde_json::json!({});
        self.request_json(session, Method::POST, &url, Some(&payload))
            .await
    }
}
