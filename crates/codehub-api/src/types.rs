//! Wire types for the REST service.
//!
//! The service stores documents with a `_id` key and camel-cased timestamps.
//! List fields are frequently absent or `null`; both decode as empty vectors.

use chrono::DateTime;
use codehub_core::CommitRecord;
use serde::{Deserialize, Deserializer, Serialize};

/// Decode a missing or `null` list as empty.
fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Visibility is sent as a boolean by most endpoints and as a label by some.
fn lenient_visibility<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Flag(bool),
        Label(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Flag(flag)) => flag,
        Some(Raw::Label(label)) => label.eq_ignore_ascii_case("public"),
        None => false,
    })
}

// ---------------------------------------------------------------------------
// repositories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `true` when the repository is public.
    #[serde(default, deserialize_with = "lenient_visibility")]
    pub visibility: bool,
}

impl Repository {
    #[must_use]
    pub fn visibility_label(&self) -> &'static str {
        if self.visibility {
            "Public"
        } else {
            "Private"
        }
    }
}

/// `GET /repo/user/{userId}`: `{ "repositories": [...] }`.
#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryListResponse {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub repositories: Vec<Repository>,
}

// ---------------------------------------------------------------------------
// commits
// ---------------------------------------------------------------------------

/// Commit author: a populated user document, or just its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorRef {
    User(UserSummary),
    Id(String),
}

fn username(author: Option<&AuthorRef>) -> Option<&str> {
    match author {
        Some(AuthorRef::User(user)) if !user.username.is_empty() => Some(&user.username),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "commitId", default)]
    pub commit_id: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: Option<AuthorRef>,
    /// ISO string on most deployments; epoch milliseconds on some.
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub files: Vec<serde_json::Value>,
}

impl Commit {
    /// Username of the author when the document was populated.
    #[must_use]
    pub fn author_name(&self) -> Option<&str> {
        username(self.author.as_ref())
    }

    /// Abbreviated commit hash, falling back to the document id.
    #[must_use]
    pub fn short_id(&self) -> &str {
        let full = self.commit_id.as_deref().unwrap_or(&self.id);
        full.char_indices().nth(7).map_or(full, |(i, _)| &full[..i])
    }

    /// Creation time as a string: ISO values pass through, epoch
    /// milliseconds are rendered as RFC 3339.
    #[must_use]
    pub fn created_at_string(&self) -> Option<String> {
        match self.created_at.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => n
                .as_i64()
                .and_then(DateTime::from_timestamp_millis)
                .map(|ts| ts.to_rfc3339()),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_record(&self) -> CommitRecord {
        CommitRecord {
            created_at: self.created_at_string(),
        }
    }
}

/// `GET /repo/{repoId}/commits`: `{ "commits": [...] }`.
#[derive(Debug, Deserialize)]
pub(crate) struct CommitListResponse {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub commits: Vec<Commit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitFile {
    #[serde(default)]
    pub filename: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
}

/// `GET /commit/{commitId}`: `{ "commit": {...}, "files": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitDetail {
    pub commit: Commit,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub files: Vec<CommitFile>,
}

// ---------------------------------------------------------------------------
// users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// `GET /userProfile/{userId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// `GET /connections/{userId}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connections {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub followers: Vec<UserSummary>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub following: Vec<UserSummary>,
}

/// Body of `POST /repo/create`. The owner is the session user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRepository {
    pub name: String,
    pub description: Option<String>,
    /// `true` for a public repository.
    pub visibility: bool,
}

/// Reply to `POST /star/{userId}/{repoId}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarToggle {
    /// Whether the repository is starred after the toggle.
    #[serde(rename = "isStarred", default)]
    pub is_starred: bool,
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// issues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    #[default]
    Open,
    Closed,
}

impl IssueStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IssueStatus::Open => "open",
            IssueStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Repository an issue belongs to: populated, or just its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepositoryRef {
    Repository(Repository),
    Id(String),
}

impl RepositoryRef {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            RepositoryRef::Repository(repository) => &repository.id,
            RepositoryRef::Id(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: IssueStatus,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub labels: Vec<String>,
    #[serde(default)]
    pub repository: Option<RepositoryRef>,
    #[serde(default)]
    pub creator: Option<AuthorRef>,
    #[serde(default)]
    pub assignee: Option<AuthorRef>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
}

impl Issue {
    /// Last six characters of the id, as shown in issue lists.
    #[must_use]
    pub fn short_id(&self) -> &str {
        let skip = self.id.chars().count().saturating_sub(6);
        self.id
            .char_indices()
            .nth(skip)
            .map_or(self.id.as_str(), |(i, _)| &self.id[i..])
    }

    /// Username of the creator when the document was populated.
    #[must_use]
    pub fn creator_name(&self) -> Option<&str> {
        username(self.creator.as_ref())
    }

    #[must_use]
    pub fn assignee_name(&self) -> Option<&str> {
        username(self.assignee.as_ref())
    }

    /// Repository name when the document was populated.
    #[must_use]
    pub fn repository_name(&self) -> Option<&str> {
        match &self.repository {
            Some(RepositoryRef::Repository(repository)) if !repository.name.is_empty() => {
                Some(&repository.name)
            }
            _ => None,
        }
    }
}

/// Body of `POST /issue/create/{repoId}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub labels: Vec<String>,
}

/// Body of `PUT /issue/update/{issueId}`. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<IssueStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl IssueUpdate {
    #[must_use]
    pub fn status(status: IssueStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
