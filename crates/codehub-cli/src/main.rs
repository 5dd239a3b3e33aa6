mod issues;
mod profile;
mod render;
mod repos;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use codehub_api::{ApiClient, IssueStatus};
use codehub_core::Session;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "codehub")]
#[command(about = "Browse repositories, commits, issues and contribution activity")]
struct Cli {
    /// REST base URL; overrides CODEHUB_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show a user's profile and contribution heat map for the last year
    Profile {
        /// User id; defaults to the signed-in user
        #[arg(long)]
        user: Option<String>,
        /// Anchor the one-year window on this day (YYYY-MM-DD) instead of today
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Print the activity report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List repositories owned by a user
    Repos {
        #[arg(long)]
        user: Option<String>,
        /// List every repository on the service instead
        #[arg(long, conflicts_with = "user")]
        all: bool,
    },
    /// Search public repositories by name
    Search { query: String },
    /// Create a repository owned by the signed-in user
    CreateRepo {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        private: bool,
    },
    /// Show the commit history of a repository
    Commits { repo_id: String },
    /// Show a single commit and its files
    Commit { commit_id: String },
    /// List repositories starred by a user
    Starred {
        #[arg(long)]
        user: Option<String>,
    },
    /// Star a repository, or unstar it if already starred
    Star { repo_id: String },
    /// List followers and followed users
    Connections {
        #[arg(long)]
        user: Option<String>,
    },
    /// List the issues of a repository
    Issues {
        repo_id: String,
        #[arg(long, value_enum, default_value_t = issues::StateFilter::All)]
        state: issues::StateFilter,
    },
    /// Show, open, change or delete a single issue
    Issue {
        #[command(subcommand)]
        action: IssueAction,
    },
}

#[derive(Debug, Subcommand)]
enum IssueAction {
    /// Show an issue
    Show { issue_id: String },
    /// Open an issue on a repository
    Create {
        repo_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Comma-separated or repeated
        #[arg(long = "label", value_delimiter = ',')]
        labels: Vec<String>,
    },
    /// Change an issue's title, description or labels
    Edit {
        issue_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Replaces all labels; comma-separated or repeated
        #[arg(long = "label", value_delimiter = ',')]
        labels: Option<Vec<String>>,
    },
    /// Mark an issue closed
    Close { issue_id: String },
    /// Mark an issue open again
    Reopen { issue_id: String },
    /// Delete an issue
    Delete {
        issue_id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = codehub_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }

    let session = config.session();
    let client = ApiClient::from_config(&config)
        .map_err(|e| anyhow::anyhow!("failed to build API client: {e}"))?;
    tracing::debug!(api_url = %client.base_url(), signed_in = session.is_authenticated(), "starting");

    match cli.command {
        Commands::Profile { user, as_of, json } => {
            profile::run_profile(
                &client,
                &session,
                &config,
                user.as_deref(),
                as_of,
                json,
            )
            .await
        }
        Commands::Repos { user, all } => {
            repos::run_repos(&client, &session, user.as_deref(), all).await
        }
        Commands::Search { query } => repos::run_search(&client, &session, &query).await,
        Commands::CreateRepo {
            name,
            description,
            private,
        } => {
            repos::run_create_repo(&client, &session, &name, description.as_deref(), private)
                .await
        }
        Commands::Commits { repo_id } => repos::run_commits(&client, &session, &repo_id).await,
        Commands::Commit { commit_id } => repos::run_commit(&client, &session, &commit_id).await,
        Commands::Starred { user } => {
            profile::run_starred(&client, &session, user.as_deref()).await
        }
        Commands::Star { repo_id } => repos::run_star(&client, &session, &repo_id).await,
        Commands::Connections { user } => {
            profile::run_connections(&client, &session, user.as_deref()).await
        }
        Commands::Issues { repo_id, state } => {
            issues::run_issues(&client, &session, &repo_id, state).await
        }
        Commands::Issue { action } => run_issue_action(&client, &session, action).await,
    }
}

async fn run_issue_action(
    client: &ApiClient,
    session: &Session,
    action: IssueAction,
) -> anyhow::Result<()> {
    match action {
        IssueAction::Show { issue_id } => issues::run_issue_show(client, session, &issue_id).await,
        IssueAction::Create {
            repo_id,
            title,
            description,
            labels,
        } => {
            issues::run_issue_create(client, session, &repo_id, &title, &description, &labels)
                .await
        }
        IssueAction::Edit {
            issue_id,
            title,
            description,
            labels,
        } => {
            issues::run_issue_edit(
                client,
                session,
                &issue_id,
                title.as_deref(),
                description.as_deref(),
                labels.as_deref(),
            )
            .await
        }
        IssueAction::Close { issue_id } => {
            issues::run_issue_set_status(client, session, &issue_id, IssueStatus::Closed).await
        }
        IssueAction::Reopen { issue_id } => {
            issues::run_issue_set_status(client, session, &issue_id, IssueStatus::Open).await
        }
        IssueAction::Delete { issue_id, yes } => {
            issues::run_issue_delete(client, session, &issue_id, yes).await
        }
    }
}

/// The explicit `--user`, else the signed-in user.
///
/// # Errors
///
/// Returns an error when neither is available.
pub(crate) fn resolve_user<'a>(
    explicit: Option<&'a str>,
    session: &'a Session,
) -> anyhow::Result<&'a str> {
    explicit.or(session.user_id()).ok_or_else(|| {
        anyhow::anyhow!("no user given; pass --user or set CODEHUB_USER_ID and CODEHUB_TOKEN")
    })
}

/// `value` trimmed, or an error naming `field` when blank.
pub(crate) fn require_text<'a>(field: &str, value: &'a str) -> anyhow::Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        anyhow::bail!("{field} must not be empty");
    }
    Ok(trimmed)
}

/// Shorten `text` to `max` characters, appending `...` when cut.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}
