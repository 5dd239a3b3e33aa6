use std::cmp::Reverse;

use chrono::Utc;
use codehub_api::{ApiClient, AuthorRef, Commit, NewRepository, Repository, StarToggle};
use codehub_core::{parse_commit_timestamp, relative_age_raw, Session};

fn print_repositories(repos: &[Repository]) {
    println!("{:<26}{:<26}{:<10}DESCRIPTION", "ID", "NAME", "VISIBILITY");
    for repo in repos {
        println!(
            "{:<26}{:<26}{:<10}{}",
            repo.id,
            crate::truncate(&repo.name, 24),
            repo.visibility_label(),
            crate::truncate(repo.description.as_deref().unwrap_or("\u{2014}"), 50)
        );
    }
}

/// List repositories owned by a user, or every repository with `all`.
///
/// # Errors
///
/// Returns an error if no user resolves or the request fails.
pub(crate) async fn run_repos(
    client: &ApiClient,
    session: &Session,
    user: Option<&str>,
    all: bool,
) -> anyhow::Result<()> {
    if all {
        let repos = client.list_all_repositories(session).await?;
        if repos.is_empty() {
            println!("no repositories found");
        } else {
            print_repositories(&repos);
        }
        return Ok(());
    }

    let user_id = crate::resolve_user(user, session)?;
    let repos = client.list_user_repositories(session, user_id).await?;

    if repos.is_empty() {
        println!("no repositories found for user {user_id}");
        return Ok(());
    }
    print_repositories(&repos);
    Ok(())
}

/// Search public repositories by name.
///
/// # Errors
///
/// Returns an error if the query is blank or the request fails.
pub(crate) async fn run_search(
    client: &ApiClient,
    session: &Session,
    query: &str,
) -> anyhow::Result<()> {
    let query = crate::require_text("query", query)?;
    let repos = client.search_repositories(session, query).await?;

    if repos.is_empty() {
        println!("no repositories match '{query}'");
        return Ok(());
    }
    print_repositories(&repos);
    Ok(())
}

/// Create a repository owned by the signed-in user.
///
/// # Errors
///
/// Returns an error if the name is blank, no user is signed in, or the
/// request fails.
pub(crate) async fn run_create_repo(
    client: &ApiClient,
    session: &Session,
    name: &str,
    description: Option<&str>,
    private: bool,
) -> anyhow::Result<()> {
    let repository = NewRepository {
        name: crate::require_text("repository name", name)?.to_string(),
        description: description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_owned),
        visibility: !private,
    };
    client.create_repository(session, &repository).await?;
    println!(
        "created {} repository {}",
        if repository.visibility {
            "public"
        } else {
            "private"
        },
        repository.name
    );
    Ok(())
}

/// Newest first; commits without a readable timestamp sort last.
fn sort_newest_first(commits: &mut [Commit]) {
    commits.sort_by_cached_key(|commit| {
        Reverse(
            commit
                .created_at_string()
                .as_deref()
                .and_then(parse_commit_timestamp),
        )
    });
}

fn author_label(commit: &Commit) -> &str {
    match &commit.author {
        Some(AuthorRef::User(user)) if !user.username.is_empty() => &user.username,
        Some(AuthorRef::User(user)) => &user.id,
        Some(AuthorRef::Id(id)) => id,
        None => "\u{2014}",
    }
}

/// Show the commit history of a repository.
///
/// The repository header is best-effort; the commit listing is not.
///
/// # Errors
///
/// Returns an error if the commit listing fails.
pub(crate) async fn run_commits(
    client: &ApiClient,
    session: &Session,
    repo_id: &str,
) -> anyhow::Result<()> {
    let (repo, commits) = tokio::join!(
        client.get_repository(session, repo_id),
        client.list_commits(session, repo_id),
    );
    let mut commits = commits?;

    match repo {
        Ok(repo) => {
            println!("{} ({})", repo.name, repo.visibility_label());
            if let Some(description) = repo.description.as_deref() {
                println!("{description}");
            }
        }
        Err(e) => {
            tracing::warn!(repo_id, error = %e, "repository fetch failed");
            println!("repository {repo_id}");
        }
    }
    println!();

    if commits.is_empty() {
        println!("No commits yet");
        return Ok(());
    }

    sort_newest_first(&mut commits);
    let now = Utc::now();
    println!("{:<9}{:<16}{:<16}MESSAGE", "COMMIT", "AGE", "AUTHOR");
    for commit in &commits {
        let age = relative_age_raw(commit.created_at_string().as_deref(), now);
        println!(
            "{:<9}{:<16}{:<16}{}",
            commit.short_id(),
            age,
            crate::truncate(author_label(commit), 14),
            crate::truncate(commit.message.lines().next().unwrap_or_default(), 60)
        );
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn format_kb(size: Option<u64>) -> String {
    size.map_or_else(
        || "\u{2014}".to_string(),
        |bytes| format!("{:.2} KB", bytes as f64 / 1024.0),
    )
}

/// Show a single commit and the files it recorded.
///
/// # Errors
///
/// Returns an error if the commit cannot be fetched.
pub(crate) async fn run_commit(
    client: &ApiClient,
    session: &Session,
    commit_id: &str,
) -> anyhow::Result<()> {
    let detail = client.get_commit(session, commit_id).await?;
    let commit = &detail.commit;
    let created_at = commit.created_at_string();

    println!(
        "commit {}",
        commit.commit_id.as_deref().unwrap_or(&commit.id)
    );
    println!("Author: {}", author_label(commit));
    println!(
        "Date:   {} ({})",
        created_at.as_deref().unwrap_or("\u{2014}"),
        relative_age_raw(created_at.as_deref(), Utc::now())
    );
    println!();
    for line in commit.message.lines() {
        println!("    {line}");
    }
    println!();

    if detail.files.is_empty() {
        println!("no files recorded");
        return Ok(());
    }
    println!("{:<50}SIZE", "FILE");
    for file in &detail.files {
        println!("{:<50}{}", file.filename, format_kb(file.size));
    }
    Ok(())
}

/// Star a repository for the signed-in user, or unstar it if already starred.
///
/// # Errors
///
/// Returns an error when not signed in or the request fails.
pub(crate) async fn run_star(
    client: &ApiClient,
    session: &Session,
    repo_id: &str,
) -> anyhow::Result<()> {
    let toggle = client.toggle_star(session, repo_id).await?;
    println!("{}", star_summary(repo_id, &toggle));
    Ok(())
}

fn star_summary(repo_id: &str, toggle: &StarToggle) -> String {
    let state = if toggle.is_starred {
        "starred"
    } else {
        "unstarred"
    };
    match toggle.message.as_deref() {
        Some(message) if !message.is_empty() => format!("repository {repo_id} {state}: {message}"),
        _ => format!("repository {repo_id} {state}"),
    }
}
