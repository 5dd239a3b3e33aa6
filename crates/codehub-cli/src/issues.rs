use chrono::Utc;
use clap::ValueEnum;
use codehub_api::{ApiClient, Issue, IssueStatus, IssueUpdate, NewIssue};
use codehub_core::{relative_age_raw, Session};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum StateFilter {
    #[default]
    All,
    Open,
    Closed,
}

impl StateFilter {
    fn matches(self, status: IssueStatus) -> bool {
        match self {
            StateFilter::All => true,
            StateFilter::Open => status == IssueStatus::Open,
            StateFilter::Closed => status == IssueStatus::Closed,
        }
    }
}

/// Open and closed counts, in that order.
fn status_counts(issues: &[Issue]) -> (usize, usize) {
    let open = issues
        .iter()
        .filter(|i| i.status == IssueStatus::Open)
        .count();
    (open, issues.len() - open)
}

/// Trimmed, non-empty labels.
pub(crate) fn clean_labels(labels: &[String]) -> Vec<String> {
    labels
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect()
}

fn creator_label(issue: &Issue) -> &str {
    issue.creator_name().unwrap_or("\u{2014}")
}

/// List the issues of a repository.
///
/// # Errors
///
/// Returns an error if the issue listing fails.
pub(crate) async fn run_issues(
    client: &ApiClient,
    session: &Session,
    repo_id: &str,
    state: StateFilter,
) -> anyhow::Result<()> {
    let issues = client.list_issues(session, repo_id).await?;
    let (open, closed) = status_counts(&issues);
    println!("{open} open \u{b7} {closed} closed");
    println!();

    let shown: Vec<&Issue> = issues.iter().filter(|i| state.matches(i.status)).collect();
    if shown.is_empty() {
        println!("no issues");
        return Ok(());
    }

    let now = Utc::now();
    println!(
        "{:<8}{:<8}{:<16}{:<16}TITLE",
        "ID", "STATUS", "OPENED", "BY"
    );
    for issue in shown {
        let labels = if issue.labels.is_empty() {
            String::new()
        } else {
            format!(" [{}]", issue.labels.join(", "))
        };
        println!(
            "{:<8}{:<8}{:<16}{:<16}{}{}",
            issue.short_id(),
            issue.status,
            relative_age_raw(issue.created_at.as_deref(), now),
            crate::truncate(creator_label(issue), 14),
            crate::truncate(&issue.title, 60),
            labels
        );
    }
    Ok(())
}

/// Show one issue in full.
///
/// # Errors
///
/// Returns an error if the issue cannot be fetched.
pub(crate) async fn run_issue_show(
    client: &ApiClient,
    session: &Session,
    issue_id: &str,
) -> anyhow::Result<()> {
    let issue = client.get_issue(session, issue_id).await?;
    let now = Utc::now();

    println!("{} ({})", issue.title, issue.status);
    println!(
        "opened by {} {}",
        creator_label(&issue),
        relative_age_raw(issue.created_at.as_deref(), now)
    );
    if let Some(repository) = issue.repository_name() {
        println!("Repository: {repository}");
    }
    if let Some(assignee) = issue.assignee_name() {
        println!("Assignee:   {assignee}");
    }
    if !issue.labels.is_empty() {
        println!("Labels:     {}", issue.labels.join(", "));
    }
    println!();
    for line in issue.description.lines() {
        println!("    {line}");
    }
    if issue.updated_at.is_some() {
        println!();
        println!(
            "last updated {}",
            relative_age_raw(issue.updated_at.as_deref(), now)
        );
    }
    Ok(())
}

/// Open an issue on a repository.
///
/// # Errors
///
/// Returns an error if the title or description is blank or the request fails.
pub(crate) async fn run_issue_create(
    client: &ApiClient,
    session: &Session,
    repo_id: &str,
    title: &str,
    description: &str,
    labels: &[String],
) -> anyhow::Result<()> {
    let issue = NewIssue {
        title: crate::require_text("title", title)?.to_string(),
        description: crate::require_text("description", description)?.to_string(),
        labels: clean_labels(labels),
    };
    client.create_issue(session, repo_id, &issue).await?;
    println!("opened issue '{}' on repository {repo_id}", issue.title);
    Ok(())
}

/// Close or reopen an issue.
///
/// # Errors
///
/// Returns an error if the request fails.
pub(crate) async fn run_issue_set_status(
    client: &ApiClient,
    session: &Session,
    issue_id: &str,
    status: IssueStatus,
) -> anyhow::Result<()> {
    client
        .update_issue(session, issue_id, &IssueUpdate::status(status))
        .await?;
    println!("issue {issue_id} is now {status}");
    Ok(())
}

/// Build the update for `issue edit`. Blank values are rejected; a bare
/// `--label ""` clears the labels.
fn edit_update(
    title: Option<&str>,
    description: Option<&str>,
    labels: Option<&[String]>,
) -> anyhow::Result<IssueUpdate> {
    let update = IssueUpdate {
        title: title
            .map(|t| crate::require_text("title", t).map(str::to_owned))
            .transpose()?,
        description: description
            .map(|d| crate::require_text("description", d).map(str::to_owned))
            .transpose()?,
        status: None,
        labels: labels.map(clean_labels),
    };
    if update.is_empty() {
        anyhow::bail!("nothing to change; pass --title, --description or --label");
    }
    Ok(update)
}

/// Change an issue's title, description or labels.
///
/// # Errors
///
/// Returns an error if no change is given or the request fails.
pub(crate) async fn run_issue_edit(
    client: &ApiClient,
    session: &Session,
    issue_id: &str,
    title: Option<&str>,
    description: Option<&str>,
    labels: Option<&[String]>,
) -> anyhow::Result<()> {
    let update = edit_update(title, description, labels)?;
    client.update_issue(session, issue_id, &update).await?;
    println!("updated issue {issue_id}");
    Ok(())
}

/// Delete an issue. Requires `confirmed`.
///
/// # Errors
///
/// Returns an error if not confirmed or the request fails.
pub(crate) async fn run_issue_delete(
    client: &ApiClient,
    session: &Session,
    issue_id: &str,
    confirmed: bool,
) -> anyhow::Result<()> {
    if !confirmed {
        anyhow::bail!("deleting issue {issue_id} cannot be undone; pass --yes to confirm");
    }
    client.delete_issue(session, issue_id).await?;
    println!("deleted issue {issue_id}");
    Ok(())
}
