use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use codehub_api::{load_activity_tracked, ActivityReport, ApiClient, Connections, UserProfile};
use codehub_core::{AppConfig, Session, SubjectTracker};

use crate::render::render_heatmap;

/// Midnight UTC of `as_of`, or now.
fn reference_time(as_of: Option<NaiveDate>) -> DateTime<Utc> {
    as_of.map_or_else(Utc::now, |day| day.and_time(NaiveTime::MIN).and_utc())
}

/// Profile panels need a token; without one the service can only refuse.
fn panel_subject<'a>(session: &Session, subject: Option<&'a str>) -> Option<&'a str> {
    session.token().and(subject)
}

async fn fetch_profile(
    client: &ApiClient,
    session: &Session,
    user_id: Option<&str>,
) -> Option<UserProfile> {
    let user_id = user_id?;
    match client.get_user_profile(session, user_id).await {
        Ok(profile) => Some(profile),
        Err(e) => {
            tracing::warn!(user_id, error = %e, "profile fetch failed");
            None
        }
    }
}

async fn fetch_connections(
    client: &ApiClient,
    session: &Session,
    user_id: Option<&str>,
) -> Option<Connections> {
    let user_id = user_id?;
    match client.get_connections(session, user_id).await {
        Ok(connections) => Some(connections),
        Err(e) => {
            tracing::warn!(user_id, error = %e, "connections fetch failed");
            None
        }
    }
}

/// Show a user's profile and one-year contribution heat map.
///
/// Profile, connections and activity load concurrently. Each is best-effort:
/// a failure leaves that section out (or the series all zero) rather than
/// failing the command.
///
/// # Errors
///
/// Returns an error if JSON output cannot be serialized.
pub(crate) async fn run_profile(
    client: &ApiClient,
    session: &Session,
    config: &AppConfig,
    user: Option<&str>,
    as_of: Option<NaiveDate>,
    json: bool,
) -> anyhow::Result<()> {
    let reference = reference_time(as_of);
    let subject = panel_subject(session, user.or(session.user_id()));
    let tracker = SubjectTracker::new();

    let (report, profile, connections) = tokio::join!(
        load_activity_tracked(
            &tracker,
            client,
            session,
            user,
            reference,
            config.max_concurrent_fetches,
        ),
        fetch_profile(client, session, subject),
        fetch_connections(client, session, subject),
    );
    let Some(report) = report else {
        anyhow::bail!("activity load was superseded");
    };

    if json {
        let body = serde_json::json!({
            "profile": profile,
            "connections": connections,
            "activity": report,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    print_profile(profile.as_ref(), connections.as_ref(), &report);
    Ok(())
}

fn print_profile(
    profile: Option<&UserProfile>,
    connections: Option<&Connections>,
    report: &ActivityReport,
) {
    match (profile, report.user_id.as_deref()) {
        (Some(profile), _) => {
            println!("{}", profile.username);
            if let Some(email) = profile.email.as_deref() {
                println!("{email}");
            }
        }
        (None, Some(user_id)) => println!("user {user_id}"),
        (None, None) => {
            println!("not signed in; pass --user or set CODEHUB_USER_ID and CODEHUB_TOKEN");
        }
    }
    if let Some(connections) = connections {
        println!(
            "{} followers \u{b7} {} following",
            connections.followers.len(),
            connections.following.len()
        );
    }
    println!();

    let series = &report.series;
    println!(
        "{} contributions in the last year ({} to {})",
        series.total_contributions(),
        series.start(),
        series.end()
    );
    println!("{}", render_heatmap(series));
    println!();
    println!(
        "Active days: {}  Longest streak: {}  Current streak: {}",
        series.active_days(),
        series.longest_streak(),
        series.current_streak()
    );

    if let Some(error) = report.listing_error.as_deref() {
        println!("note: repository listing failed: {error}");
    }
    for failure in &report.failures {
        println!(
            "note: commits for {} unavailable: {}",
            failure.repository_name, failure.error
        );
    }
    let dropped = series.dropped();
    if dropped.malformed > 0 {
        println!(
            "note: {} commits skipped for missing or unreadable timestamps",
            dropped.malformed
        );
    }
}

/// List repositories starred by a user.
///
/// # Errors
///
/// Returns an error if no user resolves or the request fails.
pub(crate) async fn run_starred(
    client: &ApiClient,
    session: &Session,
    user: Option<&str>,
) -> anyhow::Result<()> {
    let user_id = crate::resolve_user(user, session)?;
    let starred = client.list_starred(session, user_id).await?;

    if starred.is_empty() {
        println!("no starred repositories for user {user_id}");
        return Ok(());
    }

    println!("{:<26}{:<10}DESCRIPTION", "NAME", "VISIBILITY");
    for repo in &starred {
        println!(
            "{:<26}{:<10}{}",
            crate::truncate(&repo.name, 24),
            repo.visibility_label(),
            crate::truncate(repo.description.as_deref().unwrap_or("\u{2014}"), 50)
        );
    }
    Ok(())
}

/// List followers and followed users.
///
/// # Errors
///
/// Returns an error if no user resolves or the request fails.
pub(crate) async fn run_connections(
    client: &ApiClient,
    session: &Session,
    user: Option<&str>,
) -> anyhow::Result<()> {
    let user_id = crate::resolve_user(user, session)?;
    let connections = client.get_connections(session, user_id).await?;

    for (title, users) in [
        ("Followers", &connections.followers),
        ("Following", &connections.following),
    ] {
        println!("{title} ({})", users.len());
        for user in users {
            let name = if user.username.is_empty() {
                &user.id
            } else {
                &user.username
            };
            println!("  {name}");
        }
    }
    Ok(())
}
