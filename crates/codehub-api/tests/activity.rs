//! Integration tests for the activity loader: fan-out over repositories,
//! partial failure handling, and discarding results for superseded subjects.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use codehub_api::{load_activity, load_activity_tracked, ApiClient};
use codehub_core::{SeverityTier, Session, SubjectTracker};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, 5, "codehub-test/0.1").expect("client construction should not fail")
}

fn reference() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 18, 0, 0).unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn mount_repositories(server: &MockServer, user_id: &str, ids: &[&str]) {
    let repositories: Vec<_> = ids
        .iter()
        .map(|id| json!({"_id": id, "name": format!("repo-{id}"), "visibility": true}))
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("/repo/user/{user_id}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "repositories": repositories })),
        )
        .mount(server)
        .await;
}

async fn mount_commits(server: &MockServer, repo_id: &str, stamps: &[&str]) {
    let commits: Vec<_> = stamps
        .iter()
        .enumerate()
        .map(|(i, ts)| json!({"_id": format!("{repo_id}-{i}"), "message": "m", "createdAt": ts}))
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("/repo/{repo_id}/commits")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "commits": commits })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn aggregates_commits_of_every_repository() {
    let server = MockServer::start().await;
    mount_repositories(&server, "u1", &["r1"]).await;
    mount_commits(
        &server,
        "r1",
        &[
            "2024-06-15T08:00:00.000Z",
            "2024-06-15T09:00:00.000Z",
            "2024-06-15T10:00:00.000Z",
            "2024-06-10T10:00:00.000Z",
        ],
    )
    .await;

    let client = test_client(&server.uri());
    let report = load_activity(
        &client,
        &Session::logged_in("u1", "tok"),
        None,
        reference(),
        4,
    )
    .await;

    assert_eq!(report.user_id.as_deref(), Some("u1"));
    assert!(report.is_complete());
    assert_eq!(report.repositories.len(), 1);

    let series = &report.series;
    assert_eq!(series.total_contributions(), 4);
    let june_15 = series.bucket(day(2024, 6, 15)).unwrap();
    assert_eq!(june_15.count, 3);
    assert_eq!(june_15.tier(), SeverityTier::Medium);
    let june_10 = series.bucket(day(2024, 6, 10)).unwrap();
    assert_eq!(june_10.count, 1);
    assert_eq!(june_10.tier(), SeverityTier::Low);
}

#[tokio::test]
async fn failed_repository_only_removes_its_own_commits() {
    let server = MockServer::start().await;
    mount_repositories(&server, "u1", &["good", "bad"]).await;
    mount_commits(&server, "good", &["2024-06-01T10:00:00Z", "2024-06-02T10:00:00Z"]).await;
    Mock::given(method("GET"))
        .and(path("/repo/bad/commits"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let report = load_activity(
        &client,
        &Session::logged_in("u1", "tok"),
        None,
        reference(),
        4,
    )
    .await;

    assert_eq!(report.series.len(), 367);
    assert_eq!(report.series.total_contributions(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].repository_id, "bad");
    assert_eq!(report.failures[0].repository_name, "repo-bad");
    assert!(report.listing_error.is_none());
    assert!(!report.is_complete());
}

#[tokio::test]
async fn explicit_subject_overrides_session_user() {
    let server = MockServer::start().await;
    mount_repositories(&server, "other", &["r7"]).await;
    mount_commits(&server, "r7", &["2024-05-05T05:05:05Z"]).await;

    let client = test_client(&server.uri());
    let report = load_activity(
        &client,
        &Session::logged_in("u1", "tok"),
        Some("other"),
        reference(),
        1,
    )
    .await;

    assert_eq!(report.user_id.as_deref(), Some("other"));
    assert_eq!(report.series.total_contributions(), 1);
}

#[tokio::test]
async fn rejected_credential_degrades_to_empty_series() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repo/user/u1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let report = load_activity(
        &client,
        &Session::logged_in("u1", "expired"),
        None,
        reference(),
        4,
    )
    .await;

    assert!(report.repositories.is_empty());
    assert!(report.listing_error.is_some());
    assert_eq!(report.series.total_contributions(), 0);
    assert_eq!(report.series.len(), 367);
}

#[tokio::test]
async fn anonymous_session_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());

    let no_identity = load_activity(&client, &Session::anonymous(), None, reference(), 4).await;
    assert!(no_identity.user_id.is_none());
    assert_eq!(no_identity.series.total_contributions(), 0);

    let no_token =
        load_activity(&client, &Session::anonymous(), Some("u1"), reference(), 4).await;
    assert_eq!(no_token.user_id.as_deref(), Some("u1"));
    assert_eq!(no_token.series.total_contributions(), 0);
    assert!(no_token.is_complete());
}

#[tokio::test]
async fn results_for_superseded_subject_are_discarded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repo/user/alice"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"repositories": []}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    mount_repositories(&server, "bob", &[]).await;

    let client = test_client(&server.uri());
    let session = Session::logged_in("me", "tok");
    let tracker = SubjectTracker::new();

    let stale = load_activity_tracked(&tracker, &client, &session, Some("alice"), reference(), 4);
    let fresh = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        load_activity_tracked(&tracker, &client, &session, Some("bob"), reference(), 4).await
    };
    let (stale, fresh) = tokio::join!(stale, fresh);

    assert!(stale.is_none(), "alice's late result must be dropped");
    let fresh = fresh.expect("bob's result is current");
    assert_eq!(fresh.user_id.as_deref(), Some("bob"));
}
