//! Integration tests for `ApiClient` endpoints using wiremock HTTP mocks.

use codehub_api::{ApiClient, ApiError, AuthorRef, NewRepository, StarToggle};
use codehub_core::Session;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, 5, "codehub-test/0.1").expect("client construction should not fail")
}

fn session() -> Session {
    Session::logged_in("u1", "tok")
}

#[tokio::test]
async fn list_user_repositories_sends_bearer_and_parses() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repo/user/u1"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "repositories": [
                {"_id": "r1", "name": "alpha", "description": "first", "visibility": true},
                {"_id": "r2", "name": "beta", "description": null, "visibility": false}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let repos = test_client(&server.uri())
        .list_user_repositories(&session(), "u1")
        .await
        .expect("should parse repositories");

    assert_eq!(repos.len(), 2);
    assert_eq!(repos[0].id, "r1");
    assert_eq!(repos[0].description.as_deref(), Some("first"));
    assert!(repos[0].visibility);
    assert_eq!(repos[1].name, "beta");
    assert!(repos[1].description.is_none());
}

#[tokio::test]
async fn anonymous_session_sends_no_authorization_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repo/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "r1", "name": "alpha"
        })))
        .mount(&server)
        .await;

    let repo = test_client(&server.uri())
        .get_repository(&Session::anonymous(), "r1")
        .await
        .expect("public repository should load");
    assert_eq!(repo.name, "alpha");

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn list_commits_parses_commit_documents() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repo/r1/commits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "commits": [{
                "_id": "c1",
                "commitId": "abcdef0123456",
                "message": "initial import",
                "author": {"_id": "u1", "username": "octo"},
                "createdAt": "2024-06-15T10:00:00.000Z",
                "files": ["a.txt", "b.txt"]
            }]
        })))
        .mount(&server)
        .await;

    let commits = test_client(&server.uri())
        .list_commits(&session(), "r1")
        .await
        .expect("should parse commits");

    assert_eq!(commits.len(), 1);
    let commit = &commits[0];
    assert_eq!(commit.message, "initial import");
    assert_eq!(commit.short_id(), "abcdef0");
    assert_eq!(commit.author_name(), Some("octo"));
    assert_eq!(commit.files.len(), 2);
    assert_eq!(
        commit.created_at_string().as_deref(),
        Some("2024-06-15T10:00:00.000Z")
    );
}

#[tokio::test]
async fn get_commit_returns_commit_and_files() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/commit/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "commit": {
                "_id": "c1",
                "commitId": "abc123",
                "message": "fix",
                "author": "u1",
                "createdAt": "2024-06-15T10:00:00Z"
            },
            "files": [{"filename": "src/main.rs", "size": 2048}]
        })))
        .mount(&server)
        .await;

    let detail = test_client(&server.uri())
        .get_commit(&session(), "abc123")
        .await
        .expect("should parse commit detail");

    assert_eq!(detail.commit.message, "fix");
    assert_eq!(detail.commit.author, Some(AuthorRef::Id("u1".to_string())));
    assert_eq!(detail.files.len(), 1);
    assert_eq!(detail.files[0].filename, "src/main.rs");
    assert_eq!(detail.files[0].size, Some(2048));
}

#[tokio::test]
async fn unauthorized_maps_to_typed_error_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repo/user/u1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "bad token"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_retry_policy(3, 0);
    let result = client.list_user_repositories(&session(), "u1").await;
    assert!(
        matches!(result, Err(ApiError::Unauthorized { .. })),
        "expected Unauthorized, got: {result:?}"
    );
}

#[tokio::test]
async fn not_found_maps_to_typed_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repo/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = test_client(&server.uri())
        .get_repository(&session(), "missing")
        .await;
    assert!(matches!(result, Err(ApiError::NotFound { .. })));
}

#[tokio::test]
async fn server_error_is_retried_until_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repo/r1/commits"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repo/r1/commits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"commits": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_retry_policy(2, 0);
    let commits = client
        .list_commits(&session(), "r1")
        .await
        .expect("third attempt should succeed");
    assert!(commits.is_empty());
}

#[tokio::test]
async fn server_error_surfaces_when_retries_are_disabled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repo/r1/commits"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_client(&server.uri())
        .list_commits(&session(), "r1")
        .await;
    assert!(matches!(
        result,
        Err(ApiError::UnexpectedStatus { status: 500, .. })
    ));
}

#[tokio::test]
async fn malformed_body_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repo/user/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = test_client(&server.uri())
        .list_user_repositories(&session(), "u1")
        .await;
    assert!(matches!(result, Err(ApiError::Deserialize { .. })));
}

#[tokio::test]
async fn user_profile_starred_and_connections() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/userProfile/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "u1", "username": "octo", "email": "octo@example.com", "followedUsers": []
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/starred/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "r9", "name": "starred-one", "visibility": true}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/connections/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "followers": [{"_id": "u2", "username": "hubot"}],
            "following": null
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let session = session();

    let profile = client.get_user_profile(&session, "u1").await.unwrap();
    assert_eq!(profile.username, "octo");
    assert_eq!(profile.email.as_deref(), Some("octo@example.com"));

    let starred = client.list_starred(&session, "u1").await.unwrap();
    assert_eq!(starred.len(), 1);
    assert_eq!(starred[0].name, "starred-one");

    let connections = client.get_connections(&session, "u1").await.unwrap();
    assert_eq!(connections.followers.len(), 1);
    assert_eq!(connections.followers[0].username, "hubot");
    assert!(connections.following.is_empty());
}

#[tokio::test]
async fn starred_null_body_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/starred/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let starred = test_client(&server.uri())
        .list_starred(&session(), "u1")
        .await
        .unwrap();
    assert!(starred.is_empty());
}

#[tokio::test]
async fn toggle_star_posts_empty_object_for_session_user() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/star/u1/r9"))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "isStarred": false,
            "message": "Repository unstarred"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let toggle = test_client(&server.uri())
        .toggle_star(&session(), "r9")
        .await
        .expect("star toggle should succeed");
    assert_eq!(
        toggle,
        StarToggle {
            is_starred: false,
            message: Some("Repository unstarred".to_string()),
        }
    );
}

#[tokio::test]
async fn post_is_not_retried_on_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/star/u1/r9"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_retry_policy(3, 0);
    let result = client.toggle_star(&session(), "r9").await;
    assert!(matches!(
        result,
        Err(ApiError::UnexpectedStatus { status: 503, .. })
    ));
}

#[tokio::test]
async fn list_all_and_search_repositories() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repo/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "r1", "name": "alpha", "visibility": true},
            {"_id": "r2", "name": "beta", "visibility": true}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repo/search"))
        .and(query_param("query", "heat map"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "r3", "name": "heat-map", "visibility": true}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let all = client
        .list_all_repositories(&Session::anonymous())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let found = client
        .search_repositories(&Session::anonymous(), "heat map")
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "heat-map");
}

#[tokio::test]
async fn create_repository_posts_owner_and_empty_collections() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repo/create"))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(json!({
            "owner": "u1",
            "name": "gamma",
            "description": "",
            "visibility": false,
            "content": [],
            "issues": []
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "created"})))
        .expect(1)
        .mount(&server)
        .await;

    let repository = NewRepository {
        name: "gamma".to_string(),
        description: None,
        visibility: false,
    };
    test_client(&server.uri())
        .create_repository(&session(), &repository)
        .await
        .expect("repository creation should succeed");
}

#[tokio::test]
async fn create_repository_requires_a_signed_in_user() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let repository = NewRepository {
        name: "gamma".to_string(),
        description: None,
        visibility: true,
    };
    let result = test_client(&server.uri())
        .create_repository(&Session::anonymous(), &repository)
        .await;
    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[tokio::test]
async fn toggle_star_requires_a_signed_in_user() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = test_client(&server.uri())
        .toggle_star(&Session::anonymous(), "r9")
        .await;
    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}
