//! Unit tests for the GitHub client against a mocked REST API.
//!
//! These tests verify request shapes, status classification and the mapping
//! from GitHub responses onto the `RemoteApi` contract.

use gitpad_core::{AccessToken, FileWrite, PublishError, RemoteApi, RepositoryRef, RevisionMarker};
use gitpad_github::{GitHubClient, GitHubError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn token() -> AccessToken {
    AccessToken::new("gho_test")
}

fn demo() -> RepositoryRef {
    RepositoryRef::new("octocat", "demo").unwrap()
}

fn repository_body(name: &str, private: bool) -> serde_json::Value {
    json!({
        "id": 1296269,
        "name": name,
        "full_name": format!("octocat/{}", name),
        "owner": { "login": "octocat", "id": 1 },
        "private": private,
        "default_branch": "main",
        "html_url": format!("https://github.com/octocat/{}", name)
    })
}

fn error_body(message: &str) -> serde_json::Value {
    json!({
        "message": message,
        "documentation_url": "https://docs.github.com/rest"
    })
}

/// Test that an existing repository is reported with its metadata.
#[tokio::test]
async fn test_get_repository_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/demo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repository_body("demo", true)))
        .mount(&server)
        .await;

    let client = GitHubClient::with_api_url(server.uri());
    let info = client
        .get_repository(&token(), &demo())
        .await
        .unwrap()
        .expect("repository should be found");

    assert_eq!(info.owner, "octocat");
    assert_eq!(info.name, "demo");
    assert!(info.private);
    assert_eq!(info.default_branch.as_deref(), Some("main"));
}

/// Test that a 404 lookup is "not found", not an error.
#[tokio::test]
async fn test_get_repository_not_found_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/demo"))
        .respond_with(ResponseTemplate::new(404).set_body_json(error_body("Not Found")))
        .mount(&server)
        .await;

    let client = GitHubClient::with_api_url(server.uri());
    let result = client.get_repository(&token(), &demo()).await.unwrap();

    assert!(result.is_none());
}

/// Test that a rejected token surfaces as unauthenticated.
#[tokio::test]
async fn test_bad_credentials_is_unauthenticated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/demo"))
        .respond_with(ResponseTemplate::new(401).set_body_json(error_body("Bad credentials")))
        .mount(&server)
        .await;

    let client = GitHubClient::with_api_url(server.uri());
    let error = client.get_repository(&token(), &demo()).await.unwrap_err();

    assert_eq!(error, PublishError::Unauthenticated);
}

/// Test that a 403 rate-limit response is classified as rate limited.
#[tokio::test]
async fn test_rate_limit_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/demo"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(error_body("API rate limit exceeded for user ID 1.")),
        )
        .mount(&server)
        .await;

    let client = GitHubClient::with_api_url(server.uri());
    let error = client.get_repository(&token(), &demo()).await.unwrap_err();

    assert_eq!(error.kind(), "rate_limited");
}

/// Test that repository creation posts the name and visibility.
#[tokio::test]
async fn test_create_repository_sends_visibility() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .and(body_partial_json(json!({ "name": "demo", "private": false })))
        .respond_with(ResponseTemplate::new(201).set_body_json(repository_body("demo", false)))
        .expect(1)
        .mount(&server)
        .await;

    let client = GitHubClient::with_api_url(server.uri());
    let info = RemoteApi::create_repository(&client, &token(), "demo", false)
        .await
        .unwrap();

    assert_eq!(info.name, "demo");
    assert!(!info.private);
}

/// Test that GitHub's refusal to create a repository keeps its status and message.
#[tokio::test]
async fn test_create_repository_rejected_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(error_body("Repository creation failed.")),
        )
        .mount(&server)
        .await;

    let client = GitHubClient::with_api_url(server.uri());
    let error = RemoteApi::create_repository(&client, &token(), "demo", false)
        .await
        .unwrap_err();

    assert_eq!(
        error,
        PublishError::rejected(422, "Repository creation failed.")
    );
}

/// Test that a file's sha and decoded content are returned.
#[tokio::test]
async fn test_get_file_decodes_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/demo/contents/index.js"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "file",
            "name": "index.js",
            "path": "index.js",
            "sha": "abc123",
            "encoding": "base64",
            "content": "Y29uc29sZS5s\nb2coMSk=\n"
        })))
        .mount(&server)
        .await;

    let client = GitHubClient::with_api_url(server.uri());
    let file = client
        .get_file(&token(), &demo(), "index.js", None)
        .await
        .unwrap()
        .expect("file should be found");

    assert_eq!(file.revision, RevisionMarker::new("abc123"));
    assert_eq!(file.content.as_deref(), Some(&b"console.log(1)"[..]));
}

/// Test that a branch is passed as the `ref` query parameter.
#[tokio::test]
async fn test_get_file_on_branch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/demo/contents/index.js"))
        .and(query_param("ref", "draft"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "file",
            "sha": "def456",
            "encoding": "base64",
            "content": ""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GitHubClient::with_api_url(server.uri());
    let file = client
        .get_file(&token(), &demo(), "index.js", Some("draft"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(file.revision.as_str(), "def456");
    assert!(file.content.is_none());
}

/// Test that a missing file is "not found", not an error.
#[tokio::test]
async fn test_get_file_missing_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/demo/contents/index.js"))
        .respond_with(ResponseTemplate::new(404).set_body_json(error_body("Not Found")))
        .mount(&server)
        .await;

    let client = GitHubClient::with_api_url(server.uri());
    let file = client
        .get_file(&token(), &demo(), "index.js", None)
        .await
        .unwrap();

    assert!(file.is_none());
}

/// Test that a directory at the target path is an invalid request.
#[tokio::test]
async fn test_get_file_on_directory_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/demo/contents/src"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "type": "file", "name": "main.rs", "path": "src/main.rs", "sha": "abc" }
        ])))
        .mount(&server)
        .await;

    let client = GitHubClient::with_api_url(server.uri());
    let error = client
        .get_file(&token(), &demo(), "src", None)
        .await
        .unwrap_err();

    assert_eq!(error.kind(), "invalid_request");
}

/// Test that a new file is written without a sha and the new sha is returned.
#[tokio::test]
async fn test_put_new_file() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/octocat/demo/contents/index.js"))
        .and(body_partial_json(json!({
            "message": "init",
            "content": "Y29uc29sZS5sb2coMSk="
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "content": { "name": "index.js", "path": "index.js", "sha": "new123" },
            "commit": { "sha": "commit123" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GitHubClient::with_api_url(server.uri());
    let marker = client
        .put_file(
            &token(),
            &demo(),
            FileWrite {
                path: "index.js",
                content: b"console.log(1)",
                message: "init",
                revision: None,
                branch: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(marker.as_str(), "new123");
}

/// Test that an update carries the previous sha.
#[tokio::test]
async fn test_put_existing_file_sends_sha() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/octocat/demo/contents/index.js"))
        .and(body_partial_json(json!({ "sha": "abc123", "branch": "main" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": { "sha": "def456" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GitHubClient::with_api_url(server.uri());
    let previous = RevisionMarker::new("abc123");
    let marker = client
        .put_file(
            &token(),
            &demo(),
            FileWrite {
                path: "index.js",
                content: b"console.log(2)",
                message: "edit",
                revision: Some(&previous),
                branch: Some("main"),
            },
        )
        .await
        .unwrap();

    assert_eq!(marker.as_str(), "def456");
}

/// Test that a sha mismatch on write is a conflict.
#[tokio::test]
async fn test_put_sha_mismatch_is_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/octocat/demo/contents/index.js"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(error_body("index.js does not match abc123")),
        )
        .mount(&server)
        .await;

    let client = GitHubClient::with_api_url(server.uri());
    let stale = RevisionMarker::new("abc123");
    let error = client
        .put_file(
            &token(),
            &demo(),
            FileWrite {
                path: "index.js",
                content: b"x",
                message: "edit",
                revision: Some(&stale),
                branch: None,
            },
        )
        .await
        .unwrap_err();

    assert_eq!(error, PublishError::Conflict);
}

/// Test that the authenticated user's profile is returned.
#[tokio::test]
async fn test_authenticated_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "login": "octocat",
            "name": "The Octocat",
            "email": null
        })))
        .mount(&server)
        .await;

    let client = GitHubClient::with_api_url(server.uri());
    let user = client.authenticated_user(&token()).await.unwrap();

    assert_eq!(user.login, "octocat");
    assert_eq!(user.name.as_deref(), Some("The Octocat"));
    assert!(user.email.is_none());
}

/// Test that an unreachable API is a network failure.
#[tokio::test]
async fn test_unreachable_api_is_network_failure() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = GitHubClient::with_api_url(uri);
    let error = client.authenticated_user(&token()).await.unwrap_err();

    assert_eq!(error.kind(), "network_failure");
}

/// Test that the inherent API keeps GitHub's classification.
#[tokio::test]
async fn test_inherent_api_reports_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/demo"))
        .respond_with(ResponseTemplate::new(404).set_body_json(error_body("Not Found")))
        .mount(&server)
        .await;

    let client = GitHubClient::with_api_url(server.uri());
    let error = client.repository(&token(), &demo()).await.unwrap_err();

    assert!(matches!(error, GitHubError::NotFound { .. }));
}
