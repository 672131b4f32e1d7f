//! Tests for repository resolution.
//!
//! These verify that `ensure_exists` is idempotent, creates only when the
//! remote reports the repository missing, and propagates every other failure
//! without retrying.

use gitpad_core::{
    AccessToken, PublishError, PublishOptions, RepositoryRef, RepositoryResolver, Session,
};
use gitpad_test_utils::{InMemoryGitHub, Operation};
use proptest::prelude::*;
use std::sync::Arc;

fn signed_in() -> Arc<Session> {
    Arc::new(Session::with_token(AccessToken::new("gho_test")))
}

fn resolver(remote: &InMemoryGitHub, session: Arc<Session>) -> RepositoryResolver {
    RepositoryResolver::new(session, Arc::new(remote.clone()))
}

#[tokio::test]
async fn test_missing_repository_is_created_then_found() {
    let remote = InMemoryGitHub::new("octocat");
    let repo = RepositoryRef::new("octocat", "demo").unwrap();
    let resolver = resolver(&remote, signed_in());

    let first = resolver.ensure_exists(&repo).await.unwrap();
    assert!(!first.already_existed);
    assert!(remote.has_repository(&repo));

    let second = resolver.ensure_exists(&repo).await.unwrap();
    assert!(second.already_existed);
    assert_eq!(remote.call_count(Operation::CreateRepository), 1);
}

#[tokio::test]
async fn test_existing_repository_is_never_recreated() {
    let remote = InMemoryGitHub::new("octocat");
    let repo = RepositoryRef::new("octocat", "demo").unwrap();
    remote.add_repository(&repo);
    let resolver = resolver(&remote, signed_in());

    for _ in 0..2 {
        let resolution = resolver.ensure_exists(&repo).await.unwrap();
        assert!(resolution.already_existed);
    }
    assert_eq!(remote.call_count(Operation::CreateRepository), 0);
}

#[tokio::test]
async fn test_lookup_failure_is_propagated_without_create() {
    let remote = InMemoryGitHub::new("octocat");
    let repo = RepositoryRef::new("octocat", "demo").unwrap();
    remote.fail_next(
        Operation::GetRepository,
        PublishError::RateLimited {
            message: "API rate limit exceeded".to_string(),
        },
    );

    let failed = resolver(&remote, signed_in())
        .ensure_exists(&repo)
        .await
        .unwrap_err();

    assert_eq!(failed.0.kind(), "rate_limited");
    assert_eq!(remote.call_count(Operation::GetRepository), 1);
    assert_eq!(remote.call_count(Operation::CreateRepository), 0);
}

#[tokio::test]
async fn test_create_failure_is_propagated() {
    let remote = InMemoryGitHub::new("octocat");
    let repo = RepositoryRef::new("octocat", "demo").unwrap();
    remote.fail_next(
        Operation::CreateRepository,
        PublishError::rejected(403, "Resource not accessible by integration"),
    );

    let failed = resolver(&remote, signed_in())
        .ensure_exists(&repo)
        .await
        .unwrap_err();

    assert_eq!(
        failed.into_cause(),
        PublishError::rejected(403, "Resource not accessible by integration")
    );
}

#[tokio::test]
async fn test_missing_token_makes_no_calls() {
    let remote = InMemoryGitHub::new("octocat");
    let repo = RepositoryRef::new("octocat", "demo").unwrap();

    let failed = resolver(&remote, Arc::new(Session::new()))
        .ensure_exists(&repo)
        .await
        .unwrap_err();

    assert_eq!(failed.into_cause(), PublishError::Unauthenticated);
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn test_refuses_to_create_under_another_account() {
    let remote = InMemoryGitHub::new("octocat");
    let repo = RepositoryRef::new("hubot", "demo").unwrap();
    let session = signed_in();
    session.set_owner_login("octocat");

    let failed = resolver(&remote, session)
        .ensure_exists(&repo)
        .await
        .unwrap_err();

    assert_eq!(failed.0.kind(), "invalid_request");
    assert_eq!(remote.call_count(Operation::CreateRepository), 0);
}

#[tokio::test]
async fn test_owner_comparison_ignores_case() {
    let remote = InMemoryGitHub::new("octocat");
    let repo = RepositoryRef::new("OctoCat", "demo").unwrap();
    let session = signed_in();
    session.set_owner_login("octocat");

    let resolution = resolver(&remote, session)
        .ensure_exists(&repo)
        .await
        .unwrap();
    assert!(!resolution.already_existed);
}

#[tokio::test]
async fn test_private_option_reaches_remote() {
    let remote = InMemoryGitHub::new("octocat");
    let repo = RepositoryRef::new("octocat", "secret").unwrap();
    let options = PublishOptions {
        private: true,
        ..PublishOptions::default()
    };
    let resolver = RepositoryResolver::with_options(signed_in(), Arc::new(remote.clone()), &options);

    resolver.ensure_exists(&repo).await.unwrap();
    assert!(remote.has_repository(&repo));
}

/// For any repository name, two sequential `ensure_exists` calls yield
/// `false` then `true` when the repository was missing, and `true` twice when
/// it already existed.
#[test]
fn property_ensure_exists_is_idempotent() {
    let runtime = tokio::runtime::Runtime::new().unwrap();

    proptest!(|(
        name in "[a-z][a-z0-9_-]{0,30}",
        preexisting in any::<bool>(),
    )| {
        let remote = InMemoryGitHub::new("octocat");
        let repo = RepositoryRef::new("octocat", name).unwrap();
        if preexisting {
            remote.add_repository(&repo);
        }
        let resolver = resolver(&remote, signed_in());

        let (first, second) = runtime.block_on(async {
            let first = resolver.ensure_exists(&repo).await.unwrap();
            let second = resolver.ensure_exists(&repo).await.unwrap();
            (first, second)
        });

        prop_assert_eq!(first.already_existed, preexisting);
        prop_assert!(second.already_existed);
    });
}
