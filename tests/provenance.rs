//! End-to-end behavior of the provenance engine over scripted git and API

mod helper;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use futures::future::join_all;
use rstest::rstest;

use helper::{FakeApi, FakeGit, HEAD, create_engine};
use readme_provenance::provenance::{CommittishOverrides, GitError, ProvenanceError};

const OTHER: &str = "2222222222222222222222222222222222222222";
const TAG_OBJECT: &str = "3333333333333333333333333333333333333333";

/// ls-remote listing with v1.0.0 annotated (peeled to `commit`) and
/// v0.9.0 lightweight
fn listing(commit: &str) -> String {
    format!(
        "{TAG_OBJECT}\trefs/tags/v1.0.0\n{commit}\trefs/tags/v1.0.0^{{}}\n{OTHER}\trefs/tags/v0.9.0\n4444444444444444444444444444444444444444\trefs/tags/not-a-release\n"
    )
}

#[tokio::test]
async fn peeled_line_is_the_commit_and_plain_line_the_tag_object() {
    let git = Arc::new(FakeGit::new().with_head(HEAD).with_output("ls-remote", &listing(HEAD)));
    let api = Arc::new(FakeApi::new());
    let engine = create_engine(&git, &api);

    let catalog = engine.fetch_tag_catalog().await.unwrap();

    assert_eq!(catalog.len(), 2);
    let tag = catalog.get("1.0.0").unwrap();
    assert_eq!(tag.tag_sha(), Some(TAG_OBJECT));
    assert_eq!(tag.commit(), Some(HEAD));
    assert_eq!(tag.resolve_commit().await.unwrap(), HEAD);
    assert_eq!(git.calls("show-ref"), 0);
    assert_eq!(api.list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn api_fallback_leaves_commits_unresolved_until_requested() {
    let git = Arc::new(FakeGit::new().with_head(HEAD));
    let api = Arc::new(FakeApi::new().with_tag("v1.0.0", TAG_OBJECT, HEAD));
    let engine = create_engine(&git, &api);

    let catalog = engine.fetch_tag_catalog().await.unwrap();
    let tag = catalog.get("1.0.0").unwrap();

    assert_eq!(git.calls("ls-remote"), 1);
    assert_eq!(api.list_calls.load(Ordering::SeqCst), 1);
    assert_eq!(tag.tag_sha(), Some(TAG_OBJECT));
    assert_eq!(tag.commit(), None);
    assert_eq!(api.tag_commit_calls.load(Ordering::SeqCst), 0);

    assert_eq!(tag.resolve_commit().await.unwrap(), HEAD);
    assert_eq!(api.tag_commit_calls.load(Ordering::SeqCst), 1);

    assert_eq!(tag.resolve_commit().await.unwrap(), HEAD);
    assert_eq!(tag.commit(), Some(HEAD));
    assert_eq!(api.tag_commit_calls.load(Ordering::SeqCst), 1);
    assert_eq!(git.calls("show-ref"), 1);
}

#[tokio::test]
async fn both_strategies_failing_surfaces_the_git_failure_once() {
    let git = Arc::new(FakeGit::new().with_head(HEAD));
    let api = Arc::new(FakeApi::new());
    let engine = create_engine(&git, &api);

    let first = engine.fetch_tag_catalog().await.unwrap_err();
    let second = engine.fetch_tag_catalog().await.unwrap_err();

    match (&first, &second) {
        (ProvenanceError::Shared(a), ProvenanceError::Shared(b)) => assert!(Arc::ptr_eq(a, b)),
        other => panic!("expected shared errors, got {:?}", other),
    }
    match first.root() {
        ProvenanceError::CatalogUnavailable { repository, source } => {
            assert_eq!(repository, "github:owner/project");
            assert!(matches!(
                source,
                GitError::CommandFailed {
                    exit_code: Some(128),
                    ..
                }
            ));
        }
        other => panic!("expected catalog failure, got {:?}", other),
    }
    let message = first.to_string();
    assert!(message.contains("git ls-remote --tags https://github.com/owner/project.git"));
    assert!(message.contains("fatal: ls-remote unavailable"));
    assert!(message.contains("128"));
    assert!(!message.contains("404"));

    assert_eq!(git.calls("ls-remote"), 1);
    assert_eq!(api.list_calls.load(Ordering::SeqCst), 1);
}

#[rstest]
#[case(Some(HEAD), Some(listing(HEAD)), "1.0.0", Some(false))]
#[case(Some(HEAD), Some(listing(OTHER)), "1.0.0", Some(true))]
#[case(Some(HEAD), Some(listing(HEAD)), "9.9.9", Some(false))]
#[case(None, Some(listing(HEAD)), "1.0.0", None)]
#[case(None, Some(listing(HEAD)), "9.9.9", None)]
#[case(Some(HEAD), None, "1.0.0", None)]
#[tokio::test]
async fn is_older_released_version_is_three_valued(
    #[case] head: Option<&str>,
    #[case] ls_remote: Option<String>,
    #[case] version: &str,
    #[case] expected: Option<bool>,
) {
    let mut git = FakeGit::new();
    if let Some(head) = head {
        git = git.with_head(head);
    }
    if let Some(output) = &ls_remote {
        git = git.with_output("ls-remote", output);
    }
    let git = Arc::new(git);
    let api = Arc::new(FakeApi::new());
    let engine = create_engine(&git, &api);

    let result = engine.is_older_released_version(version).await.unwrap();

    assert_eq!(result, expected);
}

#[tokio::test]
async fn no_head_means_no_network() {
    let git = Arc::new(FakeGit::new().with_output("ls-remote", &listing(HEAD)));
    let api = Arc::new(FakeApi::new());
    let engine = create_engine(&git, &api);

    assert_eq!(engine.is_older_released_version("1.0.0").await.unwrap(), None);
    assert_eq!(git.calls("ls-remote"), 0);
    assert_eq!(api.list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unresolvable_tag_commit_is_an_error() {
    let git = Arc::new(FakeGit::new().with_head(HEAD));
    let api = Arc::new(FakeApi::new().with_unresolvable_tag("v1.0.0", TAG_OBJECT));
    let engine = create_engine(&git, &api);

    let catalog = engine.fetch_tag_catalog().await.unwrap();
    assert!(catalog.contains("1.0.0"));

    let error = engine.is_older_released_version("1.0.0").await.unwrap_err();

    assert!(matches!(error.root(), ProvenanceError::Api(_)));
    assert_eq!(catalog.get("1.0.0").unwrap().commit(), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unresolvable_tag_commit_is_looked_up_once() {
    let git = Arc::new(FakeGit::new().with_head(HEAD));
    let api = Arc::new(FakeApi::new().with_unresolvable_tag("v1.0.0", TAG_OBJECT));
    let engine = Arc::new(create_engine(&git, &api));

    let tasks = (0..5).map(|_| {
        let engine = engine.clone();
        tokio::spawn(async move { engine.is_older_released_version("1.0.0").await })
    });
    let results = join_all(tasks).await;
    let later = engine.is_older_released_version("1.0.0").await;

    let errors: Vec<_> = results
        .into_iter()
        .map(|joined| joined.unwrap())
        .chain([later])
        .map(|result| match result {
            Err(ProvenanceError::Shared(error)) => error,
            other => panic!("expected shared failure, got {:?}", other),
        })
        .collect();
    for error in &errors[1..] {
        assert!(Arc::ptr_eq(&errors[0], error));
    }
    assert_eq!(git.calls("show-ref"), 1);
    assert_eq!(api.tag_commit_calls.load(Ordering::SeqCst), 1);
}

fn overrides(
    committish: Option<&str>,
    commit: Option<&str>,
    branch: Option<&str>,
    tag: Option<&str>,
) -> CommittishOverrides {
    CommittishOverrides {
        committish: committish.map(str::to_string),
        commit: commit.map(str::to_string),
        branch: branch.map(str::to_string),
        tag: tag.map(str::to_string),
    }
}

#[rstest]
#[case(overrides(Some("X"), Some("Y"), Some("Z"), Some("W")), HEAD, "X")]
#[case(overrides(None, Some("Y"), Some("Z"), Some("W")), HEAD, "Y")]
#[case(overrides(None, None, Some("Z"), Some("W")), HEAD, "Z")]
#[case(overrides(None, None, None, Some("W")), HEAD, "W")]
#[case(CommittishOverrides::default(), HEAD, "v1.0.0")]
#[case(CommittishOverrides::default(), OTHER, "")]
#[tokio::test]
async fn select_committish_follows_overrides_then_release(
    #[case] overrides: CommittishOverrides,
    #[case] released_from: &str,
    #[case] expected: &str,
) {
    let git = Arc::new(
        FakeGit::new()
            .with_head(HEAD)
            .with_output("ls-remote", &listing(released_from)),
    );
    let api = Arc::new(FakeApi::new());
    let engine = create_engine(&git, &api);

    let result = engine
        .select_committish(&overrides, Some("1.0.0"))
        .await
        .unwrap();

    assert_eq!(result, expected);
}

#[tokio::test]
async fn select_committish_pins_unreleased_version() {
    let git = Arc::new(FakeGit::new().with_head(HEAD).with_output("ls-remote", &listing(OTHER)));
    let api = Arc::new(FakeApi::new());
    let engine = create_engine(&git, &api);

    let result = engine
        .select_committish(&CommittishOverrides::default(), Some("2.0.0"))
        .await
        .unwrap();

    assert_eq!(result, "v2.0.0");
}

#[tokio::test]
async fn select_committish_without_version_is_empty() {
    let git = Arc::new(FakeGit::new().with_head(HEAD));
    let api = Arc::new(FakeApi::new());
    let engine = create_engine(&git, &api);

    let result = engine
        .select_committish(&CommittishOverrides::default(), None)
        .await
        .unwrap();

    assert_eq!(result, "");
    assert_eq!(git.calls("rev-parse"), 0);
    assert_eq!(git.calls("ls-remote"), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_run_each_lookup_once() {
    let git = Arc::new(FakeGit::new().with_head(HEAD));
    let api = Arc::new(FakeApi::new().with_tag("v1.0.0", TAG_OBJECT, OTHER));
    let engine = Arc::new(create_engine(&git, &api));

    let tasks = (0..24).map(|i| {
        let engine = engine.clone();
        tokio::spawn(async move {
            match i % 3 {
                0 => engine
                    .is_older_released_version("1.0.0")
                    .await
                    .map(|older| format!("{older:?}")),
                1 => engine
                    .select_committish(&CommittishOverrides::default(), Some("1.0.0"))
                    .await,
                _ => Ok(engine.resolve_head_commit().await.unwrap_or_default()),
            }
        })
    });

    let results: Vec<String> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    for (i, result) in results.iter().enumerate() {
        let expected = match i % 3 {
            0 => "Some(true)",
            1 => "",
            _ => HEAD,
        };
        assert_eq!(result, expected);
    }
    assert_eq!(git.calls("rev-parse"), 1);
    assert_eq!(git.calls("ls-remote"), 1);
    assert_eq!(git.calls("show-ref"), 1);
    assert_eq!(api.list_calls.load(Ordering::SeqCst), 1);
    assert_eq!(api.tag_commit_calls.load(Ordering::SeqCst), 1);
}
