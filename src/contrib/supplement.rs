use super::{spinner, ContributorMap};
use crate::error::ContribError;
use crate::github::{CommitItem, GitHubApi, Paginator, RepoRef};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Attribute the commits made after `repo` was created to contributors
/// already present in `contributors`.
///
/// The creation time must be readable, anything else is fatal. A failed
/// history walk is logged and leaves `contributors` as it was.
pub async fn supplement_commits(
    api: &dyn GitHubApi,
    repo: &RepoRef,
    contributors: &mut ContributorMap,
) -> Result<()> {
    let created_at = api
        .repo_created_at(repo)
        .await
        .context(ContribError::CreationTimeUnavailable {
            repo: repo.to_string(),
        })?;
    debug!("{} was created at {}", repo, created_at);

    let pb = spinner(format!("Fetching {} commits...", repo));
    let history = Paginator::new(|page| api.list_commits(repo, page))
        .stop_after(move |commits: &[CommitItem]| predates(commits, created_at))
        .collect()
        .await;

    let commits = match history {
        Ok(history) => {
            pb.finish_with_message(format!("Fetching {} commits done", repo));
            debug!(
                "Read {} commits of {} over {} pages ({:?})",
                history.items.len(),
                repo,
                history.pages,
                history.termination
            );
            history.items
        }
        Err(err) => {
            pb.abandon_with_message(format!("Fetching {} commits failed", repo));
            warn!("Fetching {} contributors commits failed: {:#}", repo, err);
            return Ok(());
        }
    };

    let attributed = attribute(commits, created_at, contributors);
    info!("Attributed {} commits of {}", attributed, repo);
    Ok(())
}

/// True when the page reaches back past the creation time.
fn predates(commits: &[CommitItem], created_at: DateTime<Utc>) -> bool {
    commits.iter().any(|commit| commit.date() < created_at)
}

/// Append the URL of each commit authored strictly after `created_at` by a
/// known contributor. Returns how many were attributed.
fn attribute(
    commits: Vec<CommitItem>,
    created_at: DateTime<Utc>,
    contributors: &mut ContributorMap,
) -> usize {
    let mut attributed = 0;

    for commit in commits {
        let Some(login) = commit.login() else {
            continue;
        };
        if commit.date() <= created_at {
            continue;
        }
        // attribution never introduces a contributor
        if let Some(record) = contributors.get_mut(login) {
            record.commit_urls.push(commit.url().to_string());
            attributed += 1;
        }
    }

    attributed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contrib::fake::{commit, ts, FakeApi, FakeRepo};
    use crate::contrib::ContributorRecord;

    fn seeded(logins: &[&str]) -> ContributorMap {
        logins
            .iter()
            .map(|login| (login.to_string(), ContributorRecord::new(format!("avatar-{}", login))))
            .collect()
    }

    fn repo() -> RepoRef {
        RepoRef::new("acme", "rocket")
    }

    #[tokio::test]
    async fn boundary_and_pre_creation_commits_are_excluded() {
        let api = FakeApi::default().with_repo(
            repo(),
            FakeRepo {
                created_at: Some(ts("2020-01-01T00:00:00Z")),
                commit_pages: vec![
                    vec![
                        commit(Some("alice"), "2021-06-01T00:00:00Z", "c1"),
                        commit(Some("bob"), "2020-01-01T00:00:00Z", "c2"),
                    ],
                    vec![commit(Some("alice"), "2019-12-31T00:00:00Z", "c3")],
                    vec![commit(Some("alice"), "2019-06-01T00:00:00Z", "c4")],
                ],
                ..FakeRepo::default()
            },
        );
        let mut map = seeded(&["alice", "bob"]);

        supplement_commits(&api, &repo(), &mut map).await.unwrap();

        assert_eq!(map["alice"].commit_urls, vec!["https://api.example/commits/c1"]);
        assert!(map["bob"].commit_urls.is_empty());
        // page 2 holds the pre-creation commit, page 3 is never requested
        assert_eq!(
            api.requests(),
            vec![
                "created acme/rocket",
                "commits acme/rocket 1",
                "commits acme/rocket 2",
            ]
        );
    }

    #[tokio::test]
    async fn post_creation_commits_on_triggering_page_are_kept() {
        let api = FakeApi::default().with_repo(
            repo(),
            FakeRepo {
                created_at: Some(ts("2020-01-01T00:00:00Z")),
                commit_pages: vec![vec![
                    commit(Some("alice"), "2020-01-02T00:00:00Z", "c1"),
                    commit(Some("alice"), "2019-01-01T00:00:00Z", "c2"),
                    // out of order: newer than creation but after an older one
                    commit(Some("alice"), "2020-03-01T00:00:00Z", "c3"),
                ]],
                ..FakeRepo::default()
            },
        );
        let mut map = seeded(&["alice"]);

        supplement_commits(&api, &repo(), &mut map).await.unwrap();

        assert_eq!(
            map["alice"].commit_urls,
            vec!["https://api.example/commits/c1", "https://api.example/commits/c3"]
        );
    }

    #[tokio::test]
    async fn unattributed_and_unknown_authors_are_skipped() {
        let api = FakeApi::default().with_repo(
            repo(),
            FakeRepo {
                created_at: Some(ts("2020-01-01T00:00:00Z")),
                commit_pages: vec![vec![
                    commit(None, "2021-01-01T00:00:00Z", "c1"),
                    commit(Some("mallory"), "2021-01-02T00:00:00Z", "c2"),
                    commit(Some("alice"), "2021-01-03T00:00:00Z", "c3"),
                ]],
                ..FakeRepo::default()
            },
        );
        let mut map = seeded(&["alice"]);

        supplement_commits(&api, &repo(), &mut map).await.unwrap();

        assert_eq!(map.len(), 1);
        assert!(!map.contains_key("mallory"));
        assert_eq!(map["alice"].commit_count(), 1);
    }

    #[tokio::test]
    async fn missing_creation_time_is_fatal() {
        let api = FakeApi::default().with_repo(repo(), FakeRepo::default());
        let mut map = seeded(&["alice"]);

        let err = supplement_commits(&api, &repo(), &mut map)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ContribError>(),
            Some(ContribError::CreationTimeUnavailable { .. })
        ));
        assert_eq!(api.requests(), vec!["created acme/rocket"]);
    }

    #[tokio::test]
    async fn history_failure_keeps_seeded_contributors() {
        let mut api = FakeApi::default().with_repo(
            repo(),
            FakeRepo {
                created_at: Some(ts("2020-01-01T00:00:00Z")),
                ..FakeRepo::default()
            },
        );
        api.failing_commits.insert(repo());
        let mut map = seeded(&["alice", "bob"]);

        supplement_commits(&api, &repo(), &mut map).await.unwrap();

        assert_eq!(map, seeded(&["alice", "bob"]));
    }

    #[test]
    fn predicate_is_strictly_before_creation() {
        let created = ts("2020-01-01T00:00:00Z");
        let at_boundary = [commit(Some("a"), "2020-01-01T00:00:00Z", "x")];
        let before = [commit(Some("a"), "2019-12-31T23:59:59Z", "y")];

        assert!(!predates(&at_boundary, created));
        assert!(predates(&before, created));
    }
}
