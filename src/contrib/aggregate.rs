use super::{collect_contributors, ContributorMap, ContributorRecord};
use crate::github::{GitHubApi, RepoRef};
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Run-wide contributor accumulator.
#[derive(Debug, Default)]
pub struct Aggregator {
    contributors: ContributorMap,
    repos_merged: usize,
}

/// Contributors ordered by commit count, highest first. Equal counts keep
/// the order in which contributors were first merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ranking {
    entries: Vec<(String, ContributorRecord)>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contributors(&self) -> &ContributorMap {
        &self.contributors
    }

    pub fn repos_merged(&self) -> usize {
        self.repos_merged
    }

    /// Fold one repository's contributors into the run.
    pub fn merge(&mut self, contributors: ContributorMap) {
        for (login, record) in contributors {
            match self.contributors.get_mut(&login) {
                Some(existing) => existing.merge(record),
                None => {
                    self.contributors.insert(login, record);
                }
            }
        }
        self.repos_merged += 1;
    }

    /// Collect and merge every repository in `repos` except the one named
    /// `exclude`.
    ///
    /// With `concurrency > 1` up to that many repositories are collected at
    /// once; results are still merged in `repos` order.
    pub async fn collect(
        &mut self,
        api: Arc<dyn GitHubApi>,
        repos: &[RepoRef],
        exclude: Option<&str>,
        concurrency: usize,
    ) -> Result<()> {
        let targets: Vec<RepoRef> = repos
            .iter()
            .filter(|repo| {
                let skip = exclude.is_some_and(|name| repo.repo == name);
                if skip {
                    info!("Skipping excluded repository {}", repo);
                }
                !skip
            })
            .cloned()
            .collect();

        if concurrency <= 1 {
            for repo in &targets {
                let contributors = collect_contributors(api.as_ref(), repo).await?;
                self.merge(contributors);
            }
        } else {
            for contributors in collect_concurrently(api, targets, concurrency).await? {
                self.merge(contributors);
            }
        }

        info!(
            "Merged {} repositories into {} contributors",
            self.repos_merged(),
            self.contributors().len()
        );
        Ok(())
    }

    pub fn ranking(self) -> Ranking {
        let mut entries: Vec<_> = self.contributors.into_iter().collect();
        // stable: ties keep merge order
        entries.sort_by(|a, b| b.1.commit_count().cmp(&a.1.commit_count()));
        Ranking { entries }
    }
}

async fn collect_concurrently(
    api: Arc<dyn GitHubApi>,
    repos: Vec<RepoRef>,
    concurrency: usize,
) -> Result<Vec<ContributorMap>> {
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut join_set = JoinSet::new();

    for (index, repo) in repos.into_iter().enumerate() {
        let api = Arc::clone(&api);
        let permit = Arc::clone(&semaphore);

        join_set.spawn(async move {
            let _permit = permit.acquire_owned().await?;
            let contributors = collect_contributors(api.as_ref(), &repo).await?;
            Ok::<_, anyhow::Error>((index, contributors))
        });
    }

    let mut collected = Vec::with_capacity(join_set.len());
    while let Some(joined) = join_set.join_next().await {
        let (index, contributors) = joined.map_err(|e| anyhow!("Collector task failed: {}", e))??;
        debug!("Repository #{} collected", index);
        collected.push((index, contributors));
    }

    collected.sort_by_key(|(index, _)| *index);
    Ok(collected.into_iter().map(|(_, contributors)| contributors).collect())
}

impl Ranking {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContributorRecord)> {
        self.entries
            .iter()
            .map(|(login, record)| (login.as_str(), record))
    }

    /// Logins in ranked order.
    pub fn identities(&self) -> Vec<String> {
        self.entries.iter().map(|(login, _)| login.clone()).collect()
    }

    pub fn total_commits(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, record)| record.commit_count())
            .sum()
    }
}
