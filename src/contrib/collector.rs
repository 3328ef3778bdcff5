use super::{spinner, supplement_commits, ContributorMap, ContributorRecord};
use crate::github::{ContributorItem, GitHubApi, Paginator, RepoRef};
use anyhow::Result;
use tracing::{debug, warn};

/// Contributors of `repo` with the commits they authored there.
///
/// A failed contributor listing is logged and treated as a repository
/// without contributors. Errors from [`supplement_commits`] propagate.
pub async fn collect_contributors(api: &dyn GitHubApi, repo: &RepoRef) -> Result<ContributorMap> {
    let pb = spinner(format!("Fetching {} contributors...", repo));

    let listing = Paginator::new(|page| api.list_contributors(repo, page))
        .collect()
        .await;

    let items = match listing {
        Ok(listing) => {
            pb.finish_with_message(format!("Fetching {} contributors done", repo));
            listing.items
        }
        Err(err) => {
            pb.abandon_with_message(format!("Fetching {} contributors failed", repo));
            warn!("Fetching {} contributors failed: {:#}", repo, err);
            Vec::new()
        }
    };

    let mut contributors = seed(items);
    debug!("{} has {} distinct contributors", repo, contributors.len());

    supplement_commits(api, repo, &mut contributors).await?;
    Ok(contributors)
}

/// One record per login, keeping the avatar of the first sighting.
/// Anonymous entries carry no login and are dropped.
fn seed(items: Vec<ContributorItem>) -> ContributorMap {
    let mut contributors = ContributorMap::new();

    for item in items {
        let Some(login) = item.login.filter(|login| !login.is_empty()) else {
            continue;
        };
        contributors
            .entry(login)
            .or_insert_with(|| ContributorRecord::new(item.avatar_url.unwrap_or_default()));
    }

    contributors
}
