use super::spinner;
use crate::error::{is_not_found, ContribError};
use crate::github::{GitHubApi, Paginator, RepoRef};
use anyhow::{Context, Result};
use tracing::info;

/// Every public repository of `owner`, in listing order.
///
/// Errors from the listing are fatal; an owner without public repositories
/// yields an empty vector.
pub async fn fetch_repos(api: &dyn GitHubApi, owner: &str) -> Result<Vec<RepoRef>> {
    let pb = spinner(format!("Fetching {} repos...", owner));

    let listing = Paginator::new(|page| api.list_repos(owner, page))
        .collect()
        .await
        .with_context(|| format!("Fetching {} repos failed", owner));

    let listing = match listing {
        Ok(listing) => listing,
        Err(err) => {
            pb.abandon_with_message(format!("Fetching {} repos failed", owner));
            return Err(err);
        }
    };
    pb.finish_with_message(format!("Fetching {} repos done", owner));

    let repos: Vec<RepoRef> = listing
        .items
        .iter()
        .map(|item| RepoRef::new(owner, item.short_name()))
        .collect();

    info!(
        "Found {} public repositories for {} across {} pages",
        repos.len(),
        owner,
        listing.pages
    );
    Ok(repos)
}

/// Like [`fetch_repos`], but an owner GitHub does not know, or one with an
/// empty listing, is the fatal [`ContribError::NoRepositories`].
pub async fn fetch_owner_repos(api: &dyn GitHubApi, owner: &str) -> Result<Vec<RepoRef>> {
    let repos = match fetch_repos(api, owner).await {
        Ok(repos) => repos,
        Err(err) if is_not_found(&err) => Vec::new(),
        Err(err) => return Err(err),
    };
    if repos.is_empty() {
        return Err(ContribError::NoRepositories {
            owner: owner.to_string(),
        }
        .into());
    }
    Ok(repos)
}
