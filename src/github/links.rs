use super::RepoRef;
use crate::error::ContribError;
use anyhow::Result;
use git2::Repository;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static HTTPS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://github\.com/([\w.\-]+)/([\w.\-]+?)(?:\.git)?(?:[/?#].*)?$")
        .expect("static regex")
});

static SSH_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^git@github\.com:([\w.\-]+)/([\w.\-]+?)(?:\.git)?$").expect("static regex")
});

/// Parse `https://github.com/<owner>/<repo>`, ignoring any sub-path, query
/// or fragment after the repository name.
pub fn parse_repo_url(url: &str) -> Result<RepoRef> {
    HTTPS_URL
        .captures(url.trim())
        .map(|caps| RepoRef::new(&caps[1], &caps[2]))
        .ok_or_else(|| ContribError::InvalidRepoUrl(url.to_string()).into())
}

/// Parse a GitHub remote in either HTTPS or SSH form.
pub fn parse_remote_url(url: &str) -> Option<RepoRef> {
    let url = url.trim();
    HTTPS_URL
        .captures(url)
        .or_else(|| SSH_URL.captures(url))
        .map(|caps| RepoRef::new(&caps[1], &caps[2]))
}

/// The GitHub repository the checkout at `path` points to, taken from
/// `origin` or else the first remote with a GitHub URL.
pub fn detect_origin(path: &Path) -> Option<RepoRef> {
    let repo = Repository::discover(path).ok()?;

    if let Ok(remote) = repo.find_remote("origin") {
        if let Some(found) = remote.url().and_then(parse_remote_url) {
            debug!("Using origin remote {}", found);
            return Some(found);
        }
    }

    let remotes = repo.remotes().ok()?;
    remotes
        .iter()
        .flatten()
        .filter_map(|name| repo.find_remote(name).ok())
        .find_map(|remote| remote.url().and_then(parse_remote_url))
}

/// Link to a user's GitHub profile.
pub fn profile_url(login: &str) -> String {
    format!("https://github.com/{}", login)
}
