use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod client;
pub mod links;
pub mod paginate;

pub use client::GitHubClient;
pub use paginate::Paginator;

/// A repository addressed by owner and short name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// One entry of an owner's repository listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoItem {
    /// `owner/name`
    pub full_name: String,
}

impl RepoItem {
    pub fn short_name(&self) -> &str {
        self.full_name
            .split_once('/')
            .map(|(_, name)| name)
            .unwrap_or(&self.full_name)
    }
}

/// One entry of a repository's contributor listing. Anonymous
/// contributors come back without a login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorItem {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitUser {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitSignature {
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetail {
    pub author: CommitSignature,
    pub url: String,
}

/// One entry of a repository's commit history.
///
/// `author` is the GitHub account the commit resolved to, if any, while
/// `commit.author.date` is the git author date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitItem {
    #[serde(default)]
    pub author: Option<CommitUser>,
    pub commit: CommitDetail,
}

impl CommitItem {
    pub fn login(&self) -> Option<&str> {
        self.author
            .as_ref()
            .map(|user| user.login.as_str())
            .filter(|login| !login.is_empty())
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.commit.author.date
    }

    pub fn url(&self) -> &str {
        &self.commit.url
    }
}

/// Paged access to the GitHub resources the pipeline reads.
///
/// Every `list_*` call returns one page (1-based); an exhausted resource
/// answers with an empty vector.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    async fn list_repos(&self, owner: &str, page: u32) -> Result<Vec<RepoItem>>;

    async fn list_contributors(&self, repo: &RepoRef, page: u32) -> Result<Vec<ContributorItem>>;

    /// Commits ordered newest first.
    async fn list_commits(&self, repo: &RepoRef, page: u32) -> Result<Vec<CommitItem>>;

    async fn repo_created_at(&self, repo: &RepoRef) -> Result<DateTime<Utc>>;
}
