//! In-memory `GitHubApi` used by the pipeline tests.

use crate::github::{
    CommitDetail, CommitItem, CommitSignature, CommitUser, ContributorItem, GitHubApi, RepoItem,
    RepoRef,
};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeRepo {
    pub created_at: Option<DateTime<Utc>>,
    pub contributor_pages: Vec<Vec<ContributorItem>>,
    pub commit_pages: Vec<Vec<CommitItem>>,
}

#[derive(Default)]
pub struct FakeApi {
    pub repo_pages: HashMap<String, Vec<Vec<RepoItem>>>,
    pub repos: HashMap<RepoRef, FakeRepo>,
    pub failing_owners: HashSet<String>,
    pub failing_contributors: HashSet<RepoRef>,
    pub failing_commits: HashSet<RepoRef>,
    requests: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn with_repo(mut self, repo: RepoRef, fake: FakeRepo) -> Self {
        self.repos.insert(repo, fake);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, request: String) {
        self.requests.lock().unwrap().push(request);
    }

    fn repo(&self, repo: &RepoRef) -> Result<&FakeRepo> {
        self.repos
            .get(repo)
            .ok_or_else(|| anyhow!("404 Not Found: {}", repo))
    }
}

fn page_of<T: Clone>(pages: &[Vec<T>], page: u32) -> Vec<T> {
    pages.get(page as usize - 1).cloned().unwrap_or_default()
}

pub fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

pub fn contributor(login: &str) -> ContributorItem {
    ContributorItem {
        login: Some(login.to_string()),
        avatar_url: Some(format!("https://avatars.example/{}", login)),
    }
}

pub fn anonymous() -> ContributorItem {
    ContributorItem {
        login: None,
        avatar_url: None,
    }
}

pub fn commit(login: Option<&str>, date: &str, sha: &str) -> CommitItem {
    CommitItem {
        author: login.map(|login| CommitUser {
            login: login.to_string(),
        }),
        commit: CommitDetail {
            author: CommitSignature { date: ts(date) },
            url: format!("https://api.example/commits/{}", sha),
        },
    }
}

#[async_trait]
impl GitHubApi for FakeApi {
    async fn list_repos(&self, owner: &str, page: u32) -> Result<Vec<RepoItem>> {
        self.record(format!("repos {} {}", owner, page));
        if self.failing_owners.contains(owner) {
            return Err(anyhow!("502 Bad Gateway"));
        }
        Ok(self
            .repo_pages
            .get(owner)
            .map(|pages| page_of(pages, page))
            .unwrap_or_default())
    }

    async fn list_contributors(&self, repo: &RepoRef, page: u32) -> Result<Vec<ContributorItem>> {
        self.record(format!("contributors {} {}", repo, page));
        if self.failing_contributors.contains(repo) {
            return Err(anyhow!("502 Bad Gateway"));
        }
        Ok(page_of(&self.repo(repo)?.contributor_pages, page))
    }

    async fn list_commits(&self, repo: &RepoRef, page: u32) -> Result<Vec<CommitItem>> {
        self.record(format!("commits {} {}", repo, page));
        if self.failing_commits.contains(repo) {
            return Err(anyhow!("502 Bad Gateway"));
        }
        Ok(page_of(&self.repo(repo)?.commit_pages, page))
    }

    async fn repo_created_at(&self, repo: &RepoRef) -> Result<DateTime<Utc>> {
        self.record(format!("created {}", repo));
        self.repo(repo)?
            .created_at
            .ok_or_else(|| anyhow!("404 Not Found: {}", repo))
    }
}
