use super::*;
use crate::config::GitHubConfig;
use crate::error::{is_not_found, ContribError};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct RepoDetails {
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OwnerKind {
    Organization,
    User,
}

impl OwnerKind {
    fn repos_path(self, owner: &str) -> String {
        match self {
            OwnerKind::Organization => format!("/orgs/{}/repos", owner),
            OwnerKind::User => format!("/users/{}/repos", owner),
        }
    }
}

/// `GitHubApi` over the GitHub REST API.
pub struct GitHubClient {
    http: Client,
    base_url: String,
    per_page: u32,
    /// Which repo listing answered for an owner, so later pages skip the
    /// org lookup.
    owner_kinds: Mutex<HashMap<String, OwnerKind>>,
}

impl GitHubClient {
    pub fn new(token: &str, config: &GitHubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .context("GitHub token contains invalid characters")?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            per_page: config.per_page,
            owner_kinds: Mutex::new(HashMap::new()),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContribError::Http {
                status: status.as_u16(),
                url,
            }
            .into());
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to decode response from {}", url))
    }

    fn page_query(&self, page: u32) -> Vec<(&'static str, String)> {
        vec![
            ("page", page.to_string()),
            ("per_page", self.per_page.to_string()),
        ]
    }

    fn owner_kind(&self, owner: &str) -> Option<OwnerKind> {
        self.owner_kinds
            .lock()
            .ok()
            .and_then(|kinds| kinds.get(owner).copied())
    }

    fn remember_owner_kind(&self, owner: &str, kind: OwnerKind) {
        if let Ok(mut kinds) = self.owner_kinds.lock() {
            kinds.insert(owner.to_string(), kind);
        }
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn list_repos(&self, owner: &str, page: u32) -> Result<Vec<RepoItem>> {
        let mut query = self.page_query(page);
        query.push(("type", "public".to_string()));

        if let Some(kind) = self.owner_kind(owner) {
            return self.get_json(&kind.repos_path(owner), &query).await;
        }

        match self
            .get_json(&OwnerKind::Organization.repos_path(owner), &query)
            .await
        {
            Err(err) if is_not_found(&err) => {
                debug!("{} is not an organization, listing user repositories", owner);
                let repos = self
                    .get_json(&OwnerKind::User.repos_path(owner), &query)
                    .await?;
                self.remember_owner_kind(owner, OwnerKind::User);
                Ok(repos)
            }
            Ok(repos) => {
                self.remember_owner_kind(owner, OwnerKind::Organization);
                Ok(repos)
            }
            Err(err) => Err(err),
        }
    }

    async fn list_contributors(&self, repo: &RepoRef, page: u32) -> Result<Vec<ContributorItem>> {
        let mut query = self.page_query(page);
        query.push(("anon", "true".to_string()));

        self.get_json(
            &format!("/repos/{}/{}/contributors", repo.owner, repo.repo),
            &query,
        )
        .await
    }

    async fn list_commits(&self, repo: &RepoRef, page: u32) -> Result<Vec<CommitItem>> {
        self.get_json(
            &format!("/repos/{}/{}/commits", repo.owner, repo.repo),
            &self.page_query(page),
        )
        .await
    }

    async fn repo_created_at(&self, repo: &RepoRef) -> Result<DateTime<Utc>> {
        let details: RepoDetails = self
            .get_json(&format!("/repos/{}/{}", repo.owner, repo.repo), &[])
            .await?;
        Ok(details.created_at)
    }
}
