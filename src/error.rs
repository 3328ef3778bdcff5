use thiserror::Error;

/// Failures callers need to tell apart from plain transport errors.
#[derive(Debug, Error)]
pub enum ContribError {
    #[error("GitHub answered {status} for {url}")]
    Http { status: u16, url: String },

    #[error("No public repositories found for {owner}")]
    NoRepositories { owner: String },

    #[error("Could not read the creation time of {repo}")]
    CreationTimeUnavailable { repo: String },

    #[error("Invalid GitHub repository URL: {0}")]
    InvalidRepoUrl(String),
}

/// True when `err` carries a 404 answer from GitHub.
pub fn is_not_found(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<ContribError>(),
        Some(ContribError::Http { status: 404, .. })
    )
}
