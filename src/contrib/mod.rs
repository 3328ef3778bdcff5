use indexmap::IndexMap;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;

pub mod aggregate;
pub mod collector;
pub mod enumerate;
pub mod supplement;

#[cfg(test)]
pub(crate) mod fake;

pub use aggregate::{Aggregator, Ranking};
pub use collector::collect_contributors;
pub use enumerate::fetch_owner_repos;
pub use supplement::supplement_commits;

/// What the run knows about one contributor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorRecord {
    pub avatar_url: String,
    pub commit_urls: Vec<String>,
}

impl ContributorRecord {
    pub fn new(avatar_url: impl Into<String>) -> Self {
        Self {
            avatar_url: avatar_url.into(),
            commit_urls: Vec::new(),
        }
    }

    pub fn commit_count(&self) -> usize {
        self.commit_urls.len()
    }

    /// Fold another sighting of the same contributor into this one.
    ///
    /// The avatar is first-write-wins and is never replaced; commit URLs
    /// are appended in order.
    pub fn merge(&mut self, other: ContributorRecord) {
        self.commit_urls.extend(other.commit_urls);
    }
}

/// Login to record, in first-sighting order.
pub type ContributorMap = IndexMap<String, ContributorRecord>;

/// Every spinner draws through this, so concurrent collectors get their
/// own line each.
static PROGRESS: LazyLock<MultiProgress> = LazyLock::new(MultiProgress::new);

pub(crate) fn spinner(message: String) -> ProgressBar {
    let pb = PROGRESS.add(ProgressBar::new_spinner());
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
