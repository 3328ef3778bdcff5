use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The ranked logins seen by the previous run for one identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenContributors {
    pub contributors: Vec<String>,
}

/// JSON file of already-seen contributors, one per output identifier.
pub struct PersistenceStore {
    path: PathBuf,
}

impl PersistenceStore {
    pub fn new(directory: &Path, identifier: &str) -> Self {
        Self {
            path: super::add_file_extension(&directory.join(identifier), "json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Contributors saved by the last run; empty when nothing was saved yet.
    pub fn load(&self) -> Result<SeenContributors> {
        if !self.path.exists() {
            debug!("No contributor record at {}", self.path.display());
            return Ok(SeenContributors::default());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Corrupt contributor record {}", self.path.display()))
    }

    /// Logins of `current` missing from the saved record, in `current` order.
    pub fn newcomers(&self, current: &[String]) -> Result<Vec<String>> {
        let seen = self.load()?;
        let known: HashSet<&str> = seen.contributors.iter().map(String::as_str).collect();

        let newcomers: Vec<String> = current
            .iter()
            .filter(|login| !known.contains(login.as_str()))
            .cloned()
            .collect();

        info!(
            "{} of {} contributors are new since the last run",
            newcomers.len(),
            current.len()
        );
        Ok(newcomers)
    }

    pub fn save(&self, current: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let record = SeenContributors {
            contributors: current.to_vec(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&record)?)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        info!("Contributor record saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logins(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn first_run_sees_everyone_as_new() {
        let dir = tempfile::tempdir().unwrap();
        let store = PersistenceStore::new(dir.path(), "contributor_rocket");

        let newcomers = store.newcomers(&logins(&["alice", "bob"])).unwrap();
        assert_eq!(newcomers, logins(&["alice", "bob"]));
    }

    #[test]
    fn reports_only_unseen_logins_after_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = PersistenceStore::new(dir.path(), "contributor_rocket");
        store.save(&logins(&["alice", "bob"])).unwrap();

        let newcomers = store
            .newcomers(&logins(&["carol", "alice", "dave", "bob"]))
            .unwrap();
        assert_eq!(newcomers, logins(&["carol", "dave"]));
        assert_eq!(
            store.path(),
            dir.path().join("contributor_rocket.json").as_path()
        );
    }

    #[test]
    fn save_replaces_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = PersistenceStore::new(&dir.path().join("nested"), "contributor_acme");
        store.save(&logins(&["alice"])).unwrap();
        store.save(&logins(&["bob", "alice"])).unwrap();

        assert_eq!(store.load().unwrap().contributors, logins(&["bob", "alice"]));
    }

    #[test]
    fn corrupt_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = PersistenceStore::new(dir.path(), "contributor_acme");
        fs::write(store.path(), "not json").unwrap();

        assert!(store.newcomers(&logins(&["alice"])).is_err());
    }
}
