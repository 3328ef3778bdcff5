use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub mod persistence;
pub mod svg;

pub use persistence::PersistenceStore;
pub use svg::SvgRenderer;

use crate::config::{OutputConfig, RenderConfig};
use crate::contrib::Ranking;

/// Append `.extension` unless `path` already ends with it. Repository
/// names may contain dots, so the existing extension is never replaced.
pub fn add_file_extension(path: &Path, extension: &str) -> PathBuf {
    let suffix = format!(".{}", extension);
    let mut raw = path.as_os_str().to_owned();
    if !raw.to_string_lossy().ends_with(&suffix) {
        raw.push(&suffix);
    }
    PathBuf::from(raw)
}

/// What a run leaves on disk.
#[derive(Debug)]
pub struct Report {
    pub svg_path: PathBuf,
    pub record_path: PathBuf,
    pub newcomers: Vec<String>,
}

/// Writes the SVG grid and the seen-contributors record for one identifier.
pub struct Reporter {
    renderer: SvgRenderer,
    directory: PathBuf,
    identifier: String,
}

impl Reporter {
    pub fn new(render: RenderConfig, output: &OutputConfig, identifier: &str) -> Result<Self> {
        Ok(Self {
            renderer: SvgRenderer::new(render)?,
            directory: output.directory.clone(),
            identifier: identifier.to_string(),
        })
    }

    pub fn generate_report(&self, ranking: &Ranking) -> Result<Report> {
        let identities = ranking.identities();
        let store = PersistenceStore::new(&self.directory, &self.identifier);
        let newcomers = store.newcomers(&identities)?;

        let content = self.renderer.render(ranking)?;
        fs::create_dir_all(&self.directory)
            .with_context(|| format!("Failed to create {}", self.directory.display()))?;
        let svg_path = add_file_extension(&self.directory.join(&self.identifier), "svg");
        fs::write(&svg_path, content)
            .with_context(|| format!("Failed to write {}", svg_path.display()))?;
        info!("SVG saved to {}", svg_path.display());

        store.save(&identities)?;

        Ok(Report {
            svg_path,
            record_path: store.path().to_path_buf(),
            newcomers,
        })
    }
}
