use crate::config::RenderConfig;
use crate::contrib::Ranking;
use crate::github::links::profile_url;
use anyhow::{anyhow, Result};
use rust_embed::RustEmbed;
use serde::Serialize;
use tera::{Context, Tera};

#[derive(RustEmbed)]
#[folder = "src/output/templates/"]
#[include = "*.svg"]
struct Templates;

const TEMPLATE: &str = "contributors.svg";
/// Blank border around each avatar, as a share of the block.
const MARGIN_RATIO: f64 = 0.1;

#[derive(Debug, Serialize)]
struct Cell {
    login: String,
    avatar_url: String,
    profile_url: String,
    commits: usize,
    x: f64,
    y: f64,
    cx: f64,
    cy: f64,
}

pub struct SvgRenderer {
    tera: Tera,
    layout: RenderConfig,
}

impl SvgRenderer {
    pub fn new(layout: RenderConfig) -> Result<Self> {
        if layout.line_count == 0 || layout.avatar_size == 0 || layout.width == 0 {
            return Err(anyhow!(
                "Avatar size, image width and avatars per line must be positive"
            ));
        }

        let mut tera = Tera::default();
        for file in Templates::iter() {
            let name = file.as_ref();
            let content = Templates::get(name)
                .ok_or_else(|| anyhow!("Template {} not found", name))?;
            let source = std::str::from_utf8(&content.data)
                .map_err(|e| anyhow!("Invalid UTF-8 in template {}: {}", name, e))?;
            tera.add_raw_template(name, source)
                .map_err(|e| anyhow!("Failed to add template {}: {}", name, e))?;
        }

        Ok(Self { tera, layout })
    }

    /// Render `ranking` as a grid, `line_count` avatars per row.
    pub fn render(&self, ranking: &Ranking) -> Result<String> {
        let per_line = self.layout.line_count as usize;
        let block = f64::from(self.layout.avatar_size);
        let step = f64::from(self.layout.width) / per_line as f64;
        let avatar = block.min(step) * (1.0 - 2.0 * MARGIN_RATIO);
        let pixels = avatar.round() as u32;

        let cells: Vec<Cell> = ranking
            .iter()
            .enumerate()
            .map(|(i, (login, record))| {
                let (row, col) = (i / per_line, i % per_line);
                let x = col as f64 * step + (step - avatar) / 2.0;
                let y = row as f64 * block + (block - avatar) / 2.0;
                Cell {
                    login: login.to_string(),
                    avatar_url: sized_avatar(&record.avatar_url, pixels),
                    profile_url: profile_url(login),
                    commits: record.commit_count(),
                    x,
                    y,
                    cx: x + avatar / 2.0,
                    cy: y + avatar / 2.0,
                }
            })
            .collect();

        let rows = cells.len().div_ceil(per_line);
        let mut context = Context::new();
        context.insert("width", &self.layout.width);
        context.insert("height", &(rows as u32 * self.layout.avatar_size));
        context.insert("avatar", &avatar);
        context.insert("radius", &(avatar / 2.0));
        context.insert("cells", &cells);

        self.tera
            .render(TEMPLATE, &context)
            .map_err(|e| anyhow!("Failed to render {}: {}", TEMPLATE, e))
    }
}

/// Ask the avatar host for an image of `pixels` square.
fn sized_avatar(url: &str, pixels: u32) -> String {
    if url.is_empty() {
        return String::new();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}s={}", url, separator, pixels)
}
