use anyhow::{anyhow, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

mod config;
mod contrib;
mod error;
mod github;
mod output;

use crate::config::Config;
use crate::contrib::{Aggregator, Ranking};
use crate::github::{GitHubApi, GitHubClient, RepoRef};
use crate::output::{Report, Reporter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Repository URL, e.g. https://github.com/<owner>/<repo>
    url: Option<String>,

    /// Personal GitHub token
    #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Repository owner (user or organization)
    #[arg(short, long)]
    owner: Option<String>,

    /// Single repository to collect; every public repository of the owner otherwise
    #[arg(short, long)]
    repo: Option<String>,

    /// Repository name to leave out
    #[arg(short, long)]
    exclude: Option<String>,

    /// Single avatar block size (pixel)
    #[arg(short, long)]
    size: Option<u32>,

    /// Output image width (pixel)
    #[arg(short, long)]
    width: Option<u32>,

    /// Avatar count in one line
    #[arg(short, long)]
    count: Option<u32>,

    /// Directory for the SVG and the contributor record
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Repositories collected at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Owner/repository selection after URL, flags and checkout detection.
#[derive(Debug, PartialEq, Eq)]
struct Target {
    owner: String,
    repo: Option<String>,
}

impl Target {
    fn identifier(&self) -> String {
        match &self.repo {
            Some(repo) => format!("contributor_{}", repo),
            None => format!("contributor_{}", self.owner),
        }
    }
}

fn resolve_target(cli: &Cli, detected: Option<RepoRef>) -> Result<Target> {
    if let Some(url) = &cli.url {
        let RepoRef { owner, repo } = github::links::parse_repo_url(url)?;
        return Ok(Target {
            owner,
            repo: Some(repo),
        });
    }

    match (&cli.owner, detected) {
        (Some(owner), _) => Ok(Target {
            owner: owner.clone(),
            repo: cli.repo.clone(),
        }),
        (None, Some(found)) => {
            info!("Using repository {} from the current checkout", found);
            Ok(Target {
                owner: found.owner,
                repo: cli.repo.clone().or(Some(found.repo)),
            })
        }
        (None, None) => Err(anyhow!("GitHub repo path is required")),
    }
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(size) = cli.size {
        config.render.avatar_size = size;
    }
    if let Some(width) = cli.width {
        config.render.width = width;
    }
    if let Some(count) = cli.count {
        config.render.line_count = count;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }
    if let Some(concurrency) = cli.concurrency {
        config.github.concurrency = concurrency;
    }
}

/// Collect, rank and report contributors of `target`.
///
/// The output layout is validated before the first request.
async fn run(
    api: Arc<dyn GitHubApi>,
    target: &Target,
    exclude: Option<&str>,
    config: &Config,
) -> Result<(Ranking, Report)> {
    let reporter = Reporter::new(config.render.clone(), &config.output, &target.identifier())?;

    let repos = match &target.repo {
        Some(repo) => vec![RepoRef::new(&target.owner, repo)],
        None => contrib::fetch_owner_repos(api.as_ref(), &target.owner).await?,
    };
    println!(
        "Owner: {}  Repositories: {}",
        target.owner.bright_white(),
        repos.len().to_string().bright_white()
    );

    let mut aggregator = Aggregator::new();
    aggregator
        .collect(api, &repos, exclude, config.github.concurrency)
        .await?;
    let merged = aggregator.repos_merged();
    let ranking = aggregator.ranking();
    if ranking.is_empty() {
        warn!("No contributors found in {} repositories", merged);
    }

    let report = reporter.generate_report(&ranking)?;
    Ok((ranking, report))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    println!("{}", "gh-contrib-svg - GitHub Contributors Grid".bright_cyan().bold());

    let token = cli
        .token
        .clone()
        .ok_or_else(|| anyhow!("Personal GitHub token is required"))?;
    let detected = if cli.url.is_none() && cli.owner.is_none() {
        github::links::detect_origin(&std::env::current_dir()?)
    } else {
        None
    };
    let target = resolve_target(&cli, detected)?;

    let mut config = Config::load()?;
    apply_overrides(&mut config, &cli);

    let api: Arc<dyn GitHubApi> = Arc::new(GitHubClient::new(&token, &config.github)?);
    let started = Instant::now();

    let (ranking, report) = run(api, &target, cli.exclude.as_deref(), &config).await?;

    println!(
        "\n{} contributors, {} commits",
        ranking.len().to_string().bright_white(),
        ranking.total_commits().to_string().bright_white()
    );
    if !report.newcomers.is_empty() {
        println!(
            "{} {}",
            "New contributors:".bright_yellow(),
            report.newcomers.join(", ")
        );
    }
    println!("SVG: {}", report.svg_path.display().to_string().bright_white());
    println!(
        "Record: {}",
        report.record_path.display().to_string().bright_white()
    );
    println!(
        "\n{} Time cost: {}s",
        "Done!".bright_green().bold(),
        started.elapsed().as_secs()
    );

    Ok(())
}
