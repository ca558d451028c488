use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::info;

use readme_provenance::config::{ProvenanceConfig, log_path};
use readme_provenance::hosting::RepositoryUrlParser;
use readme_provenance::logging;
use readme_provenance::provenance::{CommittishOverrides, Provenance};
use readme_provenance::report::Report;

#[derive(Parser)]
#[command(name = "readme-provenance")]
#[command(version, about = "Resolve release provenance of a repository for README generation")]
struct Cli {
    /// Repository URL or shorthand (e.g. github:owner/project)
    #[arg(long)]
    repository: String,

    /// Version being documented (e.g. 1.2.3)
    #[arg(long = "package-version")]
    package_version: Option<String>,

    /// Explicit committish for browse URLs
    #[arg(long)]
    committish: Option<String>,

    /// Commit for browse URLs
    #[arg(long)]
    commit: Option<String>,

    /// Branch for browse URLs
    #[arg(long)]
    branch: Option<String>,

    /// Tag for browse URLs
    #[arg(long)]
    tag: Option<String>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Working directory whose HEAD is compared with releases
    #[arg(long)]
    cwd: Option<PathBuf>,

    /// Token for the GitHub API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Write JSON logs to the default log file instead of stderr
    #[arg(long)]
    log_to_file: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    /// Config file first, command-line flags on top
    fn resolve_config(&self) -> anyhow::Result<ProvenanceConfig> {
        let mut config = match &self.config {
            Some(path) => ProvenanceConfig::load(path)?,
            None => ProvenanceConfig::default(),
        };
        if let Some(cwd) = &self.cwd {
            config.git.working_dir = cwd.clone();
        }
        if let Some(token) = &self.github_token {
            config.api.github_token = Some(token.clone());
        }
        if self.log_to_file && config.log.file.is_none() {
            config.log.file = Some(log_path());
        }
        Ok(config)
    }

    fn overrides(&self) -> CommittishOverrides {
        CommittishOverrides {
            committish: self.committish.clone(),
            commit: self.commit.clone(),
            branch: self.branch.clone(),
            tag: self.tag.clone(),
        }
    }
}

async fn run(cli: Cli, config: ProvenanceConfig) -> anyhow::Result<()> {
    let repository = RepositoryUrlParser::new()
        .parse(&cli.repository)
        .with_context(|| format!("Invalid --repository {:?}", cli.repository))?;
    info!("Resolving provenance of {}", repository);

    let engine = Provenance::from_config(repository, &config)?;
    let report = Report::collect(&engine, &cli.overrides(), cli.package_version.as_deref()).await;

    match cli.format {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    for error in &report.errors {
        eprintln!("error: {}", error);
    }
    if !report.errors.is_empty() {
        anyhow::bail!("{} fact(s) could not be resolved", report.errors.len());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    let _guard = logging::init(&config.log)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli, config))
}
