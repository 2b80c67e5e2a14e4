//! Styleguard CLI: analyze files and publish the results from one CI job.

use anyhow::{bail, Context};
use clap::Parser;
use futures::future::BoxFuture;
use std::path::PathBuf;
use std::sync::Arc;
use styleguard::client::{AnalysisClient, DocumentAnalyzer, FileAnalysis};
use styleguard::config::{load_config, StyleguardConfig};
use styleguard::dispatch::BatchDispatcher;
use styleguard::files::{discover_files, has_allowed_extension, read_document, DEFAULT_EXTENSIONS};
use styleguard::logging::init_structured_logging;
use styleguard::report::{commit_status, render_comment, render_details, render_summary, IssueTotals};
use styleguard::scm::{write_job_summary, ScmClient};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "styleguard",
    version,
    about = "Run remote prose style analysis over changed files and publish the results"
)]
struct Cli {
    /// Files or directories to analyze. When omitted, the changed files of
    /// --pr/--commit (or the configured run identity) are used.
    paths: Vec<String>,

    /// Configuration file (defaults to ./styleguard.toml when present).
    #[arg(long, env = "STYLEGUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Analyze the files of this pull request.
    #[arg(long, conflicts_with = "commit")]
    pr: Option<u64>,

    /// Analyze the files of this commit.
    #[arg(long)]
    commit: Option<String>,

    /// File extension to analyze (repeatable); defaults to common prose types.
    #[arg(long = "ext", value_name = "EXT")]
    extensions: Vec<String>,

    /// Skip posting the pull-request comment.
    #[arg(long)]
    no_comment: bool,

    /// Skip setting the commit status.
    #[arg(long)]
    no_status: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_structured_logging();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("loading configuration")?;
    let extensions = if cli.extensions.is_empty() {
        DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
    } else {
        cli.extensions.clone()
    };

    let scm = match ScmClient::new(&config.scm) {
        Ok(client) => Some(client),
        Err(err) => {
            warn!(error = %err, "Source-control access unavailable; publishing disabled");
            None
        }
    };

    let files = resolve_files(&cli, &config, scm.as_ref(), &extensions).await?;
    if files.is_empty() {
        info!("No analyzable files in scope; nothing to do");
        return Ok(());
    }

    let analyzer = Arc::new(AnalysisClient::new(&config.analysis)?);
    let dispatcher = BatchDispatcher::new(
        config.dispatch.max_concurrency,
        config.dispatch.retry_policy(),
    );

    let executor = {
        let analyzer = Arc::clone(&analyzer);
        move |path: String| {
            let analyzer = Arc::clone(&analyzer);
            async move {
                let content = read_document(&path)?;
                analyzer.analyze(&path, &content).await
            }
        }
    };

    let analyses = dispatcher
        .dispatch(&files, executor)
        .await
        .context("batch analysis aborted")?;

    publish(&cli, &config, scm.as_ref(), &analyses).await;

    print!("{}", render_summary(&analyses));
    let totals = IssueTotals::from_analyses(&analyses);
    if totals.errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Resolve the job list: explicit paths win, then pull request, then commit.
async fn resolve_files(
    cli: &Cli,
    config: &StyleguardConfig,
    scm: Option<&ScmClient>,
    extensions: &[String],
) -> anyhow::Result<Vec<String>> {
    if !cli.paths.is_empty() {
        return Ok(discover_files(&cli.paths, extensions)?);
    }

    let scm = scm.context(
        "source-control access is required to resolve changed files; configure scm.repository",
    )?;

    // Explicit flags win over configured run identity.
    let changed = if let Some(number) = cli.pr {
        scm.pull_request_files(number).await?
    } else if let Some(sha) = &cli.commit {
        scm.commit_files(sha).await?
    } else if let Some(number) = config.scm.pull_request {
        scm.pull_request_files(number).await?
    } else if let Some(sha) = &config.scm.commit_sha {
        scm.commit_files(sha).await?
    } else {
        bail!("nothing to analyze: pass paths, --pr, or --commit");
    };

    Ok(changed
        .into_iter()
        .filter(|file| file.is_analyzable())
        .map(|file| file.filename)
        .filter(|name| has_allowed_extension(name, extensions))
        .collect())
}

/// Publish results to every configured surface; publishing failures are logged,
/// never fatal to the run.
async fn publish(
    cli: &Cli,
    config: &StyleguardConfig,
    scm: Option<&ScmClient>,
    analyses: &[FileAnalysis],
) {
    if let Some(path) = &config.scm.summary_path {
        let report = format!("{}{}", render_summary(analyses), render_details(analyses));
        if let Err(err) = write_job_summary(path, &report) {
            warn!(error = %err, "Failed to write job summary");
        }
    }

    let Some(scm) = scm else { return };
    let mut tasks: Vec<BoxFuture<'_, (&'static str, styleguard::Result<()>)>> = Vec::new();

    if config.report.post_comment && !cli.no_comment {
        if let Some(number) = cli.pr.or(config.scm.pull_request) {
            let body = render_comment(analyses, config.report.max_comment_bytes);
            tasks.push(Box::pin(async move {
                ("comment", scm.upsert_comment(number, &body).await)
            }));
        }
    }
    if config.report.set_status && !cli.no_status {
        if let Some(sha) = cli.commit.clone().or_else(|| config.scm.commit_sha.clone()) {
            let (state, description) = commit_status(analyses);
            tasks.push(Box::pin(async move {
                (
                    "commit status",
                    scm.post_commit_status(&sha, state, &description).await,
                )
            }));
        }
    }

    for (surface, result) in futures::future::join_all(tasks).await {
        if let Err(err) = result {
            warn!(error = %err, "Failed to publish {surface}");
        }
    }
}
