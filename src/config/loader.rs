//! Configuration Loader
//!
//! Builds the effective [`StyleguardConfig`] from three layers, later layers winning:
//! defaults, an optional TOML file, `STYLEGUARD_*` environment variables (nested keys
//! separated with `__`, e.g. `STYLEGUARD_ANALYSIS__TOKEN`). CI-provided variables
//! back-fill run identity fields the explicit layers leave empty.

use super::StyleguardConfig;
use crate::error::{Result, StyleguardError};
use config::{Config, Environment, File};
use std::env;
use std::path::Path;
use tracing::debug;

const ENV_PREFIX: &str = "STYLEGUARD";
const DEFAULT_CONFIG_BASENAME: &str = "styleguard";

/// Load and validate configuration.
///
/// With an explicit `path` the file must exist; otherwise `styleguard.toml` in the
/// working directory is used when present.
pub fn load_config(path: Option<&Path>) -> Result<StyleguardConfig> {
    let mut builder = Config::builder();
    builder = match path {
        Some(path) => builder.add_source(File::from(path)),
        None => builder.add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false)),
    };
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    let mut config: StyleguardConfig = builder
        .build()
        .map_err(|e| StyleguardError::Configuration(e.to_string()))?
        .try_deserialize()
        .map_err(|e| StyleguardError::Configuration(e.to_string()))?;

    apply_ci_fallbacks(&mut config);
    config.validate()?;

    debug!(
        analysis_url = %config.analysis.base_url,
        repository = config.scm.repository.as_deref(),
        pull_request = config.scm.pull_request,
        max_concurrency = config.dispatch.max_concurrency,
        "Configuration loaded"
    );
    Ok(config)
}

/// Fill run-identity fields from the CI environment when configuration left them
/// unset. Values already present always win.
fn apply_ci_fallbacks(config: &mut StyleguardConfig) {
    if config.scm.repository.is_none() {
        config.scm.repository = env_first(&["GITHUB_REPOSITORY", "CI_REPOSITORY"]);
    }
    if config.scm.commit_sha.is_none() {
        config.scm.commit_sha = env_first(&["GITHUB_SHA", "CI_COMMIT_SHA"]);
    }
    if config.scm.pull_request.is_none() {
        config.scm.pull_request = env_first(&["PULL_REQUEST_NUMBER", "CI_PULL_REQUEST"])
            .and_then(|value| value.parse().ok());
    }
    if config.scm.summary_path.is_none() {
        config.scm.summary_path =
            env_first(&["GITHUB_STEP_SUMMARY", "CI_JOB_SUMMARY"]).map(Into::into);
    }
}

fn env_first(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.is_empty())
}
