//! Configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level studyquiz configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyquizConfig {
    /// Directory searched for quiz files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Progress store location.
    #[serde(default = "default_progress_file")]
    pub progress_file: PathBuf,
    /// Output directory for results.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Entries shown under recent activity.
    #[serde(default = "default_recent_activity_limit")]
    pub recent_activity_limit: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./quizzes")
}
fn default_progress_file() -> PathBuf {
    PathBuf::from("./studyquiz-progress.json")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./studyquiz-results")
}
fn default_recent_activity_limit() -> usize {
    5
}

impl Default for StudyquizConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            progress_file: default_progress_file(),
            output_dir: default_output_dir(),
            recent_activity_limit: default_recent_activity_limit(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without an explicit path:
/// 1. `studyquiz.toml` in the current directory
/// 2. `~/.config/studyquiz/config.toml`
///
/// Environment variable overrides: `STUDYQUIZ_DATA_DIR`, `STUDYQUIZ_PROGRESS_FILE`.
pub fn load_config_from(path: Option<&Path>) -> Result<StudyquizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("studyquiz.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            parse_config(&path)?
        }
        None => StudyquizConfig::default(),
    };

    // Apply env var overrides
    if let Ok(dir) = std::env::var("STUDYQUIZ_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }
    if let Ok(file) = std::env::var("STUDYQUIZ_PROGRESS_FILE") {
        config.progress_file = PathBuf::from(file);
    }

    config.data_dir = resolve_path(&config.data_dir);
    config.progress_file = resolve_path(&config.progress_file);
    config.output_dir = resolve_path(&config.output_dir);

    Ok(config)
}

fn parse_config(path: &Path) -> Result<StudyquizConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<StudyquizConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("studyquiz"))
}
