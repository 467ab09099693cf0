//! Configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizscore_algebra::AlgebraConfig;

use crate::model::IndexBase;

/// Grading defaults applied when a question does not set its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingConfig {
    /// Tolerance for `number` questions.
    #[serde(default = "default_number_tolerance")]
    pub number_tolerance: f64,
    /// Tolerance for math-mode blanks.
    #[serde(default = "default_blank_tolerance")]
    pub blank_tolerance: f64,
    /// Index base for quizzes that do not declare one.
    #[serde(default)]
    pub index_base: IndexBase,
}

fn default_number_tolerance() -> f64 {
    0.01
}
fn default_blank_tolerance() -> f64 {
    0.0001
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            number_tolerance: default_number_tolerance(),
            blank_tolerance: default_blank_tolerance(),
            index_base: IndexBase::default(),
        }
    }
}

/// Top-level quizscore configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizscoreConfig {
    #[serde(default)]
    pub grading: GradingConfig,
    #[serde(default)]
    pub algebra: AlgebraConfig,
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizscore.toml` in the current directory
/// 2. `~/.config/quizscore/config.toml`
///
/// Environment variable overrides: `QUIZSCORE_DISABLE_ALGEBRA`,
/// `QUIZSCORE_NUMBER_TOLERANCE`.
pub fn load_config() -> Result<QuizscoreConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizscoreConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizscore.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizscoreConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizscoreConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

/// Apply environment overrides, reading variables through `lookup`.
pub fn apply_env_overrides(
    config: &mut QuizscoreConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(value) = lookup("QUIZSCORE_DISABLE_ALGEBRA") {
        if is_truthy(&value) {
            config.algebra.enabled = false;
        }
    }

    if let Some(value) = lookup("QUIZSCORE_NUMBER_TOLERANCE") {
        let tolerance: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("invalid QUIZSCORE_NUMBER_TOLERANCE: {value:?}"))?;
        if !tolerance.is_finite() || tolerance < 0.0 {
            anyhow::bail!(
                "QUIZSCORE_NUMBER_TOLERANCE must be a non-negative number, got {value:?}"
            );
        }
        config.grading.number_tolerance = tolerance;
    }

    Ok(())
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizscore"))
}
