pub mod check;
pub mod grade;
pub mod init;
pub mod regrade;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use quizscore_algebra::AlgebraEngine;
use quizscore_core::{load_config_from, QuizscoreConfig};

/// Load configuration and the shared algebra back end.
pub fn load_environment(
    config_path: Option<&Path>,
) -> Result<(QuizscoreConfig, Option<&'static AlgebraEngine>)> {
    let config = load_config_from(config_path)?;
    let engine = quizscore_algebra::init_shared(&config.algebra);
    Ok((config, engine))
}
