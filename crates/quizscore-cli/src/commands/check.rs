//! The `quizscore check` command.

use std::path::PathBuf;

use anyhow::Result;

use quizscore_algebra::SymbolicComparator;

pub fn execute(
    user: String,
    correct: String,
    tolerance: Option<f64>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (config, engine) = super::load_environment(config_path.as_deref())?;
    let tolerance = tolerance.unwrap_or(config.grading.blank_tolerance);
    anyhow::ensure!(
        tolerance.is_finite() && tolerance >= 0.0,
        "tolerance must be a non-negative number"
    );

    let comparator = SymbolicComparator::new(engine);
    match comparator.check(&user, &correct, tolerance) {
        Some(strategy) => println!("equivalent ({strategy})"),
        None => println!("not equivalent"),
    }

    if comparator.is_degraded() {
        println!("note: algebra back end unavailable, compared normalized text only");
    }

    Ok(())
}
