//! The `quizscore regrade` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizscore_core::ManualGrade;
use quizscore_report::AttemptRecord;

pub fn execute(
    attempt_path: PathBuf,
    index: usize,
    points: f64,
    max_points: Option<f64>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut record = AttemptRecord::load_json(&attempt_path)?;

    let max_points = max_points
        .or_else(|| record.result.detailed_results.get(index).map(|r| r.max_points))
        .unwrap_or(1.0);
    let grade = ManualGrade::new(points, max_points);

    record
        .regrade(index, &grade)
        .with_context(|| format!("regrade rejected for {}", attempt_path.display()))?;

    let target = output.unwrap_or(attempt_path);
    record.save_json(&target)?;

    let result = &record.result;
    println!(
        "Regraded question {index}: {points} / {max_points}. New score {} / {} ({}%), {} pending review.",
        result.score,
        result.max_score(),
        result.percentage,
        result.pending_review()
    );
    println!("Saved {}", target.display());

    Ok(())
}
