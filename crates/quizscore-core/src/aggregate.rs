//! Score aggregation and manual regrading.
//!
//! Aggregates are always recomputed from the per-question detail, so a
//! stored result can be regraded without re-running any evaluator.

use serde::{Deserialize, Serialize};

use crate::error::GradeError;
use crate::model::{QuestionResult, QuizResult};

/// Build a [`QuizResult`] from per-question results.
///
/// Results waiting for review count toward neither the correct nor the
/// incorrect total, but their maximum points still count toward the
/// percentage.
pub fn summarize(detailed_results: Vec<QuestionResult>, time_spent: u64) -> QuizResult {
    let earned: f64 = detailed_results.iter().map(|r| r.points).sum();
    let max: f64 = detailed_results.iter().map(|r| r.max_points).sum();
    let graded = detailed_results.iter().filter(|r| !r.needs_review);
    let correct_answers = graded.clone().filter(|r| r.is_correct).count();
    let incorrect_answers = graded.filter(|r| !r.is_correct).count();

    QuizResult {
        score: earned,
        total_questions: detailed_results.len(),
        correct_answers,
        incorrect_answers,
        percentage: percentage(earned, max),
        time_spent,
        detailed_results,
    }
}

/// `round(100 * earned / max)`, clamped to `0..=100`; 0 when `max` is 0.
pub fn percentage(earned: f64, max: f64) -> u32 {
    if max <= 0.0 || !max.is_finite() || !earned.is_finite() {
        return 0;
    }
    (100.0 * earned / max).round().clamp(0.0, 100.0) as u32
}

/// A manually assigned grade for one question.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualGrade {
    pub points: f64,
    pub max_points: f64,
    /// Defaults to full marks meaning correct.
    #[serde(default)]
    pub is_correct: Option<bool>,
}

impl ManualGrade {
    pub fn new(points: f64, max_points: f64) -> Self {
        Self {
            points,
            max_points,
            is_correct: None,
        }
    }

    fn validate(&self) -> Result<(), GradeError> {
        if !self.points.is_finite() || !self.max_points.is_finite() {
            return Err(GradeError::NonFiniteGrade);
        }
        if self.points < 0.0 || self.points > self.max_points {
            return Err(GradeError::InvalidGrade {
                points: self.points,
                max_points: self.max_points,
            });
        }
        Ok(())
    }
}

/// Overwrite one result with a manual grade and recompute the aggregates.
///
/// The input is left untouched; on error nothing is produced.
pub fn regrade_question(
    detailed_results: &[QuestionResult],
    index: usize,
    grade: &ManualGrade,
    time_spent: u64,
) -> Result<QuizResult, GradeError> {
    grade.validate()?;
    if index >= detailed_results.len() {
        return Err(GradeError::QuestionIndexOutOfRange {
            index,
            len: detailed_results.len(),
        });
    }

    let mut updated = detailed_results.to_vec();
    let entry = &mut updated[index];
    entry.points = grade.points;
    entry.max_points = grade.max_points;
    entry.is_correct = grade
        .is_correct
        .unwrap_or(grade.max_points > 0.0 && grade.points == grade.max_points);
    entry.needs_review = false;

    tracing::info!(
        question_id = entry.question_id,
        points = grade.points,
        max_points = grade.max_points,
        "applied manual grade"
    );
    Ok(summarize(updated, time_spent))
}

impl QuizResult {
    /// Regrade one question, keeping this result's time spent.
    pub fn regrade(&self, index: usize, grade: &ManualGrade) -> Result<QuizResult, GradeError> {
        regrade_question(&self.detailed_results, index, grade, self.time_spent)
    }
}
