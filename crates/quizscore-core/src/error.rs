//! Grading error types.
//!
//! Evaluation itself never fails: malformed learner input is absorbed into a
//! zero-credit result. Only a manual regrade can be rejected.

use thiserror::Error;

/// Errors from applying a manual grade to stored results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradeError {
    /// Points outside `[0, max_points]`.
    #[error("invalid grade: {points} points is outside 0..={max_points}")]
    InvalidGrade { points: f64, max_points: f64 },

    /// The question index does not exist in the stored results.
    #[error("question index {index} out of range ({len} results)")]
    QuestionIndexOutOfRange { index: usize, len: usize },

    /// Points or maximum points were NaN or infinite.
    #[error("grade values must be finite numbers")]
    NonFiniteGrade,
}
