//! Attempt records with JSON persistence.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quizscore_core::{GradeError, ManualGrade, QuizResult};

/// Why an attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    #[default]
    Submitted,
    Timeout,
    Abandoned,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::Submitted => write!(f, "submitted"),
            EndReason::Timeout => write!(f, "timeout"),
            EndReason::Abandoned => write!(f, "abandoned"),
        }
    }
}

impl FromStr for EndReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "submitted" => Ok(EndReason::Submitted),
            "timeout" => Ok(EndReason::Timeout),
            "abandoned" => Ok(EndReason::Abandoned),
            other => Err(format!("unknown end reason: {other}")),
        }
    }
}

/// A scored attempt, as handed to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    /// Unique attempt identifier.
    pub id: Uuid,
    pub user_id: String,
    pub quiz_id: String,
    pub submitted_at: DateTime<Utc>,
    /// When the score became visible to the learner, if it has.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_released_at: Option<DateTime<Utc>>,
    pub end_reason: EndReason,
    pub result: QuizResult,
}

impl AttemptRecord {
    /// A new record submitted now.
    pub fn new(
        user_id: impl Into<String>,
        quiz_id: impl Into<String>,
        end_reason: EndReason,
        result: QuizResult,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            quiz_id: quiz_id.into(),
            submitted_at: Utc::now(),
            score_released_at: None,
            end_reason,
            result,
        }
    }

    /// Mark the score as released now. Keeps an earlier release time.
    pub fn release_score(&mut self) {
        self.score_released_at.get_or_insert_with(Utc::now);
    }

    /// Apply a manual grade. On error the record is left unchanged.
    pub fn regrade(&mut self, index: usize, grade: &ManualGrade) -> Result<(), GradeError> {
        self.result = self.result.regrade(index, grade)?;
        Ok(())
    }

    /// Save the record as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize attempt")?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write attempt to {}", path.display()))?;
        tracing::debug!(attempt = %self.id, "saved attempt to {}", path.display());
        Ok(())
    }

    /// Load a record from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read attempt from {}", path.display()))?;
        let record: AttemptRecord =
            serde_json::from_str(&content).context("failed to parse attempt JSON")?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizscore_core::{summarize, QuestionResult, QuestionType};
    use serde_json::Value;

    fn make_result() -> QuizResult {
        summarize(
            vec![
                QuestionResult {
                    question_id: 1,
                    question: "2+2?".into(),
                    question_type: QuestionType::Number,
                    user_answer: Value::Array(vec![Value::from(4)]),
                    correct_answer: Value::from(4.0),
                    is_correct: true,
                    points: 1.0,
                    max_points: 1.0,
                    needs_review: false,
                },
                QuestionResult {
                    question_id: 2,
                    question: "Why?".into(),
                    question_type: QuestionType::Essay,
                    user_answer: Value::Array(vec![Value::from("because")]),
                    correct_answer: Value::Null,
                    is_correct: false,
                    points: 0.0,
                    max_points: 1.0,
                    needs_review: true,
                },
            ],
            90,
        )
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("attempt.json");
        let record = AttemptRecord::new("learner-1", "quiz-1", EndReason::Submitted, make_result());

        record.save_json(&path).unwrap();
        let loaded = AttemptRecord::load_json(&path).unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn json_uses_camel_case_and_omits_unreleased() {
        let record = AttemptRecord::new("u", "q", EndReason::Timeout, make_result());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["endReason"], "timeout");
        assert!(json.get("scoreReleasedAt").is_none());
        assert_eq!(json["result"]["detailedResults"][1]["needsReview"], true);
    }

    #[test]
    fn regrade_updates_result() {
        let mut record = AttemptRecord::new("u", "q", EndReason::Submitted, make_result());
        assert_eq!(record.result.percentage, 50);
        record.regrade(1, &ManualGrade::new(1.0, 1.0)).unwrap();
        assert_eq!(record.result.percentage, 100);
        assert_eq!(record.result.time_spent, 90);
        assert_eq!(record.result.pending_review(), 0);
    }

    #[test]
    fn failed_regrade_leaves_record_untouched() {
        let mut record = AttemptRecord::new("u", "q", EndReason::Submitted, make_result());
        let before = record.clone();
        let err = record.regrade(1, &ManualGrade::new(2.0, 1.0)).unwrap_err();
        assert!(matches!(err, GradeError::InvalidGrade { .. }));
        assert_eq!(record, before);
    }

    #[test]
    fn release_keeps_first_timestamp() {
        let mut record = AttemptRecord::new("u", "q", EndReason::Submitted, make_result());
        record.release_score();
        let first = record.score_released_at;
        record.release_score();
        assert!(first.is_some());
        assert_eq!(record.score_released_at, first);
    }

    #[test]
    fn end_reason_parses() {
        assert_eq!("Timeout".parse::<EndReason>(), Ok(EndReason::Timeout));
        assert!("quit".parse::<EndReason>().is_err());
    }

    #[test]
    fn load_missing_file_fails() {
        let err = AttemptRecord::load_json(Path::new("/nonexistent/attempt.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read attempt"));
    }
}
