//! Core data model: quizzes, questions, submitted answers and results.
//!
//! Field names serialize in camelCase and the question type is carried in a
//! `type` tag, so the same structures read quiz files, answer payloads and
//! stored results.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A quiz: an ordered list of questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// How stored option indices are numbered. Falls back to configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_base: Option<IndexBase>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// A single question. Immutable once an attempt begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    /// Prompt text, echoed into results.
    #[serde(default)]
    pub question: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// Type-specific part of a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionKind {
    #[serde(rename_all = "camelCase")]
    MultipleChoice {
        #[serde(default)]
        options: Vec<String>,
        correct_answer: i64,
    },
    #[serde(rename_all = "camelCase")]
    MultipleSelect {
        #[serde(default)]
        options: Vec<String>,
        correct_answer: Vec<i64>,
    },
    #[serde(rename_all = "camelCase")]
    ComplexMultipleChoice {
        #[serde(default)]
        options: Vec<String>,
        correct_answer: Vec<i64>,
    },
    #[serde(rename_all = "camelCase")]
    Text { correct_answer: String },
    #[serde(rename_all = "camelCase")]
    Number {
        correct_answer: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tolerance: Option<f64>,
    },
    Essay {},
    FillInTheBlank {
        #[serde(default)]
        blanks: Vec<Blank>,
    },
}

impl QuestionKind {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuestionKind::MultipleSelect { .. } => QuestionType::MultipleSelect,
            QuestionKind::ComplexMultipleChoice { .. } => QuestionType::ComplexMultipleChoice,
            QuestionKind::Text { .. } => QuestionType::Text,
            QuestionKind::Number { .. } => QuestionType::Number,
            QuestionKind::Essay {} => QuestionType::Essay,
            QuestionKind::FillInTheBlank { .. } => QuestionType::FillInTheBlank,
        }
    }
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }
}

/// One slot of a fill-in-the-blank question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blank {
    /// Position of the learner's value in the submitted answer array.
    pub index: i64,
    pub correct_answers: Vec<String>,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub math_mode: bool,
    /// Use symbolic comparison in math mode; otherwise numbers only.
    #[serde(default = "default_true")]
    pub algebra_mode: bool,
    /// Falls back to the configured blank tolerance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
}

fn default_true() -> bool {
    true
}

/// Question type names, as they appear in the `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    MultipleSelect,
    ComplexMultipleChoice,
    Text,
    Number,
    Essay,
    FillInTheBlank,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::MultipleChoice => write!(f, "multiple-choice"),
            QuestionType::MultipleSelect => write!(f, "multiple-select"),
            QuestionType::ComplexMultipleChoice => write!(f, "complex-multiple-choice"),
            QuestionType::Text => write!(f, "text"),
            QuestionType::Number => write!(f, "number"),
            QuestionType::Essay => write!(f, "essay"),
            QuestionType::FillInTheBlank => write!(f, "fill-in-the-blank"),
        }
    }
}

/// How option indices in a quiz are numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBase {
    /// A collection containing any index `<= 0` is taken as 0-based.
    #[default]
    Auto,
    Zero,
    One,
}

impl IndexBase {
    /// Map a collection of indices to 1-based numbering.
    pub fn to_one_based(self, indices: &[i64]) -> Vec<i64> {
        let shift = match self {
            IndexBase::One => false,
            IndexBase::Zero => true,
            IndexBase::Auto => indices.iter().any(|&i| i <= 0),
        };
        if shift {
            indices.iter().map(|i| i.saturating_add(1)).collect()
        } else {
            indices.to_vec()
        }
    }
}

impl fmt::Display for IndexBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexBase::Auto => write!(f, "auto"),
            IndexBase::Zero => write!(f, "zero"),
            IndexBase::One => write!(f, "one"),
        }
    }
}

/// A learner's answer to one question. A question with no entry is unanswered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: i64,
    /// Type name as sent by the client. Informational only.
    #[serde(rename = "type", default)]
    pub question_type: String,
    #[serde(default)]
    pub answer: Vec<Value>,
}

/// Outcome of evaluating one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: i64,
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub user_answer: Value,
    pub correct_answer: Value,
    pub is_correct: bool,
    pub points: f64,
    pub max_points: f64,
    /// Waiting for a manual grade; excluded from correct/incorrect counts.
    #[serde(default)]
    pub needs_review: bool,
}

/// Aggregated outcome of one submitted attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub score: f64,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub incorrect_answers: usize,
    pub percentage: u32,
    pub time_spent: u64,
    pub detailed_results: Vec<QuestionResult>,
}

impl QuizResult {
    /// Sum of the maximum points of every question.
    pub fn max_score(&self) -> f64 {
        self.detailed_results.iter().map(|r| r.max_points).sum()
    }

    /// Number of results still waiting for a manual grade.
    pub fn pending_review(&self) -> usize {
        self.detailed_results.iter().filter(|r| r.needs_review).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_type_tag_is_kebab_case() {
        let json = r#"{"id": 3, "type": "complex-multiple-choice", "question": "Pick",
                       "options": ["a", "b", "c"], "correctAnswer": [1, 3]}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.question_type(), QuestionType::ComplexMultipleChoice);
        assert!(matches!(
            q.kind,
            QuestionKind::ComplexMultipleChoice {
                ref correct_answer,
                ..
            } if correct_answer == &[1, 3]
        ));
    }

    #[test]
    fn blank_defaults() {
        let json = r#"{"index": 0, "correctAnswers": ["x"]}"#;
        let blank: Blank = serde_json::from_str(json).unwrap();
        assert!(blank.algebra_mode);
        assert!(!blank.math_mode);
        assert!(!blank.case_sensitive);
        assert_eq!(blank.tolerance, None);
    }

    #[test]
    fn essay_round_trips_through_json() {
        let q = Question {
            id: 9,
            question: "Explain".into(),
            kind: QuestionKind::Essay {},
        };
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["type"], "essay");
        let back: Question = serde_json::from_value(json).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn number_question_accepts_integer_answer() {
        let json = r#"{"id": 1, "type": "number", "correctAnswer": 3}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert!(matches!(
            q.kind,
            QuestionKind::Number {
                correct_answer,
                tolerance: None
            } if correct_answer == 3.0
        ));
    }

    #[test]
    fn index_base_shifts() {
        assert_eq!(IndexBase::One.to_one_based(&[0, 2]), vec![0, 2]);
        assert_eq!(IndexBase::Zero.to_one_based(&[1, 2]), vec![2, 3]);
        assert_eq!(IndexBase::Auto.to_one_based(&[0, 2]), vec![1, 3]);
        assert_eq!(IndexBase::Auto.to_one_based(&[1, 2]), vec![1, 2]);
    }

    #[test]
    fn results_serialize_camel_case() {
        let result = QuestionResult {
            question_id: 1,
            question: "q".into(),
            question_type: QuestionType::Text,
            user_answer: Value::Null,
            correct_answer: Value::String("a".into()),
            is_correct: false,
            points: 0.0,
            max_points: 1.0,
            needs_review: false,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("questionId").is_some());
        assert!(json.get("maxPoints").is_some());
        assert_eq!(json["type"], "text");
    }
}
