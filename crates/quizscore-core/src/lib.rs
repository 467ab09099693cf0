//! quizscore-core: Question evaluation and score aggregation.
//!
//! This crate defines the quiz data model, the per-question grading policies,
//! the aggregation of per-question results into an attempt score, and manual
//! regrading of stored results. Math-mode answers are compared through
//! `quizscore-algebra`.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod parser;

pub use aggregate::{regrade_question, summarize, ManualGrade};
pub use config::{load_config, load_config_from, GradingConfig, QuizscoreConfig};
pub use error::GradeError;
pub use evaluator::{score, Grader};
pub use model::{
    Blank, IndexBase, Question, QuestionKind, QuestionResult, QuestionType, Quiz, QuizResult,
    SubmittedAnswer,
};
