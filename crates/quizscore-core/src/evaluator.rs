//! Per-question evaluation and whole-attempt scoring.
//!
//! [`Grader::evaluate`] is a single exhaustive match over [`QuestionKind`];
//! each arm applies its own credit policy. Nothing here returns an error:
//! answers that cannot be interpreted earn zero credit.

use std::collections::{BTreeSet, HashMap};

use serde_json::{json, Value};

use quizscore_algebra::eval::parse_plain_number;
use quizscore_algebra::{AlgebraEngine, SymbolicComparator};

use crate::aggregate::summarize;
use crate::config::GradingConfig;
use crate::model::{
    Blank, IndexBase, Question, QuestionKind, QuestionResult, Quiz, QuizResult, SubmittedAnswer,
};

/// Score an attempt with default grading settings and the shared back end.
pub fn score(questions: &[Question], answers: &[SubmittedAnswer], time_spent: u64) -> QuizResult {
    Grader::new(&GradingConfig::default(), quizscore_algebra::shared())
        .score(questions, answers, time_spent)
}

/// Applies grading policy to questions and submitted answers.
#[derive(Debug, Clone)]
pub struct Grader<'a> {
    settings: GradingConfig,
    comparator: SymbolicComparator<'a>,
}

impl<'a> Grader<'a> {
    pub fn new(settings: &GradingConfig, engine: Option<&'a AlgebraEngine>) -> Self {
        Self {
            settings: settings.clone(),
            comparator: SymbolicComparator::new(engine),
        }
    }

    /// Use the quiz's declared index base, if it has one.
    pub fn for_quiz(mut self, quiz: &Quiz) -> Self {
        if let Some(base) = quiz.index_base {
            self.settings.index_base = base;
        }
        self
    }

    pub fn index_base(&self) -> IndexBase {
        self.settings.index_base
    }

    pub fn comparator(&self) -> &SymbolicComparator<'a> {
        &self.comparator
    }

    /// Score a whole quiz using its own index base.
    pub fn grade_quiz(
        &self,
        quiz: &Quiz,
        answers: &[SubmittedAnswer],
        time_spent: u64,
    ) -> QuizResult {
        self.clone()
            .for_quiz(quiz)
            .score(&quiz.questions, answers, time_spent)
    }

    /// Evaluate every question in order and aggregate.
    ///
    /// Answers are matched by question id; when a question id is submitted
    /// more than once the last entry wins.
    pub fn score(
        &self,
        questions: &[Question],
        answers: &[SubmittedAnswer],
        time_spent: u64,
    ) -> QuizResult {
        let by_id: HashMap<i64, &SubmittedAnswer> =
            answers.iter().map(|a| (a.question_id, a)).collect();

        let detailed: Vec<QuestionResult> = questions
            .iter()
            .map(|q| self.evaluate(q, by_id.get(&q.id).copied()))
            .collect();

        let result = summarize(detailed, time_spent);
        tracing::debug!(
            score = result.score,
            percentage = result.percentage,
            questions = result.total_questions,
            "scored attempt"
        );
        result
    }

    /// Evaluate a single question.
    pub fn evaluate(
        &self,
        question: &Question,
        answer: Option<&SubmittedAnswer>,
    ) -> QuestionResult {
        let mut result = QuestionResult {
            question_id: question.id,
            question: question.question.clone(),
            question_type: question.question_type(),
            user_answer: Value::Null,
            correct_answer: correct_answer_echo(&question.kind),
            is_correct: false,
            points: 0.0,
            max_points: 1.0,
            needs_review: false,
        };

        let values = match answer {
            Some(a) if !a.answer.is_empty() => &a.answer,
            _ => {
                // An unanswered essay still waits for a manual grade.
                result.needs_review = matches!(question.kind, QuestionKind::Essay {});
                return result;
            }
        };
        result.user_answer = Value::Array(values.clone());

        let base = self.settings.index_base;
        let points = match &question.kind {
            QuestionKind::MultipleChoice { correct_answer, .. } => {
                let correct = base.to_one_based(&[*correct_answer]);
                let selected = base.to_one_based(&indices(&values[..1]));
                full_or_nothing(!selected.is_empty() && selected == correct)
            }
            QuestionKind::MultipleSelect { correct_answer, .. } => {
                let correct: BTreeSet<i64> =
                    base.to_one_based(correct_answer).into_iter().collect();
                let selected: BTreeSet<i64> =
                    base.to_one_based(&indices(values)).into_iter().collect();
                full_or_nothing(selected == correct)
            }
            QuestionKind::ComplexMultipleChoice { correct_answer, .. } => {
                let correct: BTreeSet<i64> =
                    base.to_one_based(correct_answer).into_iter().collect();
                let selected: BTreeSet<i64> =
                    base.to_one_based(&indices(values)).into_iter().collect();
                penalty_weighted(&correct, &selected)
            }
            QuestionKind::Text { correct_answer } => {
                let user = as_text(&values[0]);
                full_or_nothing(user.trim().to_lowercase() == correct_answer.trim().to_lowercase())
            }
            QuestionKind::Number {
                correct_answer,
                tolerance,
            } => {
                let tolerance = tolerance.unwrap_or(self.settings.number_tolerance);
                let matched = as_number(&values[0])
                    .is_some_and(|user| (user - correct_answer).abs() <= tolerance);
                full_or_nothing(matched)
            }
            QuestionKind::Essay {} => {
                result.needs_review = true;
                return result;
            }
            QuestionKind::FillInTheBlank { blanks } => self.score_blanks(blanks, values),
        };

        result.points = points;
        result.is_correct = match question.kind {
            QuestionKind::ComplexMultipleChoice { .. } => points > 0.0,
            _ => points == 1.0,
        };
        result
    }

    /// `matching / total`, each blank weighted equally.
    fn score_blanks(&self, blanks: &[Blank], values: &[Value]) -> f64 {
        if blanks.is_empty() {
            return 0.0;
        }
        let matching = blanks
            .iter()
            .filter(|blank| {
                let user = usize::try_from(blank.index)
                    .ok()
                    .and_then(|i| values.get(i))
                    .map(as_text)
                    .unwrap_or_default();
                self.blank_matches(blank, &user)
            })
            .count();
        matching as f64 / blanks.len() as f64
    }

    fn blank_matches(&self, blank: &Blank, user: &str) -> bool {
        let tolerance = blank.tolerance.unwrap_or(self.settings.blank_tolerance);

        if !blank.math_mode {
            return blank.correct_answers.iter().any(|correct| {
                if blank.case_sensitive {
                    user.trim() == correct.trim()
                } else {
                    user.trim().to_lowercase() == correct.trim().to_lowercase()
                }
            });
        }

        if user.trim().is_empty() {
            return false;
        }

        if blank.algebra_mode {
            return blank
                .correct_answers
                .iter()
                .any(|correct| self.comparator.equivalent(user, correct, tolerance));
        }

        blank.correct_answers.iter().any(|correct| {
            match (parse_plain_number(user), parse_plain_number(correct)) {
                (Some(u), Some(c)) => (u - c).abs() <= tolerance,
                _ => user.trim().to_lowercase() == correct.trim().to_lowercase(),
            }
        })
    }
}

fn full_or_nothing(matched: bool) -> f64 {
    if matched {
        1.0
    } else {
        0.0
    }
}

/// `max(0, c/N - i/N)` for `c` correct and `i` incorrect selections.
fn penalty_weighted(correct: &BTreeSet<i64>, selected: &BTreeSet<i64>) -> f64 {
    let n = correct.len();
    if n == 0 {
        return 0.0;
    }
    let hits = selected.intersection(correct).count();
    let misses = selected.len() - hits;
    let n = n as f64;
    (hits as f64 / n - misses as f64 / n).max(0.0)
}

/// Interpret submitted values as option indices, dropping the unreadable.
fn indices(values: &[Value]) -> Vec<i64> {
    values.iter().filter_map(as_index).collect()
}

fn as_index(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_plain_number(s),
        _ => None,
    }
}

/// Render a submitted value as text; `null` becomes the empty string.
fn as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn correct_answer_echo(kind: &QuestionKind) -> Value {
    match kind {
        QuestionKind::MultipleChoice { correct_answer, .. } => json!(correct_answer),
        QuestionKind::MultipleSelect { correct_answer, .. }
        | QuestionKind::ComplexMultipleChoice { correct_answer, .. } => json!(correct_answer),
        QuestionKind::Text { correct_answer } => json!(correct_answer),
        QuestionKind::Number { correct_answer, .. } => json!(correct_answer),
        QuestionKind::Essay {} => Value::Null,
        QuestionKind::FillInTheBlank { blanks } => Value::Array(
            blanks
                .iter()
                .map(|b| json!({ "index": b.index, "correctAnswers": b.correct_answers }))
                .collect(),
        ),
    }
}
