//! Quiz and answer file loading, and quiz validation.
//!
//! Quizzes are read from TOML or JSON (chosen by file extension); answer
//! sets are JSON arrays of submitted answers.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

use quizscore_algebra::AlgebraEngine;

use crate::model::{Blank, IndexBase, Question, QuestionKind, Quiz, SubmittedAnswer};

/// Parse a quiz file, TOML or JSON by extension.
pub fn parse_quiz(path: &Path) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse quiz content; `source_path` selects the format and labels errors.
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<Quiz> {
    if is_json(source_path) {
        serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display()))
    } else {
        toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Recursively load all `.toml` and `.json` quiz files from a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            quizzes.extend(load_quiz_directory(&path)?);
        } else if path
            .extension()
            .is_some_and(|ext| ext == "toml" || ext == "json")
        {
            match parse_quiz(&path) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(quizzes)
}

/// Load a JSON array of submitted answers.
pub fn load_answers(path: &Path) -> Result<Vec<SubmittedAnswer>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answers: {}", path.display()))
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<i64>,
    /// Warning message.
    pub message: String,
}

/// Validate a quiz for common authoring mistakes.
///
/// Correct indices are read with the quiz's own index base, falling back to
/// `default_base` (the configured one). With an engine, math-mode correct
/// answers are also checked for parsability.
pub fn validate_quiz(
    quiz: &Quiz,
    default_base: IndexBase,
    engine: Option<&AlgebraEngine>,
) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let base = quiz.index_base.unwrap_or(default_base);

    let mut seen_ids = HashSet::new();
    for question in &quiz.questions {
        if !seen_ids.insert(question.id) {
            let message = format!("duplicate question ID: {}", question.id);
            warn(&mut warnings, question, message);
        }
    }

    for question in &quiz.questions {
        match &question.kind {
            QuestionKind::MultipleChoice {
                options,
                correct_answer,
            } => {
                let correct = base.to_one_based(&[*correct_answer]);
                check_option_range(&mut warnings, question, options.len(), &correct);
            }
            QuestionKind::MultipleSelect {
                options,
                correct_answer,
            } => {
                let correct = base.to_one_based(correct_answer);
                check_option_range(&mut warnings, question, options.len(), &correct);
            }
            QuestionKind::ComplexMultipleChoice {
                options,
                correct_answer,
            } => {
                if correct_answer.is_empty() {
                    let message = "no correct option; every answer scores zero".to_string();
                    warn(&mut warnings, question, message);
                }
                let correct = base.to_one_based(correct_answer);
                check_option_range(&mut warnings, question, options.len(), &correct);
            }
            QuestionKind::Number {
                tolerance: Some(t), ..
            } if *t < 0.0 => {
                warn(&mut warnings, question, format!("negative tolerance: {t}"));
            }
            QuestionKind::FillInTheBlank { blanks } => {
                check_blanks(&mut warnings, question, blanks, engine);
            }
            _ => {}
        }
    }

    warnings
}

fn check_blanks(
    warnings: &mut Vec<ValidationWarning>,
    question: &Question,
    blanks: &[Blank],
    engine: Option<&AlgebraEngine>,
) {
    if blanks.is_empty() {
        warn(warnings, question, "fill-in-the-blank question has no blanks".into());
    }
    let mut seen_blanks = HashSet::new();
    for blank in blanks {
        let index = blank.index;
        if !seen_blanks.insert(index) {
            warn(warnings, question, format!("duplicate blank index: {index}"));
        }
        if index < 0 {
            warn(warnings, question, format!("negative blank index: {index}"));
        }
        if blank.tolerance.is_some_and(|t| t < 0.0) {
            warn(warnings, question, format!("blank {index} has a negative tolerance"));
        }
        if blank.correct_answers.is_empty() {
            warn(warnings, question, format!("blank {index} has no correct answers"));
        }
        let Some(engine) = engine.filter(|_| blank.math_mode && blank.algebra_mode) else {
            continue;
        };
        for answer in &blank.correct_answers {
            if let Err(e) = engine.parse_lenient(answer) {
                let message = format!("blank {index}: cannot parse {answer:?}: {e}");
                warn(warnings, question, message);
            }
        }
    }
}

fn warn(warnings: &mut Vec<ValidationWarning>, question: &Question, message: String) {
    warnings.push(ValidationWarning {
        question_id: Some(question.id),
        message,
    });
}

fn check_option_range(
    warnings: &mut Vec<ValidationWarning>,
    question: &Question,
    option_count: usize,
    indices: &[i64],
) {
    if option_count == 0 {
        warn(warnings, question, "question has no options".into());
        return;
    }
    for &index in indices {
        if index < 1 || index as usize > option_count {
            warn(
                warnings,
                question,
                format!("correct index {index} is outside options 1..={option_count}"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionType;
    use quizscore_algebra::AlgebraConfig;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
id = "algebra-basics"
title = "Algebra basics"
indexBase = "one"

[[questions]]
id = 1
type = "multiple-choice"
question = "Which is prime?"
options = ["4", "6", "7"]
correctAnswer = 3

[[questions]]
id = 2
type = "number"
question = "Approximate pi"
correctAnswer = 3.14
tolerance = 0.01

[[questions]]
id = 3
type = "fill-in-the-blank"
question = "Expand 2(x+1) = ___"

[[questions.blanks]]
index = 0
correctAnswers = ["2*x+2"]
mathMode = true

[[questions]]
id = 4
type = "essay"
question = "Explain why."
"#;

    #[test]
    fn parse_valid_toml() {
        let quiz = parse_quiz_str(VALID_TOML, &PathBuf::from("quiz.toml")).unwrap();
        assert_eq!(quiz.id, "algebra-basics");
        assert_eq!(quiz.index_base, Some(IndexBase::One));
        assert_eq!(quiz.questions.len(), 4);
        let types: Vec<QuestionType> = quiz.questions.iter().map(|q| q.question_type()).collect();
        assert_eq!(
            types,
            vec![
                QuestionType::MultipleChoice,
                QuestionType::Number,
                QuestionType::FillInTheBlank,
                QuestionType::Essay
            ]
        );
        match &quiz.questions[2].kind {
            QuestionKind::FillInTheBlank { blanks } => {
                assert!(blanks[0].math_mode);
                assert!(blanks[0].algebra_mode);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn parse_json_quiz() {
        let json = r#"{"id": "j", "questions": [
            {"id": 1, "type": "text", "question": "Capital of France?", "correctAnswer": "Paris"}
        ]}"#;
        let quiz = parse_quiz_str(json, &PathBuf::from("quiz.json")).unwrap();
        assert_eq!(quiz.questions[0].question_type(), QuestionType::Text);
        assert_eq!(quiz.index_base, None);
    }

    #[test]
    fn parse_unknown_type_fails() {
        let toml = r#"
id = "bad"
[[questions]]
id = 1
type = "matching"
"#;
        assert!(parse_quiz_str(toml, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_quiz_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn load_directory_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "id = ").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let quizzes = load_quiz_directory(dir.path()).unwrap();
        assert_eq!(quizzes.len(), 1);
        assert_eq!(quizzes[0].id, "algebra-basics");
    }

    #[test]
    fn load_answers_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.json");
        std::fs::write(
            &path,
            r#"[{"questionId": 1, "type": "multiple-choice", "answer": [3]},
                {"questionId": 3, "answer": ["2(x+1)"]}]"#,
        )
        .unwrap();
        let answers = load_answers(&path).unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[1].question_id, 3);
        assert!(answers[1].question_type.is_empty());
    }

    #[test]
    fn validate_clean_quiz() {
        let quiz = parse_quiz_str(VALID_TOML, &PathBuf::from("quiz.toml")).unwrap();
        let engine = AlgebraEngine::load(&AlgebraConfig::default()).unwrap();
        let warnings = validate_quiz(&quiz, IndexBase::Auto, Some(&engine));
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn validate_reports_authoring_mistakes() {
        let toml = r#"
id = "messy"
indexBase = "one"

[[questions]]
id = 1
type = "multiple-choice"
options = ["a", "b"]
correctAnswer = 5

[[questions]]
id = 1
type = "complex-multiple-choice"
options = ["a", "b"]
correctAnswer = []

[[questions]]
id = 2
type = "fill-in-the-blank"

[[questions.blanks]]
index = 0
correctAnswers = ["(x+"]
mathMode = true

[[questions.blanks]]
index = 0
correctAnswers = ["y"]
tolerance = -1.0

[[questions]]
id = 3
type = "fill-in-the-blank"
blanks = []
"#;
        let quiz = parse_quiz_str(toml, &PathBuf::from("messy.toml")).unwrap();
        let engine = AlgebraEngine::load(&AlgebraConfig::default()).unwrap();
        let messages: Vec<String> = validate_quiz(&quiz, IndexBase::Auto, Some(&engine))
            .into_iter()
            .map(|w| w.message)
            .collect();
        let has = |needle: &str| messages.iter().any(|m| m.contains(needle));
        assert!(has("duplicate question ID"), "{messages:?}");
        assert!(has("outside options"), "{messages:?}");
        assert!(has("no correct option"), "{messages:?}");
        assert!(has("duplicate blank index"), "{messages:?}");
        assert!(has("negative tolerance"), "{messages:?}");
        assert!(has("cannot parse"), "{messages:?}");
        assert!(has("has no blanks"), "{messages:?}");
    }

    #[test]
    fn validate_uses_configured_index_base() {
        let json = r#"{"id": "z", "questions": [
            {"id": 1, "type": "multiple-choice", "options": ["a", "b"], "correctAnswer": 1},
            {"id": 2, "type": "multiple-select", "options": ["a", "b", "c"], "correctAnswer": [2]}
        ]}"#;
        let quiz = parse_quiz_str(json, &PathBuf::from("z.json")).unwrap();
        assert!(validate_quiz(&quiz, IndexBase::Zero, None).is_empty());

        let warnings = validate_quiz(&quiz, IndexBase::One, None);
        assert!(warnings.is_empty(), "{warnings:?}");

        let tight = r#"{"id": "t", "questions": [
            {"id": 1, "type": "multiple-choice", "options": ["a", "b"], "correctAnswer": 2}
        ]}"#;
        let quiz = parse_quiz_str(tight, &PathBuf::from("t.json")).unwrap();
        assert!(validate_quiz(&quiz, IndexBase::One, None).is_empty());
        let warnings = validate_quiz(&quiz, IndexBase::Zero, None);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("outside options"));

        // A base declared in the quiz wins over the configured one.
        let declared = tight.replace(r#""id": "t","#, r#""id": "t", "indexBase": "one","#);
        let quiz = parse_quiz_str(&declared, &PathBuf::from("t.json")).unwrap();
        assert!(validate_quiz(&quiz, IndexBase::Zero, None).is_empty());
    }
}
