//! End-to-end grading scenarios and aggregate properties.

use serde_json::{json, Value};

use quizscore_algebra::{AlgebraConfig, AlgebraEngine};
use quizscore_core::{
    regrade_question, Blank, GradingConfig, Grader, ManualGrade, Question, QuestionKind,
    SubmittedAnswer,
};

fn engine() -> AlgebraEngine {
    AlgebraEngine::load(&AlgebraConfig::default()).unwrap()
}

fn answer(id: i64, values: Vec<Value>) -> SubmittedAnswer {
    SubmittedAnswer {
        question_id: id,
        question_type: String::new(),
        answer: values,
    }
}

fn math_blank(index: i64, correct: &str) -> Blank {
    Blank {
        index,
        correct_answers: vec![correct.to_string()],
        case_sensitive: false,
        math_mode: true,
        algebra_mode: true,
        tolerance: None,
    }
}

fn mixed_quiz() -> Vec<Question> {
    vec![
        Question {
            id: 1,
            question: "Pick C".into(),
            kind: QuestionKind::MultipleChoice {
                options: vec!["A".into(), "B".into(), "C".into()],
                correct_answer: 3,
            },
        },
        Question {
            id: 2,
            question: "Pick the odd numbers".into(),
            kind: QuestionKind::ComplexMultipleChoice {
                options: vec!["1".into(), "2".into(), "3".into(), "4".into()],
                correct_answer: vec![1, 3],
            },
        },
        Question {
            id: 3,
            question: "Describe a proof".into(),
            kind: QuestionKind::Essay {},
        },
        Question {
            id: 4,
            question: "Approximate pi".into(),
            kind: QuestionKind::Number {
                correct_answer: 3.14,
                tolerance: Some(0.01),
            },
        },
        Question {
            id: 5,
            question: "Explain limits".into(),
            kind: QuestionKind::Essay {},
        },
    ]
}

#[test]
fn scenario_multiple_choice() {
    let grader = Grader::new(&GradingConfig::default(), None);
    let q = Question {
        id: 1,
        question: "Pick B".into(),
        kind: QuestionKind::MultipleChoice {
            options: vec!["A".into(), "B".into(), "C".into()],
            correct_answer: 2,
        },
    };
    let r = grader.evaluate(&q, Some(&answer(1, vec![json!(2)])));
    assert!(r.is_correct);
    assert_eq!(r.points, 1.0);
}

#[test]
fn scenario_complex_multiple_choice_penalty() {
    let grader = Grader::new(&GradingConfig::default(), None);
    let q = &mixed_quiz()[1];
    let r = grader.evaluate(q, Some(&answer(2, vec![json!(1), json!(2)])));
    assert_eq!(r.points, 0.0);
    assert!(!r.is_correct);

    let r = grader.evaluate(q, Some(&answer(2, vec![json!(1)])));
    assert_eq!(r.points, 0.5);
    assert!(r.is_correct);
}

#[test]
fn scenario_math_blanks() {
    let engine = engine();
    let grader = Grader::new(&GradingConfig::default(), Some(&engine));
    let q = Question {
        id: 7,
        question: "Fill in".into(),
        kind: QuestionKind::FillInTheBlank {
            blanks: vec![
                math_blank(0, "2*x+2"),
                math_blank(1, "5"),
                math_blank(2, "y^2"),
            ],
        },
    };
    let r = grader.evaluate(
        &q,
        Some(&answer(7, vec![json!("2(x+1)"), json!("5.0"), json!("y*y")])),
    );
    assert_eq!(r.points, 1.0);
    assert!(r.is_correct);
}

#[test]
fn scenario_number_within_tolerance() {
    let grader = Grader::new(&GradingConfig::default(), None);
    let q = &mixed_quiz()[3];
    let r = grader.evaluate(q, Some(&answer(4, vec![json!(3.145)])));
    assert!(r.is_correct);
}

#[test]
fn scenario_essay_until_regraded() {
    let grader = Grader::new(&GradingConfig::default(), None);
    let questions = mixed_quiz();
    let result = grader.score(&questions, &[answer(3, vec![json!("Because...")])], 0);
    let essay = &result.detailed_results[2];
    assert_eq!(essay.points, 0.0);
    assert!(!essay.is_correct);
    assert!(essay.needs_review);

    let regraded = result.regrade(2, &ManualGrade::new(1.0, 1.0)).unwrap();
    assert_eq!(regraded.detailed_results[2].points, 1.0);
    assert!(regraded.detailed_results[2].is_correct);
}

#[test]
fn scoring_is_idempotent() {
    let engine = engine();
    let grader = Grader::new(&GradingConfig::default(), Some(&engine));
    let questions = mixed_quiz();
    let answers = vec![
        answer(1, vec![json!(3)]),
        answer(2, vec![json!(1), json!(4)]),
        answer(4, vec![json!("3.2")]),
    ];
    let first = grader.score(&questions, &answers, 120);
    let second = grader.score(&questions, &answers, 120);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn equal_weight_per_blank() {
    let engine = engine();
    let grader = Grader::new(&GradingConfig::default(), Some(&engine));
    for n in 1..=6i64 {
        let blanks: Vec<Blank> = (0..n).map(|i| math_blank(i, &i.to_string())).collect();
        let q = Question {
            id: 1,
            question: String::new(),
            kind: QuestionKind::FillInTheBlank { blanks },
        };
        for k in 0..=n {
            let values = (0..n)
                .map(|i| if i < k { json!(i.to_string()) } else { json!("wrong") })
                .collect();
            let r = grader.evaluate(&q, Some(&answer(1, values)));
            assert!((r.points - k as f64 / n as f64).abs() < 1e-9, "n={n} k={k}");
        }
    }
}

#[test]
fn penalty_never_goes_negative() {
    let grader = Grader::new(&GradingConfig::default(), None);
    let q = &mixed_quiz()[1];
    let selections: [&[i64]; 5] = [&[], &[2], &[2, 4], &[1, 2, 3, 4], &[4, 2, 2]];
    for selection in selections {
        let values = selection.iter().map(|i| json!(i)).collect();
        let r = grader.evaluate(q, Some(&answer(2, values)));
        assert!(r.points >= 0.0, "{selection:?}");
    }
}

#[test]
fn percentage_stays_in_bounds() {
    let grader = Grader::new(&GradingConfig::default(), None);
    let questions = mixed_quiz();
    let cases = [
        vec![],
        vec![answer(1, vec![json!(3)])],
        vec![
            answer(1, vec![json!(3)]),
            answer(2, vec![json!(1), json!(3)]),
            answer(4, vec![json!(3.14)]),
        ],
    ];
    for answers in cases {
        let r = grader.score(&questions, &answers, 0);
        assert!(r.percentage <= 100);
    }
    assert_eq!(grader.score(&[], &[], 0).percentage, 0);
}

#[test]
fn non_essay_results_are_all_counted() {
    let grader = Grader::new(&GradingConfig::default(), None);
    let questions = mixed_quiz();
    let r = grader.score(&questions, &[answer(1, vec![json!(1)])], 0);
    // Two essays pending review.
    assert_eq!(r.correct_answers + r.incorrect_answers, r.total_questions - 2);
}

#[test]
fn regrading_essays_matches_auto_correct_essays() {
    let grader = Grader::new(&GradingConfig::default(), None);
    let questions = mixed_quiz();
    let answers = vec![
        answer(1, vec![json!(3)]),
        answer(2, vec![json!(1)]),
        answer(3, vec![json!("essay one")]),
        answer(5, vec![json!("essay two")]),
    ];
    let mut result = grader.score(&questions, &answers, 60);
    for index in [2, 4] {
        let max_points = result.detailed_results[index].max_points;
        result = regrade_question(
            &result.detailed_results,
            index,
            &ManualGrade::new(max_points, max_points),
            result.time_spent,
        )
        .unwrap();
    }

    // Same attempt with the essays swapped for questions answered correctly.
    let auto: Vec<Question> = questions
        .iter()
        .map(|q| match q.kind {
            QuestionKind::Essay {} => Question {
                id: q.id,
                question: q.question.clone(),
                kind: QuestionKind::Text {
                    correct_answer: "ok".into(),
                },
            },
            _ => q.clone(),
        })
        .collect();
    let auto_answers = vec![
        answer(1, vec![json!(3)]),
        answer(2, vec![json!(1)]),
        answer(3, vec![json!("ok")]),
        answer(5, vec![json!("ok")]),
    ];
    let expected = grader.score(&auto, &auto_answers, 60);

    assert_eq!(result.percentage, expected.percentage);
    assert_eq!(result.score, expected.score);
    assert_eq!(result.correct_answers, expected.correct_answers);
}

#[test]
fn rejected_regrade_leaves_result_untouched() {
    let grader = Grader::new(&GradingConfig::default(), None);
    let result = grader.score(&mixed_quiz(), &[answer(3, vec![json!("text")])], 0);
    let before = result.clone();
    assert!(result.regrade(2, &ManualGrade::new(1.5, 1.0)).is_err());
    assert_eq!(result, before);
}
