//! The `quizscore grade` command.

use std::path::PathBuf;

use anyhow::Result;

use quizscore_core::parser::{load_answers, parse_quiz};
use quizscore_core::{Grader, Quiz};
use quizscore_report::html::{display_value, generate_html};
use quizscore_report::{AttemptRecord, EndReason};

#[allow(clippy::too_many_arguments)]
pub fn execute(
    quiz_path: PathBuf,
    answers_path: PathBuf,
    time_spent: u64,
    user: String,
    end_reason: String,
    format: String,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let end_reason: EndReason = end_reason.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    anyhow::ensure!(
        matches!(format.as_str(), "text" | "json" | "html"),
        "unknown format: {format} (expected text, json or html)"
    );

    let (config, engine) = super::load_environment(config_path.as_deref())?;
    let quiz = parse_quiz(&quiz_path)?;
    let answers = load_answers(&answers_path)?;

    let known: std::collections::HashSet<i64> = quiz.questions.iter().map(|q| q.id).collect();
    for answer in answers.iter().filter(|a| !known.contains(&a.question_id)) {
        tracing::warn!(
            "answer for unknown question {} ignored",
            answer.question_id
        );
    }

    let grader = Grader::new(&config.grading, engine);
    let result = grader.grade_quiz(&quiz, &answers, time_spent);
    let record = AttemptRecord::new(user, quiz.id.clone(), end_reason, result);

    match format.as_str() {
        "json" => match &output {
            Some(path) => {
                record.save_json(path)?;
                println!("Wrote attempt to {}", path.display());
            }
            None => println!("{}", serde_json::to_string_pretty(&record)?),
        },
        "html" => match &output {
            Some(path) => {
                quizscore_report::write_html_report(&record, path)?;
                println!("Wrote review page to {}", path.display());
            }
            None => println!("{}", generate_html(&record)),
        },
        _ => {
            print_summary(&quiz, &record);
            if let Some(path) = &output {
                record.save_json(path)?;
                println!("Saved attempt {} to {}", record.id, path.display());
            }
        }
    }

    Ok(())
}

fn print_summary(quiz: &Quiz, record: &AttemptRecord) {
    use comfy_table::{Cell, Table};

    let result = &record.result;
    let title = if quiz.title.is_empty() {
        quiz.id.clone()
    } else {
        format!("{} ({})", quiz.title, quiz.id)
    };
    println!("Quiz: {title}");

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Type", "Answer", "Points", "Status"]);

    for (i, r) in result.detailed_results.iter().enumerate() {
        let status = if r.needs_review {
            "REVIEW"
        } else if r.is_correct {
            "OK"
        } else {
            "WRONG"
        };
        table.add_row(vec![
            Cell::new(i),
            Cell::new(&r.question),
            Cell::new(r.question_type),
            Cell::new(display_value(&r.user_answer)),
            Cell::new(format!("{:.2} / {:.2}", r.points, r.max_points)),
            Cell::new(status),
        ]);
    }

    println!("{table}");
    println!(
        "Score: {:.2} / {:.2} ({}%) | correct {} | incorrect {} | pending review {} | {}s",
        result.score,
        result.max_score(),
        result.percentage,
        result.correct_answers,
        result.incorrect_answers,
        result.pending_review(),
        result.time_spent
    );
}
