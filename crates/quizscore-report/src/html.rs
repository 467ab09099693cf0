//! HTML review page generator.
//!
//! Produces a self-contained HTML page with inlined CSS listing every
//! question of an attempt in question order.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use quizscore_core::QuestionResult;

use crate::attempt::AttemptRecord;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Render a submitted or reference value for display.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) if items.is_empty() => "-".to_string(),
        Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(", "),
        Value::Object(map) => match (map.get("index"), map.get("correctAnswers")) {
            (Some(index), Some(answers)) => format!("[{index}] {}", display_value(answers)),
            _ => value.to_string(),
        },
        other => other.to_string(),
    }
}

fn status(result: &QuestionResult) -> (&'static str, &'static str) {
    if result.needs_review {
        ("review", "needs review")
    } else if result.is_correct {
        ("pass", "correct")
    } else {
        ("fail", "incorrect")
    }
}

/// Generate an HTML review page for an attempt.
pub fn generate_html(record: &AttemptRecord) -> String {
    let result = &record.result;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>quizscore review: {}</title>\n",
        html_escape(&record.quiz_id)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&record.quiz_id)));
    html.push_str(&format!(
        "<p class=\"meta\">Learner: <strong>{}</strong> | {} | submitted {}</p>\n",
        html_escape(&record.user_id),
        record.end_reason,
        record.submitted_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary
    html.push_str("<section class=\"summary\">\n<h2>Summary</h2>\n<table>\n<tbody>\n");
    let rows = [
        ("Score", format!("{} / {}", trim_float(result.score), trim_float(result.max_score()))),
        ("Percentage", format!("{}%", result.percentage)),
        ("Correct", result.correct_answers.to_string()),
        ("Incorrect", result.incorrect_answers.to_string()),
        ("Pending review", result.pending_review().to_string()),
        ("Time spent", format!("{}s", result.time_spent)),
    ];
    for (label, value) in rows {
        html.push_str(&format!("<tr><th>{label}</th><td>{value}</td></tr>\n"));
    }
    html.push_str("</tbody></table>\n</section>\n");

    // Per-question results
    html.push_str("<section class=\"results\">\n<h2>Questions</h2>\n");
    html.push_str("<table class=\"results-table\">\n");
    html.push_str("<thead><tr><th>#</th><th>Question</th><th>Type</th><th>Your answer</th><th>Correct answer</th><th>Points</th><th>Status</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for (i, r) in result.detailed_results.iter().enumerate() {
        let (class, label) = status(r);
        html.push_str(&format!(
            "<tr class=\"{class}\"><td>{}</td><td>{}</td><td>{}</td><td><code>{}</code></td><td><code>{}</code></td><td>{} / {}</td><td>{label}</td></tr>\n",
            i + 1,
            html_escape(&r.question),
            r.question_type,
            html_escape(&display_value(&r.user_answer)),
            html_escape(&display_value(&r.correct_answer)),
            trim_float(r.points),
            trim_float(r.max_points),
        ));
    }
    html.push_str("</tbody></table>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Two decimals at most, without trailing zeros.
fn trim_float(value: f64) -> String {
    let s = format!("{value:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Write an HTML review page to a file.
pub fn write_html_report(record: &AttemptRecord, path: &Path) -> Result<()> {
    let html = generate_html(record);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML review to {}", path.display()))?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --review: #fef9c3; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --review: #713f12; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; vertical-align: top; }
th { background: var(--border); }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.review { background: var(--review); }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
"#;
