//! The `quizscore init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("quizscore.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("quizzes")?;
    write_if_missing(Path::new("quizzes/example.toml"), EXAMPLE_QUIZ)?;
    write_if_missing(Path::new("quizzes/example-answers.json"), EXAMPLE_ANSWERS)?;

    println!("\nNext steps:");
    println!("  1. Edit quizscore.toml to adjust tolerances");
    println!("  2. Run: quizscore validate --quiz quizzes/example.toml");
    println!(
        "  3. Run: quizscore grade --quiz quizzes/example.toml --answers quizzes/example-answers.json"
    );

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizscore configuration

[grading]
# Default tolerance for number questions without their own.
number_tolerance = 0.01
# Default tolerance for math-mode blanks.
blank_tolerance = 0.0001
# How quizzes without `indexBase` number their options: auto, zero, one.
index_base = "auto"

[algebra]
enabled = true
# Restrict the functions learners may use; empty allows all built-ins.
functions = []
max_expansion_terms = 4096
"#;

const EXAMPLE_QUIZ: &str = r#"id = "example"
title = "Example quiz"
indexBase = "one"

[[questions]]
id = 1
type = "multiple-choice"
question = "Which number is prime?"
options = ["4", "6", "7"]
correctAnswer = 3

[[questions]]
id = 2
type = "complex-multiple-choice"
question = "Select every even number."
options = ["2", "3", "4", "5"]
correctAnswer = [1, 3]

[[questions]]
id = 3
type = "number"
question = "Give pi to two decimal places."
correctAnswer = 3.14
tolerance = 0.01

[[questions]]
id = 4
type = "fill-in-the-blank"
question = "Expand 2(x+1) = ___ and simplify y*y = ___"

[[questions.blanks]]
index = 0
correctAnswers = ["2*x+2"]
mathMode = true

[[questions.blanks]]
index = 1
correctAnswers = ["y^2"]
mathMode = true

[[questions]]
id = 5
type = "essay"
question = "Explain why the sum of two odd numbers is even."
"#;

const EXAMPLE_ANSWERS: &str = r#"[
  { "questionId": 1, "type": "multiple-choice", "answer": [3] },
  { "questionId": 2, "type": "complex-multiple-choice", "answer": [1, 2] },
  { "questionId": 3, "type": "number", "answer": ["3.145"] },
  { "questionId": 4, "type": "fill-in-the-blank", "answer": ["2(x+1)", "y²"] },
  { "questionId": 5, "type": "essay", "answer": ["Write them as 2a+1 and 2b+1."] }
]
"#;
