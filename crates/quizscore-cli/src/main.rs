//! quizscore CLI: grade quiz attempts from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "quizscore",
    version,
    about = "Quiz answer grading with symbolic math checking"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a submitted attempt against a quiz
    Grade {
        /// Quiz file (.toml or .json)
        #[arg(long)]
        quiz: PathBuf,

        /// Submitted answers (JSON array)
        #[arg(long)]
        answers: PathBuf,

        /// Seconds the learner spent on the attempt
        #[arg(long, default_value = "0")]
        time_spent: u64,

        /// Learner identifier recorded on the attempt
        #[arg(long, default_value = "anonymous")]
        user: String,

        /// How the attempt ended: submitted, timeout, abandoned
        #[arg(long, default_value = "submitted")]
        end_reason: String,

        /// Output format: text, json, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Write the output here (text format: the attempt record as JSON)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Apply a manual grade to a saved attempt
    Regrade {
        /// Attempt record JSON written by `grade`
        #[arg(long)]
        attempt: PathBuf,

        /// Position of the question in the attempt (0-based)
        #[arg(long)]
        index: usize,

        /// Points awarded
        #[arg(long, allow_negative_numbers = true)]
        points: f64,

        /// Maximum points (defaults to the question's current maximum)
        #[arg(long)]
        max_points: Option<f64>,

        /// Write the updated record here instead of overwriting the attempt
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate quiz files
    Validate {
        /// Path to a quiz file or directory
        #[arg(long)]
        quiz: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check whether two expressions are equivalent
    Check {
        /// The learner's expression
        user: String,

        /// The reference expression
        correct: String,

        /// Numeric tolerance (defaults to the configured blank tolerance)
        #[arg(long)]
        tolerance: Option<f64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example quiz
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizscore=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            quiz,
            answers,
            time_spent,
            user,
            end_reason,
            format,
            output,
            config,
        } => commands::grade::execute(
            quiz, answers, time_spent, user, end_reason, format, output, config,
        ),
        Commands::Regrade {
            attempt,
            index,
            points,
            max_points,
            output,
        } => commands::regrade::execute(attempt, index, points, max_points, output),
        Commands::Validate { quiz, config } => commands::validate::execute(quiz, config),
        Commands::Check {
            user,
            correct,
            tolerance,
            config,
        } => commands::check::execute(user, correct, tolerance, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
