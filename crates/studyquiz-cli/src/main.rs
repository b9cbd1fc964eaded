//! studyquiz CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "studyquiz", version, about = "Self-study quiz grader")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a completed quiz attempt and record it
    Grade {
        /// Path to the quiz JSON file
        #[arg(long)]
        quiz: PathBuf,

        /// Path to the answers JSON file (question id -> answer)
        #[arg(long)]
        answers: PathBuf,

        /// Seconds spent on the attempt
        #[arg(long, default_value = "0")]
        elapsed: u64,

        /// Output directory (defaults to the configured output_dir)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, all, none
        #[arg(long, default_value = "json")]
        format: String,

        /// Do not record the attempt in the progress store
        #[arg(long)]
        no_progress: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show instant feedback for answers without recording anything
    Check {
        /// Path to the quiz JSON file
        #[arg(long)]
        quiz: PathBuf,

        /// Path to the answers JSON file
        #[arg(long)]
        answers: PathBuf,

        /// Only check this question
        #[arg(long)]
        question: Option<String>,
    },

    /// Validate quiz JSON files
    Validate {
        /// Path to a quiz file or directory
        #[arg(long)]
        quiz: PathBuf,
    },

    /// List available quizzes with progress
    List {
        /// Quiz directory (defaults to the configured data_dir)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example quiz
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("studyquiz=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            quiz,
            answers,
            elapsed,
            output,
            format,
            no_progress,
            config,
        } => commands::grade::execute(quiz, answers, elapsed, output, format, no_progress, config),
        Commands::Check {
            quiz,
            answers,
            question,
        } => commands::check::execute(quiz, answers, question),
        Commands::Validate { quiz } => commands::validate::execute(quiz),
        Commands::List { dir, config } => commands::list::execute(dir, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
