//! The `studyquiz grade` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};

use studyquiz_core::answer::AnswerSheet;
use studyquiz_core::config::load_config_from;
use studyquiz_core::parser::parse_quiz;
use studyquiz_core::progress::ProgressStore;
use studyquiz_core::scoring::{QuizResult, ResultStatus};
use studyquiz_core::session::QuizSession;
use studyquiz_report::html::write_html_report;

#[allow(clippy::too_many_arguments)]
pub fn execute(
    quiz_path: PathBuf,
    answers_path: PathBuf,
    elapsed: u64,
    output: Option<PathBuf>,
    format: String,
    no_progress: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html"]
    } else if format == "none" {
        Vec::new()
    } else {
        format.split(',').map(str::trim).collect()
    };
    if let Some(bad) = formats.iter().find(|f| !matches!(**f, "json" | "html")) {
        anyhow::bail!("unknown format: '{bad}' (expected json, html, all or none)");
    }

    let config = load_config_from(config_path.as_deref())?;
    let quiz = parse_quiz(&quiz_path)?;
    let answers = AnswerSheet::load_json(&answers_path)?;

    for (id, _) in answers.iter() {
        if quiz.question(id).is_none() {
            tracing::warn!("answer for unknown question {id} ignored");
        }
    }

    let completed_at = Utc::now();
    let started_at = i64::try_from(elapsed)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|spent| completed_at.checked_sub_signed(spent))
        .with_context(|| format!("elapsed time out of range: {elapsed}s"))?;
    let mut session = QuizSession::started_at(quiz, started_at).with_answers(answers);
    let result = session.submit_at(completed_at)?;

    print_summary(&result);

    let output = output.unwrap_or(config.output_dir);
    let timestamp = result.completed_at.format("%Y-%m-%dT%H%M%S");
    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("result-{}-{timestamp}.json", result.quiz_id));
                result.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("result-{}-{timestamp}.html", result.quiz_id));
                write_html_report(&result, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            _ => {}
        }
    }

    if !no_progress {
        let mut store = ProgressStore::load_json(&config.progress_file)?;
        let progress = store.record(&result);
        println!(
            "Attempt {} recorded (best score {}%).",
            progress.attempts, progress.best_score
        );
        store.save_json(&config.progress_file)?;
    }

    Ok(())
}

fn print_summary(result: &QuizResult) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Question", "Status", "Points", "Your Answer", "Correct Answer"]);

    for detail in &result.detailed_results {
        let status = match detail.status {
            ResultStatus::Correct => "correct",
            ResultStatus::Incorrect => "incorrect",
            ResultStatus::Unanswered => "unanswered",
        };
        let user_answer = detail
            .user_answer
            .as_ref()
            .map(|a| a.display())
            .unwrap_or_else(|| "No answer provided".to_string());
        table.add_row(vec![
            Cell::new(&detail.question_id),
            Cell::new(status),
            Cell::new(format!("{}/{}", detail.points_earned, detail.total_points)),
            Cell::new(user_answer),
            Cell::new(&detail.correct_answer),
        ]);
    }

    println!("{} ({})", result.quiz_title, result.quiz_id);
    println!("{table}");
    println!(
        "Score: {}% ({}/{} points) | correct {} | incorrect {} | unanswered {} | {}s",
        result.score,
        result.earned_points,
        result.total_points,
        result.correct_answers,
        result.incorrect_answers,
        result.unanswered,
        result.time_spent,
    );
    println!("{}", result.tier().message());
}
