//! The `studyquiz list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use studyquiz_core::config::load_config_from;
use studyquiz_core::parser::load_quiz_directory;
use studyquiz_core::progress::ProgressStore;

pub fn execute(dir: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let dir = dir.unwrap_or(config.data_dir);

    let quizzes = load_quiz_directory(&dir)?;
    let store = ProgressStore::load_json(&config.progress_file)?;

    if quizzes.is_empty() {
        println!(
            "No quizzes found in {}. Run `studyquiz init` to create an example.",
            dir.display()
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Questions", "Points", "Status", "Best"]);

    for quiz in &quizzes {
        let progress = store.get(&quiz.id).filter(|p| p.completed);
        let status = match progress {
            Some(p) => format!("Completed ({}%)", p.score),
            None => "New".to_string(),
        };
        let best = progress.map_or_else(|| "-".to_string(), |p| format!("{}%", p.best_score));

        table.add_row(vec![
            Cell::new(&quiz.id),
            Cell::new(&quiz.title),
            Cell::new(quiz.questions.len()),
            Cell::new(quiz.total_points()),
            Cell::new(status),
            Cell::new(best),
        ]);
    }

    println!("{table}");

    let stats = store.stats(quizzes.len());
    println!(
        "Total quizzes: {} | Completed: {} | Average score: {}%",
        stats.total_quizzes, stats.completed_quizzes, stats.average_score
    );

    let recent = store.recent_activity(config.recent_activity_limit);
    if !recent.is_empty() {
        println!("\nRecent activity:");
        for (quiz_id, progress) in recent {
            let title = quizzes
                .iter()
                .find(|q| q.id == quiz_id)
                .map_or(quiz_id, |q| q.title.as_str());
            println!(
                "  {} | {}% | {}",
                title,
                progress.score,
                progress.last_attempted.format("%Y-%m-%d %H:%M")
            );
        }
    }

    Ok(())
}
