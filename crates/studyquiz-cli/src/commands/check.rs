//! The `studyquiz check` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use studyquiz_core::answer::AnswerSheet;
use studyquiz_core::model::Id;
use studyquiz_core::parser::parse_quiz;
use studyquiz_core::session::QuizSession;

pub fn execute(quiz_path: PathBuf, answers_path: PathBuf, question: Option<String>) -> Result<()> {
    let quiz = parse_quiz(&quiz_path)?;
    let answers = AnswerSheet::load_json(&answers_path)?;

    let ids: Vec<Id> = match question {
        Some(id) => vec![Id::from(id)],
        None => quiz.questions.iter().map(|q| q.id.clone()).collect(),
    };

    let session = QuizSession::start(quiz).with_answers(answers);

    let mut table = Table::new();
    table.set_header(vec!["Question", "Type", "Verdict", "Score", "Feedback"]);

    let mut earned = 0;
    let mut possible = 0;
    for id in &ids {
        let feedback = session.feedback(id)?;
        let points = session.quiz().question(id).map_or(0, |q| q.points);
        let label = session.quiz().question(id).map_or("", |q| q.kind.label());
        earned += feedback.score;
        possible += points;

        table.add_row(vec![
            Cell::new(id),
            Cell::new(label),
            Cell::new(feedback.kind),
            Cell::new(format!("{}/{}", feedback.score, points)),
            Cell::new(&feedback.message),
        ]);
    }

    println!("{table}");
    println!("Feedback score: {earned}/{possible} points");

    Ok(())
}
