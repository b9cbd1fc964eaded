//! The `studyquiz init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create studyquiz.toml
    if Path::new("studyquiz.toml").exists() {
        println!("studyquiz.toml already exists, skipping.");
    } else {
        std::fs::write("studyquiz.toml", SAMPLE_CONFIG)?;
        println!("Created studyquiz.toml");
    }

    // Create example quiz
    std::fs::create_dir_all("quizzes")?;
    let example_path = Path::new("quizzes/example.json");
    if example_path.exists() {
        println!("quizzes/example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.json");
    }

    // Answers stay outside data_dir
    std::fs::create_dir_all("answers")?;
    let answers_path = Path::new("answers/example.json");
    if answers_path.exists() {
        println!("answers/example.json already exists, skipping.");
    } else {
        std::fs::write(answers_path, EXAMPLE_ANSWERS)?;
        println!("Created answers/example.json");
    }

    println!("\nNext steps:");
    println!("  1. Run: studyquiz validate --quiz quizzes/example.json");
    println!("  2. Run: studyquiz check --quiz quizzes/example.json --answers answers/example.json");
    println!("  3. Run: studyquiz grade --quiz quizzes/example.json --answers answers/example.json");
    println!("  4. Run: studyquiz list");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# studyquiz configuration

data_dir = "./quizzes"
progress_file = "./studyquiz-progress.json"
output_dir = "./studyquiz-results"
recent_activity_limit = 5
"#;

const EXAMPLE_QUIZ: &str = r#"{
  "id": "example",
  "title": "Example Quiz",
  "description": "A short quiz to get started",
  "questions": [
    {
      "id": 1,
      "type": "single_choice",
      "question": "Which layer of the OSI model does IP belong to?",
      "options": ["A. Data link", "B. Network", "C. Transport"],
      "correctAnswer": "B"
    },
    {
      "id": 2,
      "type": "multiple_choice",
      "question": "Which of these are transport protocols?",
      "options": ["A. TCP", "B. IP", "C. UDP"],
      "correctAnswers": ["A", "C"],
      "points": 2
    },
    {
      "id": 3,
      "type": "calculation",
      "question": "How many addresses does a /30 subnet contain?",
      "answer": "4"
    },
    {
      "id": 4,
      "type": "short_answer",
      "question": "What does a router do?",
      "keywords": { "required": ["forward", "packet"], "bonus": ["routing table"] },
      "answer": "It forwards packets between networks using its routing table.",
      "points": 3
    }
  ]
}
"#;

const EXAMPLE_ANSWERS: &str = r#"{
  "1": "B",
  "2": ["C", "A"],
  "3": "4 addresses",
  "4": "A router forwards each packet toward its destination."
}
"#;
