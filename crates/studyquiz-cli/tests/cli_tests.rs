//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SAMPLE_QUIZ: &str = "../../quizzes/networking-basics.json";

fn studyquiz() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("studyquiz").unwrap()
}

/// Answers for the sample quiz: question 6 left blank, part b of question 5 wrong.
fn write_answers(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("answers.json");
    std::fs::write(
        &path,
        r#"{
    "1": "B",
    "2": ["C", "A"],
    "3": "TCP uses a three-way handshake with SYN and ACK",
    "4": "100 microseconds",
    "5": {"a": "192.168.1.0", "b": "256"},
    "6": null
}"#,
    )
    .unwrap();
    path
}

fn grade(dir: &Path, answers: &Path) -> Command {
    let mut cmd = studyquiz();
    cmd.env("STUDYQUIZ_PROGRESS_FILE", dir.join("progress.json"))
        .arg("grade")
        .arg("--quiz")
        .arg(SAMPLE_QUIZ)
        .arg("--answers")
        .arg(answers)
        .arg("--output")
        .arg(dir.join("results"));
    cmd
}

fn files_with_extension(dir: &Path, ext: &str) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| e.path().extension().is_some_and(|x| x == ext))
                .count()
        })
        .unwrap_or(0)
}

#[test]
fn validate_sample_quiz() {
    studyquiz()
        .arg("validate")
        .arg("--quiz")
        .arg(SAMPLE_QUIZ)
        .assert()
        .success()
        .stdout(predicate::str::contains("6 questions, 14 points"))
        .stdout(predicate::str::contains("All quizzes valid"));
}

#[test]
fn validate_directory() {
    studyquiz()
        .arg("validate")
        .arg("--quiz")
        .arg("../../quizzes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Networking Basics"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(
        &path,
        r#"{"id": "broken", "title": "Broken", "questions": [
            {"id": 1, "type": "single_choice", "options": ["A. yes", "B. no"], "correctAnswer": "C"},
            {"id": 1, "type": "essay"}
        ]}"#,
    )
    .unwrap();

    studyquiz()
        .arg("validate")
        .arg("--quiz")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[1] WARNING"))
        .stdout(predicate::str::contains("duplicate question ID"))
        .stdout(predicate::str::contains("3 warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    studyquiz()
        .arg("validate")
        .arg("--quiz")
        .arg("nonexistent.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn grade_prints_summary_and_records_progress() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(dir.path());

    grade(dir.path(), &answers)
        .arg("--elapsed")
        .arg("95")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 79% (11/14 points)"))
        .stdout(predicate::str::contains("unanswered 1"))
        .stdout(predicate::str::contains("95s"))
        .stdout(predicate::str::contains("Good job!"))
        .stdout(predicate::str::contains("Attempt 1 recorded (best score 79%)"));

    assert_eq!(files_with_extension(&dir.path().join("results"), "json"), 1);

    let progress = std::fs::read_to_string(dir.path().join("progress.json")).unwrap();
    let progress: serde_json::Value = serde_json::from_str(&progress).unwrap();
    assert_eq!(progress["networking-basics"]["attempts"], 1);
    assert_eq!(progress["networking-basics"]["bestScore"], 79);
    assert_eq!(progress["networking-basics"]["completed"], true);

    grade(dir.path(), &answers)
        .assert()
        .success()
        .stdout(predicate::str::contains("Attempt 2 recorded"));
}

#[test]
fn grade_result_json_is_camel_case() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(dir.path());

    grade(dir.path(), &answers)
        .arg("--no-progress")
        .assert()
        .success();

    let results = dir.path().join("results");
    let entry = std::fs::read_dir(&results)
        .unwrap()
        .filter_map(Result::ok)
        .find(|e| e.path().extension().is_some_and(|x| x == "json"))
        .unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(entry.path()).unwrap()).unwrap();

    assert_eq!(json["quizId"], "networking-basics");
    assert_eq!(json["earnedPoints"], 11);
    assert_eq!(json["totalPoints"], 14);
    assert_eq!(json["detailedResults"].as_array().unwrap().len(), 6);
    assert_eq!(json["detailedResults"][5]["status"], "unanswered");
    assert_eq!(json["detailedResults"][5]["userAnswer"], serde_json::Value::Null);
    assert!(!dir.path().join("progress.json").exists());
}

#[test]
fn grade_all_formats() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(dir.path());

    grade(dir.path(), &answers)
        .arg("--format")
        .arg("all")
        .arg("--no-progress")
        .assert()
        .success()
        .stderr(predicate::str::contains("HTML report"));

    let results = dir.path().join("results");
    assert_eq!(files_with_extension(&results, "json"), 1);
    assert_eq!(files_with_extension(&results, "html"), 1);
}

#[test]
fn grade_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(dir.path());

    grade(dir.path(), &answers)
        .arg("--format")
        .arg("sarif")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn grade_rejects_huge_elapsed_time() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(dir.path());

    grade(dir.path(), &answers)
        .arg("--elapsed")
        .arg("100000000000000")
        .arg("--format")
        .arg("none")
        .arg("--no-progress")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: elapsed time out of range"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn grade_missing_answers_file() {
    let dir = TempDir::new().unwrap();

    grade(dir.path(), &dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read answers"));
}

#[test]
fn check_all_questions() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(dir.path());

    studyquiz()
        .arg("check")
        .arg("--quiz")
        .arg(SAMPLE_QUIZ)
        .arg("--answers")
        .arg(&answers)
        .assert()
        .success()
        .stdout(predicate::str::contains("Multi-Part Question"))
        .stdout(predicate::str::contains("partial"))
        .stdout(predicate::str::contains("Missing: sequence number").not())
        .stdout(predicate::str::contains("Feedback score: 9/14 points"));
}

#[test]
fn check_single_question() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(dir.path());

    studyquiz()
        .arg("check")
        .arg("--quiz")
        .arg(SAMPLE_QUIZ)
        .arg("--answers")
        .arg(&answers)
        .arg("--question")
        .arg("6")
        .assert()
        .success()
        .stdout(predicate::str::contains("unanswered"))
        .stdout(predicate::str::contains("Feedback score: 0/3 points"));
}

#[test]
fn check_unknown_question() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(dir.path());

    studyquiz()
        .arg("check")
        .arg("--quiz")
        .arg(SAMPLE_QUIZ)
        .arg("--answers")
        .arg(&answers)
        .arg("--question")
        .arg("99")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown question: 99"));
}

#[test]
fn list_shows_progress() {
    let dir = TempDir::new().unwrap();
    let quizzes = dir.path().join("quizzes");
    std::fs::create_dir(&quizzes).unwrap();
    std::fs::copy(SAMPLE_QUIZ, quizzes.join("networking-basics.json")).unwrap();
    let answers = write_answers(dir.path());

    studyquiz()
        .env("STUDYQUIZ_PROGRESS_FILE", dir.path().join("progress.json"))
        .arg("list")
        .arg("--dir")
        .arg(&quizzes)
        .assert()
        .success()
        .stdout(predicate::str::contains("Networking Basics"))
        .stdout(predicate::str::contains("New"))
        .stdout(predicate::str::contains("Completed: 0"));

    grade(dir.path(), &answers).assert().success();

    studyquiz()
        .env("STUDYQUIZ_PROGRESS_FILE", dir.path().join("progress.json"))
        .arg("list")
        .arg("--dir")
        .arg(&quizzes)
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed (79%)"))
        .stdout(predicate::str::contains("Average score: 79%"))
        .stdout(predicate::str::contains("Recent activity"));
}

#[test]
fn list_empty_directory() {
    let dir = TempDir::new().unwrap();

    studyquiz()
        .env("STUDYQUIZ_PROGRESS_FILE", dir.path().join("progress.json"))
        .arg("list")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No quizzes found"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    studyquiz()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created studyquiz.toml"))
        .stdout(predicate::str::contains("Created quizzes/example.json"));

    assert!(dir.path().join("studyquiz.toml").exists());
    assert!(dir.path().join("quizzes/example.json").exists());
    assert!(dir.path().join("answers/example.json").exists());

    studyquiz()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--quiz")
        .arg("quizzes/example.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("All quizzes valid"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    // First init
    studyquiz()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    // Second init should skip
    studyquiz()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn init_then_grade_example() {
    let dir = TempDir::new().unwrap();

    studyquiz()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    studyquiz()
        .current_dir(dir.path())
        .env_remove("STUDYQUIZ_PROGRESS_FILE")
        .env_remove("STUDYQUIZ_DATA_DIR")
        .arg("grade")
        .arg("--quiz")
        .arg("quizzes/example.json")
        .arg("--answers")
        .arg("answers/example.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 100%"));

    assert!(dir.path().join("studyquiz-progress.json").exists());
    assert_eq!(
        files_with_extension(&dir.path().join("studyquiz-results"), "json"),
        1
    );
}

#[test]
fn help_output() {
    studyquiz()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Self-study quiz grader"));
}

#[test]
fn version_output() {
    studyquiz()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("studyquiz"));
}
