//! JSON quiz parser.
//!
//! Loads quizzes from JSON files and directories, and validates them.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::model::{
    Calculation, Id, Keywords, MatchItem, Matching, MultiPart, MultipleChoice, Part, Question,
    QuestionKind, Quiz, ShortAnswer, SingleChoice, DEFAULT_POINTS,
};

/// Intermediate JSON structure for quiz files.
#[derive(Debug, Deserialize)]
struct JsonQuizFile {
    id: Id,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    questions: Vec<JsonQuestion>,
}

/// Union of every kind's fields; the `type` tag decides which are used.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonQuestion {
    id: Id,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    question: String,
    #[serde(default)]
    points: Option<u32>,
    #[serde(default)]
    hint: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    correct_answer: Option<Value>,
    #[serde(default)]
    correct_answers: Vec<String>,
    #[serde(default)]
    answer: Option<Value>,
    #[serde(default)]
    expected_answers: Option<JsonExpected>,
    #[serde(default)]
    keywords: Option<JsonKeywords>,
    #[serde(default)]
    parts: Vec<JsonPart>,
    #[serde(default)]
    items: Vec<JsonItem>,
}

/// `expectedAnswers` is a list for calculations and a map for multi-part.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonExpected {
    List(Vec<Value>),
    ByPart(BTreeMap<Id, JsonAccepted>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonAccepted {
    Many(Vec<Value>),
    One(Value),
}

#[derive(Debug, Deserialize)]
struct JsonKeywords {
    #[serde(default)]
    required: Vec<String>,
    #[serde(default)]
    bonus: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct JsonPart {
    part: Id,
    #[serde(default)]
    question: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonItem {
    id: Id,
    #[serde(default)]
    description: String,
    #[serde(default)]
    correct_answer: Option<Value>,
    #[serde(default)]
    answer: Option<Value>,
}

/// Reference values may be written as strings or bare numbers.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn texts(values: &[Value]) -> Vec<String> {
    values.iter().filter_map(value_text).collect()
}

impl JsonQuestion {
    fn into_question(self) -> Question {
        let kind = match self.kind.as_str() {
            "short_answer" => QuestionKind::ShortAnswer(ShortAnswer {
                keywords: self.keywords.map(|k| Keywords {
                    required: k.required,
                    bonus: k.bonus,
                }),
                answer: self.answer.as_ref().and_then(value_text),
            }),
            "single_choice" => QuestionKind::SingleChoice(SingleChoice {
                options: self.options,
                correct_answer: self
                    .correct_answer
                    .as_ref()
                    .and_then(value_text)
                    .unwrap_or_default(),
            }),
            "multiple_choice" => QuestionKind::MultipleChoice(MultipleChoice {
                options: self.options,
                correct_answers: self.correct_answers,
            }),
            "calculation" => {
                let expected_answers = match self.expected_answers {
                    Some(JsonExpected::List(values)) if !values.is_empty() => texts(&values),
                    _ => self.answer.as_ref().and_then(value_text).into_iter().collect(),
                };
                QuestionKind::Calculation(Calculation { expected_answers })
            }
            "multi_part" => QuestionKind::MultiPart(MultiPart {
                parts: self
                    .parts
                    .into_iter()
                    .map(|p| Part {
                        part: p.part,
                        question: p.question,
                    })
                    .collect(),
                expected_answers: match self.expected_answers {
                    Some(JsonExpected::ByPart(map)) => Some(
                        map.into_iter()
                            .map(|(part, accepted)| {
                                let accepted = match accepted {
                                    JsonAccepted::Many(values) => texts(&values),
                                    JsonAccepted::One(value) => {
                                        value_text(&value).into_iter().collect()
                                    }
                                };
                                (part, accepted)
                            })
                            .collect(),
                    ),
                    _ => None,
                },
            }),
            "matching" => QuestionKind::Matching(Matching {
                items: self
                    .items
                    .into_iter()
                    .map(|item| MatchItem {
                        id: item.id,
                        description: item.description,
                        correct_answer: item
                            .correct_answer
                            .or(item.answer)
                            .as_ref()
                            .and_then(value_text)
                            .unwrap_or_default(),
                    })
                    .collect(),
                options: self.options,
            }),
            other => QuestionKind::Unknown {
                declared: other.to_string(),
            },
        };

        if self.points == Some(0) {
            tracing::warn!("question {} has 0 points, using {}", self.id, DEFAULT_POINTS);
        }

        Question {
            id: self.id,
            question: self.question,
            points: self.points.filter(|&p| p > 0).unwrap_or(DEFAULT_POINTS),
            hint: self.hint,
            image: self.image,
            kind,
        }
    }
}

/// Parse a single JSON file into a `Quiz`.
pub fn parse_quiz(path: &Path) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse a JSON string into a `Quiz` (useful for testing).
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<Quiz> {
    let parsed: JsonQuizFile = serde_json::from_str(content)
        .with_context(|| format!("failed to parse quiz JSON: {}", source_path.display()))?;

    Ok(Quiz {
        id: parsed.id.to_string(),
        title: parsed.title,
        description: parsed.description,
        questions: parsed
            .questions
            .into_iter()
            .map(JsonQuestion::into_question)
            .collect(),
    })
}

/// Recursively load all `.json` quiz files from a directory.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            quizzes.extend(load_quiz_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "json") {
            match parse_quiz(&path) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(quizzes)
}

/// Load a quiz file, or every quiz under a directory.
pub fn load_quizzes(path: &Path) -> Result<Vec<Quiz>> {
    if path.is_dir() {
        load_quiz_directory(path)
    } else {
        Ok(vec![parse_quiz(path)?])
    }
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<Id>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn question(id: &Id, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(id.clone()),
            message: message.into(),
        }
    }
}

/// Validate a quiz for common issues.
pub fn validate_quiz(quiz: &Quiz) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if quiz.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "quiz has no questions".into(),
        });
    }

    // Check for duplicate question IDs
    let mut seen_ids = HashSet::new();
    for question in &quiz.questions {
        if !seen_ids.insert(&question.id) {
            warnings.push(ValidationWarning::question(
                &question.id,
                format!("duplicate question ID: {}", question.id),
            ));
        }
    }

    for question in &quiz.questions {
        let id = &question.id;
        if question.points == 0 {
            warnings.push(ValidationWarning::question(id, "points must be at least 1"));
        }

        match &question.kind {
            QuestionKind::SingleChoice(q) => {
                if !q.option_keys().contains(&q.correct_answer.as_str()) {
                    warnings.push(ValidationWarning::question(
                        id,
                        format!("correctAnswer '{}' is not an option key", q.correct_answer),
                    ));
                }
            }
            QuestionKind::MultipleChoice(q) => {
                if q.correct_answers.is_empty() {
                    warnings.push(ValidationWarning::question(id, "no correctAnswers given"));
                }
                let keys = q.option_keys();
                for answer in &q.correct_answers {
                    if !keys.contains(&answer.as_str()) {
                        warnings.push(ValidationWarning::question(
                            id,
                            format!("correctAnswers entry '{answer}' is not an option key"),
                        ));
                    }
                }
            }
            QuestionKind::ShortAnswer(q) => match &q.keywords {
                None => warnings.push(ValidationWarning::question(
                    id,
                    "no keywords; answers will need manual review",
                )),
                Some(k) if k.required.is_empty() => warnings.push(ValidationWarning::question(
                    id,
                    "no required keywords; answers can never pass",
                )),
                Some(k) => {
                    if k.required.iter().chain(&k.bonus).any(|w| w.trim().is_empty()) {
                        warnings.push(ValidationWarning::question(id, "empty keyword"));
                    }
                }
            },
            QuestionKind::Calculation(q) => {
                if q.expected_answers.is_empty() {
                    warnings.push(ValidationWarning::question(
                        id,
                        "no expectedAnswers or answer; answers will need manual review",
                    ));
                }
            }
            QuestionKind::MultiPart(q) => match &q.expected_answers {
                Some(expected) if !expected.is_empty() => {
                    for part in &q.parts {
                        if !expected.contains_key(&part.part) {
                            warnings.push(ValidationWarning::question(
                                id,
                                format!("part {} has no expected answers", part.part),
                            ));
                        }
                    }
                }
                _ => warnings.push(ValidationWarning::question(
                    id,
                    "no expectedAnswers; answers will need manual review",
                )),
            },
            QuestionKind::Matching(q) => {
                if q.items.is_empty() {
                    warnings.push(ValidationWarning::question(id, "matching has no items"));
                }
                for item in &q.items {
                    if !q.options.contains(&item.correct_answer) {
                        warnings.push(ValidationWarning::question(
                            id,
                            format!("item {} answer '{}' is not an option", item.id, item.correct_answer),
                        ));
                    }
                }
            }
            QuestionKind::Unknown { declared } => {
                warnings.push(ValidationWarning::question(
                    id,
                    format!("unknown question type '{declared}'; answers will need manual review"),
                ));
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::{AnswerSheet, AnswerValue};
    use crate::scoring::score_quiz;
    use std::path::PathBuf;

    const VALID_JSON: &str = r#"
{
  "id": "networking-basics",
  "title": "Networking Basics",
  "description": "Protocols and addressing",
  "questions": [
    {
      "id": 1,
      "type": "single_choice",
      "question": "Which transport does DNS use by default?",
      "options": ["A. TCP", "B. UDP"],
      "correctAnswer": "B",
      "points": 2
    },
    {
      "id": 2,
      "type": "multiple_choice",
      "question": "Which are connection-oriented?",
      "options": ["A. TCP", "B. UDP", "C. SCTP"],
      "correctAnswers": ["A", "C"]
    },
    {
      "id": 3,
      "type": "short_answer",
      "question": "Describe connection setup.",
      "keywords": { "required": ["TCP", "handshake"], "bonus": ["SYN"] },
      "answer": "TCP uses a three-way handshake."
    },
    {
      "id": 4,
      "type": "calculation",
      "question": "Throughput?",
      "answer": 100
    },
    {
      "id": 5,
      "type": "multi_part",
      "question": "Subnetting",
      "parts": [{ "part": "a", "question": "Network?" }, { "part": "b", "question": "Hosts?" }],
      "expectedAnswers": { "a": ["192.168.1.0"], "b": "254" }
    },
    {
      "id": 6,
      "type": "matching",
      "question": "Match ports",
      "items": [
        { "id": 1, "description": "HTTP", "correctAnswer": "80" },
        { "id": 2, "description": "HTTPS", "answer": "443" }
      ],
      "options": ["80", "443"]
    },
    {
      "id": 7,
      "type": "essay",
      "question": "Discuss."
    }
  ]
}
"#;

    #[test]
    fn parse_valid_json() {
        let quiz = parse_quiz_str(VALID_JSON, &PathBuf::from("test.json")).unwrap();
        assert_eq!(quiz.id, "networking-basics");
        assert_eq!(quiz.questions.len(), 7);
        assert_eq!(quiz.questions[0].points, 2);
        assert_eq!(quiz.questions[1].points, 1);
        assert_eq!(quiz.total_points(), 8);

        match &quiz.questions[3].kind {
            QuestionKind::Calculation(c) => assert_eq!(c.expected_answers, vec!["100"]),
            other => panic!("unexpected kind: {other:?}"),
        }
        match &quiz.questions[4].kind {
            QuestionKind::MultiPart(m) => {
                let expected = m.expected_answers.as_ref().unwrap();
                assert_eq!(expected[&Id::from("b")], vec!["254"]);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
        match &quiz.questions[5].kind {
            QuestionKind::Matching(m) => assert_eq!(m.items[1].correct_answer, "443"),
            other => panic!("unexpected kind: {other:?}"),
        }
        assert_eq!(quiz.questions[6].kind.type_name(), "essay");
    }

    #[test]
    fn calculation_prefers_expected_answers() {
        let json = r#"{"id": "c", "title": "C", "questions": [
            {"id": 1, "type": "calculation", "expectedAnswers": ["1.5 ms", "1500 us"], "answer": "ignored"}
        ]}"#;
        let quiz = parse_quiz_str(json, &PathBuf::from("c.json")).unwrap();
        match &quiz.questions[0].kind {
            QuestionKind::Calculation(c) => assert_eq!(c.expected_answers, vec!["1.5 ms", "1500 us"]),
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn validate_reports_unknown_type() {
        let quiz = parse_quiz_str(VALID_JSON, &PathBuf::from("test.json")).unwrap();
        let warnings = validate_quiz(&quiz);
        assert_eq!(warnings.len(), 1, "{warnings:?}");
        assert!(warnings[0].message.contains("unknown question type 'essay'"));
    }

    #[test]
    fn validate_duplicate_ids_and_bad_keys() {
        let json = r#"{"id": "d", "title": "D", "questions": [
            {"id": 1, "type": "single_choice", "options": ["A. x", "B. y"], "correctAnswer": "C"},
            {"id": "1", "type": "multiple_choice", "options": ["A. x"], "correctAnswers": ["Z"], "points": 0}
        ]}"#;
        let mut quiz = parse_quiz_str(json, &PathBuf::from("d.json")).unwrap();
        quiz.questions[1].points = 0;
        let warnings = validate_quiz(&quiz);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
        assert!(warnings.iter().any(|w| w.message.contains("'C' is not an option key")));
        assert!(warnings.iter().any(|w| w.message.contains("'Z' is not an option key")));
        assert!(warnings.iter().any(|w| w.message.contains("at least 1")));
    }

    #[test]
    fn zero_points_fall_back_to_default() {
        let json = r#"{"id": "z", "title": "Z", "questions": [
            {"id": 1, "type": "single_choice", "options": ["A. x", "B. y"], "correctAnswer": "A", "points": 0}
        ]}"#;
        let quiz = parse_quiz_str(json, &PathBuf::from("z.json")).unwrap();
        assert_eq!(quiz.questions[0].points, 1);
        assert!(validate_quiz(&quiz).is_empty());

        let mut answers = AnswerSheet::new();
        answers.set(Id::from(1), AnswerValue::Text("A".into()));
        let result = score_quiz(&quiz, &answers, 0);
        assert_eq!(result.total_points, 1);
        assert_eq!(result.earned_points, 1);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn validate_empty_quiz() {
        let quiz = parse_quiz_str(r#"{"id": 3, "title": "Empty"}"#, &PathBuf::from("e.json")).unwrap();
        assert_eq!(quiz.id, "3");
        let warnings = validate_quiz(&quiz);
        assert!(warnings.iter().any(|w| w.message.contains("no questions")));
    }

    #[test]
    fn parse_malformed_json() {
        let result = parse_quiz_str("{ not json", &PathBuf::from("bad.json"));
        assert!(result.is_err());
    }

    #[test]
    fn question_without_type_is_an_error() {
        let json = r#"{"id": "t", "title": "T", "questions": [{"id": 1}]}"#;
        assert!(parse_quiz_str(json, &PathBuf::from("t.json")).is_err());
    }

    #[test]
    fn load_directory_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.json"), VALID_JSON).unwrap();
        std::fs::write(dir.path().join("bad.json"), "oops").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let nested = dir.path().join("more");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(
            nested.join("other.json"),
            r#"{"id": "other", "title": "Other", "questions": []}"#,
        )
        .unwrap();

        let quizzes = load_quiz_directory(dir.path()).unwrap();
        let ids: Vec<&str> = quizzes.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["networking-basics", "other"]);
    }

    #[test]
    fn load_quizzes_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiz.json");
        std::fs::write(&path, VALID_JSON).unwrap();
        assert_eq!(load_quizzes(&path).unwrap().len(), 1);
        assert!(load_quizzes(&dir.path().join("missing.json")).is_err());
    }
}
