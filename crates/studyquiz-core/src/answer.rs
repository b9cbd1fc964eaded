//! Learner answers and the text helpers the graders share.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::Id;

/// A submitted answer. The variant must match the question kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Short answer, calculation, and single choice.
    Text(String),
    /// Multiple choice: the selected option keys.
    Choices(Vec<String>),
    /// Multi-part (part id → text) and matching (item id → option).
    Mapping(BTreeMap<Id, String>),
}

impl AnswerValue {
    /// An answer counts as given unless it is the empty string or an empty
    /// selection.
    pub fn is_present(&self) -> bool {
        match self {
            AnswerValue::Text(s) => !s.is_empty(),
            AnswerValue::Choices(c) => !c.is_empty(),
            AnswerValue::Mapping(_) => true,
        }
    }

    /// Render the answer for review output.
    pub fn display(&self) -> String {
        match self {
            AnswerValue::Text(s) => s.clone(),
            AnswerValue::Choices(c) => c.join(", "),
            AnswerValue::Mapping(m) => m
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

/// Presence check over an optional answer.
pub fn is_present(answer: Option<&AnswerValue>) -> bool {
    answer.is_some_and(AnswerValue::is_present)
}

/// Answers for one quiz attempt, keyed by question id.
///
/// `null` entries in an answers file are treated as unanswered and dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Id, Option<AnswerValue>>",
    into = "BTreeMap<Id, AnswerValue>"
)]
pub struct AnswerSheet {
    answers: BTreeMap<Id, AnswerValue>,
}

impl From<BTreeMap<Id, Option<AnswerValue>>> for AnswerSheet {
    fn from(raw: BTreeMap<Id, Option<AnswerValue>>) -> Self {
        Self {
            answers: raw
                .into_iter()
                .filter_map(|(id, answer)| answer.map(|a| (id, a)))
                .collect(),
        }
    }
}

impl From<AnswerSheet> for BTreeMap<Id, AnswerValue> {
    fn from(sheet: AnswerSheet) -> Self {
        sheet.answers
    }
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &Id) -> Option<&AnswerValue> {
        self.answers.get(id)
    }

    /// Store or overwrite the answer for a question.
    pub fn set(&mut self, id: Id, answer: AnswerValue) {
        self.answers.insert(id, answer);
    }

    pub fn clear(&mut self, id: &Id) -> Option<AnswerValue> {
        self.answers.remove(id)
    }

    /// Set one entry of a multi-part or matching answer, replacing any
    /// stored answer of another shape.
    pub fn set_entry(&mut self, id: Id, key: Id, value: String) {
        match self.answers.get_mut(&id) {
            Some(AnswerValue::Mapping(map)) => {
                map.insert(key, value);
            }
            _ => {
                self.answers
                    .insert(id, AnswerValue::Mapping(BTreeMap::from([(key, value)])));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Id, &AnswerValue)> {
        self.answers.iter()
    }

    /// Load answers from a JSON object file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read answers from {}", path.display()))?;
        let sheet: AnswerSheet = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse answers JSON: {}", path.display()))?;
        Ok(sheet)
    }
}

/// Lowercase and trim for text comparison.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// First space-delimited token of an already normalized string.
pub fn first_token(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or("")
}

/// Loose textual match used by calculation and multi-part grading.
///
/// `user` must already be normalized. Matches when it equals the reference
/// or contains the reference's first token. Empty references never match.
pub fn text_matches(user: &str, reference: &str) -> bool {
    let reference = normalize(reference);
    if reference.is_empty() {
        return false;
    }
    user == reference || user.contains(first_token(&reference))
}

/// Parse the leading number out of free text.
///
/// Every character that is not an ASCII digit or `.` is dropped first, so
/// `"~100 Mbps"` yields `100.0` and `"1.5.2"` yields `1.5`. Signs and
/// exponents are not recognised.
pub fn leading_number(s: &str) -> Option<f64> {
    let digits: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_digit = false;
    for (i, c) in digits.char_indices() {
        if c == '.' {
            if seen_dot {
                break;
            }
            seen_dot = true;
        } else {
            seen_digit = true;
        }
        end = i + 1;
    }

    if !seen_digit {
        return None;
    }
    digits[..end].trim_end_matches('.').parse::<f64>().ok()
}

/// Key of an option string: `"A. TCP"` → `"A"`.
pub fn option_key(option: &str) -> &str {
    match option.split_once('.') {
        Some((key, _)) => key.trim(),
        None => option.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_rules() {
        assert!(!is_present(None));
        assert!(!is_present(Some(&AnswerValue::Text(String::new()))));
        assert!(!is_present(Some(&AnswerValue::Choices(vec![]))));
        assert!(is_present(Some(&AnswerValue::Text(" ".into()))));
        assert!(is_present(Some(&AnswerValue::Choices(vec!["A".into()]))));
        assert!(is_present(Some(&AnswerValue::Mapping(BTreeMap::new()))));
    }

    #[test]
    fn answer_shapes_deserialize() {
        let sheet: AnswerSheet = serde_json::from_str(
            r#"{"1": "B", "2": ["A", "C"], "3": {"a": "10", "b": "20"}, "4": null}"#,
        )
        .unwrap();
        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.get(&Id::from(1)), Some(&AnswerValue::Text("B".into())));
        assert!(matches!(
            sheet.get(&Id::from(2)),
            Some(AnswerValue::Choices(c)) if c.len() == 2
        ));
        assert!(matches!(
            sheet.get(&Id::from(3)),
            Some(AnswerValue::Mapping(m)) if m.len() == 2
        ));
        assert!(sheet.get(&Id::from(4)).is_none());
    }

    #[test]
    fn set_entry_replaces_other_shapes() {
        let mut sheet = AnswerSheet::new();
        sheet.set(Id::from(5), AnswerValue::Text("stale".into()));
        sheet.set_entry(Id::from(5), Id::from("a"), "x".into());
        assert_eq!(
            sheet.get(&Id::from(5)).map(AnswerValue::display),
            Some("a: x".to_string())
        );
    }

    #[test]
    fn text_matching() {
        assert!(text_matches("100mbps", "100 Mbps"));
        assert!(text_matches("about 100 mbps", "100 Mbps"));
        assert!(text_matches("255.255.255.0", "255.255.255.0"));
        assert!(!text_matches("50", "100 Mbps"));
        assert!(!text_matches("anything", "   "));
    }

    #[test]
    fn leading_number_parsing() {
        assert_eq!(leading_number("100 Mbps"), Some(100.0));
        assert_eq!(leading_number("~104"), Some(104.0));
        assert_eq!(leading_number("1.5.2"), Some(1.5));
        assert_eq!(leading_number("12."), Some(12.0));
        assert_eq!(leading_number(".5"), Some(0.5));
        assert_eq!(leading_number("n/a"), None);
        assert_eq!(leading_number("."), None);
    }

    #[test]
    fn option_keys() {
        assert_eq!(option_key("A. TCP"), "A");
        assert_eq!(option_key("12. Twelve"), "12");
        assert_eq!(option_key("TCP"), "TCP");
    }

    #[test]
    fn load_answers_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.json");
        std::fs::write(&path, r#"{"1": "A"}"#).unwrap();
        let sheet = AnswerSheet::load_json(&path).unwrap();
        assert_eq!(sheet.len(), 1);

        assert!(AnswerSheet::load_json(&dir.path().join("missing.json")).is_err());
    }
}
