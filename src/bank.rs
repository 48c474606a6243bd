use std::fs;
use std::path::{Path, PathBuf};

use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Embed)]
#[folder = "assets/questions/"]
struct QuestionAssets;

pub const BUNDLED_BANK: &str = "modern_history.json";

/// Choices are picked with the digit keys 1-9.
pub const MAX_CHOICES: usize = 9;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub id: u32,
    #[serde(rename = "question")]
    pub text: String,
    pub choices: Vec<String>,
    #[serde(rename = "correct")]
    pub correct_index: usize,
    #[serde(default)]
    pub explanation: String,
}

impl Question {
    /// Ledger duplicate check. Only `text` and `correct_index` are compared, so
    /// two records that differ in choices or explanation still count as one.
    pub fn same_as(&self, other: &Question) -> bool {
        self.text == other.text && self.correct_index == other.correct_index
    }

    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_index
    }

    pub fn is_well_formed(&self) -> bool {
        (2..=MAX_CHOICES).contains(&self.choices.len()) && self.correct_index < self.choices.len()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Genre {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct QuestionBank {
    pub genres: Vec<Genre>,
}

#[derive(Debug, Error)]
pub enum BankError {
    #[error("failed to read question bank {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed question bank {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("bundled question bank {0} is missing")]
    MissingAsset(String),
    #[error("question bank {0} contains no genres")]
    Empty(String),
}

impl QuestionBank {
    /// Resolve the catalog: an explicit file first, then the bundled asset,
    /// then the single-question placeholder. Never fails.
    pub fn load(path: Option<&Path>) -> Self {
        if let Some(path) = path {
            match Self::from_file(path) {
                Ok(bank) => {
                    info!(path = %path.display(), genres = bank.genres.len(), "loaded question bank");
                    return bank;
                }
                Err(err) => warn!("{err}; falling back to bundled bank"),
            }
        }

        match Self::bundled() {
            Ok(bank) => bank,
            Err(err) => {
                warn!("{err}; using placeholder catalog");
                Self::placeholder()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, BankError> {
        let content = fs::read_to_string(path).map_err(|source| BankError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content, &path.display().to_string())
    }

    pub fn bundled() -> Result<Self, BankError> {
        let file = QuestionAssets::get(BUNDLED_BANK)
            .ok_or_else(|| BankError::MissingAsset(BUNDLED_BANK.to_string()))?;
        let content = String::from_utf8_lossy(file.data.as_ref());
        Self::from_json(&content, BUNDLED_BANK)
    }

    pub fn from_json(content: &str, origin: &str) -> Result<Self, BankError> {
        let mut bank: QuestionBank =
            serde_json::from_str(content).map_err(|source| BankError::Parse {
                origin: origin.to_string(),
                source,
            })?;
        if bank.genres.is_empty() {
            return Err(BankError::Empty(origin.to_string()));
        }
        bank.drop_malformed();
        Ok(bank)
    }

    fn drop_malformed(&mut self) {
        for genre in &mut self.genres {
            let before = genre.questions.len();
            genre.questions.retain(Question::is_well_formed);
            let dropped = before - genre.questions.len();
            if dropped > 0 {
                warn!(genre = %genre.id, dropped, "skipped malformed questions");
            }
        }
    }

    pub fn placeholder() -> Self {
        Self {
            genres: vec![Genre {
                id: "sample1".to_string(),
                name: "Sample 1".to_string(),
                description: "Test data".to_string(),
                questions: vec![Question {
                    id: 1,
                    text: "This is a sample question. Which answer is correct?".to_string(),
                    choices: vec![
                        "Choice 1".to_string(),
                        "Choice 2".to_string(),
                        "Choice 3".to_string(),
                        "Choice 4".to_string(),
                    ],
                    correct_index: 0,
                    explanation: "Placeholder data. Point --bank at a question file.".to_string(),
                }],
            }],
        }
    }

    pub fn genre(&self, id: &str) -> Option<&Genre> {
        self.genres.iter().find(|g| g.id == id)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn question(text: &str, correct: usize) -> Question {
        Question {
            id: 0,
            text: text.to_string(),
            choices: vec!["a".into(), "b".into(), "c".into()],
            correct_index: correct,
            explanation: String::new(),
        }
    }

    #[test]
    fn same_as_ignores_choices_and_explanation() {
        let a = question("When did the Meiji era begin?", 1);
        let mut b = a.clone();
        b.choices = vec!["x".into(), "y".into()];
        b.explanation = "different".into();
        assert!(a.same_as(&b));

        let c = question("When did the Meiji era begin?", 2);
        assert!(!a.same_as(&c));
    }

    #[test]
    fn parses_wire_field_names() {
        let json = r#"{"genres":[{"id":"g","name":"G","description":"d","questions":[
            {"id":7,"question":"Q?","choices":["a","b"],"correct":1,"explanation":"E"}]}]}"#;
        let bank = QuestionBank::from_json(json, "inline").unwrap();
        let q = &bank.genre("g").unwrap().questions[0];
        assert_eq!(q.id, 7);
        assert_eq!(q.text, "Q?");
        assert_eq!(q.correct_index, 1);
        assert_eq!(q.explanation, "E");
    }

    #[test]
    fn malformed_questions_are_skipped() {
        let json = r#"{"genres":[{"id":"g","name":"G","questions":[
            {"question":"one choice","choices":["a"],"correct":0},
            {"question":"out of range","choices":["a","b"],"correct":5},
            {"question":"fine","choices":["a","b"],"correct":0}]}]}"#;
        let bank = QuestionBank::from_json(json, "inline").unwrap();
        let questions = &bank.genre("g").unwrap().questions;
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].text, "fine");
    }

    #[test]
    fn questions_with_more_choices_than_digit_keys_are_skipped() {
        let ten: Vec<String> = (0..10).map(|i| format!("c{i}")).collect();
        let nine = &ten[..9];
        let json = serde_json::json!({"genres": [{"id": "g", "name": "G", "questions": [
            {"question": "ten", "choices": ten, "correct": 9},
            {"question": "nine", "choices": nine, "correct": 8}
        ]}]})
        .to_string();
        let bank = QuestionBank::from_json(&json, "inline").unwrap();
        let questions = &bank.genre("g").unwrap().questions;
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].text, "nine");
    }

    #[test]
    fn empty_document_is_rejected() {
        assert!(matches!(
            QuestionBank::from_json(r#"{"genres":[]}"#, "inline"),
            Err(BankError::Empty(_))
        ));
        assert!(matches!(
            QuestionBank::from_json("not json", "inline"),
            Err(BankError::Parse { .. })
        ));
    }

    #[test]
    fn bundled_bank_loads() {
        let bank = QuestionBank::bundled().unwrap();
        assert!(!bank.genres.is_empty());
        assert!(bank.genres.iter().all(|g| !g.questions.is_empty()));
    }

    #[test]
    fn missing_file_falls_back_to_bundled() {
        let bank = QuestionBank::load(Some(Path::new("/nonexistent/bank.json")));
        assert!(!bank.genres.is_empty());
        assert!(bank.genre("sample1").is_none());
    }

    #[test]
    fn loads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"genres":[{{"id":"edo","name":"Edo","questions":[
                {{"question":"Q","choices":["a","b"],"correct":0}}]}}]}}"#
        )
        .unwrap();
        let bank = QuestionBank::load(Some(file.path()));
        assert_eq!(bank.genres.len(), 1);
        assert_eq!(bank.genres[0].id, "edo");
    }

    #[test]
    fn placeholder_has_one_question() {
        let bank = QuestionBank::placeholder();
        let genre = bank.genre("sample1").unwrap();
        assert_eq!(genre.questions.len(), 1);
        assert_eq!(genre.questions[0].correct_index, 0);
    }
}
