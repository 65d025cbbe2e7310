//! Question bank loading and validation
//!
//! The bank is a JSON document of the form `{"questions": [...]}`. Order in the
//! file is difficulty order: a game plays the first `QUESTIONS_PER_GAME`
//! entries.

use log::info;
use serde::Deserialize;
use shared::{OptionLabel, Options, QUESTIONS_PER_GAME};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

const DEFAULT_EXPLANATION: &str = "Better luck next time!";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    pub options: Options,
    pub correct_answer: OptionLabel,
    #[serde(default = "default_explanation")]
    pub explanation: String,
}

fn default_explanation() -> String {
    DEFAULT_EXPLANATION.to_string()
}

#[derive(Debug, Deserialize)]
struct QuestionFile {
    questions: Vec<Question>,
}

#[derive(Debug, Error)]
pub enum QuestionBankError {
    #[error("failed to read question bank: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse question bank: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question {index} must have exactly the options A, B, C and D")]
    IncompleteOptions { index: usize },
    #[error("a game needs {needed} questions but the bank has {found}")]
    TooFewQuestions { needed: usize, found: usize },
}

pub fn load_questions<P: AsRef<Path>>(path: P) -> Result<Arc<[Question]>, QuestionBankError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let questions = parse_questions(&content)?;
    info!("Loaded {} questions from {}", questions.len(), path.display());
    Ok(questions)
}

/// Parses and validates a bank, keeping only the questions one game uses
pub fn parse_questions(json: &str) -> Result<Arc<[Question]>, QuestionBankError> {
    let file: QuestionFile = serde_json::from_str(json)?;
    validate(&file.questions)?;
    Ok(file.questions.into_iter().take(QUESTIONS_PER_GAME).collect())
}

fn validate(questions: &[Question]) -> Result<(), QuestionBankError> {
    if questions.len() < QUESTIONS_PER_GAME {
        return Err(QuestionBankError::TooFewQuestions {
            needed: QUESTIONS_PER_GAME,
            found: questions.len(),
        });
    }

    for (index, question) in questions.iter().enumerate() {
        let complete = question.options.len() == OptionLabel::ALL.len()
            && OptionLabel::ALL.iter().all(|l| question.options.contains_key(l));
        if !complete {
            return Err(QuestionBankError::IncompleteOptions { index });
        }
    }

    Ok(())
}
