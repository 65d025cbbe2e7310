//! Message types carried by the codec
//!
//! Player-facing messages are tagged by a `type` field in snake_case. The
//! lifeline protocol uses the lifeline id itself as its `type`.

use crate::{LifelineKind, OptionLabel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Answer texts keyed by label
pub type Options = BTreeMap<OptionLabel, String>;

/// Commands sent by the contestant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// `answer` is expected to be one of A-D but arrives unchecked
    Answer { answer: String },
    /// `lifeline` is a catalog id or its numeric shortcut
    Lifeline { lifeline: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    pub questions_answered: usize,
    pub lifelines_used: usize,
}

/// Payload of a resolved lifeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LifelineResult {
    AudiencePoll { results: BTreeMap<OptionLabel, u8> },
    FiftyFifty { remaining: Options },
}

impl LifelineResult {
    pub fn kind(&self) -> LifelineKind {
        match self {
            LifelineResult::AudiencePoll { .. } => LifelineKind::AudiencePoll,
            LifelineResult::FiftyFifty { .. } => LifelineKind::FiftyFifty,
        }
    }
}

/// Messages sent by the session server to the contestant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Question {
        question_number: usize,
        total_questions: usize,
        question: String,
        options: Options,
        available_lifelines: Vec<LifelineKind>,
        prize: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        next_prize: Option<String>,
    },
    Correct {
        message: String,
        question_number: usize,
        total_questions: usize,
        prize: String,
    },
    Wrong {
        correct_answer: OptionLabel,
        explanation: String,
        message: String,
        question_number: usize,
        prize: String,
    },
    Lifeline {
        lifeline: LifelineKind,
        #[serde(flatten)]
        result: LifelineResult,
    },
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lifeline: Option<String>,
    },
    GameOver {
        message: String,
        prize: String,
        statistics: GameStatistics,
    },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
            lifeline: None,
        }
    }

    pub fn lifeline_error(message: impl Into<String>, lifeline: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
            lifeline: Some(lifeline.into()),
        }
    }

    /// True for the last message of a game
    pub fn is_game_over(&self) -> bool {
        matches!(self, ServerMessage::GameOver { .. })
    }
}

/// Session server to lifeline server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifelineRequest {
    #[serde(rename = "type")]
    pub kind: LifelineKind,
    pub correct_answer: OptionLabel,
    pub options: Options,
}

/// Lifeline server reply, one per request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LifelineResponse {
    AudiencePoll { results: BTreeMap<OptionLabel, u8> },
    FiftyFifty { remaining: Options },
    Error { message: String },
}

impl From<LifelineResult> for LifelineResponse {
    fn from(result: LifelineResult) -> Self {
        match result {
            LifelineResult::AudiencePoll { results } => LifelineResponse::AudiencePoll { results },
            LifelineResult::FiftyFifty { remaining } => LifelineResponse::FiftyFifty { remaining },
        }
    }
}

impl LifelineResponse {
    /// Splits a reply into the result payload or the resolver's error text
    pub fn into_result(self) -> Result<LifelineResult, String> {
        match self {
            LifelineResponse::AudiencePoll { results } => Ok(LifelineResult::AudiencePoll { results }),
            LifelineResponse::FiftyFifty { remaining } => Ok(LifelineResult::FiftyFifty { remaining }),
            LifelineResponse::Error { message } => Err(message),
        }
    }
}
