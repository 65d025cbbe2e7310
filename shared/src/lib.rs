pub mod codec;
pub mod net;
pub mod protocol;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use codec::{
    write_message, FrameBuffer, MessageReader, WireError, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_FRAME_LEN,
};
pub use net::bind_listener;
pub use protocol::{
    ClientMessage, GameStatistics, LifelineRequest, LifelineResponse, LifelineResult, Options,
    ServerMessage,
};

pub const QUESTIONS_PER_GAME: usize = 5;
pub const PRIZE_LADDER: [&str; QUESTIONS_PER_GAME + 1] =
    ["0", "1,000", "5,000", "10,000", "50,000", "100,000"];
pub const LIFELINE_CATALOG: [LifelineKind; 2] = [LifelineKind::AudiencePoll, LifelineKind::FiftyFifty];

pub const DEFAULT_SERVER_PORT: u16 = 4337;
pub const DEFAULT_LIFELINE_PORT: u16 = 4338;

/// Prize secured after `answered` correct answers.
pub fn prize_for(answered: usize) -> &'static str {
    PRIZE_LADDER[answered.min(QUESTIONS_PER_GAME)]
}

/// One of the four answer slots of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; 4] = [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionLabel::A => "A",
            OptionLabel::B => "B",
            OptionLabel::C => "C",
            OptionLabel::D => "D",
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(OptionLabel::A),
            "B" => Ok(OptionLabel::B),
            "C" => Ok(OptionLabel::C),
            "D" => Ok(OptionLabel::D),
            other => Err(format!("'{}' is not an answer option", other)),
        }
    }
}

/// Single-use aids a contestant may invoke during a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifelineKind {
    AudiencePoll,
    FiftyFifty,
}

impl LifelineKind {
    pub fn id(&self) -> &'static str {
        match self {
            LifelineKind::AudiencePoll => "audience-poll",
            LifelineKind::FiftyFifty => "fifty-fifty",
        }
    }

    /// Number key the terminal client shows for this lifeline.
    pub fn shortcut(&self) -> &'static str {
        match self {
            LifelineKind::AudiencePoll => "1",
            LifelineKind::FiftyFifty => "2",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LifelineKind::AudiencePoll => "Ask the Audience",
            LifelineKind::FiftyFifty => "50:50",
        }
    }
}

impl fmt::Display for LifelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for LifelineKind {
    type Err = String;

    /// Accepts the catalog id or the numeric shortcut.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        LIFELINE_CATALOG
            .iter()
            .copied()
            .find(|kind| kind.id().eq_ignore_ascii_case(s) || kind.shortcut() == s)
            .ok_or_else(|| format!("unknown lifeline '{}'", s))
    }
}
