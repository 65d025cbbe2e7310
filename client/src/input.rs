//! Interpreting what the contestant types

use shared::{ClientMessage, LifelineKind, OptionLabel};

/// A validated line of contestant input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Answer(OptionLabel),
    Lifeline(LifelineKind),
}

impl Choice {
    pub fn to_message(self) -> ClientMessage {
        match self {
            Choice::Answer(label) => ClientMessage::Answer {
                answer: label.to_string(),
            },
            Choice::Lifeline(kind) => ClientMessage::Lifeline {
                lifeline: kind.id().to_string(),
            },
        }
    }
}

/// Parses one line against the lifelines still on offer
///
/// Answers are case-insensitive. Lifelines may be typed by number or by id,
/// but only those in `available` are accepted.
pub fn parse_choice(line: &str, available: &[LifelineKind]) -> Option<Choice> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Ok(label) = line.parse::<OptionLabel>() {
        return Some(Choice::Answer(label));
    }

    line.parse::<LifelineKind>()
        .ok()
        .filter(|kind| available.contains(kind))
        .map(Choice::Lifeline)
}

/// `Some(true)` for yes, `Some(false)` for no, `None` otherwise
pub fn parse_yes_no(line: &str) -> Option<bool> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
