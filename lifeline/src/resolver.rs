//! Lifeline computations
//!
//! Both lifelines are pure functions of the question and a random source.
//! Callers pass the RNG so tests can seed it.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use shared::{LifelineKind, LifelineRequest, LifelineResponse, LifelineResult, OptionLabel, Options};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Raw vote weight drawn for each incorrect option
pub const DISTRACTOR_WEIGHT: RangeInclusive<u32> = 5..=20;
/// Raw vote weight drawn for the correct option
pub const CORRECT_WEIGHT: RangeInclusive<u32> = 40..=65;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("correct answer {0} is not among the options")]
    MissingCorrectOption(OptionLabel),
    #[error("no incorrect option left to keep")]
    NoIncorrectOption,
}

/// Simulates the studio audience voting on the four options
///
/// Every label gets a raw weight, the correct one from a higher range. Weights
/// are rescaled to integer percentages by truncation and the truncation
/// remainder goes to the correct label. Each truncated share is at most its
/// exact share, so the remainder is between 0 and 3 and the total is exactly
/// 100.
pub fn audience_poll<R: Rng + ?Sized>(rng: &mut R, correct: OptionLabel) -> BTreeMap<OptionLabel, u8> {
    let weights: Vec<(OptionLabel, u32)> = OptionLabel::ALL
        .iter()
        .map(|label| {
            let range = if *label == correct {
                CORRECT_WEIGHT
            } else {
                DISTRACTOR_WEIGHT
            };
            (*label, rng.gen_range(range))
        })
        .collect();

    let total: u32 = weights.iter().map(|(_, w)| w).sum();
    let mut shares: BTreeMap<OptionLabel, u8> = weights
        .iter()
        .map(|(label, w)| (*label, (w * 100 / total) as u8))
        .collect();

    let assigned: u32 = shares.values().map(|p| *p as u32).sum();
    let remainder = (100 - assigned) as u8;
    if let Some(share) = shares.get_mut(&correct) {
        *share += remainder;
    }

    debug!("Audience poll for {}: {:?}", correct, shares);
    shares
}

/// Keeps the correct option and one incorrect option chosen uniformly
pub fn fifty_fifty<R: Rng + ?Sized>(
    rng: &mut R,
    correct: OptionLabel,
    options: &Options,
) -> Result<Options, ResolveError> {
    let correct_text = options
        .get(&correct)
        .ok_or(ResolveError::MissingCorrectOption(correct))?;

    let wrong: Vec<OptionLabel> = options.keys().copied().filter(|l| *l != correct).collect();
    let keep = *wrong.choose(rng).ok_or(ResolveError::NoIncorrectOption)?;

    let mut remaining = Options::new();
    remaining.insert(correct, correct_text.clone());
    remaining.insert(keep, options[&keep].clone());

    debug!("50:50 for {}: keeping {}", correct, keep);
    Ok(remaining)
}

pub fn resolve<R: Rng + ?Sized>(
    rng: &mut R,
    request: &LifelineRequest,
) -> Result<LifelineResult, ResolveError> {
    match request.kind {
        LifelineKind::AudiencePoll => {
            if !request.options.is_empty() && !request.options.contains_key(&request.correct_answer) {
                return Err(ResolveError::MissingCorrectOption(request.correct_answer));
            }
            Ok(LifelineResult::AudiencePoll {
                results: audience_poll(rng, request.correct_answer),
            })
        }
        LifelineKind::FiftyFifty => Ok(LifelineResult::FiftyFifty {
            remaining: fifty_fifty(rng, request.correct_answer, &request.options)?,
        }),
    }
}

/// Answers one request; invalid input becomes an error reply
pub fn handle_request<R: Rng + ?Sized>(rng: &mut R, request: &LifelineRequest) -> LifelineResponse {
    match resolve(rng, request) {
        Ok(result) => result.into(),
        Err(e) => LifelineResponse::Error {
            message: e.to_string(),
        },
    }
}
