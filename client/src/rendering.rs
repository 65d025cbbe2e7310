//! Plain-text rendering of server messages

use shared::{LifelineKind, LifelineResult, OptionLabel, Options, ServerMessage};
use std::collections::BTreeMap;
use std::fmt::Write;

const WIDTH: usize = 60;
const BAR_WIDTH: usize = 50;

pub fn header() -> String {
    let rule = "=".repeat(WIDTH);
    format!(
        "{}\n{:^width$}\n{}\n",
        rule,
        "Who Wants to Be a Millionaire",
        rule,
        width = WIDTH
    )
}

fn progress(number: usize, total: usize, prize: &str, next_prize: Option<&str>) -> String {
    let rule = "=".repeat(WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "{:^width$}",
        format!("Question {} of {}", number, total),
        width = WIDTH
    );
    let _ = writeln!(out, "Current prize: {}", prize);
    if let Some(next) = next_prize {
        let _ = writeln!(out, "Next prize: {}", next);
    }
    let _ = writeln!(out, "{}", rule);
    out
}

fn options_list(options: &Options) -> String {
    options
        .iter()
        .map(|(label, text)| format!("{}) {}\n", label, text))
        .collect()
}

/// What the contestant may type for the current question
pub fn prompt_help(available: &[LifelineKind]) -> String {
    let mut out = String::from("To answer: type A, B, C or D\n");
    for kind in available {
        let _ = writeln!(out, "Type {} for {}", kind.shortcut(), kind.display_name());
    }
    out
}

/// One `label) bar percent%` line per option, largest share first
pub fn audience_chart(results: &BTreeMap<OptionLabel, u8>) -> String {
    let mut sorted: Vec<_> = results.iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

    sorted
        .into_iter()
        .map(|(label, percent)| {
            let filled = (*percent as usize / 2).min(BAR_WIDTH);
            format!(
                "{}) {}{} {}%\n",
                label,
                "#".repeat(filled),
                ".".repeat(BAR_WIDTH - filled),
                percent
            )
        })
        .collect()
}

pub fn render_message(message: &ServerMessage) -> String {
    match message {
        ServerMessage::Question {
            question_number,
            total_questions,
            question,
            options,
            available_lifelines,
            prize,
            next_prize,
        } => {
            let mut out = progress(
                *question_number,
                *total_questions,
                prize,
                next_prize.as_deref(),
            );
            let _ = writeln!(out, "\nQuestion: {}\n", question);
            out.push_str(&options_list(options));
            if !available_lifelines.is_empty() {
                out.push_str("\nAvailable lifelines:\n");
                for kind in available_lifelines {
                    let _ = writeln!(out, "{}) {}", kind.shortcut(), kind.display_name());
                }
            }
            out
        }
        ServerMessage::Correct {
            message,
            question_number,
            total_questions,
            ..
        } => format!(
            "\n{}\nProgress: question {} of {} completed\n",
            message, question_number, total_questions
        ),
        ServerMessage::Wrong {
            correct_answer,
            explanation,
            message,
            ..
        } => format!(
            "\nThe correct answer was {}\n{}\n{}\n",
            correct_answer, explanation, message
        ),
        ServerMessage::Lifeline { lifeline, result } => {
            let body = match result {
                LifelineResult::AudiencePoll { results } => audience_chart(results),
                LifelineResult::FiftyFifty { remaining } => options_list(remaining),
            };
            let title = match lifeline {
                LifelineKind::AudiencePoll => "Audience poll results:",
                LifelineKind::FiftyFifty => "Remaining options:",
            };
            format!("\n{}\n{}", title, body)
        }
        ServerMessage::Error { message, lifeline } => match lifeline {
            Some(id) => format!("\nError: {} ({})\n", message, id),
            None => format!("\nError: {}\n", message),
        },
        ServerMessage::GameOver {
            message,
            prize,
            statistics,
        } => format!(
            "\n{}\nFinal prize: {}\n\nGame statistics:\nQuestions answered: {}\nLifelines used: {}\n",
            message, prize, statistics.questions_answered, statistics.lifelines_used
        ),
    }
}
