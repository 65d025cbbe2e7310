//! Drives one contestant connection through a `Session`
//!
//! The driver owns the socket and the session. It sends the current question,
//! then handles commands until one answer is graded, and repeats until the
//! session reaches a terminal state or the contestant goes away.

use crate::config::{Pacing, ServerConfig};
use crate::lifeline_client::LifelineClient;
use crate::question_bank::Question;
use crate::session::{Session, SessionState};
use log::{debug, error, info, warn};
use shared::{
    write_message, ClientMessage, LifelineKind, MessageReader, OptionLabel, ServerMessage,
    WireError, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_FRAME_LEN,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub pacing: Pacing,
    pub chunk_size: usize,
    pub max_frame_len: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            pacing: Pacing::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

impl From<&ServerConfig> for SessionOptions {
    fn from(config: &ServerConfig) -> Self {
        Self {
            pacing: config.pacing,
            chunk_size: config.chunk_size,
            max_frame_len: config.max_frame_len,
        }
    }
}

/// Plays one game over `stream` and returns how it ended
pub async fn run_session<S>(
    stream: S,
    questions: Arc<[Question]>,
    lifelines: Arc<LifelineClient>,
    options: SessionOptions,
) -> SessionState
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (read_half, mut writer) = tokio::io::split(stream);
    let mut reader =
        MessageReader::with_limits(read_half, options.chunk_size, options.max_frame_len);
    let mut session = Session::new(questions);

    if let Err(e) = play(&mut session, &mut reader, &mut writer, &lifelines, &options).await {
        if e.is_disconnect() {
            info!("Contestant disconnected during question {}", session.questions_answered() + 1);
        } else {
            warn!("Ending session after wire error: {}", e);
        }
        session.mark_disconnected();
    }

    session.state()
}

async fn play<R, W>(
    session: &mut Session,
    reader: &mut MessageReader<R>,
    writer: &mut W,
    lifelines: &LifelineClient,
    options: &SessionOptions,
) -> Result<(), WireError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    while let Some(question) = session.question_message() {
        pause(options.pacing.question_delay).await;
        write_message(writer, &question).await?;

        // Commands for this question until one answer is graded
        loop {
            let value = reader.next_value().await?;
            let command = match serde_json::from_value::<ClientMessage>(value) {
                Ok(command) => command,
                Err(e) => {
                    debug!("Unrecognized command: {}", e);
                    write_message(writer, &ServerMessage::error("Unrecognized command")).await?;
                    continue;
                }
            };

            match command {
                ClientMessage::Lifeline { lifeline } => {
                    let reply = use_lifeline(session, lifelines, &lifeline).await;
                    write_message(writer, &reply).await?;
                }
                ClientMessage::Answer { answer } => {
                    let label = match answer.parse::<OptionLabel>() {
                        Ok(label) => label,
                        Err(e) => {
                            debug!("Rejecting answer: {}", e);
                            write_message(writer, &ServerMessage::error("Invalid answer")).await?;
                            continue;
                        }
                    };

                    pause(options.pacing.suspense).await;
                    let messages = match session.submit_answer(label) {
                        Ok(messages) => messages,
                        Err(e) => {
                            error!("Answer arrived after the game ended: {}", e);
                            return Ok(());
                        }
                    };
                    for message in &messages {
                        write_message(writer, message).await?;
                    }
                    break;
                }
            }
        }
    }

    match session.state() {
        SessionState::Won => info!("Contestant won the game"),
        SessionState::Lost => info!(
            "Contestant lost after {} correct answers",
            session.questions_answered()
        ),
        other => debug!("Session finished in state {:?}", other),
    }
    Ok(())
}

/// Resolves a lifeline for the current question
///
/// The lifeline is only consumed once the resolver has produced a result.
async fn use_lifeline(session: &mut Session, lifelines: &LifelineClient, id: &str) -> ServerMessage {
    let kind = match id.parse::<LifelineKind>() {
        Ok(kind) if session.is_available(kind) => kind,
        _ => return ServerMessage::lifeline_error("Lifeline not available", id),
    };
    let (correct_answer, options) = match session.current_question() {
        Some(question) => (question.correct_answer, question.options.clone()),
        None => return ServerMessage::lifeline_error("Lifeline not available", id),
    };

    match lifelines.resolve(kind, correct_answer, &options).await {
        Ok(result) => {
            session.consume_lifeline(kind);
            info!("Lifeline {} used", kind);
            ServerMessage::Lifeline {
                lifeline: kind,
                result,
            }
        }
        Err(e) => {
            warn!("Lifeline {} failed: {}", kind, e);
            ServerMessage::lifeline_error("Failed to process lifeline", id)
        }
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
