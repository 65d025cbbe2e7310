use crate::input::{parse_choice, parse_yes_no, Choice};
use crate::rendering::{header, prompt_help, render_message};
use log::{info, warn};
use shared::{
    write_message, GameStatistics, LifelineKind, MessageReader, ServerMessage, WireError,
};
use std::io;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("connection to game server failed: {0}")]
    Wire(#[from] WireError),
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

/// How a single game ended from the contestant's side
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameOutcome {
    Finished {
        prize: String,
        statistics: GameStatistics,
    },
    /// The server went away before announcing the end of the game
    ServerClosed,
    /// The contestant's input ran out
    InputClosed,
}

/// Terminal contestant: reads choices from `input`, writes text to `output`
pub struct Contestant<I, O> {
    input: I,
    output: O,
}

impl<I, O> Contestant<I, O>
where
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> O {
        self.output
    }

    /// Plays games against `server_addr` until the contestant declines another
    pub async fn run(&mut self, server_addr: &str) -> Result<(), ClientError> {
        loop {
            self.print(&header()).await?;
            self.print("Starting new game...\n").await?;

            match self.play_game(server_addr).await {
                Ok(GameOutcome::Finished { .. }) => {}
                Ok(GameOutcome::ServerClosed) => {
                    self.print("\nThe game server closed the connection.\n").await?;
                }
                Ok(GameOutcome::InputClosed) => break,
                Err(e @ ClientError::Connect { .. }) => {
                    warn!("{}", e);
                    self.print("Failed to connect to the game server.\n").await?;
                }
                Err(e) => return Err(e),
            }

            if !self.ask_play_again().await? {
                break;
            }
        }

        self.print("\nThanks for playing! Goodbye!\n").await?;
        Ok(())
    }

    /// Opens a fresh connection and plays one game on it
    pub async fn play_game(&mut self, server_addr: &str) -> Result<GameOutcome, ClientError> {
        let stream = TcpStream::connect(server_addr)
            .await
            .map_err(|source| ClientError::Connect {
                addr: server_addr.to_string(),
                source,
            })?;
        info!("Connected to game server at {}", server_addr);

        self.play_on(stream).await
    }

    /// Plays one game over an already connected stream
    pub async fn play_on<S>(&mut self, stream: S) -> Result<GameOutcome, ClientError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (read_half, mut writer) = tokio::io::split(stream);
        let mut reader = MessageReader::new(read_half);
        let mut available: Vec<LifelineKind> = Vec::new();

        loop {
            let message: ServerMessage = match reader.read_message().await {
                Ok(message) => message,
                Err(e) if e.is_disconnect() => {
                    warn!("Game server closed the connection");
                    return Ok(GameOutcome::ServerClosed);
                }
                Err(e) => return Err(e.into()),
            };
            self.print(&render_message(&message)).await?;

            // Lifeline results and errors leave the same question open
            let awaiting_choice = match &message {
                ServerMessage::Question {
                    available_lifelines,
                    ..
                } => {
                    available = available_lifelines.clone();
                    true
                }
                ServerMessage::Lifeline { lifeline, .. } => {
                    available.retain(|kind| kind != lifeline);
                    true
                }
                ServerMessage::Error { .. } => true,
                ServerMessage::Correct { .. } | ServerMessage::Wrong { .. } => false,
                ServerMessage::GameOver {
                    prize, statistics, ..
                } => {
                    return Ok(GameOutcome::Finished {
                        prize: prize.clone(),
                        statistics: *statistics,
                    })
                }
            };

            if awaiting_choice {
                match self.choose(&available).await? {
                    Some(choice) => write_message(&mut writer, &choice.to_message()).await?,
                    None => return Ok(GameOutcome::InputClosed),
                }
            }
        }
    }

    async fn choose(&mut self, available: &[LifelineKind]) -> Result<Option<Choice>, ClientError> {
        self.print(&format!("\n{}", prompt_help(available))).await?;

        loop {
            self.print("Your choice: ").await?;
            let line = match self.read_line().await? {
                Some(line) => line,
                None => return Ok(None),
            };
            match parse_choice(&line, available) {
                Some(choice) => return Ok(Some(choice)),
                None => self.print("Invalid choice. Please try again.\n").await?,
            }
        }
    }

    async fn ask_play_again(&mut self) -> Result<bool, ClientError> {
        loop {
            self.print("\nWould you like to play again? (y/n): ").await?;
            let line = match self.read_line().await? {
                Some(line) => line,
                None => return Ok(false),
            };
            match parse_yes_no(&line) {
                Some(again) => return Ok(again),
                None => self.print("Please enter 'y' for yes or 'n' for no.\n").await?,
            }
        }
    }

    async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    async fn print(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{LifelineResult, OptionLabel, Options, LIFELINE_CATALOG};
    use tokio::io::BufReader;
    use tokio_test::io::Builder;

    fn line(message: &ServerMessage) -> Vec<u8> {
        let mut bytes = serde_json::to_vec(message).unwrap();
        bytes.push(b'\n');
        bytes
    }

    fn lines(messages: &[ServerMessage]) -> Vec<u8> {
        messages.iter().flat_map(line).collect()
    }

    fn options() -> Options {
        OptionLabel::ALL
            .iter()
            .zip(["Lion", "Tiger", "Bear", "Wolf"])
            .map(|(l, t)| (*l, t.to_string()))
            .collect()
    }

    fn question(available: Vec<LifelineKind>) -> ServerMessage {
        ServerMessage::Question {
            question_number: 1,
            total_questions: 1,
            question: "Which one is striped?".to_string(),
            options: options(),
            available_lifelines: available,
            prize: "0".to_string(),
            next_prize: None,
        }
    }

    fn contestant(typed: &'static str) -> Contestant<BufReader<&'static [u8]>, Vec<u8>> {
        Contestant::new(BufReader::new(typed.as_bytes()), Vec::new())
    }

    #[tokio::test]
    async fn test_answers_after_rejecting_bad_input() {
        let server = Builder::new()
            .read(&line(&question(LIFELINE_CATALOG.to_vec())))
            .write(b"{\"type\":\"answer\",\"answer\":\"B\"}\n")
            .read(&lines(&[
                ServerMessage::Correct {
                    message: "Correct! You've secured 1,000".to_string(),
                    question_number: 1,
                    total_questions: 1,
                    prize: "1,000".to_string(),
                },
                ServerMessage::GameOver {
                    message: "Congratulations! You've won the game!".to_string(),
                    prize: "1,000".to_string(),
                    statistics: GameStatistics {
                        questions_answered: 1,
                        lifelines_used: 0,
                    },
                },
            ]))
            .build();

        let mut player = contestant("E\nb\n");
        let outcome = player.play_on(server).await.unwrap();
        assert_eq!(
            outcome,
            GameOutcome::Finished {
                prize: "1,000".to_string(),
                statistics: GameStatistics {
                    questions_answered: 1,
                    lifelines_used: 0,
                },
            }
        );

        let shown = String::from_utf8(player.into_output()).unwrap();
        assert!(shown.contains("Which one is striped?"));
        assert!(shown.contains("Invalid choice. Please try again."));
        assert!(shown.contains("Correct! You've secured 1,000"));
        assert!(shown.contains("Questions answered: 1"));
    }

    #[tokio::test]
    async fn test_reprompts_after_lifeline_without_spent_one() {
        let mut remaining = Options::new();
        remaining.insert(OptionLabel::B, "Tiger".to_string());
        remaining.insert(OptionLabel::D, "Wolf".to_string());

        let server = Builder::new()
            .read(&line(&question(LIFELINE_CATALOG.to_vec())))
            .write(b"{\"type\":\"lifeline\",\"lifeline\":\"fifty-fifty\"}\n")
            .read(&line(&ServerMessage::Lifeline {
                lifeline: LifelineKind::FiftyFifty,
                result: LifelineResult::FiftyFifty { remaining },
            }))
            .write(b"{\"type\":\"answer\",\"answer\":\"D\"}\n")
            .read(&lines(&[
                ServerMessage::Wrong {
                    correct_answer: OptionLabel::B,
                    explanation: "Tigers have stripes".to_string(),
                    message: "Wrong answer! You leave with 0".to_string(),
                    question_number: 1,
                    prize: "0".to_string(),
                },
                ServerMessage::GameOver {
                    message: "Game Over! Thanks for playing!".to_string(),
                    prize: "0".to_string(),
                    statistics: GameStatistics {
                        questions_answered: 0,
                        lifelines_used: 1,
                    },
                },
            ]))
            .build();

        // The second "2" refers to a spent lifeline and must be refused locally
        let mut player = contestant("2\n2\nD\n");
        let outcome = player.play_on(server).await.unwrap();
        assert!(matches!(outcome, GameOutcome::Finished { ref prize, .. } if prize == "0"));

        let shown = String::from_utf8(player.into_output()).unwrap();
        assert!(shown.contains("Remaining options:\nB) Tiger\nD) Wolf\n"));
        assert!(shown.contains("The correct answer was B"));
        assert!(shown.contains("Tigers have stripes"));
        assert_eq!(shown.matches("Invalid choice").count(), 1);
    }

    #[tokio::test]
    async fn test_error_keeps_question_open() {
        let server = Builder::new()
            .read(&line(&question(vec![LifelineKind::AudiencePoll])))
            .write(b"{\"type\":\"lifeline\",\"lifeline\":\"audience-poll\"}\n")
            .read(&line(&ServerMessage::lifeline_error(
                "Failed to process lifeline",
                "audience-poll",
            )))
            .write(b"{\"type\":\"answer\",\"answer\":\"A\"}\n")
            .build();

        let mut player = contestant("1\nA\n");
        let outcome = player.play_on(server).await.unwrap();
        assert_eq!(outcome, GameOutcome::ServerClosed);

        let shown = String::from_utf8(player.into_output()).unwrap();
        assert!(shown.contains("Error: Failed to process lifeline (audience-poll)"));
    }

    #[tokio::test]
    async fn test_input_closed_mid_question() {
        let server = Builder::new()
            .read(&line(&question(LIFELINE_CATALOG.to_vec())))
            .build();

        let mut player = contestant("");
        let outcome = player.play_on(server).await.unwrap();
        assert_eq!(outcome, GameOutcome::InputClosed);
    }

    #[tokio::test]
    async fn test_garbage_from_server_is_an_error() {
        let server = Builder::new().read(b"<html>\n").build();

        let mut player = contestant("");
        let err = player.play_on(server).await.unwrap_err();
        assert!(matches!(err, ClientError::Wire(ref e) if e.is_framing()));
    }

    #[tokio::test]
    async fn test_unreachable_server_then_decline() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut player = contestant("maybe\nn\n");
        player.run(&addr.to_string()).await.unwrap();

        let shown = String::from_utf8(player.into_output()).unwrap();
        assert!(shown.contains("Failed to connect to the game server."));
        assert!(shown.contains("Please enter 'y' for yes or 'n' for no."));
        assert!(shown.ends_with("Thanks for playing! Goodbye!\n"));
    }
}
