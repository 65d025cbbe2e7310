//! Per-contestant game state machine
//!
//! A `Session` knows which question the contestant is on, which lifelines are
//! left, and how the game ended. It performs no I/O: callers feed it commands
//! and send the messages it returns, in order. Each connection owns its own
//! `Session`, so nothing here is shared or locked.
//!
//! ```text
//! AwaitingAnswer(i) --correct, i+1 < N--> AwaitingAnswer(i+1)
//! AwaitingAnswer(i) --correct, i+1 = N--> Won
//! AwaitingAnswer(i) --wrong-------------> Lost
//! AwaitingAnswer(i) --peer gone---------> Disconnected
//! ```

use crate::question_bank::Question;
use shared::{
    prize_for, GameStatistics, LifelineKind, OptionLabel, ServerMessage, LIFELINE_CATALOG,
    QUESTIONS_PER_GAME,
};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting on question `i` (0-based)
    AwaitingAnswer(usize),
    Won,
    Lost,
    Disconnected,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionState::AwaitingAnswer(_))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session has already ended ({0:?})")]
    Finished(SessionState),
}

#[derive(Debug)]
pub struct Session {
    questions: Arc<[Question]>,
    total: usize,
    /// Correct answers so far
    current: usize,
    state: SessionState,
    available_lifelines: Vec<LifelineKind>,
}

impl Session {
    pub fn new(questions: Arc<[Question]>) -> Self {
        let total = questions.len().min(QUESTIONS_PER_GAME);
        let state = if total == 0 {
            SessionState::Won
        } else {
            SessionState::AwaitingAnswer(0)
        };

        Self {
            questions,
            total,
            current: 0,
            state,
            available_lifelines: LIFELINE_CATALOG.to_vec(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn total_questions(&self) -> usize {
        self.total
    }

    pub fn questions_answered(&self) -> usize {
        self.current
    }

    /// The question being played, `None` once the session has ended
    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            SessionState::AwaitingAnswer(i) => self.questions.get(i),
            _ => None,
        }
    }

    pub fn available_lifelines(&self) -> &[LifelineKind] {
        &self.available_lifelines
    }

    pub fn is_available(&self, kind: LifelineKind) -> bool {
        self.available_lifelines.contains(&kind)
    }

    /// Removes `kind` from the available set
    ///
    /// Returns false if it was already spent. Lifelines are never given back.
    pub fn consume_lifeline(&mut self, kind: LifelineKind) -> bool {
        match self.available_lifelines.iter().position(|k| *k == kind) {
            Some(pos) => {
                self.available_lifelines.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn lifelines_used(&self) -> usize {
        LIFELINE_CATALOG.len() - self.available_lifelines.len()
    }

    pub fn statistics(&self) -> GameStatistics {
        GameStatistics {
            questions_answered: self.current,
            lifelines_used: self.lifelines_used(),
        }
    }

    pub fn question_message(&self) -> Option<ServerMessage> {
        let index = self.current;
        let question = self.current_question()?;

        Some(ServerMessage::Question {
            question_number: index + 1,
            total_questions: self.total,
            question: question.text.clone(),
            options: question.options.clone(),
            available_lifelines: self.available_lifelines.clone(),
            prize: prize_for(index).to_string(),
            next_prize: (index + 1 < self.total).then(|| prize_for(index + 1).to_string()),
        })
    }

    /// Grades `answer` against the current question
    ///
    /// Returns the messages to send, in order: a correctness result, followed
    /// by the game-over message when the game ends.
    pub fn submit_answer(&mut self, answer: OptionLabel) -> Result<Vec<ServerMessage>, SessionError> {
        let index = match self.state {
            SessionState::AwaitingAnswer(i) => i,
            ended => return Err(SessionError::Finished(ended)),
        };
        let question = &self.questions[index];

        if answer == question.correct_answer {
            self.current = index + 1;
            let prize = prize_for(self.current).to_string();
            let mut messages = vec![ServerMessage::Correct {
                message: format!("Correct! You've secured {}", prize),
                question_number: index + 1,
                total_questions: self.total,
                prize: prize.clone(),
            }];

            if self.current == self.total {
                self.state = SessionState::Won;
                messages.push(ServerMessage::GameOver {
                    message: "Congratulations! You've won the game!".to_string(),
                    prize,
                    statistics: self.statistics(),
                });
            } else {
                self.state = SessionState::AwaitingAnswer(self.current);
            }

            Ok(messages)
        } else {
            let prize = prize_for(index).to_string();
            let wrong = ServerMessage::Wrong {
                correct_answer: question.correct_answer,
                explanation: question.explanation.clone(),
                message: format!("Wrong answer! You leave with {}", prize),
                question_number: index + 1,
                prize: prize.clone(),
            };
            self.state = SessionState::Lost;

            Ok(vec![
                wrong,
                ServerMessage::GameOver {
                    message: "Game Over! Thanks for playing!".to_string(),
                    prize,
                    statistics: self.statistics(),
                },
            ])
        }
    }

    /// Records that the contestant went away; terminal states are kept
    pub fn mark_disconnected(&mut self) {
        if !self.state.is_terminal() {
            self.state = SessionState::Disconnected;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question_bank::tests::sample_questions;

    fn correct_label(session: &Session) -> OptionLabel {
        session.current_question().unwrap().correct_answer
    }

    fn wrong_label(session: &Session) -> OptionLabel {
        let correct = correct_label(session);
        *OptionLabel::ALL.iter().find(|l| **l != correct).unwrap()
    }

    #[test]
    fn test_new_session_starts_at_first_question() {
        let session = Session::new(sample_questions());
        assert_eq!(session.state(), SessionState::AwaitingAnswer(0));
        assert_eq!(session.total_questions(), 5);
        assert_eq!(session.available_lifelines(), &LIFELINE_CATALOG);
        assert_eq!(session.lifelines_used(), 0);
    }

    #[test]
    fn test_question_message_contents() {
        let session = Session::new(sample_questions());
        match session.question_message().unwrap() {
            ServerMessage::Question {
                question_number,
                total_questions,
                question,
                options,
                available_lifelines,
                prize,
                next_prize,
            } => {
                assert_eq!(question_number, 1);
                assert_eq!(total_questions, 5);
                assert_eq!(question, "Question 1?");
                assert_eq!(options.len(), 4);
                assert_eq!(available_lifelines, LIFELINE_CATALOG.to_vec());
                assert_eq!(prize, "0");
                assert_eq!(next_prize.as_deref(), Some("1,000"));
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_correct_answer_advances_one_step() {
        for start in 0..4 {
            let mut session = Session::new(sample_questions());
            for _ in 0..start {
                let label = correct_label(&session);
                session.submit_answer(label).unwrap();
            }
            assert_eq!(session.state(), SessionState::AwaitingAnswer(start));

            let label = correct_label(&session);
            let messages = session.submit_answer(label).unwrap();
            assert_eq!(messages.len(), 1);
            assert_eq!(session.state(), SessionState::AwaitingAnswer(start + 1));
            match &messages[0] {
                ServerMessage::Correct {
                    question_number,
                    prize,
                    ..
                } => {
                    assert_eq!(*question_number, start + 1);
                    assert_eq!(prize, prize_for(start + 1));
                }
                other => panic!("unexpected message {:?}", other),
            }
        }
    }

    #[test]
    fn test_last_question_wins_and_omits_next_prize() {
        let mut session = Session::new(sample_questions());
        for _ in 0..4 {
            let label = correct_label(&session);
            session.submit_answer(label).unwrap();
        }

        match session.question_message().unwrap() {
            ServerMessage::Question {
                question_number,
                prize,
                next_prize,
                ..
            } => {
                assert_eq!(question_number, 5);
                assert_eq!(prize, "50,000");
                assert_eq!(next_prize, None);
            }
            other => panic!("unexpected message {:?}", other),
        }

        let label = correct_label(&session);
        let messages = session.submit_answer(label).unwrap();
        assert_eq!(session.state(), SessionState::Won);
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[1],
            ServerMessage::GameOver {
                message: "Congratulations! You've won the game!".to_string(),
                prize: "100,000".to_string(),
                statistics: GameStatistics {
                    questions_answered: 5,
                    lifelines_used: 0,
                },
            }
        );
        assert!(session.question_message().is_none());
    }

    #[test]
    fn test_wrong_answer_loses_at_any_index() {
        for start in 0..5 {
            let mut session = Session::new(sample_questions());
            for _ in 0..start {
                let label = correct_label(&session);
                session.submit_answer(label).unwrap();
            }

            let expected_correct = correct_label(&session);
            let label = wrong_label(&session);
            let messages = session.submit_answer(label).unwrap();
            assert_eq!(session.state(), SessionState::Lost);
            assert_eq!(messages.len(), 2);

            match &messages[0] {
                ServerMessage::Wrong {
                    correct_answer,
                    explanation,
                    prize,
                    ..
                } => {
                    assert_eq!(*correct_answer, expected_correct);
                    assert!(explanation.starts_with("Because"));
                    assert_eq!(prize, prize_for(start));
                }
                other => panic!("unexpected message {:?}", other),
            }
            match &messages[1] {
                ServerMessage::GameOver { statistics, .. } => {
                    assert_eq!(statistics.questions_answered, start);
                }
                other => panic!("unexpected message {:?}", other),
            }

            // Lost never resumes
            assert_eq!(
                session.submit_answer(expected_correct),
                Err(SessionError::Finished(SessionState::Lost))
            );
            assert!(session.question_message().is_none());
        }
    }

    #[test]
    fn test_lifelines_only_shrink() {
        let mut session = Session::new(sample_questions());
        assert!(session.consume_lifeline(LifelineKind::FiftyFifty));
        assert!(!session.is_available(LifelineKind::FiftyFifty));
        assert!(!session.consume_lifeline(LifelineKind::FiftyFifty));
        assert_eq!(session.lifelines_used(), 1);

        let label = correct_label(&session);
        session.submit_answer(label).unwrap();
        match session.question_message().unwrap() {
            ServerMessage::Question {
                available_lifelines,
                ..
            } => assert_eq!(available_lifelines, vec![LifelineKind::AudiencePoll]),
            other => panic!("unexpected message {:?}", other),
        }

        assert!(session.consume_lifeline(LifelineKind::AudiencePoll));
        assert!(session.available_lifelines().is_empty());
        assert_eq!(session.statistics().lifelines_used, 2);
    }

    #[test]
    fn test_disconnect_is_terminal_but_does_not_override_outcome() {
        let mut session = Session::new(sample_questions());
        session.mark_disconnected();
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(session.state().is_terminal());

        let mut won = Session::new(sample_questions());
        for _ in 0..5 {
            let label = correct_label(&won);
            won.submit_answer(label).unwrap();
        }
        won.mark_disconnected();
        assert_eq!(won.state(), SessionState::Won);
    }
}
