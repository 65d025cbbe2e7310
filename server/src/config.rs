//! Runtime settings for the session server

use shared::{
    DEFAULT_CHUNK_SIZE, DEFAULT_LIFELINE_PORT, DEFAULT_MAX_FRAME_LEN, DEFAULT_SERVER_PORT,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address contestants connect to
    pub listen_addr: String,
    /// Address of the lifeline server
    pub lifeline_addr: String,
    pub questions_path: PathBuf,
    /// Listen backlog for the contestant socket
    pub backlog: u32,
    pub chunk_size: usize,
    /// Longest accepted command line; longer input ends the session
    pub max_frame_len: usize,
    /// Upper bound on one lifeline round trip, connect included; `None` waits forever
    pub lifeline_timeout: Option<Duration>,
    pub pacing: Pacing,
    pub status_interval: Duration,
}

/// Pauses inserted for dramatic effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pacing {
    /// Before each question is sent
    pub question_delay: Duration,
    /// Between receiving an answer and grading it
    pub suspense: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: format!("127.0.0.1:{}", DEFAULT_SERVER_PORT),
            lifeline_addr: format!("127.0.0.1:{}", DEFAULT_LIFELINE_PORT),
            questions_path: PathBuf::from("data/questions.json"),
            backlog: 5,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            lifeline_timeout: Some(Duration::from_secs(10)),
            pacing: Pacing::default(),
            status_interval: Duration::from_secs(1),
        }
    }
}
