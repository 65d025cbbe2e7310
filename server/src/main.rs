use clap::Parser;
use log::info;
use server::config::{Pacing, ServerConfig};
use server::network::SessionServer;
use server::question_bank::load_questions;
use server::status::spawn_status_reporter;
use shared::{
    DEFAULT_CHUNK_SIZE, DEFAULT_LIFELINE_PORT, DEFAULT_MAX_FRAME_LEN, DEFAULT_SERVER_PORT,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Session server for the millionaire game", long_about = None)]
struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port contestants connect to
    #[arg(short, long, default_value_t = DEFAULT_SERVER_PORT)]
    port: u16,

    /// Address of the lifeline server
    #[arg(long, default_value_t = format!("127.0.0.1:{}", DEFAULT_LIFELINE_PORT))]
    lifeline_addr: String,

    /// Question bank file
    #[arg(short, long, default_value = "data/questions.json")]
    questions: PathBuf,

    /// Listen backlog
    #[arg(long, default_value_t = 5)]
    backlog: u32,

    /// Socket read chunk size in bytes
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Longest accepted command line in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_FRAME_LEN)]
    max_frame_len: usize,

    /// Lifeline round trip timeout, 0 waits forever
    #[arg(long, default_value_t = 10)]
    lifeline_timeout_secs: u64,

    /// Pause before each question
    #[arg(long, default_value_t = 500)]
    question_delay_ms: u64,

    /// Pause between receiving and grading an answer
    #[arg(long, default_value_t = 500)]
    suspense_ms: u64,

    /// How often session counts are logged
    #[arg(long, default_value_t = 1000)]
    status_interval_ms: u64,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            listen_addr: format!("{}:{}", self.host, self.port),
            lifeline_addr: self.lifeline_addr,
            questions_path: self.questions,
            backlog: self.backlog,
            chunk_size: self.chunk_size,
            max_frame_len: self.max_frame_len,
            lifeline_timeout: (self.lifeline_timeout_secs > 0)
                .then(|| Duration::from_secs(self.lifeline_timeout_secs)),
            pacing: Pacing {
                question_delay: Duration::from_millis(self.question_delay_ms),
                suspense: Duration::from_millis(self.suspense_ms),
            },
            status_interval: Duration::from_millis(self.status_interval_ms),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Args::parse().into_config();
    let questions = load_questions(&config.questions_path)?;

    let server = SessionServer::bind(&config, questions).await?;
    info!("Lifeline server expected at {}", config.lifeline_addr);
    let status = spawn_status_reporter(server.counters(), config.status_interval);

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    status.abort();
    Ok(())
}
