//! Contestant listener: one task per accepted connection

use crate::config::ServerConfig;
use crate::connection::{run_session, SessionOptions};
use crate::counters::SessionCounters;
use crate::lifeline_client::LifelineClient;
use crate::question_bank::Question;
use crate::session::SessionState;
use log::{error, info, warn};
use shared::bind_listener;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Accepts contestants and runs each game in its own task
///
/// Sessions share only the read-only question bank, the lifeline client and
/// the counters. There is no table of sessions; each task owns its state.
pub struct SessionServer {
    listener: TcpListener,
    questions: Arc<[Question]>,
    lifelines: Arc<LifelineClient>,
    counters: Arc<SessionCounters>,
    options: SessionOptions,
}

impl SessionServer {
    pub async fn bind(config: &ServerConfig, questions: Arc<[Question]>) -> io::Result<Self> {
        let listener = bind_listener(&config.listen_addr, config.backlog).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let lifelines = LifelineClient::new(
            config.lifeline_addr.clone(),
            config.chunk_size,
            config.lifeline_timeout,
        );

        Ok(Self {
            listener,
            questions,
            lifelines: Arc::new(lifelines),
            counters: Arc::new(SessionCounters::new()),
            options: SessionOptions::from(config),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn counters(&self) -> Arc<SessionCounters> {
        Arc::clone(&self.counters)
    }

    /// Accept loop; only returns if the task is cancelled
    pub async fn run(self) -> io::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => self.spawn_session(stream, addr),
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }

    fn spawn_session(&self, stream: TcpStream, addr: SocketAddr) {
        let guard = self.counters.session_started();
        info!(
            "Contestant connected from {} ({} active)",
            addr,
            self.counters.active_sessions()
        );

        let questions = Arc::clone(&self.questions);
        let lifelines = Arc::clone(&self.lifelines);
        let options = self.options;

        let session = tokio::spawn(async move {
            let _guard = guard;
            run_session(stream, questions, lifelines, options).await
        });
        tokio::spawn(report_session(addr, session));
    }
}

/// Waits for a session task and logs how it ended, panics included
///
/// Returns `None` when the task did not run to completion.
pub async fn report_session(
    addr: SocketAddr,
    session: JoinHandle<SessionState>,
) -> Option<SessionState> {
    match session.await {
        Ok(SessionState::Disconnected) => {
            info!("Contestant {} disconnected", addr);
            Some(SessionState::Disconnected)
        }
        Ok(state) => {
            info!("Session with {} ended: {:?}", addr, state);
            Some(state)
        }
        Err(e) if e.is_panic() => {
            error!("Session with {} panicked: {}", addr, e);
            None
        }
        Err(e) => {
            warn!("Session with {} was cancelled: {}", addr, e);
            None
        }
    }
}
