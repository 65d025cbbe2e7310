//! Session-side client for the lifeline server
//!
//! All sessions share one persistent connection. The connection mutex is held
//! for the whole request/response round trip so replies can never be handed
//! to the wrong session.

use log::{debug, info, warn};
use shared::{
    write_message, LifelineKind, LifelineRequest, LifelineResponse, LifelineResult, MessageReader,
    OptionLabel, Options, WireError,
};
use std::future::Future;
use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Error)]
pub enum LifelineError {
    #[error("cannot reach lifeline server at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("lifeline exchange failed: {0}")]
    Wire(#[from] WireError),
    #[error("lifeline server did not answer within {0:?}")]
    Timeout(Duration),
    #[error("lifeline server rejected the request: {0}")]
    Rejected(String),
    #[error("asked for {requested} but the lifeline server answered {received}")]
    Mismatch {
        requested: LifelineKind,
        received: LifelineKind,
    },
}

struct ResolverConnection {
    reader: MessageReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl ResolverConnection {
    async fn round_trip(&mut self, request: &LifelineRequest) -> Result<LifelineResponse, WireError> {
        write_message(&mut self.writer, request).await?;
        self.reader.read_message().await
    }
}

pub struct LifelineClient {
    addr: String,
    chunk_size: usize,
    timeout: Option<Duration>,
    connection: Mutex<Option<ResolverConnection>>,
}

impl LifelineClient {
    /// Creates a client; no connection is made until the first request
    pub fn new(addr: impl Into<String>, chunk_size: usize, timeout: Option<Duration>) -> Self {
        Self {
            addr: addr.into(),
            chunk_size,
            timeout,
            connection: Mutex::new(None),
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    async fn connect(&self) -> Result<ResolverConnection, LifelineError> {
        let stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|source| LifelineError::Connect {
                addr: self.addr.clone(),
                source,
            })?;
        info!("Connected to lifeline server at {}", self.addr);

        let (read_half, writer) = stream.into_split();
        Ok(ResolverConnection {
            reader: MessageReader::with_chunk_size(read_half, self.chunk_size),
            writer,
        })
    }

    /// Asks the lifeline server to resolve `kind` for one question
    ///
    /// A connection that fails mid-exchange is discarded. If it was a reused
    /// connection the request is retried once on a fresh one, since the server
    /// may simply have restarted. The timeout is one deadline for the whole
    /// call, covering any connect and the retry.
    pub async fn resolve(
        &self,
        kind: LifelineKind,
        correct_answer: OptionLabel,
        options: &Options,
    ) -> Result<LifelineResult, LifelineError> {
        let request = LifelineRequest {
            kind,
            correct_answer,
            options: options.clone(),
        };

        let mut guard = self.connection.lock().await;
        let deadline = self.timeout.map(|limit| (limit, Instant::now() + limit));

        let response = loop {
            let reused = guard.is_some();
            let connection = match guard.as_mut() {
                Some(connection) => connection,
                None => guard.insert(within(deadline, self.connect()).await?),
            };

            let exchange = async {
                connection
                    .round_trip(&request)
                    .await
                    .map_err(LifelineError::from)
            };
            match within(deadline, exchange).await {
                Ok(response) => break response,
                Err(e) => {
                    *guard = None;
                    match e {
                        LifelineError::Wire(ref wire) if reused && wire.is_disconnect() => {
                            debug!("Stale lifeline connection ({}), reconnecting", wire);
                        }
                        other => return Err(other),
                    }
                }
            }
        };

        let result = response.into_result().map_err(LifelineError::Rejected)?;
        if result.kind() != kind {
            warn!("Lifeline server answered {} to a {} request", result.kind(), kind);
            return Err(LifelineError::Mismatch {
                requested: kind,
                received: result.kind(),
            });
        }
        Ok(result)
    }
}

async fn within<T, F>(deadline: Option<(Duration, Instant)>, step: F) -> Result<T, LifelineError>
where
    F: Future<Output = Result<T, LifelineError>>,
{
    match deadline {
        Some((limit, at)) => tokio::time::timeout_at(at, step)
            .await
            .map_err(|_| LifelineError::Timeout(limit))?,
        None => step.await,
    }
}
