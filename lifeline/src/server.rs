//! TCP front end for the resolver

use crate::resolver::handle_request;
use log::{debug, error, info, warn};
use shared::{
    bind_listener, write_message, LifelineRequest, LifelineResponse, MessageReader, WireError,
    DEFAULT_MAX_FRAME_LEN,
};
use std::io;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};

/// Pending connections the kernel queues for us
pub const DEFAULT_BACKLOG: u32 = 5;

pub struct LifelineServer {
    listener: TcpListener,
    chunk_size: usize,
    max_frame_len: usize,
}

impl LifelineServer {
    pub async fn bind(addr: &str, chunk_size: usize) -> io::Result<Self> {
        let listener = bind_listener(addr, DEFAULT_BACKLOG).await?;
        info!("Lifeline server listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            chunk_size,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        })
    }

    /// Longest request line accepted before the connection is dropped
    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts session servers forever, one task per connection
    pub async fn run(self) -> io::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    info!("Session server connected from {}", addr);
                    let (chunk_size, max_frame_len) = (self.chunk_size, self.max_frame_len);
                    tokio::spawn(async move {
                        match serve_connection(stream, chunk_size, max_frame_len).await {
                            Ok(()) => info!("Session server {} disconnected", addr),
                            Err(e) => error!("Lifeline connection {} failed: {}", addr, e),
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}

/// Answers requests on one connection until the peer hangs up
pub async fn serve_connection(
    stream: TcpStream,
    chunk_size: usize,
    max_frame_len: usize,
) -> Result<(), WireError> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = MessageReader::with_limits(read_half, chunk_size, max_frame_len);

    loop {
        let value = match reader.next_value().await {
            Ok(value) => value,
            Err(e) if e.is_disconnect() => return Ok(()),
            Err(e) => return Err(e),
        };

        let response = match serde_json::from_value::<LifelineRequest>(value) {
            Ok(request) => {
                debug!("Received request: {:?}", request);
                let mut rng = rand::thread_rng();
                handle_request(&mut rng, &request)
            }
            Err(e) => {
                warn!("Rejecting lifeline request: {}", e);
                LifelineResponse::Error {
                    message: "Invalid lifeline type".to_string(),
                }
            }
        };

        write_message(&mut write_half, &response).await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use shared::{LifelineKind, OptionLabel, Options};
    use tokio::io::AsyncWriteExt;

    async fn start() -> SocketAddr {
        let server = LifelineServer::bind("127.0.0.1:0", 64).await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());
        addr
    }

    fn options() -> Options {
        OptionLabel::ALL
            .iter()
            .zip(["1", "2", "3", "4"])
            .map(|(l, t)| (*l, t.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_answers_requests_in_order() {
        let addr = start().await;
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = MessageReader::new(read_half);

        for kind in [LifelineKind::AudiencePoll, LifelineKind::FiftyFifty] {
            let request = LifelineRequest {
                kind,
                correct_answer: OptionLabel::C,
                options: options(),
            };
            write_message(&mut write_half, &request).await.unwrap();

            let response: LifelineResponse = reader.read_message().await.unwrap();
            let result = response.into_result().unwrap();
            assert_eq!(result.kind(), kind);
        }
    }

    #[tokio::test]
    async fn test_pipelined_requests_get_one_reply_each() {
        let addr = start().await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        let request = serde_json::to_string(&LifelineRequest {
            kind: LifelineKind::FiftyFifty,
            correct_answer: OptionLabel::A,
            options: options(),
        })
        .unwrap();
        let batch = format!("{}\n{}\n{}\n", request, request, request);
        stream.write_all(batch.as_bytes()).await.unwrap();

        let mut reader = MessageReader::new(stream);
        for _ in 0..3 {
            let response: LifelineResponse = reader.read_message().await.unwrap();
            match response {
                LifelineResponse::FiftyFifty { remaining } => {
                    assert!(remaining.contains_key(&OptionLabel::A));
                    assert_eq!(remaining.len(), 2);
                }
                other => panic!("unexpected response {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_unknown_type_gets_error_and_connection_survives() {
        let addr = start().await;
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = MessageReader::new(read_half);

        let bogus = json!({"type": "phone-a-friend", "correct_answer": "A", "options": {}});
        write_message(&mut write_half, &bogus).await.unwrap();
        let reply: Value = reader.next_value().await.unwrap();
        assert_eq!(reply, json!({"type": "error", "message": "Invalid lifeline type"}));

        let request = LifelineRequest {
            kind: LifelineKind::AudiencePoll,
            correct_answer: OptionLabel::B,
            options: options(),
        };
        write_message(&mut write_half, &request).await.unwrap();
        let response: LifelineResponse = reader.read_message().await.unwrap();
        assert!(matches!(response, LifelineResponse::AudiencePoll { .. }));
    }

    #[tokio::test]
    async fn test_oversized_request_drops_only_that_connection() {
        let server = LifelineServer::bind("127.0.0.1:0", 64)
            .await
            .unwrap()
            .with_max_frame_len(256);
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());

        let mut flooder = TcpStream::connect(addr).await.unwrap();
        let junk = vec![b'x'; 4096];
        // The server may close before every byte is sent
        let _ = flooder.write_all(&junk).await;
        let mut reader = MessageReader::new(flooder);
        let err = tokio::time::timeout(std::time::Duration::from_secs(2), reader.next_value())
            .await
            .expect("server should close the flooding connection")
            .unwrap_err();
        assert!(err.is_disconnect());

        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = MessageReader::new(read_half);
        let request = LifelineRequest {
            kind: LifelineKind::FiftyFifty,
            correct_answer: OptionLabel::B,
            options: options(),
        };
        write_message(&mut write_half, &request).await.unwrap();
        let response: LifelineResponse = reader.read_message().await.unwrap();
        assert!(matches!(response, LifelineResponse::FiftyFifty { .. }));
    }

    #[tokio::test]
    async fn test_serves_connections_concurrently() {
        let addr = start().await;
        let idle = TcpStream::connect(addr).await.unwrap();

        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = MessageReader::new(read_half);
        let request = LifelineRequest {
            kind: LifelineKind::AudiencePoll,
            correct_answer: OptionLabel::D,
            options: options(),
        };
        write_message(&mut write_half, &request).await.unwrap();

        let response = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            reader.read_message::<LifelineResponse>(),
        )
        .await
        .expect("second connection should not wait for the first")
        .unwrap();
        assert!(matches!(response, LifelineResponse::AudiencePoll { .. }));
        drop(idle);
    }
}
