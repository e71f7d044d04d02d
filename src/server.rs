use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::db::Db;
use crate::error::Result;
use crate::protocol::{Command, Frame, FrameError, Parser};

/// Initial read buffer size per connection
const READ_BUFFER_SIZE: usize = 8 * 1024;

/// TCP server
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    db: Db,
}

impl Server {
    /// Create and bind TCP server to specified address
    pub async fn bind(addr: &str, db: Db) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("TCP server bound to {}", local_addr);

        Ok(Self {
            listener,
            local_addr,
            db,
        })
    }

    /// Get local listening address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Handle a single client connection
    async fn handle_connection(
        self: Arc<Self>,
        mut stream: TcpStream,
        peer_addr: SocketAddr,
    ) -> std::io::Result<()> {
        let mut buffer = BytesMut::with_capacity(READ_BUFFER_SIZE);

        loop {
            // Answer every complete request already buffered
            loop {
                match Parser::parse(&buffer) {
                    Ok((frame, consumed)) => {
                        buffer.advance(consumed);
                        debug!("Received command from {}: {:?}", peer_addr, frame);

                        let response = Command::execute(frame, &self.db);
                        stream.write_all(&response.encode()).await?;
                    }
                    Err(FrameError::Incomplete) => break,
                    Err(e) => {
                        warn!("Malformed request from {}: {}", peer_addr, e);
                        let reply = Frame::error(format!("ERR {}", e));
                        stream.write_all(&reply.encode()).await?;
                        return Ok(());
                    }
                }
            }

            if stream.read_buf(&mut buffer).await? == 0 {
                if buffer.is_empty() {
                    info!("Connection closed by client: {}", peer_addr);
                } else {
                    warn!(
                        "Connection from {} closed with {} unparsed bytes",
                        peer_addr,
                        buffer.len()
                    );
                }
                return Ok(());
            }
        }
    }

    /// Accept and process connections until `shutdown` completes
    pub async fn run(self: Arc<Self>, shutdown: impl Future<Output = ()>) {
        info!("Server started, listening on {}", self.local_addr);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer_addr)) => {
                        info!("New connection accepted from {}", peer_addr);

                        let server = Arc::clone(&self);
                        tokio::spawn(async move {
                            if let Err(e) = server.handle_connection(stream, peer_addr).await {
                                error!("Error handling connection from {}: {}", peer_addr, e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                    }
                },
                _ = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting connections");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;
    use tokio::task::JoinHandle;

    async fn start() -> (SocketAddr, Db, oneshot::Sender<()>, JoinHandle<()>) {
        let db = Db::default();
        let server = Arc::new(Server::bind("127.0.0.1:0", db.clone()).await.unwrap());
        let addr = server.local_addr();
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.run(async {
            let _ = rx.await;
        }));
        (addr, db, tx, handle)
    }

    fn request(parts: &[&str]) -> Frame {
        Frame::Array(Some(
            parts
                .iter()
                .map(|p| Frame::bulk(p.as_bytes().to_vec()))
                .collect(),
        ))
    }

    async fn read_frame(stream: &mut TcpStream, buffer: &mut BytesMut) -> Frame {
        loop {
            if let Ok((frame, consumed)) = Parser::parse(&buffer[..]) {
                buffer.advance(consumed);
                return frame;
            }
            let n = stream.read_buf(buffer).await.unwrap();
            assert!(n > 0, "server closed the connection");
        }
    }

    async fn call(stream: &mut TcpStream, parts: &[&str]) -> Frame {
        stream.write_all(&request(parts).encode()).await.unwrap();
        let mut buffer = BytesMut::new();
        read_frame(stream, &mut buffer).await
    }

    #[tokio::test]
    async fn test_roundtrip_over_tcp() {
        let (addr, db, tx, handle) = start().await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        assert_eq!(call(&mut stream, &["PING"]).await, Frame::Simple("PONG".to_string()));
        assert_eq!(call(&mut stream, &["ADD", "a", "1"]).await, Frame::Integer(1));
        assert_eq!(call(&mut stream, &["ADD", "a", "2"]).await, Frame::Integer(0));
        assert_eq!(call(&mut stream, &["GET", "a"]).await, Frame::bulk("1"));
        assert_eq!(call(&mut stream, &["UPDATE", "b", "x"]).await, Frame::Integer(1));
        assert_eq!(call(&mut stream, &["EXISTS", "b"]).await, Frame::Integer(1));
        assert_eq!(call(&mut stream, &["DELETE", "a"]).await, Frame::Integer(1));
        assert_eq!(call(&mut stream, &["DELETE", "a"]).await, Frame::Integer(0));

        match call(&mut stream, &["LOG"]).await {
            Frame::Bulk(Some(text)) => {
                let text = String::from_utf8(text.to_vec()).unwrap();
                assert_eq!(text.lines().count(), 7);
            }
            other => panic!("Expected bulk, got {:?}", other),
        }
        assert_eq!(db.store().len(), 1);

        tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_pipelined_requests() {
        let (addr, _db, tx, handle) = start().await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        let mut out = BytesMut::new();
        request(&["ADD", "k", "v"]).encode_into(&mut out);
        request(&["GET", "k"]).encode_into(&mut out);
        stream.write_all(&out).await.unwrap();

        let mut buffer = BytesMut::new();
        assert_eq!(read_frame(&mut stream, &mut buffer).await, Frame::Integer(1));
        assert_eq!(read_frame(&mut stream, &mut buffer).await, Frame::bulk("v"));

        tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_request_closes_connection() {
        let (addr, _db, tx, handle) = start().await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        stream.write_all(b"?garbage\r\n").await.unwrap();
        let mut buffer = BytesMut::new();
        match read_frame(&mut stream, &mut buffer).await {
            Frame::Error(msg) => assert!(msg.starts_with("ERR protocol error")),
            other => panic!("Expected error, got {:?}", other),
        }
        assert_eq!(stream.read_buf(&mut buffer).await.unwrap(), 0);

        tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_deeply_nested_request_rejected() {
        let (addr, _db, tx, handle) = start().await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        stream.write_all(&b"*1\r\n".repeat(64)).await.unwrap();
        let mut buffer = BytesMut::new();
        match read_frame(&mut stream, &mut buffer).await {
            Frame::Error(msg) => assert!(msg.starts_with("ERR protocol error")),
            other => panic!("Expected error, got {:?}", other),
        }

        tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_clients_add_same_key() {
        const CLIENTS: usize = 16;
        let (addr, db, tx, handle) = start().await;

        let tasks: Vec<_> = (0..CLIENTS)
            .map(|i| {
                tokio::spawn(async move {
                    let mut stream = TcpStream::connect(addr).await.unwrap();
                    let value = format!("v{}", i);
                    let reply = call(&mut stream, &["ADD", "shared", value.as_str()]).await;
                    (value, reply)
                })
            })
            .collect();

        let mut winners = Vec::new();
        for task in tasks {
            let (value, reply) = task.await.unwrap();
            if reply == Frame::Integer(1) {
                winners.push(value);
            } else {
                assert_eq!(reply, Frame::Integer(0));
            }
        }

        assert_eq!(winners.len(), 1);
        assert_eq!(db.store().get("shared").unwrap().value(), winners[0]);
        assert_eq!(db.audit().records().len(), CLIENTS);

        tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
