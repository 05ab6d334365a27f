//! Local status endpoint for ipv6notify
//!
//! A lightweight HTTP listener answering `GET /getip` with the currently
//! discoverable address. Every request performs a fresh resolver run; nothing
//! is cached and nothing is shared with the publish loop.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tracing::{error, info};

use crate::metrics::gather_metrics;
use crate::resolver::AddressSource;

//==============================================================================
// Types
//==============================================================================

#[derive(Debug, Serialize)]
struct AddressResponse {
    ipv6: String,
}

/// Handle to the running status server
pub struct StatusServer {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

//==============================================================================
// Implementation
//==============================================================================

impl StatusServer {
    /// Binds the listener and spawns the accept loop.
    ///
    /// A bind failure is returned to the caller; the publish loop is expected
    /// to continue without the endpoint.
    pub async fn start(addr: SocketAddr, resolver: Arc<dyn AddressSource>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("status server listening on {}", local_addr);

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    accept = listener.accept() => {
                        match accept {
                            Ok((socket, _peer)) => {
                                let resolver = Arc::clone(&resolver);
                                tokio::spawn(async move {
                                    handle_connection(socket, resolver).await;
                                });
                            }
                            Err(e) => {
                                error!("status listener accept error: {}", e);
                            }
                        }
                    }
                }
            }
        });

        Ok(Self {
            local_addr,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Address the listener actually bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops the accept loop
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

//==============================================================================
// Helpers
//==============================================================================

async fn handle_connection(mut socket: TcpStream, resolver: Arc<dyn AddressSource>) {
    let mut buf = [0u8; 1024];
    let n = match socket.read(&mut buf).await {
        Ok(n) => n,
        Err(_) => return,
    };

    let request = String::from_utf8_lossy(&buf[..n]);
    let mut request_line = request.lines().next().unwrap_or("").split_whitespace();
    let method = request_line.next().unwrap_or("");
    let path = request_line.next().unwrap_or("");
    let path = path.split('?').next().unwrap_or(path);

    let (status_line, content_type, body) = match (method, path) {
        ("GET", "/getip") => match resolver.find_public_ipv6() {
            Ok(Some(address)) => {
                let body = serde_json::to_string(&AddressResponse { ipv6: address })
                    .unwrap_or_else(|_| "{}".to_string());
                ("200 OK", "application/json", body)
            }
            Ok(None) => (
                "404 Not Found",
                "text/plain; charset=utf-8",
                "no global IPv6 address found".to_string(),
            ),
            Err(e) => (
                "500 Internal Server Error",
                "text/plain; charset=utf-8",
                format!("interface enumeration failed: {e:#}"),
            ),
        },
        ("GET", "/metrics") => (
            "200 OK",
            "text/plain; version=0.0.4",
            gather_metrics(),
        ),
        _ => (
            "404 Not Found",
            "text/plain; charset=utf-8",
            "not found".to_string(),
        ),
    };

    let reply = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        content_type,
        body.len(),
        body
    );

    if let Err(e) = socket.write_all(reply.as_bytes()).await {
        error!("status response write failed: {}", e);
    }
    let _ = socket.shutdown().await;
}

//==============================================================================
// Tests
//==============================================================================
