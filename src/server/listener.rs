// ────────────────────────────────
// src/server/listener.rs
// Low-level TCP bind kept separate so TLS termination could be swapped
// in without touching the accept loop.
// ────────────────────────────────
use anyhow::Result;
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub async fn bind_tcp(addr: SocketAddr) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr).await?;
    Ok(listener)
}
