// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! WebSocket server for real-time snapshot streaming

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use super::{Broadcaster, Subscription};

/// How long `serve` waits for open connections after shutdown
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// WebSocket server. Every accepted client becomes a [`Broadcaster`] subscriber
/// and receives each snapshot as one JSON text frame.
pub struct WebSocketServer {
    listener: TcpListener,
    max_clients: usize,
}

impl WebSocketServer {
    pub async fn bind(addr: &str, max_clients: usize) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("WebSocket server listening on ws://{}", listener.local_addr()?);
        Ok(Self { listener, max_clients })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept clients until `shutdown` fires, then wait up to [`DRAIN_TIMEOUT`]
    /// for connected clients to receive their close frame
    pub async fn serve(
        self,
        broadcaster: Broadcaster,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<()> {
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, addr)) => {
                            if broadcaster.subscriber_count() >= self.max_clients {
                                warn!("Max clients reached, rejecting connection from {}", addr);
                                continue;
                            }

                            connections.spawn(handle_connection(
                                stream,
                                addr,
                                broadcaster.clone(),
                                shutdown.resubscribe(),
                            ));
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
                _ = shutdown.recv() => {
                    info!("WebSocket server shutting down");
                    break;
                }
            }
        }

        let open = connections.len();
        let drained = tokio::time::timeout(DRAIN_TIMEOUT, async {
            while connections.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!("{} of {} WebSocket clients did not close in time", connections.len(), open);
            connections.shutdown().await;
        }

        Ok(())
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    broadcaster: Broadcaster,
    mut shutdown: broadcast::Receiver<()>,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            error!("WebSocket handshake failed for {}: {}", addr, e);
            return;
        }
    };

    let Subscription { id, mut rx } = broadcaster.subscribe();
    info!("New WebSocket connection from {} (id: {})", addr, id);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    loop {
        tokio::select! {
            msg = ws_receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        debug!("Received from {}: {}", addr, text);
                        if is_ping(&text) {
                            let pong = serde_json::json!({"type": "pong"});
                            let _ = ws_sender.send(Message::Text(pong.to_string())).await;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("WebSocket closed by client {}", addr);
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_sender.send(Message::Pong(data)).await;
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error from {}: {}", addr, e);
                        break;
                    }
                    None => break,
                    _ => {}
                }
            }

            payload = rx.recv() => {
                match payload {
                    Some(json) => {
                        if let Err(e) = ws_sender.send(Message::Text(json.to_string())).await {
                            warn!("Failed to send to {}: {}", addr, e);
                            break;
                        }
                    }
                    None => break,
                }
            }

            _ = shutdown.recv() => {
                let _ = ws_sender.send(Message::Close(None)).await;
                break;
            }
        }
    }

    broadcaster.unsubscribe(&id);
    info!("WebSocket client {} disconnected", addr);
}

fn is_ping(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(|t| t == "ping"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio_tungstenite::connect_async;

    async fn wait_for_subscribers(broadcaster: &Broadcaster, n: usize) {
        for _ in 0..200 {
            if broadcaster.subscriber_count() == n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {} subscribers, have {}", n, broadcaster.subscriber_count());
    }

    #[test]
    fn test_is_ping() {
        assert!(is_ping(r#"{"type":"ping"}"#));
        assert!(!is_ping(r#"{"type":"subscribe"}"#));
        assert!(!is_ping("ping"));
    }

    #[tokio::test]
    async fn test_end_to_end_delivery_and_shutdown() {
        let broadcaster = Broadcaster::new(4);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let server = WebSocketServer::bind("127.0.0.1:0", 8).await.unwrap();
        let addr = server.local_addr().unwrap();
        let serve = tokio::spawn(server.serve(broadcaster.clone(), shutdown_rx));

        let (mut client, _) = connect_async(format!("ws://{}", addr)).await.unwrap();
        wait_for_subscribers(&broadcaster, 1).await;

        let report = broadcaster.broadcast(Arc::from(r#"{"mine_id":"SMARTMINE_001"}"#));
        assert_eq!(report.delivered, 1);

        match client.next().await {
            Some(Ok(Message::Text(text))) => {
                let value: serde_json::Value = serde_json::from_str(&text).unwrap();
                assert_eq!(value["mine_id"], "SMARTMINE_001");
            }
            other => panic!("unexpected frame: {:?}", other),
        }

        client.send(Message::Text(r#"{"type":"ping"}"#.to_string())).await.unwrap();
        match client.next().await {
            Some(Ok(Message::Text(text))) => assert!(text.contains("pong")),
            other => panic!("unexpected frame: {:?}", other),
        }

        shutdown_tx.send(()).unwrap();
        serve.await.unwrap().unwrap();
        assert_eq!(broadcaster.subscriber_count(), 0);

        match client.next().await {
            Some(Ok(Message::Close(_))) => {}
            other => panic!("expected close, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_shutdown_closes_every_client_before_returning() {
        let broadcaster = Broadcaster::new(4);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let server = WebSocketServer::bind("127.0.0.1:0", 8).await.unwrap();
        let addr = server.local_addr().unwrap();
        let serve = tokio::spawn(server.serve(broadcaster.clone(), shutdown_rx));

        let mut clients = Vec::new();
        for _ in 0..3 {
            let (client, _) = connect_async(format!("ws://{}", addr)).await.unwrap();
            clients.push(client);
        }
        wait_for_subscribers(&broadcaster, 3).await;

        broadcaster.broadcast(Arc::from(r#"{"tick":1}"#));
        shutdown_tx.send(()).unwrap();
        serve.await.unwrap().unwrap();
        assert_eq!(broadcaster.subscriber_count(), 0);

        for mut client in clients {
            let mut closed = false;
            while let Some(frame) = client.next().await {
                match frame {
                    Ok(Message::Text(text)) => assert_eq!(text, r#"{"tick":1}"#),
                    Ok(Message::Close(_)) => {
                        closed = true;
                        break;
                    }
                    other => panic!("unexpected frame: {:?}", other),
                }
            }
            assert!(closed);
        }
    }

    #[tokio::test]
    async fn test_disconnect_unsubscribes() {
        let broadcaster = Broadcaster::new(4);
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let server = WebSocketServer::bind("127.0.0.1:0", 8).await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.serve(broadcaster.clone(), shutdown_rx));

        let (mut client, _) = connect_async(format!("ws://{}", addr)).await.unwrap();
        wait_for_subscribers(&broadcaster, 1).await;

        client.close(None).await.unwrap();
        wait_for_subscribers(&broadcaster, 0).await;
    }
}
