// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Streaming module - subscriber fan-out and WebSocket transport

mod broadcast;
mod websocket;

pub use broadcast::{BroadcastReport, Broadcaster, Subscription};
pub use websocket::WebSocketServer;

use serde::{Deserialize, Serialize};

/// Streaming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Enable WebSocket server
    pub websocket_enabled: bool,
    pub websocket_host: String,
    pub websocket_port: u16,
    pub websocket_max_clients: usize,

    /// Snapshots buffered per subscriber before it starts dropping
    pub subscriber_buffer: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            websocket_enabled: true,
            websocket_host: "0.0.0.0".to_string(),
            websocket_port: 8765,
            websocket_max_clients: 64,
            subscriber_buffer: 4,
        }
    }
}

impl StreamingConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.websocket_host, self.websocket_port)
    }
}
