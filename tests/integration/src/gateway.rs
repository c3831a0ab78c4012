//! Mock gateway server and REST collaborator doubles

use async_trait::async_trait;
use ferrocord_client::{EndpointResolver, MessageSender, OutboundMessage, ResolverError};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

/// Resolver that always returns a fixed endpoint
pub struct StaticResolver {
    endpoint: String,
}

impl StaticResolver {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl EndpointResolver for StaticResolver {
    async fn resolve(&self, _token: &str) -> Result<String, ResolverError> {
        Ok(self.endpoint.clone())
    }
}

/// Sender that records every send and forwards it to the test
pub struct RecordingSender {
    tx: mpsc::UnboundedSender<(String, OutboundMessage)>,
}

impl RecordingSender {
    /// Create a sender plus the receiving end for assertions
    #[must_use]
    pub fn channel() -> (Arc<Self>, mpsc::UnboundedReceiver<(String, OutboundMessage)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, channel_id: &str, message: OutboundMessage) -> Option<Value> {
        self.tx.send((channel_id.to_string(), message)).ok();
        Some(serde_json::json!({"ok": true}))
    }
}

/// In-process gateway server accepting real WebSocket connections
pub struct MockGateway {
    listener: TcpListener,
    endpoint: String,
}

impl MockGateway {
    /// Bind on an ephemeral local port
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let endpoint = format!("ws://{}/", listener.local_addr()?);
        Ok(Self { listener, endpoint })
    }

    /// Endpoint URL for a [`StaticResolver`]
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Accept the next client connection
    pub async fn accept(&self) -> anyhow::Result<GatewayConn> {
        let (stream, _) = self.listener.accept().await?;
        let socket = tokio_tungstenite::accept_async(stream).await?;
        Ok(GatewayConn { socket })
    }
}

/// One accepted connection, driven frame by frame from the test
pub struct GatewayConn {
    socket: WebSocketStream<TcpStream>,
}

impl GatewayConn {
    /// Send a JSON frame to the client
    pub async fn send(&mut self, frame: Value) -> anyhow::Result<()> {
        self.socket.send(Message::Text(frame.to_string())).await?;
        Ok(())
    }

    /// Receive the next text frame from the client
    pub async fn recv(&mut self) -> anyhow::Result<Value> {
        while let Some(message) = self.socket.next().await {
            if let Message::Text(text) = message? {
                return Ok(serde_json::from_str(&text)?);
            }
        }
        anyhow::bail!("connection closed before a text frame arrived")
    }

    /// Receive frames until one with the given opcode arrives
    pub async fn recv_op(&mut self, op: u64) -> anyhow::Result<Value> {
        loop {
            let frame = self.recv().await?;
            if frame["op"] == op {
                return Ok(frame);
            }
        }
    }

    /// Close the connection
    pub async fn close(mut self) -> anyhow::Result<()> {
        self.socket.close(None).await?;
        Ok(())
    }
}
