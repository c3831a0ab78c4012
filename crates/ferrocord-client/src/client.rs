//! Client facade
//!
//! Ties the session state machine to a real socket: resolves the endpoint,
//! drives the read loop, executes the state machine's actions, and cycles
//! through the fixed-delay reconnect policy on every close.

use crate::commands::{CommandContext, CommandRouter};
use crate::dispatch::{client_events, EventDispatcher};
use crate::error::ClientError;
use crate::heartbeat::HeartbeatScheduler;
use crate::options::ClientOptions;
use crate::resolver::{EndpointResolver, RestEndpointResolver};
use crate::rest::{MessageSender, OutboundMessage, RestSender};
use crate::session::{Action, Session, SessionShared, SessionState};
use ferrocord_protocol::{GatewayFrame, IdentifyPayload};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A gateway client: one long-lived session plus its dispatch layer
///
/// Construct with [`Client::new`], register listeners and commands, then
/// call [`Client::login`]. The login loop never gives up: every failure is
/// retried after the configured fixed delay, indefinitely.
pub struct Client {
    token: String,
    options: ClientOptions,
    shared: Arc<SessionShared>,
    session: Session,
    heartbeat: HeartbeatScheduler,
    dispatcher: EventDispatcher,
    commands: CommandRouter,
    resolver: Box<dyn EndpointResolver>,
    sender: Arc<dyn MessageSender>,
}

impl Client {
    /// Create a client with the production REST collaborators
    pub fn new(token: impl Into<String>, options: ClientOptions) -> Result<Self, ClientError> {
        let token = token.into();
        let resolver = Box::new(RestEndpointResolver::new(options.api_base.clone()));
        let sender = Arc::new(RestSender::new(options.api_base.clone(), token.clone()));
        Self::with_collaborators(token, options, resolver, sender)
    }

    /// Create a client with explicit collaborators
    ///
    /// The seam the tests use to run the session core against in-process
    /// endpoints.
    pub fn with_collaborators(
        token: impl Into<String>,
        options: ClientOptions,
        resolver: Box<dyn EndpointResolver>,
        sender: Arc<dyn MessageSender>,
    ) -> Result<Self, ClientError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ClientError::MissingToken);
        }

        let shared = SessionShared::new();

        Ok(Self {
            session: Session::new(shared.clone()),
            heartbeat: HeartbeatScheduler::new(),
            dispatcher: EventDispatcher::new(),
            commands: CommandRouter::new(options.prefix.clone()),
            resolver,
            sender,
            token,
            options,
            shared,
        })
    }

    /// Register an event listener; multiple listeners per event run in
    /// registration order
    pub fn on(&self, event: &str, listener: impl Fn(&Value) + Send + Sync + 'static) {
        self.dispatcher.on(event, listener);
    }

    /// Register a command handler
    pub fn command<F, Fut>(&self, name: &str, handler: F)
    where
        F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.commands.register(name, handler);
    }

    /// Current session lifecycle state
    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// Session identifier, once the handshake has completed
    pub fn session_id(&self) -> Option<String> {
        self.shared.session_id()
    }

    /// Post a message to a channel over the REST API
    ///
    /// Returns the response body, or `None` if the send failed (the
    /// failure is logged, never raised).
    pub async fn send_message(
        &self,
        channel_id: &str,
        content: impl Into<OutboundMessage>,
    ) -> Option<Value> {
        self.sender.send(channel_id, content.into()).await
    }

    /// Connect and run the session until the task is cancelled
    ///
    /// Every connection-setup failure and every socket close leads back
    /// here after the fixed reconnect delay. Retries are unbounded by
    /// design; this is a long-running daemon that never gives up.
    pub async fn login(&self) {
        loop {
            self.shared.set_state(SessionState::Connecting);

            match self.resolver.resolve(&self.token).await {
                Ok(endpoint) => match connect_async(endpoint.as_str()).await {
                    Ok((socket, _response)) => {
                        tracing::info!("Connected to gateway");
                        self.shared.set_state(SessionState::AwaitingHello);
                        self.run_connection(socket).await;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Gateway connection failed");
                    }
                },
                Err(e) => {
                    tracing::error!(error = %e, "Endpoint resolution failed");
                }
            }

            // Heartbeat first, so no tick can fire against the dead socket.
            self.heartbeat.stop();
            self.shared.reset();

            let delay = self.options.reconnect_delay;
            tracing::warn!(delay_ms = delay.as_millis() as u64, "Reconnecting after delay");
            tokio::time::sleep(delay).await;

            self.shared.set_state(SessionState::Reconnecting);
        }
    }

    /// Drive one socket until it closes or errors
    async fn run_connection(&self, socket: WsStream) {
        let (sink, mut stream) = socket.split();
        let (writer_tx, mut writer_rx) = mpsc::unbounded_channel::<GatewayFrame>();

        // Writer task owns the sink half; the session and the heartbeat
        // scheduler only ever enqueue frames.
        let writer = tokio::spawn(async move {
            let mut sink = sink;
            while let Some(frame) = writer_rx.recv().await {
                let text = match frame.to_json() {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::trace!(error = %e, "Skipping unserializable frame");
                        continue;
                    }
                };
                if sink.send(Message::Text(text)).await.is_err() {
                    // Socket closed under us; remaining frames are dropped
                    // silently.
                    break;
                }
            }
        });

        while let Some(inbound) = stream.next().await {
            match inbound {
                Ok(Message::Text(text)) => {
                    let Ok(frame) = GatewayFrame::from_json(&text) else {
                        // Malformed frames are expected noise, not errors.
                        tracing::trace!("Dropping malformed frame");
                        continue;
                    };
                    self.execute(self.session.handle_frame(&frame), &writer_tx);
                }
                Ok(Message::Close(close)) => {
                    tracing::warn!(close = ?close, "Gateway closed the connection");
                    break;
                }
                Ok(_) => {
                    // Ping/pong are answered by the transport; binary frames
                    // are not part of the json encoding.
                }
                Err(e) => {
                    tracing::error!(error = %e, "Socket error");
                    break;
                }
            }
        }

        writer.abort();
    }

    /// Execute the side effects of one frame, in order
    fn execute(&self, actions: Vec<Action>, writer: &mpsc::UnboundedSender<GatewayFrame>) {
        for action in actions {
            match action {
                Action::StartHeartbeat(interval) => {
                    self.heartbeat
                        .start(interval, self.shared.clone(), writer.clone());
                }
                Action::SendIdentify => {
                    let payload = IdentifyPayload {
                        token: self.token.clone(),
                        intents: self.options.intents,
                        properties: self.options.properties.clone(),
                    };
                    if writer.send(GatewayFrame::identify(&payload)).is_ok() {
                        tracing::info!("Sent identify");
                    }
                }
                Action::SendHeartbeat => {
                    let _ = writer.send(GatewayFrame::heartbeat(self.shared.sequence()));
                }
                Action::EmitReady(user) => {
                    let payload = serde_json::to_value(&user).unwrap_or(Value::Null);
                    self.dispatcher.emit(client_events::READY, &payload);
                }
                Action::EmitEvent { name, data } => {
                    self.dispatcher.emit(&name, &data);
                }
                Action::DispatchCommand(message) => {
                    self.commands.dispatch(message, self.sender.clone());
                }
            }
        }
    }
}
