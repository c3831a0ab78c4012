//! End-to-end tests driving the client against an in-process gateway

use ferrocord_client::{Client, ClientOptions, OutboundMessage, SessionState};
use integration_tests::{GatewayConn, MockGateway, RecordingSender, StaticResolver};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);
const RECONNECT_DELAY: Duration = Duration::from_millis(100);

struct TestClient {
    client: Arc<Client>,
    sends: mpsc::UnboundedReceiver<(String, OutboundMessage)>,
    ready: mpsc::UnboundedReceiver<Value>,
    login: JoinHandle<()>,
}

impl TestClient {
    /// Build a client against the mock gateway and start its login loop
    fn start(gateway: &MockGateway) -> Self {
        let (sender, sends) = RecordingSender::channel();
        let options = ClientOptions::default().with_reconnect_delay(RECONNECT_DELAY);

        let client = Arc::new(
            Client::with_collaborators(
                "test-token",
                options,
                Box::new(StaticResolver::new(gateway.endpoint())),
                sender,
            )
            .unwrap(),
        );

        let (ready_tx, ready) = mpsc::unbounded_channel();
        client.on("ready", move |user| {
            ready_tx.send(user.clone()).ok();
        });

        let login = tokio::spawn({
            let client = client.clone();
            async move { client.login().await }
        });

        Self { client, sends, ready, login }
    }
}

impl Drop for TestClient {
    fn drop(&mut self) {
        self.login.abort();
    }
}

/// Drive Hello -> Identify -> Ready and return the identify frame
async fn handshake(conn: &mut GatewayConn, heartbeat_interval_ms: u64) -> Value {
    conn.send(json!({"op": 10, "d": {"heartbeat_interval": heartbeat_interval_ms}}))
        .await
        .unwrap();

    let identify = timeout(WAIT, conn.recv_op(2)).await.unwrap().unwrap();

    conn.send(json!({
        "op": 0, "t": "READY", "s": 1,
        "d": {"session_id": "sess-1", "user": {"username": "bot", "discriminator": "0001"}}
    }))
    .await
    .unwrap();

    identify
}

#[tokio::test]
async fn handshake_reaches_ready_exactly_once() {
    let gateway = MockGateway::bind().await.unwrap();
    let mut test = TestClient::start(&gateway);

    let mut conn = timeout(WAIT, gateway.accept()).await.unwrap().unwrap();
    let identify = handshake(&mut conn, 50).await;

    assert_eq!(identify["d"]["token"], "test-token");
    assert_eq!(identify["d"]["intents"], 513);
    assert_eq!(identify["d"]["properties"]["browser"], "ferrocord");

    let user = timeout(WAIT, test.ready.recv()).await.unwrap().unwrap();
    assert_eq!(user["username"], "bot");
    assert_eq!(user["discriminator"], "0001");

    assert_eq!(test.client.state(), SessionState::Connected);
    assert_eq!(test.client.session_id().as_deref(), Some("sess-1"));

    // Scheduled heartbeats arrive carrying the sequence known at tick
    // time; once READY (s=1) is processed that is 1. A first tick racing
    // the READY frame may still carry null.
    let heartbeat = timeout(WAIT, async {
        loop {
            let frame = conn.recv_op(1).await.unwrap();
            if frame["d"] == 1 {
                break frame;
            }
            assert_eq!(frame["d"], Value::Null);
        }
    })
    .await
    .unwrap();
    assert_eq!(heartbeat["d"], 1);

    // No second ready emission.
    assert!(test.ready.try_recv().is_err());
}

#[tokio::test]
async fn heartbeat_request_is_answered_out_of_band() {
    let gateway = MockGateway::bind().await.unwrap();
    let test = TestClient::start(&gateway);

    let mut conn = timeout(WAIT, gateway.accept()).await.unwrap().unwrap();
    // Long interval so the only heartbeat is the requested one.
    handshake(&mut conn, 60_000).await;

    conn.send(json!({"op": 1, "d": null})).await.unwrap();

    let heartbeat = timeout(WAIT, conn.recv_op(1)).await.unwrap().unwrap();
    assert_eq!(heartbeat["d"], 1);

    drop(test);
}

#[tokio::test]
async fn close_triggers_one_delayed_reconnect() {
    let gateway = MockGateway::bind().await.unwrap();
    let test = TestClient::start(&gateway);

    let mut conn = timeout(WAIT, gateway.accept()).await.unwrap().unwrap();
    handshake(&mut conn, 60_000).await;

    let closed_at = tokio::time::Instant::now();
    conn.close().await.unwrap();

    // The client comes back, but only after the fixed delay.
    let mut conn = timeout(WAIT, gateway.accept()).await.unwrap().unwrap();
    assert!(closed_at.elapsed() >= RECONNECT_DELAY);

    // Session state was reset by the disconnect.
    assert!(test.client.session_id().is_none());

    // The new socket goes through the full handshake again.
    let identify = handshake(&mut conn, 60_000).await;
    assert_eq!(identify["op"], 2);
}

#[tokio::test]
async fn command_replies_to_originating_channel() {
    let gateway = MockGateway::bind().await.unwrap();
    let mut test = TestClient::start(&gateway);

    test.client.command("ping", |ctx| async move {
        let text = if ctx.args.is_empty() {
            "Pong!".to_string()
        } else {
            format!("Pong! {}", ctx.args.join(" "))
        };
        let _ = ctx.reply(text).await;
        Ok(())
    });

    let mut conn = timeout(WAIT, gateway.accept()).await.unwrap().unwrap();
    handshake(&mut conn, 60_000).await;

    conn.send(json!({
        "op": 0, "t": "MESSAGE_CREATE", "s": 2,
        "d": {"content": "!ping extra args", "channel_id": "chan-9"}
    }))
    .await
    .unwrap();

    let (channel, message) = timeout(WAIT, test.sends.recv()).await.unwrap().unwrap();
    assert_eq!(channel, "chan-9");
    assert_eq!(message, OutboundMessage::Text("Pong! extra args".to_string()));

    // Non-command content produces no outbound send.
    conn.send(json!({
        "op": 0, "t": "MESSAGE_CREATE", "s": 3,
        "d": {"content": "hello there", "channel_id": "chan-9"}
    }))
    .await
    .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(test.sends.try_recv().is_err());
}

#[tokio::test]
async fn message_create_reaches_listeners() {
    let gateway = MockGateway::bind().await.unwrap();
    let test = TestClient::start(&gateway);

    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    test.client.on("messageCreate", move |payload| {
        seen_tx.send(payload.clone()).ok();
    });

    let mut conn = timeout(WAIT, gateway.accept()).await.unwrap().unwrap();
    handshake(&mut conn, 60_000).await;

    conn.send(json!({
        "op": 0, "t": "MESSAGE_CREATE", "s": 2,
        "d": {"content": "hi", "channel_id": "c"}
    }))
    .await
    .unwrap();

    let payload = timeout(WAIT, seen_rx.recv()).await.unwrap().unwrap();
    assert_eq!(payload["content"], "hi");
}
