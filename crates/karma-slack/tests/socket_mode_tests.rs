use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header::AUTHORIZATION, HeaderMap},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use karma_core::InboundEvent;
use karma_slack::{AppToken, BotToken, SlackClient, SlackError, SocketModeClient};

const APP_TOKEN: &str = "xapp-1-A111-test";
const BOT_TOKEN: &str = "xoxb-111-test";

/// A fake Slack: Web API endpoints plus a Socket Mode WebSocket.
#[derive(Clone)]
struct FakeSlack {
    socket_url: String,
    acks: mpsc::UnboundedSender<String>,
    connections: Arc<AtomicUsize>,
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

async fn auth_test(headers: HeaderMap) -> Json<Value> {
    if bearer(&headers) == Some(BOT_TOKEN) {
        Json(json!({
            "ok": true,
            "url": "https://example.slack.com/",
            "team": "Example",
            "team_id": "T111",
            "user": "karmabot",
            "user_id": "U0BOT",
            "bot_id": "B111"
        }))
    } else {
        Json(json!({ "ok": false, "error": "invalid_auth" }))
    }
}

async fn connections_open(State(slack): State<FakeSlack>, headers: HeaderMap) -> Json<Value> {
    if bearer(&headers) == Some(APP_TOKEN) {
        Json(json!({ "ok": true, "url": slack.socket_url }))
    } else {
        Json(json!({ "ok": false, "error": "invalid_auth" }))
    }
}

async fn socket(ws: WebSocketUpgrade, State(slack): State<FakeSlack>) -> Response {
    ws.on_upgrade(move |socket| session(socket, slack))
}

fn message_envelope(envelope_id: &str, user_id: &str, text: &str) -> String {
    json!({
        "envelope_id": envelope_id,
        "type": "events_api",
        "accepts_response_payload": false,
        "payload": {
            "type": "event_callback",
            "event": {
                "type": "message",
                "blocks": [{
                    "type": "rich_text",
                    "elements": [{
                        "type": "rich_text_section",
                        "elements": [
                            { "type": "user", "user_id": user_id },
                            { "type": "text", "text": text }
                        ]
                    }]
                }]
            }
        }
    })
    .to_string()
}

/// The first session delivers one event and then asks the client to
/// reconnect; later sessions deliver one event each.
async fn session(mut socket: WebSocket, slack: FakeSlack) {
    let n = slack.connections.fetch_add(1, Ordering::SeqCst);

    let mut frames = vec![
        r#"{"type":"hello","num_connections":1}"#.to_string(),
        "this is not json".to_string(),
        format!(r#"{{"envelope_id":"bad{}","type":"events_api"}}"#, n + 1),
        message_envelope(&format!("e{}", n + 1), "U123", "++"),
    ];
    if n == 0 {
        frames.push(r#"{"type":"disconnect","reason":"refresh_requested"}"#.to_string());
    }

    for frame in frames {
        if socket.send(Message::Text(frame.into())).await.is_err() {
            return;
        }
    }

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                let _ = slack.acks.send(text.as_str().to_string());
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}

async fn start_fake_slack() -> (String, mpsc::UnboundedReceiver<String>, Arc<AtomicUsize>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (acks_tx, acks_rx) = mpsc::unbounded_channel();
    let connections = Arc::new(AtomicUsize::new(0));
    let state = FakeSlack {
        socket_url: format!("ws://{}/socket", addr),
        acks: acks_tx,
        connections: connections.clone(),
    };

    let app = Router::new()
        .route("/auth.test", post(auth_test))
        .route("/apps.connections.open", post(connections_open))
        .route("/socket", get(socket))
        .with_state(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), acks_rx, connections)
}

fn client(api_url: &str, app_token: &str) -> SlackClient {
    SlackClient::new(
        api_url,
        AppToken::parse(app_token).unwrap(),
        BotToken::parse(BOT_TOKEN).unwrap(),
    )
}

// ============================================================================
// Web API tests
// ============================================================================

#[tokio::test]
async fn test_auth_test_returns_identity() {
    let (api_url, _acks, _) = start_fake_slack().await;

    let identity = client(&api_url, APP_TOKEN).auth_test().await.unwrap();

    assert_eq!(identity.team.as_deref(), Some("Example"));
    assert_eq!(identity.user_id.as_deref(), Some("U0BOT"));
}

#[tokio::test]
async fn test_auth_test_rejected() {
    let (api_url, _acks, _) = start_fake_slack().await;

    let api = SlackClient::new(
        &api_url,
        AppToken::parse(APP_TOKEN).unwrap(),
        BotToken::parse("xoxb-wrong").unwrap(),
    );

    match api.auth_test().await {
        Err(SlackError::Api { method, error }) => {
            assert_eq!(method, "auth.test");
            assert_eq!(error, "invalid_auth");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_open_connection() {
    let (api_url, _acks, _) = start_fake_slack().await;

    let url = client(&api_url, APP_TOKEN).open_connection().await.unwrap();
    assert!(url.starts_with("ws://127.0.0.1:"));
    assert!(url.ends_with("/socket"));
}

// ============================================================================
// Socket Mode tests
// ============================================================================

#[tokio::test]
async fn test_socket_mode_forwards_acks_and_reconnects() {
    let (api_url, mut acks, connections) = start_fake_slack().await;

    let socket = SocketModeClient::new(client(&api_url, APP_TOKEN));
    let (tx, mut rx) = mpsc::channel(8);
    let shutdown = CancellationToken::new();

    let run = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { socket.run(tx, shutdown).await }
    });

    // One event per session, in order, across the reconnect
    for _ in 0..2 {
        let event = timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, InboundEvent::EventsApi { .. }));
        assert_eq!(event.inner_event_type(), Some("message"));
    }

    let mut received = Vec::new();
    for _ in 0..4 {
        let ack = timeout(Duration::from_secs(5), acks.recv()).await.unwrap();
        received.push(ack.unwrap());
    }
    received.sort();
    assert_eq!(
        received,
        vec![
            r#"{"envelope_id":"bad1"}"#.to_string(),
            r#"{"envelope_id":"bad2"}"#.to_string(),
            r#"{"envelope_id":"e1"}"#.to_string(),
            r#"{"envelope_id":"e2"}"#.to_string(),
        ]
    );
    assert_eq!(connections.load(Ordering::SeqCst), 2);

    shutdown.cancel();
    let result = timeout(Duration::from_secs(5), run).await.unwrap().unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_socket_mode_stops_when_receiver_dropped() {
    let (api_url, _acks, _) = start_fake_slack().await;

    let socket = SocketModeClient::new(client(&api_url, APP_TOKEN));
    let (tx, rx) = mpsc::channel(1);
    drop(rx);

    let result = timeout(
        Duration::from_secs(5),
        socket.run(tx, CancellationToken::new()),
    )
    .await
    .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_socket_mode_fails_when_connection_refused() {
    let (api_url, _acks, _) = start_fake_slack().await;

    let socket = SocketModeClient::new(client(&api_url, "xapp-1-revoked"));
    let (tx, _rx) = mpsc::channel(1);

    let result = timeout(
        Duration::from_secs(5),
        socket.run(tx, CancellationToken::new()),
    )
    .await
    .unwrap();
    assert!(matches!(result, Err(SlackError::Api { .. })));
}
