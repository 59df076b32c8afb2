//! Integration tests for the web chat channel.
//!
//! Each test spins up the web router on a random port with a running support
//! desk behind it, connects via tokio-tungstenite, and exercises the real
//! WebSocket contract.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use garment_assist::channels::{ChannelManager, WebChannel};
use garment_assist::config::DeskConfig;
use garment_assist::desk::SupportDesk;
use garment_assist::responder::{ResponseMatcher, faq};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Start the web channel and a desk on a random port, return the port.
async fn start_server() -> u16 {
    let matcher = ResponseMatcher::default();
    let web = WebChannel::new(matcher.clone());
    let app = web.router();

    let mut channels = ChannelManager::new();
    channels.add(Box::new(web));
    let config = DeskConfig {
        cli_enabled: false,
        ..DeskConfig::default()
    };
    let desk = SupportDesk::new(config, matcher, channels);
    tokio::spawn(async move {
        desk.run().await.unwrap();
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    port
}

fn chat_frame(content: &str, thread_id: Option<&str>) -> Message {
    let json = serde_json::json!({
        "type": "message",
        "content": content,
        "thread_id": thread_id,
    });
    Message::Text(json.to_string().into())
}

/// Parse a WS text frame into a serde_json::Value.
fn parse_ws_json(msg: &Message) -> Value {
    match msg {
        Message::Text(txt) => serde_json::from_str(txt).expect("invalid JSON from server"),
        other => panic!("expected Text frame, got {:?}", other),
    }
}

#[tokio::test]
async fn ws_question_gets_answer_in_same_thread() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server().await;
        let (mut ws, _) = connect_async(format!("ws://127.0.0.1:{port}/ws/chat"))
            .await
            .expect("WS connect failed");

        ws.send(chat_frame("What is the MOQ?", Some("t1"))).await.unwrap();

        let json = parse_ws_json(&ws.next().await.unwrap().unwrap());
        assert_eq!(json["type"], "response");
        assert_eq!(json["content"], faq::MINIMUM_ORDER);
        assert_eq!(json["thread_id"], "t1");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ws_unmatched_question_gets_fallback_with_line_breaks() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server().await;
        let (mut ws, _) = connect_async(format!("ws://127.0.0.1:{port}/ws/chat"))
            .await
            .unwrap();

        ws.send(chat_frame("asdkfjalksdjf", None)).await.unwrap();

        let json = parse_ws_json(&ws.next().await.unwrap().unwrap());
        assert_eq!(json["content"], faq::FALLBACK);
        assert!(json["content"].as_str().unwrap().contains("\n• Contact info\n"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ws_invalid_json_gets_error_frame() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server().await;
        let (mut ws, _) = connect_async(format!("ws://127.0.0.1:{port}/ws/chat"))
            .await
            .unwrap();

        ws.send(Message::Text("not json".into())).await.unwrap();

        let json = parse_ws_json(&ws.next().await.unwrap().unwrap());
        assert_eq!(json["type"], "error");
        assert!(json["message"].as_str().unwrap().starts_with("invalid message"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ws_answers_only_reach_the_asking_client() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server().await;
        let url = format!("ws://127.0.0.1:{port}/ws/chat");
        let (mut asker, _) = connect_async(url.as_str()).await.unwrap();
        let (mut bystander, _) = connect_async(url.as_str()).await.unwrap();

        asker.send(chat_frame("payment options?", None)).await.unwrap();

        let json = parse_ws_json(&asker.next().await.unwrap().unwrap());
        assert_eq!(json["content"], faq::PAYMENT);

        let nothing = timeout(Duration::from_millis(200), bystander.next()).await;
        assert!(nothing.is_err(), "bystander should not receive another client's answer");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ws_history_reflects_connection_session() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server().await;
        let (mut ws, _) = connect_async(format!("ws://127.0.0.1:{port}/ws/chat"))
            .await
            .unwrap();

        ws.send(chat_frame("thanks!", None)).await.unwrap();
        let _ = ws.next().await.unwrap().unwrap();

        ws.send(chat_frame("/history", None)).await.unwrap();
        let json = parse_ws_json(&ws.next().await.unwrap().unwrap());
        let transcript = json["content"].as_str().unwrap();

        assert!(transcript.starts_with(&format!("Support: {}", faq::GREETING)));
        assert!(transcript.contains("You: thanks!"));
        assert!(transcript.ends_with(faq::THANKS));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ws_quit_does_not_stop_the_desk() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server().await;
        let url = format!("ws://127.0.0.1:{port}/ws/chat");
        let (mut visitor, _) = connect_async(url.as_str()).await.unwrap();
        let (mut customer, _) = connect_async(url.as_str()).await.unwrap();

        visitor.send(chat_frame("/quit", None)).await.unwrap();
        let json = parse_ws_json(&visitor.next().await.unwrap().unwrap());
        assert_eq!(json["content"], faq::FALLBACK);

        // Both connections are still served.
        customer.send(chat_frame("colour options?", None)).await.unwrap();
        let json = parse_ws_json(&customer.next().await.unwrap().unwrap());
        assert_eq!(json["content"], faq::COLORS);

        visitor.send(chat_frame("bye", None)).await.unwrap();
        let json = parse_ws_json(&visitor.next().await.unwrap().unwrap());
        assert_eq!(json["content"], faq::THANKS);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ws_question_keeps_original_spacing_in_history() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server().await;
        let (mut ws, _) = connect_async(format!("ws://127.0.0.1:{port}/ws/chat"))
            .await
            .unwrap();

        ws.send(chat_frame("  thanks!  ", None)).await.unwrap();
        let _ = ws.next().await.unwrap().unwrap();

        ws.send(chat_frame("/history", None)).await.unwrap();
        let json = parse_ws_json(&ws.next().await.unwrap().unwrap());
        assert!(json["content"].as_str().unwrap().contains("You:   thanks!  \n"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ws_blank_message_is_ignored() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server().await;
        let (mut ws, _) = connect_async(format!("ws://127.0.0.1:{port}/ws/chat"))
            .await
            .unwrap();

        ws.send(chat_frame("   ", None)).await.unwrap();
        ws.send(chat_frame("bye", None)).await.unwrap();

        // The first frame back answers "bye"; the blank one produced nothing.
        let json = parse_ws_json(&ws.next().await.unwrap().unwrap());
        assert_eq!(json["content"], faq::THANKS);
    })
    .await
    .expect("test timed out");
}
