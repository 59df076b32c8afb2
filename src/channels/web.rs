//! Web chat channel: WebSocket chat for the storefront widget plus a
//! one-shot REST endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::{get, post},
};
use futures::stream;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, mpsc};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::channels::{Channel, IncomingMessage, MessageStream, OutgoingResponse};
use crate::error::ChannelError;
use crate::responder::ResponseMatcher;

// ── JSON Protocol ───────────────────────────────────────────────────────

/// Message from browser client → server.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ClientMessage {
    #[serde(rename = "message")]
    Message {
        content: String,
        thread_id: Option<String>,
    },
}

/// Message from server → browser client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
enum ServerMessage {
    #[serde(rename = "response")]
    Response {
        content: String,
        thread_id: Option<String>,
    },
    #[serde(rename = "error")]
    Error { message: String },
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub thread_id: Option<String>,
}

/// Reply of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub answer: String,
    pub thread_id: Option<String>,
}

// ── Shared State ────────────────────────────────────────────────────────

struct WebChannelInner {
    /// WS handlers → `Channel::start` stream.
    incoming_tx: mpsc::UnboundedSender<IncomingMessage>,
    /// `Channel::respond` → WS handler, keyed by connection user id. Entries
    /// live exactly as long as their socket.
    connections: Mutex<HashMap<String, mpsc::UnboundedSender<ServerMessage>>>,
    matcher: ResponseMatcher,
}

#[derive(Clone)]
struct WebState {
    inner: Arc<WebChannelInner>,
}

// ── WebChannel ──────────────────────────────────────────────────────────

/// Browser-facing chat channel.
///
/// - `GET /ws/chat`: each connection is its own user (`web-<uuid>`); JSON
///   `message` frames become [`IncomingMessage`]s and answers come back as
///   `response` frames on the same connection only.
/// - `POST /api/chat`: answers straight from the matcher, no session.
/// - `GET /api/health`: liveness plus rule count.
pub struct WebChannel {
    inner: Arc<WebChannelInner>,
    /// Consumed once in `start()`.
    incoming_rx: Mutex<Option<mpsc::UnboundedReceiver<IncomingMessage>>>,
}

impl WebChannel {
    pub fn new(matcher: ResponseMatcher) -> Self {
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();

        let inner = Arc::new(WebChannelInner {
            incoming_tx,
            connections: Mutex::new(HashMap::new()),
            matcher,
        });

        Self {
            inner,
            incoming_rx: Mutex::new(Some(incoming_rx)),
        }
    }

    /// Build the Axum router for this channel. Merge it into the served app.
    pub fn router(&self) -> Router {
        let state = WebState {
            inner: Arc::clone(&self.inner),
        };

        Router::new()
            .route("/ws/chat", get(ws_chat_handler))
            .route("/api/chat", post(chat_handler))
            .route("/api/health", get(health))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }
}

#[async_trait]
impl Channel for WebChannel {
    fn name(&self) -> &str {
        "web"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let rx = self
            .incoming_rx
            .lock()
            .await
            .take()
            .ok_or_else(|| ChannelError::StartupFailed {
                name: "web".to_string(),
                reason: "start() already called".to_string(),
            })?;

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        let frame = ServerMessage::Response {
            content: response.content,
            thread_id: response.thread_id.or_else(|| msg.thread_id.clone()),
        };

        let connections = self.inner.connections.lock().await;
        let tx = connections
            .get(&msg.user_id)
            .ok_or_else(|| ChannelError::SendFailed {
                name: "web".to_string(),
                reason: format!("connection {} is closed", msg.user_id),
            })?;
        tx.send(frame).map_err(|_| ChannelError::SendFailed {
            name: "web".to_string(),
            reason: format!("connection {} is closing", msg.user_id),
        })
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        if self.inner.incoming_tx.is_closed() {
            return Err(ChannelError::HealthCheckFailed {
                name: "web".to_string(),
            });
        }
        Ok(())
    }
}

// ── REST ────────────────────────────────────────────────────────────────

async fn health(State(state): State<WebState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "rules": state.inner.matcher.table().len(),
    }))
}

async fn chat_handler(
    State(state): State<WebState>,
    Json(body): Json<ChatRequest>,
) -> impl IntoResponse {
    let answer = state.inner.matcher.respond(&body.message).to_string();
    Json(ChatReply {
        answer,
        thread_id: body.thread_id,
    })
}

// ── WebSocket Handler ───────────────────────────────────────────────────

async fn ws_chat_handler(ws: WebSocketUpgrade, State(state): State<WebState>) -> impl IntoResponse {
    info!("Web chat client connecting");
    ws.on_upgrade(|socket| handle_chat_socket(socket, state.inner))
}

async fn send_frame(socket: &mut WebSocket, msg: &ServerMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "Failed to encode server frame");
            true
        }
    }
}

async fn handle_chat_socket(mut socket: WebSocket, inner: Arc<WebChannelInner>) {
    let connection = format!("web-{}", Uuid::new_v4());
    info!(connection = %connection, "Web chat client connected");

    let (outgoing_tx, mut outgoing_rx) = mpsc::unbounded_channel();
    inner
        .connections
        .lock()
        .await
        .insert(connection.clone(), outgoing_tx);

    loop {
        tokio::select! {
            Some(frame) = outgoing_rx.recv() => {
                if !send_frame(&mut socket, &frame).await {
                    debug!("Web chat client disconnected during send");
                    break;
                }
            }

            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Message { content, thread_id }) => {
                                let mut msg = IncomingMessage::new("web", &connection, &content);
                                if let Some(ref tid) = thread_id {
                                    msg = msg.with_thread(tid);
                                }
                                if inner.incoming_tx.send(msg).is_err() {
                                    warn!("Web incoming channel closed");
                                    break;
                                }
                            }
                            Err(e) => {
                                debug!(error = %e, text = %text.as_str(), "Invalid JSON from web client");
                                let frame = ServerMessage::Error {
                                    message: format!("invalid message: {}", e),
                                };
                                if !send_frame(&mut socket, &frame).await {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!(connection = %connection, "Web chat client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Web chat WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    inner.connections.lock().await.remove(&connection);
    info!(connection = %connection, "Web chat connection closed");
}
