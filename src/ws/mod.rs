pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::service::SessionService;
use crate::store::MemoryStore;
use crate::types::Session;
use handlers::ConnState;

pub type SharedService = Arc<SessionService<MemoryStore>>;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<SharedService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, service))
}

enum ConnEvent {
    /// A session snapshot from the live subscription, `None` when the
    /// session record is gone from the store.
    Snapshot(Option<Session>),
    Client(Option<Result<Message, axum::Error>>),
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, service: SharedService) {
    let (mut sender, mut receiver) = socket.split();
    let mut conn = ConnState::default();

    tracing::info!("WebSocket connected");

    loop {
        let event = tokio::select! {
            snapshot = async {
                match &mut conn.events {
                    Some(events) => events.next().await,
                    // Not subscribed: wait forever
                    None => std::future::pending::<Option<Session>>().await,
                }
            } => ConnEvent::Snapshot(snapshot),

            ws_msg = receiver.next() => ConnEvent::Client(ws_msg),
        };

        match event {
            ConnEvent::Snapshot(Some(session)) => {
                let msg = ServerMessage::SessionState { session };
                if let Ok(json) = serde_json::to_string(&msg) {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
            }
            ConnEvent::Snapshot(None) => {
                conn.events = None;
            }

            ConnEvent::Client(Some(Ok(Message::Text(text)))) => {
                tracing::debug!("Received message: {}", text);

                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        if let Some(response) =
                            handlers::handle_message(client_msg, &mut conn, &service).await
                        {
                            if let Ok(json) = serde_json::to_string(&response) {
                                if sender.send(Message::Text(json.into())).await.is_err() {
                                    tracing::error!("Failed to send response");
                                    break;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!("Failed to parse client message: {}", e);
                        let error = ServerMessage::Error {
                            code: "PARSE_ERROR".to_string(),
                            msg: format!("Invalid message format: {}", e),
                        };
                        if let Ok(json) = serde_json::to_string(&error) {
                            let _ = sender.send(Message::Text(json.into())).await;
                        }
                    }
                }
            }
            ConnEvent::Client(Some(Ok(Message::Close(_)))) => {
                tracing::info!("WebSocket closed");
                break;
            }
            ConnEvent::Client(Some(Ok(Message::Ping(data)))) => {
                if sender.send(Message::Pong(data)).await.is_err() {
                    break;
                }
            }
            ConnEvent::Client(Some(Ok(_))) => {}
            ConnEvent::Client(Some(Err(e))) => {
                tracing::error!("WebSocket error: {}", e);
                break;
            }
            ConnEvent::Client(None) => break,
        }
    }

    // Dropping the connection state releases the session subscription
    tracing::info!("WebSocket connection closed");
}
