//! WebSocket message dispatch.
//!
//! Each connection owns a [`ConnState`]: the caller's session context plus
//! the live snapshot subscription. Host-only messages are gated on the
//! context's `is_host` flag, which mirrors the client's own claim (an
//! accepted trust simplification, not a security boundary).

use crate::protocol::{ClientMessage, ServerMessage};
use crate::service::SessionService;
use crate::store::{SessionEvents, SessionStore};
use crate::types::SessionContext;
use crate::words;

/// Per-connection state threaded explicitly through the dispatcher.
#[derive(Default)]
pub struct ConnState {
    pub ctx: Option<SessionContext>,
    pub events: Option<SessionEvents>,
}

/// Macro to resolve the connection's host context or return an error reply
macro_rules! require_host {
    ($conn:expr, $action:expr) => {
        match &$conn.ctx {
            Some(ctx) if ctx.is_host => ctx.clone(),
            Some(_) => {
                return Some(ServerMessage::Error {
                    code: "UNAUTHORIZED".to_string(),
                    msg: format!("Only the host can {}", $action),
                })
            }
            None => {
                return Some(ServerMessage::Error {
                    code: "NO_SESSION".to_string(),
                    msg: format!("Join a session before trying to {}", $action),
                })
            }
        }
    };
}

/// Handle one client message and return the optional direct reply.
/// Session snapshots travel separately, over the subscription in `conn`.
pub async fn handle_message<S: SessionStore>(
    msg: ClientMessage,
    conn: &mut ConnState,
    service: &SessionService<S>,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::CreateSession { host_name } => {
            let created = match service.create_session(&host_name).await {
                Ok(created) => created,
                Err(e) => return Some(ServerMessage::error(&e)),
            };

            match service.subscribe(&created.session_id).await {
                Ok(events) => {
                    conn.ctx = Some(SessionContext {
                        session_id: created.session_id.clone(),
                        player_id: created.host_player_id.clone(),
                        is_host: true,
                    });
                    conn.events = Some(events);
                    Some(ServerMessage::SessionCreated {
                        session_id: created.session_id,
                        code: created.code,
                        player_id: created.host_player_id,
                    })
                }
                Err(e) => Some(ServerMessage::error(&e)),
            }
        }

        ClientMessage::JoinSession { code, player_name } => {
            let joined = match service.join_session(&code, &player_name).await {
                Ok(joined) => joined,
                Err(e) => return Some(ServerMessage::error(&e)),
            };

            match service.subscribe(&joined.session_id).await {
                Ok(events) => {
                    conn.ctx = Some(SessionContext {
                        session_id: joined.session_id.clone(),
                        player_id: joined.player_id.clone(),
                        is_host: false,
                    });
                    conn.events = Some(events);
                    Some(ServerMessage::SessionJoined {
                        session_id: joined.session_id,
                        player_id: joined.player_id,
                    })
                }
                Err(e) => Some(ServerMessage::error(&e)),
            }
        }

        ClientMessage::StartSession {
            impostor_count,
            category,
            word,
        } => {
            let ctx = require_host!(conn, "start the round");

            let card = match (category, word) {
                (Some(category), Some(word)) => words::WordCard { category, word },
                (Some(category), None) => {
                    match words::word_from_category(&category, &mut rand::rng()) {
                        Some(card) => card,
                        None => {
                            return Some(ServerMessage::Error {
                                code: "VALIDATION".to_string(),
                                msg: format!("Unknown category \"{category}\""),
                            })
                        }
                    }
                }
                (None, Some(_)) => {
                    return Some(ServerMessage::Error {
                        code: "VALIDATION".to_string(),
                        msg: "A word override needs its category as well".to_string(),
                    })
                }
                (None, None) => words::random_word(&mut rand::rng()),
            };

            match service
                .start_session(&ctx.session_id, impostor_count, &card.category, &card.word)
                .await
            {
                Ok(_) => None, // snapshot arrives over the subscription
                Err(e) => Some(ServerMessage::error(&e)),
            }
        }

        ClientMessage::EndSession => {
            let ctx = require_host!(conn, "end the round");
            match service.end_session(&ctx.session_id).await {
                Ok(_) => None,
                Err(e) => Some(ServerMessage::error(&e)),
            }
        }

        ClientMessage::ResetSession => {
            let ctx = require_host!(conn, "reset the session");
            match service.reset_session(&ctx.session_id).await {
                Ok(_) => None,
                Err(e) => Some(ServerMessage::error(&e)),
            }
        }

        ClientMessage::LeaveSession => {
            // Synchronous cancellation: nothing is delivered past this point
            if let Some(events) = conn.events.take() {
                events.cancel();
            }
            conn.ctx = None;
            None
        }
    }
}
