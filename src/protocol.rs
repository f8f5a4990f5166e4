use crate::error::SessionError;
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateSession {
        host_name: String,
    },
    JoinSession {
        code: String,
        player_name: String,
    },
    /// Host-only. With both overrides absent a random card is drawn from
    /// the word table; a category alone draws a random word from that
    /// category; a word alone is rejected.
    StartSession {
        impostor_count: u8,
        #[serde(default)]
        category: Option<String>,
        #[serde(default)]
        word: Option<String>,
    },
    /// Host-only
    EndSession,
    /// Host-only
    ResetSession,
    /// Stop receiving snapshots for the current session
    LeaveSession,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    SessionCreated {
        session_id: SessionId,
        code: JoinCode,
        player_id: PlayerId,
    },
    SessionJoined {
        session_id: SessionId,
        player_id: PlayerId,
    },
    /// Full session snapshot, pushed on subscription and on every committed
    /// mutation. Per-viewer redaction (hiding the word from the impostor) is
    /// the client's job.
    SessionState {
        session: Session,
    },
    Error {
        code: String,
        msg: String,
    },
}

impl ServerMessage {
    pub fn error(err: &SessionError) -> Self {
        Self::Error {
            code: err.code().to_string(),
            msg: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_wire_format() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"t":"join_session","code":"123456","player_name":"Bob"}"#,
        )
        .unwrap();
        assert!(matches!(
            msg,
            ClientMessage::JoinSession { ref code, ref player_name }
                if code == "123456" && player_name == "Bob"
        ));

        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"start_session","impostor_count":2}"#).unwrap();
        assert!(matches!(
            msg,
            ClientMessage::StartSession {
                impostor_count: 2,
                category: None,
                word: None,
            }
        ));
    }

    #[test]
    fn test_session_state_uses_original_enum_values() {
        let session = crate::machine::create("Alice", "123456".to_string()).unwrap();
        let json = serde_json::to_value(ServerMessage::SessionState { session }).unwrap();
        assert_eq!(json["t"], "session_state");
        assert_eq!(json["session"]["phase"], "LOBBY");
        assert_eq!(json["session"]["players"][0]["role"], "UNASSIGNED");
    }

    #[test]
    fn test_error_message_carries_wire_code() {
        let json =
            serde_json::to_value(ServerMessage::error(&SessionError::SessionNotFound)).unwrap();
        assert_eq!(json["code"], "SESSION_NOT_FOUND");
    }
}
