use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Opaque ID types for type safety
pub type SessionId = String;
pub type PlayerId = String;

/// Six-digit numeric join code, e.g. "482913"
pub type JoinCode = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionPhase {
    Lobby,
    Playing,
    Results,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerRole {
    Unassigned,
    Civilian,
    Impostor,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub role: PlayerRole,
}

impl Player {
    pub fn new(name: String, is_host: bool) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            name,
            is_host,
            role: PlayerRole::Unassigned,
        }
    }
}

/// One game round-set, addressed by its join code while in the lobby.
///
/// Invariants (enforced by the state machine, checked in tests):
/// - `players` is non-empty and the first player is the only host
/// - in LOBBY: `impostor_ids` empty, all roles UNASSIGNED, word/category blank
/// - outside LOBBY: `|impostor_ids| == impostor_count` and every id is a roster id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: SessionId,
    pub code: JoinCode,
    pub phase: SessionPhase,
    pub category: String,
    pub secret_word: String,
    pub impostor_count: u8,
    pub impostor_ids: HashSet<PlayerId>,
    pub players: Vec<Player>,
    pub created_at: String,
}

impl Session {
    /// Case-insensitive roster lookup, used for the join-time name check.
    /// Folds full Unicode case, not just ASCII: names here are Spanish.
    pub fn has_player_named(&self, name: &str) -> bool {
        let folded = name.to_lowercase();
        self.players
            .iter()
            .any(|p| p.name.to_lowercase() == folded)
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }
}

/// Caller context threaded explicitly through the connection layer.
///
/// `is_host` is supplied by the client UI and trusted as-is; host gating is a
/// UX concern here, not a security boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub session_id: SessionId,
    pub player_id: PlayerId,
    pub is_host: bool,
}
