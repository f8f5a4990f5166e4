//! Session phase transitions: LOBBY → PLAYING → RESULTS → LOBBY.
//!
//! Every function here is a pure validator/transformer over a `Session`
//! value. The service layer owns reading the current value from the store
//! and committing the transformed one atomically.

use crate::error::{SessionError, SessionResult};
use crate::roles;
use crate::types::{JoinCode, Player, Session, SessionPhase};
use rand::Rng;
use std::collections::HashSet;

/// Create a fresh LOBBY session with `host_name` as its single host player.
pub fn create(host_name: &str, code: JoinCode) -> SessionResult<Session> {
    let host_name = host_name.trim();
    if host_name.is_empty() {
        return Err(SessionError::Validation("host name is empty".to_string()));
    }

    Ok(Session {
        id: ulid::Ulid::new().to_string(),
        code,
        phase: SessionPhase::Lobby,
        category: String::new(),
        secret_word: String::new(),
        impostor_count: 1,
        impostor_ids: HashSet::new(),
        players: vec![Player::new(host_name.to_string(), true)],
        created_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Append a non-host player to a LOBBY session.
///
/// Names are unique case-insensitively within the roster; the service runs
/// this check and the write as one conditional update so two racing joins
/// cannot both pass it.
pub fn join(session: &Session, name: &str) -> SessionResult<(Session, Player)> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SessionError::Validation("player name is empty".to_string()));
    }
    if session.phase != SessionPhase::Lobby {
        return Err(SessionError::SessionAlreadyStarted);
    }
    if session.has_player_named(name) {
        return Err(SessionError::NameTaken(name.to_string()));
    }

    let player = Player::new(name.to_string(), false);
    let mut next = session.clone();
    next.players.push(player.clone());
    Ok((next, player))
}

/// LOBBY → PLAYING: assign roles and set the round's category and word.
pub fn start<R: Rng + ?Sized>(
    session: &Session,
    impostor_count: u8,
    category: &str,
    word: &str,
    rng: &mut R,
) -> SessionResult<Session> {
    if session.phase != SessionPhase::Lobby {
        return Err(SessionError::InvalidPhase {
            phase: session.phase,
            event: "start",
        });
    }

    let assignment = roles::assign(&session.players, impostor_count, rng)?;

    let mut next = session.clone();
    next.phase = SessionPhase::Playing;
    next.impostor_count = impostor_count;
    next.category = category.to_string();
    next.secret_word = word.to_string();
    next.impostor_ids = assignment.impostor_ids;
    next.players = assignment.players;
    Ok(next)
}

/// PLAYING → RESULTS. Word and impostor ids are kept for the reveal screen.
pub fn end(session: &Session) -> SessionResult<Session> {
    if session.phase != SessionPhase::Playing {
        return Err(SessionError::InvalidPhase {
            phase: session.phase,
            event: "end",
        });
    }

    let mut next = session.clone();
    next.phase = SessionPhase::Results;
    Ok(next)
}

/// RESULTS → LOBBY: clear the round, keep the roster for the next one.
pub fn reset(session: &Session) -> SessionResult<Session> {
    if session.phase != SessionPhase::Results {
        return Err(SessionError::InvalidPhase {
            phase: session.phase,
            event: "reset",
        });
    }

    let mut next = session.clone();
    next.phase = SessionPhase::Lobby;
    next.category.clear();
    next.secret_word.clear();
    next.impostor_ids.clear();
    for p in &mut next.players {
        p.role = crate::types::PlayerRole::Unassigned;
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlayerRole;

    fn lobby_with(n: usize) -> Session {
        let mut session = create("Host", "123456".to_string()).unwrap();
        for i in 1..n {
            let (next, _) = join(&session, &format!("Guest{i}")).unwrap();
            session = next;
        }
        session
    }

    #[test]
    fn test_create_lobby_session() {
        let session = create("Alice", "654321".to_string()).unwrap();
        assert_eq!(session.phase, SessionPhase::Lobby);
        assert_eq!(session.code, "654321");
        assert_eq!(session.players.len(), 1);
        assert!(session.players[0].is_host);
        assert_eq!(session.players[0].name, "Alice");
        assert_eq!(session.players[0].role, PlayerRole::Unassigned);
        assert!(session.impostor_ids.is_empty());
    }

    #[test]
    fn test_create_rejects_empty_host_name() {
        assert!(matches!(
            create("  ", "123456".to_string()),
            Err(SessionError::Validation(_))
        ));
    }

    #[test]
    fn test_join_appends_non_host() {
        let session = lobby_with(1);
        let (next, player) = join(&session, "Bob").unwrap();
        assert_eq!(next.players.len(), 2);
        assert!(!player.is_host);
        assert_eq!(next.players[1].id, player.id);
        // at most one host
        assert_eq!(next.players.iter().filter(|p| p.is_host).count(), 1);
    }

    #[test]
    fn test_join_duplicate_name_case_insensitive() {
        let session = lobby_with(1);
        let (session, _) = join(&session, "Bob").unwrap();
        assert_eq!(
            join(&session, "bOB").unwrap_err(),
            SessionError::NameTaken("bOB".to_string())
        );
    }

    #[test]
    fn test_join_duplicate_name_folds_unicode_case() {
        let session = create("José", "123456".to_string()).unwrap();
        assert_eq!(
            join(&session, "JOSÉ").unwrap_err(),
            SessionError::NameTaken("JOSÉ".to_string())
        );
        assert_eq!(
            join(&session, "josé").unwrap_err(),
            SessionError::NameTaken("josé".to_string())
        );
        // A genuinely different accented name still joins
        assert!(join(&session, "Jose").is_ok());
    }

    #[test]
    fn test_join_outside_lobby() {
        let mut rng = rand::rng();
        let session = lobby_with(3);
        let playing = start(&session, 1, "Comida", "Pizza", &mut rng).unwrap();
        assert_eq!(
            join(&playing, "Late").unwrap_err(),
            SessionError::SessionAlreadyStarted
        );
        let results = end(&playing).unwrap();
        assert_eq!(
            join(&results, "Late").unwrap_err(),
            SessionError::SessionAlreadyStarted
        );
    }

    #[test]
    fn test_start_assigns_roles_and_word() {
        let mut rng = rand::rng();
        let session = lobby_with(4);
        let playing = start(&session, 1, "Animales", "León", &mut rng).unwrap();

        assert_eq!(playing.phase, SessionPhase::Playing);
        assert_eq!(playing.category, "Animales");
        assert_eq!(playing.secret_word, "León");
        assert_eq!(playing.impostor_ids.len(), 1);
        assert!(playing
            .players
            .iter()
            .all(|p| p.role != PlayerRole::Unassigned));
        for id in &playing.impostor_ids {
            assert_eq!(playing.player(id).unwrap().role, PlayerRole::Impostor);
        }
    }

    #[test]
    fn test_start_requires_lobby() {
        let mut rng = rand::rng();
        let session = lobby_with(3);
        let playing = start(&session, 1, "c", "w", &mut rng).unwrap();
        assert_eq!(
            start(&playing, 1, "c", "w", &mut rng).unwrap_err(),
            SessionError::InvalidPhase {
                phase: SessionPhase::Playing,
                event: "start",
            }
        );
    }

    #[test]
    fn test_start_roster_minimums() {
        let mut rng = rand::rng();
        assert!(matches!(
            start(&lobby_with(2), 1, "c", "w", &mut rng),
            Err(SessionError::InsufficientPlayers { required: 3, .. })
        ));
        assert!(matches!(
            start(&lobby_with(4), 2, "c", "w", &mut rng),
            Err(SessionError::InsufficientPlayers { required: 5, .. })
        ));
        let playing = start(&lobby_with(5), 2, "c", "w", &mut rng).unwrap();
        assert_eq!(playing.phase, SessionPhase::Playing);
        assert_eq!(playing.impostor_ids.len(), 2);
    }

    #[test]
    fn test_end_only_from_playing() {
        let mut rng = rand::rng();
        let lobby = lobby_with(3);
        assert!(matches!(
            end(&lobby),
            Err(SessionError::InvalidPhase { event: "end", .. })
        ));

        let playing = start(&lobby, 1, "c", "w", &mut rng).unwrap();
        let results = end(&playing).unwrap();
        assert_eq!(results.phase, SessionPhase::Results);
        // retained for the reveal screen
        assert_eq!(results.secret_word, "w");
        assert_eq!(results.impostor_ids.len(), 1);
        assert!(matches!(
            end(&results),
            Err(SessionError::InvalidPhase { event: "end", .. })
        ));
    }

    #[test]
    fn test_reset_clears_round_keeps_roster() {
        let mut rng = rand::rng();
        let lobby = lobby_with(4);
        let playing = start(&lobby, 1, "Deportes", "Tenis", &mut rng).unwrap();
        let results = end(&playing).unwrap();
        let back = reset(&results).unwrap();

        assert_eq!(back.phase, SessionPhase::Lobby);
        assert!(back.category.is_empty());
        assert!(back.secret_word.is_empty());
        assert!(back.impostor_ids.is_empty());
        assert!(back.players.iter().all(|p| p.role == PlayerRole::Unassigned));

        // roster identical to the pre-start lobby, code and created_at unchanged
        assert_eq!(back, lobby);
    }

    #[test]
    fn test_reset_only_from_results() {
        let mut rng = rand::rng();
        let lobby = lobby_with(3);
        assert!(matches!(
            reset(&lobby),
            Err(SessionError::InvalidPhase { event: "reset", .. })
        ));
        let playing = start(&lobby, 1, "c", "w", &mut rng).unwrap();
        assert!(matches!(
            reset(&playing),
            Err(SessionError::InvalidPhase { event: "reset", .. })
        ));
    }
}
