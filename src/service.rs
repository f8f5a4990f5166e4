//! Session orchestration: every operation is a fresh read, a pure transform
//! through the state machine, and one conditional write. Lost races surface
//! as `StoreConflict` and are retried a bounded number of times.

use crate::error::{SessionError, SessionResult};
use crate::machine;
use crate::store::{SessionEvents, SessionStore};
use crate::types::{JoinCode, PlayerId, Session, SessionId, SessionPhase};
use rand::Rng;

/// Attempts at drawing an unused join code before giving up.
const MAX_CODE_ATTEMPTS: usize = 16;
/// Retries of a read-transform-write cycle after a lost race.
const MAX_CONFLICT_RETRIES: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedSession {
    pub session_id: SessionId,
    pub code: JoinCode,
    pub host_player_id: PlayerId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinedSession {
    pub session_id: SessionId,
    pub player_id: PlayerId,
}

pub struct SessionService<S: SessionStore> {
    store: S,
}

fn generate_join_code<R: Rng + ?Sized>(rng: &mut R) -> JoinCode {
    rng.random_range(100_000..=999_999).to_string()
}

fn valid_join_code(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}

impl<S: SessionStore> SessionService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create a LOBBY session with `host_name` as its single host player.
    ///
    /// Join codes are drawn uniformly from [100000, 999999] and redrawn
    /// while another joinable session holds the candidate. The collision
    /// check and the insert are two store calls: the store contract has no
    /// conditional create, so two creates racing onto the same code can
    /// both land. Code uniqueness while joinable is therefore best-effort
    /// at creation; backends able to enforce it in `SessionStore::create`
    /// should do so.
    pub async fn create_session(&self, host_name: &str) -> SessionResult<CreatedSession> {
        if host_name.trim().is_empty() {
            return Err(SessionError::Validation("host name is empty".to_string()));
        }

        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_join_code(&mut rand::rng());
            if let Some(existing) = self.store.find_by_code(&code).await? {
                if existing.value.phase == SessionPhase::Lobby {
                    tracing::debug!(%code, "join code collision, redrawing");
                    continue;
                }
            }

            let session = machine::create(host_name, code.clone())?;
            let host_player_id = session.players[0].id.clone();
            let session_id = self.store.create(session).await?;
            tracing::info!(%session_id, %code, "session created");
            return Ok(CreatedSession {
                session_id,
                code,
                host_player_id,
            });
        }

        Err(SessionError::CodeExhausted)
    }

    /// Add a player to the lobby behind `code`.
    ///
    /// The duplicate-name and phase checks run against the same snapshot the
    /// conditional write is keyed on, so two racing joins can never both
    /// pass them.
    pub async fn join_session(
        &self,
        code: &str,
        player_name: &str,
    ) -> SessionResult<JoinedSession> {
        let code = code.trim();
        if !valid_join_code(code) {
            return Err(SessionError::Validation(
                "join code must be 6 digits".to_string(),
            ));
        }
        if player_name.trim().is_empty() {
            return Err(SessionError::Validation("player name is empty".to_string()));
        }

        for _ in 0..MAX_CONFLICT_RETRIES {
            let current = self
                .store
                .find_by_code(code)
                .await?
                .ok_or(SessionError::SessionNotFound)?;

            let (next, player) = machine::join(&current.value, player_name)?;
            let session_id = current.value.id.clone();

            match self.store.update(&session_id, current.version, next).await {
                Ok(_) => {
                    tracing::info!(%session_id, player_id = %player.id, "player joined");
                    return Ok(JoinedSession {
                        session_id,
                        player_id: player.id,
                    });
                }
                Err(SessionError::StoreConflict) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(SessionError::StoreConflict)
    }

    /// LOBBY → PLAYING: assign roles over the roster as it is *now*, not as
    /// some caller last saw it.
    pub async fn start_session(
        &self,
        session_id: &SessionId,
        impostor_count: u8,
        category: &str,
        word: &str,
    ) -> SessionResult<Session> {
        self.transition(session_id, "start", |session| {
            machine::start(session, impostor_count, category, word, &mut rand::rng())
        })
        .await
    }

    /// PLAYING → RESULTS.
    pub async fn end_session(&self, session_id: &SessionId) -> SessionResult<Session> {
        self.transition(session_id, "end", machine::end).await
    }

    /// RESULTS → LOBBY, roster retained.
    pub async fn reset_session(&self, session_id: &SessionId) -> SessionResult<Session> {
        self.transition(session_id, "reset", machine::reset).await
    }

    /// Live snapshot feed for a session. The handle delivers the current
    /// state immediately; dropping it unsubscribes.
    pub async fn subscribe(&self, session_id: &SessionId) -> SessionResult<SessionEvents> {
        self.store.subscribe(session_id).await
    }

    pub async fn get_session(&self, session_id: &SessionId) -> SessionResult<Session> {
        Ok(self.store.get(session_id).await?.value)
    }

    async fn transition<F>(
        &self,
        session_id: &SessionId,
        event: &'static str,
        transform: F,
    ) -> SessionResult<Session>
    where
        F: Fn(&Session) -> SessionResult<Session>,
    {
        for _ in 0..MAX_CONFLICT_RETRIES {
            let current = self.store.get(session_id).await?;
            let next = transform(&current.value)?;

            match self
                .store
                .update(session_id, current.version, next.clone())
                .await
            {
                Ok(_) => {
                    tracing::info!(%session_id, event, phase = ?next.phase, "session transitioned");
                    return Ok(next);
                }
                Err(SessionError::StoreConflict) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(SessionError::StoreConflict)
    }
}
