//! Shared session store: keyed records with atomic conditional updates and
//! a push-based subscription per session.
//!
//! The service only talks to the [`SessionStore`] trait, so any realtime
//! backend with compare-and-swap semantics can sit behind it. [`MemoryStore`]
//! is the in-process implementation used by the server and the tests.

use crate::error::{SessionError, SessionResult};
use crate::types::{Session, SessionId, SessionPhase};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{watch, RwLock};

pub type Version = u64;

/// A session snapshot together with the store version it was read at.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub value: T,
    pub version: Version,
}

#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Allocate a new record. The session's `id` field is the record key.
    async fn create(&self, session: Session) -> SessionResult<SessionId>;

    async fn get(&self, id: &SessionId) -> SessionResult<Versioned<Session>>;

    /// Resolve a join code to a session. A LOBBY session wins when the code
    /// is shared with finished sessions (codes are only unique while
    /// joinable).
    async fn find_by_code(&self, code: &str) -> SessionResult<Option<Versioned<Session>>>;

    /// Conditional update: commits only if the record is still at
    /// `expected_version`, otherwise fails with `StoreConflict` and changes
    /// nothing. Every committed update is pushed to subscribers.
    async fn update(
        &self,
        id: &SessionId,
        expected_version: Version,
        session: Session,
    ) -> SessionResult<Version>;

    /// Live feed of session snapshots. Delivers the current snapshot first,
    /// then one per committed mutation (rapid writes may coalesce, but the
    /// most recent state is never skipped).
    async fn subscribe(&self, id: &SessionId) -> SessionResult<SessionEvents>;
}

/// Cancellable handle over a session's snapshot stream.
///
/// Dropping the handle (or calling [`cancel`](Self::cancel)) synchronously
/// stops delivery; nothing is received after that point.
pub struct SessionEvents {
    rx: watch::Receiver<Session>,
}

impl SessionEvents {
    /// Wait for the next snapshot. Returns `None` once the session's record
    /// is gone from the store.
    pub async fn next(&mut self) -> Option<Session> {
        match self.rx.changed().await {
            Ok(()) => Some(self.rx.borrow_and_update().clone()),
            Err(_) => None,
        }
    }

    /// The most recent snapshot without waiting.
    pub fn latest(&self) -> Session {
        self.rx.borrow().clone()
    }

    pub fn cancel(self) {
        drop(self);
    }
}

struct Record {
    version: Version,
    session: Session,
    publisher: watch::Sender<Session>,
}

/// In-memory `SessionStore` keyed by session id.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<SessionId, Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create(&self, session: Session) -> SessionResult<SessionId> {
        let id = session.id.clone();
        let (publisher, _) = watch::channel(session.clone());
        self.records.write().await.insert(
            id.clone(),
            Record {
                version: 1,
                session,
                publisher,
            },
        );
        Ok(id)
    }

    async fn get(&self, id: &SessionId) -> SessionResult<Versioned<Session>> {
        let records = self.records.read().await;
        let record = records.get(id).ok_or(SessionError::SessionNotFound)?;
        Ok(Versioned {
            value: record.session.clone(),
            version: record.version,
        })
    }

    async fn find_by_code(&self, code: &str) -> SessionResult<Option<Versioned<Session>>> {
        let records = self.records.read().await;
        let mut found: Option<&Record> = None;
        for record in records.values() {
            if record.session.code != code {
                continue;
            }
            if record.session.phase == SessionPhase::Lobby {
                found = Some(record);
                break;
            }
            found.get_or_insert(record);
        }
        Ok(found.map(|r| Versioned {
            value: r.session.clone(),
            version: r.version,
        }))
    }

    async fn update(
        &self,
        id: &SessionId,
        expected_version: Version,
        session: Session,
    ) -> SessionResult<Version> {
        let mut records = self.records.write().await;
        let record = records.get_mut(id).ok_or(SessionError::SessionNotFound)?;
        if record.version != expected_version {
            return Err(SessionError::StoreConflict);
        }
        record.version += 1;
        record.session = session.clone();
        // No receivers connected is fine
        record.publisher.send_replace(session);
        Ok(record.version)
    }

    async fn subscribe(&self, id: &SessionId) -> SessionResult<SessionEvents> {
        let records = self.records.read().await;
        let record = records.get(id).ok_or(SessionError::SessionNotFound)?;
        let mut rx = record.publisher.subscribe();
        // Flag the current value as unseen so the first `next()` yields it.
        rx.mark_changed();
        Ok(SessionEvents { rx })
    }
}
