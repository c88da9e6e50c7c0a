//! Session Management
//!
//! Sessions live in a [`SessionRegistry`] owned by whoever runs the agent
//! (the HTTP server or the CLI) and handed around by `Arc`. Each session sits
//! behind its own async mutex: a turn holds that lock from start to finish,
//! so two turns on the same session never interleave their writes.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard, RwLock};
use uuid::Uuid;

use crate::error::{AgentError, Result};
use crate::message::Conversation;

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Typed per-session state that tools read and write.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionState {
    rolls: Vec<i64>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a die roll. Earlier rolls are never touched.
    pub fn record_roll(&mut self, value: i64) {
        self.rolls.push(value);
    }

    /// All rolls in the order they were made
    pub fn rolls(&self) -> &[i64] {
        &self.rolls
    }
}

/// A conversation session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,

    /// Owning user
    pub user_id: String,

    /// Tool-visible state
    pub state: SessionState,

    /// History sent to the model on every turn
    pub conversation: Conversation,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            user_id: user_id.into(),
            state: SessionState::new(),
            conversation: Conversation::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the activity timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn message_count(&self) -> usize {
        self.conversation.len()
    }
}

/// Cheap handle to a registered session.
///
/// `id` and `user_id` never change after creation, so they are readable
/// without taking the session lock.
#[derive(Clone, Debug)]
pub struct SessionRef {
    pub id: SessionId,
    pub user_id: String,
    inner: Arc<Mutex<Session>>,
}

impl SessionRef {
    fn new(session: Session) -> Self {
        Self {
            id: session.id.clone(),
            user_id: session.user_id.clone(),
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Wait for exclusive access to the session
    pub async fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().await
    }

    /// Exclusive access only if no turn currently holds the session
    pub fn try_lock(&self) -> Option<MutexGuard<'_, Session>> {
        self.inner.try_lock().ok()
    }

    /// Exclusive access that can move into a spawned task
    pub async fn lock_owned(&self) -> OwnedMutexGuard<Session> {
        Arc::clone(&self.inner).lock_owned().await
    }
}

/// How a requested session identifier was resolved
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionResolution {
    /// The identifier was known and reused
    Existing,
    /// No identifier was given; a new session was created
    Created,
    /// The identifier was unknown; a new session stands in for it
    Replaced { requested: String },
}

/// In-memory registry of live sessions
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, SessionRef>>,
    max_sessions: Option<usize>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions: None,
        }
    }

    /// Refuse to create sessions beyond `max`
    pub fn with_max_sessions(max: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions: Some(max),
        }
    }

    /// Create a session with an empty state for `user_id`
    pub async fn create(&self, user_id: &str) -> Result<SessionRef> {
        let mut sessions = self.sessions.write().await;

        if let Some(max) = self.max_sessions {
            if sessions.len() >= max {
                return Err(AgentError::Session(format!(
                    "session limit of {max} reached"
                )));
            }
        }

        let session = SessionRef::new(Session::new(user_id));
        sessions.insert(session.id.clone(), session.clone());

        tracing::info!(session_id = %session.id, user_id, "Session created");
        Ok(session)
    }

    /// Look up a session by ID
    pub async fn get(&self, id: &str) -> Option<SessionRef> {
        let sessions = self.sessions.read().await;
        sessions.get(&SessionId::from_string(id)).cloned()
    }

    /// Reuse a known session or create one.
    ///
    /// An unknown identifier is not an error: a fresh session is created and
    /// its identifier replaces the requested one.
    pub async fn resolve(
        &self,
        requested: Option<&str>,
        user_id: &str,
    ) -> Result<(SessionRef, SessionResolution)> {
        match requested.filter(|id| !id.is_empty()) {
            Some(id) => {
                if let Some(session) = self.get(id).await {
                    return Ok((session, SessionResolution::Existing));
                }
                tracing::warn!(requested = id, "Unknown session id, creating a new session");
                let session = self.create(user_id).await?;
                Ok((
                    session,
                    SessionResolution::Replaced {
                        requested: id.to_string(),
                    },
                ))
            }
            None => {
                let session = self.create(user_id).await?;
                Ok((session, SessionResolution::Created))
            }
        }
    }

    /// Drop a session; returns whether it existed
    pub async fn remove(&self, id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&SessionId::from_string(id)).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
