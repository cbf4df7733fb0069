use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::view::StepView;
use crate::flow::FlowState;

/// One registration in progress.
///
/// The async lock over the state is held for the whole of a submit. The last rendered
/// view sits outside it so readers can still see the page while a submit runs.
pub struct RegistrationSession {
    state: tokio::sync::Mutex<FlowState>,
    last_view: Mutex<StepView>,
}

impl RegistrationSession {
    pub fn new(state: FlowState, view: StepView) -> Self {
        Self {
            state: tokio::sync::Mutex::new(state),
            last_view: Mutex::new(view),
        }
    }

    pub fn state(&self) -> &tokio::sync::Mutex<FlowState> {
        &self.state
    }

    pub fn last_view(&self) -> StepView {
        self.last_view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn remember(&self, view: &StepView) {
        *self.last_view.lock().unwrap_or_else(PoisonError::into_inner) = view.clone();
    }
}

pub type SharedSession = Arc<RegistrationSession>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a path segment; anything that is not a UUID names no session.
    pub fn parse(raw: &str) -> Result<Self, SessionError> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| SessionError::NotFound(raw.to_string()))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Storage abstraction for in-flight registrations.
pub trait SessionStore: Send + Sync {
    fn insert(&self, id: SessionId, session: SharedSession) -> Result<(), SessionError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<SharedSession>, SessionError>;
    fn remove(&self, id: &SessionId) -> Result<Option<SharedSession>, SessionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("registration session {0} not found")]
    NotFound(String),
    #[error("submission already in progress")]
    SubmissionInProgress,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<SessionId, SharedSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|sessions| sessions.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, id: SessionId, session: SharedSession) -> Result<(), SessionError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|_| SessionError::Unavailable("session store poisoned".to_string()))?;
        guard.insert(id, session);
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<SharedSession>, SessionError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|_| SessionError::Unavailable("session store poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }

    fn remove(&self, id: &SessionId) -> Result<Option<SharedSession>, SessionError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|_| SessionError::Unavailable("session store poisoned".to_string()))?;
        Ok(guard.remove(id))
    }
}
