use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::store::{RegistrationSession, SessionError, SessionId, SessionStore, SharedSession};
use super::view::{redact_outcome, StepView};
use crate::flow::{FormFlow, FormValues, SubmitOutcome};

/// Hosts many concurrent registrations over one shared flow definition.
pub struct RegistrationService<S> {
    flow: Arc<FormFlow>,
    sessions: Arc<S>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub view: StepView,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub outcome: SubmitOutcome,
    pub view: StepView,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackResponse {
    pub moved: bool,
    pub view: StepView,
}

impl<S> RegistrationService<S>
where
    S: SessionStore + 'static,
{
    pub fn new(flow: FormFlow, sessions: Arc<S>) -> Self {
        Self {
            flow: Arc::new(flow),
            sessions,
        }
    }

    pub fn flow(&self) -> &FormFlow {
        &self.flow
    }

    /// Opens a session positioned on the first step with the flow's initial values.
    pub fn start(&self) -> Result<SessionSnapshot, SessionError> {
        let session_id = SessionId::generate();
        let state = self.flow.start();
        let view = StepView::render(&self.flow, &state);
        self.sessions.insert(
            session_id,
            Arc::new(RegistrationSession::new(state, view.clone())),
        )?;
        info!(session = %session_id, "registration session started");
        Ok(SessionSnapshot { session_id, view })
    }

    /// Renders the session's current step.
    ///
    /// While a submit holds the session, the view rendered before it started is returned
    /// with `is_submitting` set.
    pub fn view(&self, id: &SessionId) -> Result<StepView, SessionError> {
        let session = self.session(id)?;
        let view = match session.state().try_lock() {
            Ok(state) => {
                let view = StepView::render(&self.flow, &state);
                session.remember(&view);
                view
            }
            Err(_) => StepView {
                is_submitting: true,
                previous_label: None,
                ..session.last_view()
            },
        };
        Ok(view)
    }

    /// Submits the current step. A session whose previous submit has not settled is
    /// rejected rather than queued. A completed registration is removed from the store.
    pub async fn submit(
        &self,
        id: &SessionId,
        values: FormValues,
    ) -> Result<SubmitResponse, SessionError> {
        let session = self.session(id)?;
        let mut state = session.state().try_lock().map_err(|_| {
            debug!(session = %id, "submit rejected while another is in flight");
            SessionError::SubmissionInProgress
        })?;

        let outcome = self.flow.submit(&mut state, values).await;
        let view = StepView::render(&self.flow, &state);
        session.remember(&view);
        if matches!(outcome, SubmitOutcome::Completed { .. }) {
            self.sessions.remove(id)?;
            info!(session = %id, "registration session completed");
        }
        Ok(SubmitResponse {
            outcome: redact_outcome(&self.flow, outcome),
            view,
        })
    }

    pub fn back(&self, id: &SessionId) -> Result<BackResponse, SessionError> {
        let session = self.session(id)?;
        let mut state = session
            .state()
            .try_lock()
            .map_err(|_| SessionError::SubmissionInProgress)?;
        let moved = self.flow.back(&mut state);
        let view = StepView::render(&self.flow, &state);
        session.remember(&view);
        Ok(BackResponse { moved, view })
    }

    /// Drops a session; returns whether it existed.
    pub fn abandon(&self, id: &SessionId) -> Result<bool, SessionError> {
        let removed = self.sessions.remove(id)?.is_some();
        if removed {
            info!(session = %id, "registration session abandoned");
        }
        Ok(removed)
    }

    fn session(&self, id: &SessionId) -> Result<SharedSession, SessionError> {
        self.sessions
            .fetch(id)?
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }
}
