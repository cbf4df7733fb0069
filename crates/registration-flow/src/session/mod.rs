//! Registration sessions served over HTTP: each session owns one `FlowState` behind an
//! async lock, all sessions share one `FormFlow`. Sessions leave the store when their
//! registration completes or when the client deletes them.

mod router;
mod service;
mod store;
mod view;

pub use router::registration_router;
pub use service::{BackResponse, RegistrationService, SessionSnapshot, SubmitResponse};
pub use store::{
    InMemorySessionStore, RegistrationSession, SessionError, SessionId, SessionStore,
    SharedSession,
};
pub use view::{redact_outcome, StepView, NEXT_LABEL, PREVIOUS_LABEL, SUBMIT_LABEL};
