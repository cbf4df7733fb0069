//! Multi-step form engine.
//!
//! A [`FormFlow`] is the immutable declaration (candidate steps, final submission,
//! hooks); a [`FlowState`] is the caller-owned instance data. The active step list is
//! always recomputed from the accumulated values rather than edited in place, and every
//! submit failure is folded into a display message by the [`ErrorNormalizer`].

mod controller;
mod errors;
mod navigator;
mod normalize;
mod selector;
mod state;
mod step;
pub mod validation;
mod values;

#[cfg(test)]
mod tests;

pub use controller::{FormFlow, FormFlowBuilder, SubmitOutcome, ValuesHook};
pub use errors::{FieldErrors, FlowDefinitionError, NavigationError, SubmitError};
pub use navigator::StepNavigator;
pub use normalize::{ErrorNormalizer, DEFAULT_ERROR_MESSAGE};
pub use selector::{compute_active_steps, ActiveSteps};
pub use state::{FlowState, SubmissionStatus};
pub use step::{
    FieldKind, FieldSpec, Inclusion, NoopAction, SelectOption, StepDescriptor, SubmitAction,
};
pub use values::FormValues;
