use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::errors::{FieldErrors, FlowDefinitionError, SubmitError};
use super::normalize::ErrorNormalizer;
use super::selector::{compute_active_steps, ActiveSteps};
use super::state::{FlowState, InFlight};
use super::step::{NoopAction, StepDescriptor, SubmitAction};
use super::values::FormValues;

/// Synchronous callback receiving a snapshot of the flow's values.
pub type ValuesHook = Arc<dyn Fn(&FormValues) + Send + Sync>;

/// What a single submit did. Exactly one of these per call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Step values were rejected before anything was merged.
    Invalid { step_id: String, errors: FieldErrors },
    /// The step's action succeeded and the cursor moved forward.
    Advanced {
        from: String,
        to: String,
        step_number: usize,
    },
    /// The final submission succeeded; state is back to its initial shape.
    Completed { values: FormValues },
    /// An action failed; the flow stays put with `message` displayed.
    Failed { step_id: String, message: String },
}

/// Where the cursor ended up after the submitted values were merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    OnStep,
    SkippedAhead,
    ClampedToEnd,
}

/// Declares a flow: candidate steps, the final submission and optional hooks.
#[derive(Default)]
pub struct FormFlowBuilder {
    steps: Vec<StepDescriptor>,
    initial_overrides: FormValues,
    final_submit: Option<Arc<dyn SubmitAction>>,
    on_step_submit: Option<ValuesHook>,
    on_complete: Option<ValuesHook>,
    normalizer: ErrorNormalizer,
}

impl FormFlowBuilder {
    pub fn step(mut self, step: StepDescriptor) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(mut self, steps: impl IntoIterator<Item = StepDescriptor>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Values layered over the union of the steps' own defaults.
    pub fn initial_values(mut self, values: FormValues) -> Self {
        self.initial_overrides.merge(&values);
        self
    }

    pub fn final_submit(mut self, action: Arc<dyn SubmitAction>) -> Self {
        self.final_submit = Some(action);
        self
    }

    /// Called with the merged values on every submit that passes validation.
    pub fn on_step_submit<F>(mut self, hook: F) -> Self
    where
        F: Fn(&FormValues) + Send + Sync + 'static,
    {
        self.on_step_submit = Some(Arc::new(hook));
        self
    }

    /// Called once with the submitted values after the final submission succeeds.
    pub fn on_complete<F>(mut self, hook: F) -> Self
    where
        F: Fn(&FormValues) + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(hook));
        self
    }

    pub fn normalizer(mut self, normalizer: ErrorNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn build(self) -> Result<FormFlow, FlowDefinitionError> {
        if self.steps.is_empty() {
            return Err(FlowDefinitionError::NoSteps);
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.id()) {
                return Err(FlowDefinitionError::DuplicateStep(step.id().to_string()));
            }
        }

        let anchor = self
            .steps
            .iter()
            .position(|step| !step.inclusion().is_conditional())
            .ok_or(FlowDefinitionError::NoUnconditionalStep)?;

        let final_submit = self
            .final_submit
            .ok_or(FlowDefinitionError::MissingTerminalSubmit)?;

        let mut initial_values = FormValues::new();
        for step in &self.steps {
            initial_values.merge(step.defaults());
        }
        initial_values.merge(&self.initial_overrides);

        Ok(FormFlow {
            steps: self.steps,
            anchor,
            initial_values,
            final_submit,
            on_step_submit: self.on_step_submit,
            on_complete: self.on_complete,
            normalizer: self.normalizer,
        })
    }
}

/// Immutable flow definition; all per-instance data lives in [`FlowState`].
pub struct FormFlow {
    steps: Vec<StepDescriptor>,
    anchor: usize,
    initial_values: FormValues,
    final_submit: Arc<dyn SubmitAction>,
    on_step_submit: Option<ValuesHook>,
    on_complete: Option<ValuesHook>,
    normalizer: ErrorNormalizer,
}

impl FormFlow {
    pub fn builder() -> FormFlowBuilder {
        FormFlowBuilder::default()
    }

    pub fn candidates(&self) -> &[StepDescriptor] {
        &self.steps
    }

    pub fn initial_values(&self) -> &FormValues {
        &self.initial_values
    }

    pub fn normalizer(&self) -> &ErrorNormalizer {
        &self.normalizer
    }

    pub fn start(&self) -> FlowState {
        let step_count = self.active_steps(&self.initial_values).len();
        FlowState::new(self.initial_values.clone(), step_count)
    }

    pub fn active_steps(&self, values: &FormValues) -> ActiveSteps<'_> {
        compute_active_steps(&self.steps, values)
    }

    pub fn current_step(&self, state: &FlowState) -> &StepDescriptor {
        let active = self.active_steps(&state.values);
        active
            .get(state.navigator.step_number())
            .or_else(|| active.get(active.len().saturating_sub(1)))
            .unwrap_or(&self.steps[self.anchor])
    }

    pub fn is_first_step(&self, state: &FlowState) -> bool {
        state.navigator.is_first_step()
    }

    pub fn is_last_step(&self, state: &FlowState) -> bool {
        state.navigator.is_last_step()
    }

    /// Whether "previous" is currently allowed: not on the first step, not mid-submit,
    /// and the previous step is not locked.
    pub fn can_go_back(&self, state: &FlowState) -> bool {
        if state.status.is_submitting || state.navigator.is_first_step() {
            return false;
        }
        self.active_steps(&state.values)
            .get(state.navigator.step_number() - 1)
            .is_some_and(|previous| !previous.is_locked_on_leave())
    }

    /// Moves to the previous step when allowed. Returns whether the cursor moved.
    pub fn back(&self, state: &mut FlowState) -> bool {
        if !self.can_go_back(state) {
            debug!(
                step_number = state.navigator.step_number(),
                "ignoring back request"
            );
            return false;
        }
        state.navigator.retreat()
    }

    /// Errors the current step would report for `step_values` merged over the state.
    /// Keys the current step does not own are ignored.
    pub fn validate(&self, state: &FlowState, step_values: &FormValues) -> FieldErrors {
        let step = self.current_step(state);
        let candidate = state.values.merged(&accepted_values(step, step_values));
        step.validate(&candidate)
    }

    /// Runs one submit of the current step.
    ///
    /// Only the keys the current step owns are taken from `step_values`, so a submit can
    /// never rewrite answers given on another step. Values are merged only after
    /// validation passes. On the last active step the final submission runs; elsewhere the
    /// step's own action runs and the cursor advances. Failures never escape: they are
    /// normalized into the state's error message.
    pub async fn submit(&self, state: &mut FlowState, step_values: FormValues) -> SubmitOutcome {
        let step = self.current_step(state);
        let step_id = step.id().to_string();

        let step_values = accepted_values(step, &step_values);
        let errors = step.validate(&state.values.merged(&step_values));
        if !errors.is_empty() {
            debug!(step = %step_id, fields = errors.len(), "step values failed validation");
            return SubmitOutcome::Invalid { step_id, errors };
        }

        state.values.merge(&step_values);
        let placement = self.follow_step(state, step);

        let is_last = placement != Placement::SkippedAhead && state.navigator.is_last_step();
        debug!(
            step = %step_id,
            step_number = state.navigator.step_number(),
            step_count = state.navigator.step_count(),
            is_last,
            "submitting step"
        );

        let result = {
            let _in_flight = InFlight::begin(&mut state.status);
            if let Some(hook) = &self.on_step_submit {
                hook(&state.values);
            }
            if placement == Placement::SkippedAhead {
                Ok(())
            } else if is_last {
                self.final_submit.submit(&state.values).await
            } else {
                match step.submit_action() {
                    Some(action) => action.submit(&state.values).await,
                    None => NoopAction.submit(&state.values).await,
                }
            }
        };

        match result {
            Ok(()) if is_last => self.complete(state, &step_id),
            Ok(()) if placement == Placement::SkippedAhead => self.advanced(state, step_id),
            Ok(()) => match state.navigator.advance() {
                Ok(()) => self.advanced(state, step_id),
                Err(err) => {
                    warn!(step = %step_id, error = %err, "advance rejected");
                    self.fail(state, step_id, &SubmitError::Generic { message: None })
                }
            },
            Err(error) => self.fail(state, step_id, &error),
        }
    }

    /// Recomputes the active list after a value change and places the cursor.
    ///
    /// The cursor stays on `step` when it survived. When the answers just merged removed
    /// `step` itself, the cursor lands on the first active step declared after it, or on
    /// the last active step if none follows.
    fn follow_step(&self, state: &mut FlowState, step: &StepDescriptor) -> Placement {
        let active = self.active_steps(&state.values);
        state.navigator.resync(active.len());

        let (index, placement) = match active.position(step.id()) {
            Some(position) => (position, Placement::OnStep),
            None => {
                let next = self
                    .steps
                    .iter()
                    .take_while(|candidate| candidate.id() != step.id())
                    .filter(|candidate| candidate.inclusion().includes(&state.values))
                    .count();
                if next < active.len() {
                    (next, Placement::SkippedAhead)
                } else {
                    (active.len().saturating_sub(1), Placement::ClampedToEnd)
                }
            }
        };

        if let Err(err) = state.navigator.jump_to(index) {
            warn!(step = %step.id(), error = %err, "unable to place cursor");
        }
        if placement != Placement::OnStep {
            debug!(step = %step.id(), ?placement, index, "submitted step left the active list");
        }
        placement
    }

    fn advanced(&self, state: &FlowState, from: String) -> SubmitOutcome {
        let to = self.current_step(state).id().to_string();
        info!(from = %from, to = %to, "advanced to next step");
        SubmitOutcome::Advanced {
            from,
            to,
            step_number: state.navigator.step_number(),
        }
    }

    fn complete(&self, state: &mut FlowState, step_id: &str) -> SubmitOutcome {
        let values = std::mem::replace(&mut state.values, self.initial_values.clone());
        let step_count = self.active_steps(&state.values).len();
        state.navigator.reset(step_count);
        info!(step = %step_id, fields = values.len(), "flow completed");

        if let Some(hook) = &self.on_complete {
            hook(&values);
        }
        SubmitOutcome::Completed { values }
    }

    fn fail(&self, state: &mut FlowState, step_id: String, error: &SubmitError) -> SubmitOutcome {
        let message = self.normalizer.normalize(error);
        warn!(step = %step_id, error = %error, message = %message, "step submission failed");
        state.status.error_message = Some(message.clone());
        SubmitOutcome::Failed { step_id, message }
    }
}

fn accepted_values(step: &StepDescriptor, submitted: &FormValues) -> FormValues {
    let accepted = submitted.subset(step.owned_fields());
    if accepted.len() < submitted.len() {
        let ignored: Vec<&str> = submitted
            .iter()
            .map(|(name, _)| name.as_str())
            .filter(|name| !accepted.contains(name))
            .collect();
        debug!(step = %step.id(), ?ignored, "ignoring fields the step does not own");
    }
    accepted
}

impl fmt::Debug for FormFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormFlow")
            .field("steps", &self.steps)
            .field("initial_values", &self.initial_values)
            .field("normalizer", &self.normalizer)
            .finish_non_exhaustive()
    }
}
