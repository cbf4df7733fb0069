use serde::Serialize;

use crate::flow::{FieldKind, FieldSpec, FlowState, FormFlow, FormValues, SubmitOutcome};

pub const NEXT_LABEL: &str = "Next »";
pub const SUBMIT_LABEL: &str = "Submit ✓";
pub const PREVIOUS_LABEL: &str = "« Previous";

/// Render model for the step a session is currently on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepView {
    pub step_id: String,
    pub title: String,
    pub step_number: usize,
    pub step_count: usize,
    pub is_first_step: bool,
    pub is_last_step: bool,
    pub fields: Vec<FieldSpec>,
    /// Current answers for this step's fields. Password fields are never echoed.
    pub values: FormValues,
    pub submit_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_label: Option<&'static str>,
    /// True when the session is read while one of its submits is still running.
    pub is_submitting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl StepView {
    pub fn render(flow: &FormFlow, state: &FlowState) -> Self {
        let step = flow.current_step(state);
        let is_last_step = flow.is_last_step(state);
        let values = state.values().subset(
            step.fields()
                .iter()
                .filter(|field| !is_secret(field))
                .map(|field| field.name.as_str()),
        );

        Self {
            step_id: step.id().to_string(),
            title: step.title().to_string(),
            step_number: state.step_number(),
            step_count: state.navigator().step_count(),
            is_first_step: flow.is_first_step(state),
            is_last_step,
            fields: step.fields().to_vec(),
            values,
            submit_label: if is_last_step { SUBMIT_LABEL } else { NEXT_LABEL },
            previous_label: flow.can_go_back(state).then_some(PREVIOUS_LABEL),
            is_submitting: state.is_submitting(),
            error_message: state.error_message().map(str::to_string),
        }
    }
}

fn is_secret(field: &FieldSpec) -> bool {
    matches!(field.kind, FieldKind::Password)
}

/// Strips every password field of the flow from a completed submission before it is
/// returned to a client.
pub fn redact_outcome(flow: &FormFlow, outcome: SubmitOutcome) -> SubmitOutcome {
    match outcome {
        SubmitOutcome::Completed { mut values } => {
            for field in flow
                .candidates()
                .iter()
                .flat_map(|step| step.fields())
                .filter(|field| is_secret(field))
            {
                values.remove(&field.name);
            }
            SubmitOutcome::Completed { values }
        }
        other => other,
    }
}
