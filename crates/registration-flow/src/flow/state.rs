use serde::Serialize;

use super::navigator::StepNavigator;
use super::values::FormValues;

/// Transient status of the submit in progress (or the last one that settled).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionStatus {
    pub is_submitting: bool,
    pub error_message: Option<String>,
}

/// Everything one flow instance owns: answers so far, cursor, submit status.
#[derive(Debug, Clone, Serialize)]
pub struct FlowState {
    pub(crate) values: FormValues,
    pub(crate) navigator: StepNavigator,
    pub(crate) status: SubmissionStatus,
}

impl FlowState {
    pub(crate) fn new(values: FormValues, step_count: usize) -> Self {
        Self {
            values,
            navigator: StepNavigator::new(step_count),
            status: SubmissionStatus::default(),
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn step_number(&self) -> usize {
        self.navigator.step_number()
    }

    pub fn navigator(&self) -> &StepNavigator {
        &self.navigator
    }

    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.status.is_submitting
    }

    pub fn error_message(&self) -> Option<&str> {
        self.status.error_message.as_deref()
    }
}

/// Marks a submit as in flight; dropping it always clears the flag, so an abandoned
/// submit future cannot leave the form locked.
pub(crate) struct InFlight<'a> {
    status: &'a mut SubmissionStatus,
}

impl<'a> InFlight<'a> {
    pub(crate) fn begin(status: &'a mut SubmissionStatus) -> Self {
        status.error_message = None;
        status.is_submitting = true;
        Self { status }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.status.is_submitting = false;
    }
}
