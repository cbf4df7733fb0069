use super::step::StepDescriptor;
use super::values::FormValues;

/// Steps taking part in the flow for the current answers, in declaration order.
#[derive(Debug, Clone)]
pub struct ActiveSteps<'a> {
    steps: Vec<&'a StepDescriptor>,
}

impl<'a> ActiveSteps<'a> {
    pub fn get(&self, index: usize) -> Option<&'a StepDescriptor> {
        self.steps.get(index).copied()
    }

    pub fn position(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.id() == step_id)
    }

    pub fn ids(&self) -> Vec<&'a str> {
        self.steps.iter().map(|step| step.id()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a StepDescriptor> + '_ {
        self.steps.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Filters `candidates` down to the steps whose inclusion holds for `values`.
///
/// Pure: the list is rebuilt from scratch on every call, never patched.
pub fn compute_active_steps<'a>(
    candidates: &'a [StepDescriptor],
    values: &FormValues,
) -> ActiveSteps<'a> {
    ActiveSteps {
        steps: candidates
            .iter()
            .filter(|step| step.inclusion().includes(values))
            .collect(),
    }
}
