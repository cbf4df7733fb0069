use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::flow::{
    FieldSpec, FormFlow, FormFlowBuilder, FormValues, Inclusion, StepDescriptor, SubmitAction,
    SubmitError,
};

/// Submit action that records every call and replays scripted results.
#[derive(Default)]
pub(super) struct RecordingAction {
    calls: Mutex<Vec<FormValues>>,
    scripted: Mutex<VecDeque<Result<(), SubmitError>>>,
}

impl RecordingAction {
    pub(super) fn succeeding() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(super) fn failing_once(error: SubmitError) -> Arc<Self> {
        let action = Self::default();
        action
            .scripted
            .lock()
            .expect("script mutex poisoned")
            .push_back(Err(error));
        Arc::new(action)
    }

    pub(super) fn calls(&self) -> Vec<FormValues> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    pub(super) fn call_count(&self) -> usize {
        self.calls.lock().expect("calls mutex poisoned").len()
    }
}

#[async_trait]
impl SubmitAction for RecordingAction {
    async fn submit(&self, values: &FormValues) -> Result<(), SubmitError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(values.clone());
        self.scripted
            .lock()
            .expect("script mutex poisoned")
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

/// Never settles; used to abandon a submit mid-flight.
pub(super) struct PendingAction;

#[async_trait]
impl SubmitAction for PendingAction {
    async fn submit(&self, _values: &FormValues) -> Result<(), SubmitError> {
        std::future::pending().await
    }
}

/// Shared hook sink for observer and completion callbacks.
#[derive(Clone, Default)]
pub(super) struct HookLog {
    seen: Arc<Mutex<Vec<FormValues>>>,
}

impl HookLog {
    pub(super) fn record(&self, values: &FormValues) {
        self.seen
            .lock()
            .expect("hook mutex poisoned")
            .push(values.clone());
    }

    pub(super) fn entries(&self) -> Vec<FormValues> {
        self.seen.lock().expect("hook mutex poisoned").clone()
    }
}

/// Steps A, B, C (only while `flag` is true) and D.
pub(super) fn lettered_steps(b_action: Arc<RecordingAction>) -> Vec<StepDescriptor> {
    vec![
        StepDescriptor::new("a", "Step A").field(FieldSpec::text("name", "Name").required()),
        StepDescriptor::new("b", "Step B")
            .default_value("flag", false)
            .action(b_action),
        StepDescriptor::new("c", "Step C")
            .field(FieldSpec::text("detail", "Detail"))
            .included(Inclusion::field_equals("flag", true)),
        StepDescriptor::new("d", "Step D").field(FieldSpec::text("confirm", "Confirm")),
    ]
}

pub(super) fn lettered_builder(
    b_action: Arc<RecordingAction>,
    final_action: Arc<RecordingAction>,
) -> FormFlowBuilder {
    FormFlow::builder()
        .steps(lettered_steps(b_action))
        .final_submit(final_action)
}

pub(super) fn lettered_flow(
    b_action: Arc<RecordingAction>,
    final_action: Arc<RecordingAction>,
) -> FormFlow {
    lettered_builder(b_action, final_action)
        .build()
        .expect("lettered flow builds")
}

pub(super) fn name(value: &str) -> FormValues {
    FormValues::new().with("name", value)
}
