use super::common::*;
use crate::flow::{FieldSpec, FormFlow, FormValues, Inclusion, StepDescriptor, SubmitOutcome};

#[tokio::test]
async fn conditional_step_appears_after_its_trigger_is_answered() {
    let observed = HookLog::default();
    let sink = observed.clone();
    let flow = lettered_builder(
        RecordingAction::succeeding(),
        RecordingAction::succeeding(),
    )
    .on_step_submit(move |values| sink.record(values))
    .build()
    .expect("flow builds");
    let mut state = flow.start();

    assert_eq!(flow.active_steps(state.values()).ids(), vec!["a", "b", "d"]);
    flow.submit(&mut state, name("Ada")).await;
    assert_eq!(state.step_number(), 1);

    let outcome = flow
        .submit(&mut state, FormValues::new().with("flag", true))
        .await;

    assert_eq!(
        flow.active_steps(state.values()).ids(),
        vec!["a", "b", "c", "d"]
    );
    assert_eq!(
        outcome,
        SubmitOutcome::Advanced {
            from: "b".to_string(),
            to: "c".to_string(),
            step_number: 2,
        }
    );
    assert_eq!(
        observed.entries()[1].get("flag"),
        Some(&serde_json::Value::Bool(true))
    );
    assert!(!flow.is_last_step(&state));
}

#[tokio::test]
async fn answering_trigger_on_former_last_step_defers_terminal_submit() {
    let final_action = RecordingAction::succeeding();
    let flow = FormFlow::builder()
        .step(StepDescriptor::new("status", "Status").field(FieldSpec::text("status", "Status")))
        .step(
            StepDescriptor::new("details", "Details")
                .included(Inclusion::field_in("status", &["veteran", "current"])),
        )
        .final_submit(final_action.clone())
        .build()
        .expect("flow builds");
    let mut state = flow.start();
    assert!(flow.is_last_step(&state));

    let outcome = flow
        .submit(&mut state, FormValues::new().with("status", "veteran"))
        .await;

    assert!(matches!(outcome, SubmitOutcome::Advanced { ref to, .. } if to == "details"));
    assert_eq!(final_action.call_count(), 0);
    assert!(flow.is_last_step(&state));
}

#[tokio::test]
async fn removing_an_earlier_step_keeps_cursor_on_current_step() {
    let flow = FormFlow::builder()
        .step(StepDescriptor::new("plan", "Plan"))
        .step(
            StepDescriptor::new("team", "Team")
                .included(Inclusion::when(|values| values.text("mode") != Some("solo"))),
        )
        .step(StepDescriptor::new("review", "Review").field(FieldSpec::text("mode", "Mode")))
        .step(StepDescriptor::new("done", "Done"))
        .final_submit(RecordingAction::succeeding())
        .build()
        .expect("flow builds");
    let mut state = flow.start();

    flow.submit(&mut state, FormValues::new()).await;
    flow.submit(&mut state, FormValues::new()).await;
    assert_eq!(flow.current_step(&state).id(), "review");
    assert_eq!(state.step_number(), 2);

    let outcome = flow
        .submit(&mut state, FormValues::new().with("mode", "solo"))
        .await;

    assert_eq!(
        flow.active_steps(state.values()).ids(),
        vec!["plan", "review", "done"]
    );
    assert_eq!(
        outcome,
        SubmitOutcome::Advanced {
            from: "review".to_string(),
            to: "done".to_string(),
            step_number: 2,
        }
    );
}

#[tokio::test]
async fn step_excluding_itself_skips_ahead_without_running_its_action() {
    let skipped_action = RecordingAction::succeeding();
    let flow = FormFlow::builder()
        .step(StepDescriptor::new("intro", "Intro"))
        .step(
            StepDescriptor::new("optional", "Optional")
                .field(FieldSpec::text("skip", "Skip"))
                .action(skipped_action.clone())
                .included(Inclusion::when(|values| values.text("skip") != Some("yes"))),
        )
        .step(StepDescriptor::new("outro", "Outro"))
        .final_submit(RecordingAction::succeeding())
        .build()
        .expect("flow builds");
    let mut state = flow.start();
    flow.submit(&mut state, FormValues::new()).await;
    assert_eq!(flow.current_step(&state).id(), "optional");

    let outcome = flow
        .submit(&mut state, FormValues::new().with("skip", "yes"))
        .await;

    assert_eq!(
        outcome,
        SubmitOutcome::Advanced {
            from: "optional".to_string(),
            to: "outro".to_string(),
            step_number: 1,
        }
    );
    assert_eq!(skipped_action.call_count(), 0);
}

#[tokio::test]
async fn last_step_excluding_itself_finishes_the_flow() {
    let final_action = RecordingAction::succeeding();
    let flow = FormFlow::builder()
        .step(StepDescriptor::new("intro", "Intro"))
        .step(
            StepDescriptor::new("tail", "Tail")
                .field(FieldSpec::text("skip", "Skip"))
                .included(Inclusion::when(|values| values.text("skip") != Some("yes"))),
        )
        .final_submit(final_action.clone())
        .build()
        .expect("flow builds");
    let mut state = flow.start();
    flow.submit(&mut state, FormValues::new()).await;
    assert_eq!(state.step_number(), 1);

    let outcome = flow
        .submit(&mut state, FormValues::new().with("skip", "yes"))
        .await;

    assert!(matches!(outcome, SubmitOutcome::Completed { .. }));
    assert_eq!(final_action.call_count(), 1);
    assert_eq!(state.step_number(), 0);
}

#[tokio::test]
async fn cursor_stays_within_bounds_across_a_scripted_session() {
    let flow = lettered_flow(
        RecordingAction::succeeding(),
        RecordingAction::succeeding(),
    );
    let mut state = flow.start();
    let script = [
        name("Ada"),
        FormValues::new().with("flag", true),
        FormValues::new().with("detail", "x"),
    ];

    for values in script {
        flow.submit(&mut state, values).await;
        let active = flow.active_steps(state.values());
        assert!(state.step_number() < active.len());
        assert_eq!(state.navigator().step_count(), active.len());
    }

    assert!(flow.back(&mut state));
    assert!(flow.back(&mut state));
    assert_eq!(flow.current_step(&state).id(), "b");

    flow.submit(&mut state, FormValues::new().with("flag", false))
        .await;
    let active = flow.active_steps(state.values());
    assert_eq!(active.ids(), vec!["a", "b", "d"]);
    assert_eq!(flow.current_step(&state).id(), "d");
    assert!(state.step_number() < active.len());
}
