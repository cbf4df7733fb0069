mod common;

use common::*;
use registration_flow::flow::{FormValues, SubmitOutcome};
use registration_flow::registration::{fields, ids};

#[tokio::test]
async fn veteran_registration_visits_military_details_and_creates_account() {
    let directory = AccountDirectory::with_taken(&[]);
    let flow = flow_with(directory.clone());
    let mut state = flow.start();
    assert_eq!(
        flow.active_steps(state.values()).ids(),
        vec![
            ids::INITIAL,
            ids::PERSONAL_DETAILS,
            ids::MILITARY_STATUS,
            ids::TECHNOLOGY
        ]
    );

    flow.submit(&mut state, credentials("Grace@Example.com")).await;
    flow.submit(&mut state, personal_details()).await;
    let outcome = flow.submit(&mut state, military_status("veteran")).await;
    assert_eq!(
        outcome,
        SubmitOutcome::Advanced {
            from: ids::MILITARY_STATUS.to_string(),
            to: ids::MILITARY_DETAILS.to_string(),
            step_number: 3,
        }
    );
    assert_eq!(state.navigator().step_count(), 5);

    flow.submit(&mut state, military_details()).await;
    assert!(flow.is_last_step(&state));
    let outcome = flow.submit(&mut state, technology()).await;

    let SubmitOutcome::Completed { values } = outcome else {
        panic!("expected completion, got {outcome:?}");
    };
    assert_eq!(values.text(fields::BRANCH_OF_SERVICE), Some("navy"));

    let registered = directory.registered();
    assert_eq!(registered.len(), 1);
    let account = &registered[0];
    assert_eq!(account.email, "grace@example.com");
    assert_eq!(account.military_status, "veteran");
    assert_eq!(account.branch_of_service.as_deref(), Some("navy"));
    assert_eq!(account.pay_grade.as_deref(), Some("O-10"));
    assert_eq!(account.programming_languages, vec!["python", "rust"]);

    assert_eq!(state.step_number(), 0);
    assert_eq!(state.values(), flow.initial_values());
}

#[tokio::test]
async fn last_step_cannot_rewrite_earlier_answers() {
    let directory = AccountDirectory::with_taken(&["taken@example.com"]);
    let flow = flow_with(directory.clone());
    let mut state = flow.start();
    flow.submit(&mut state, credentials("grace@example.com")).await;
    flow.submit(&mut state, personal_details()).await;
    flow.submit(&mut state, military_status("civilian")).await;
    assert_eq!(flow.current_step(&state).id(), ids::TECHNOLOGY);

    let outcome = flow
        .submit(
            &mut state,
            technology()
                .with(fields::ZIPCODE, "not-a-zip")
                .with(fields::MILITARY_STATUS, "bogus")
                .with(fields::EMAIL, "taken@example.com"),
        )
        .await;

    let SubmitOutcome::Completed { values } = outcome else {
        panic!("expected completion, got {outcome:?}");
    };
    assert_eq!(values.text(fields::ZIPCODE), Some("10001"));
    let registered = directory.registered();
    assert_eq!(registered.len(), 1);
    let account = &registered[0];
    assert_eq!(account.email, "grace@example.com");
    assert_eq!(account.zipcode, "10001");
    assert_eq!(account.military_status, "civilian");
}

#[tokio::test]
async fn taken_email_keeps_user_on_first_step() {
    let flow = flow_with(AccountDirectory::with_taken(&["grace@example.com"]));
    let mut state = flow.start();

    let outcome = flow.submit(&mut state, credentials("Grace@Example.com")).await;

    assert_eq!(
        outcome,
        SubmitOutcome::Failed {
            step_id: ids::INITIAL.to_string(),
            message: "Email has already been taken.".to_string(),
        }
    );
    assert_eq!(state.step_number(), 0);
    assert_eq!(state.error_message(), Some("Email has already been taken."));

    let retry = flow.submit(&mut state, credentials("grace@navy.mil")).await;
    assert!(matches!(retry, SubmitOutcome::Advanced { .. }));
    assert!(state.error_message().is_none());
}

#[tokio::test]
async fn credentials_are_validated_before_the_email_check() {
    let flow = flow_with(AccountDirectory::with_taken(&[]));
    let mut state = flow.start();

    let outcome = flow
        .submit(
            &mut state,
            FormValues::new()
                .with(fields::EMAIL, "grace")
                .with(fields::PASSWORD, "short")
                .with(fields::CONFIRM_PASSWORD, "shorter"),
        )
        .await;

    let SubmitOutcome::Invalid { step_id, errors } = outcome else {
        panic!("expected validation failure, got {outcome:?}");
    };
    assert_eq!(step_id, ids::INITIAL);
    assert_eq!(
        errors.first(fields::EMAIL),
        Some("must be a valid email address")
    );
    assert_eq!(
        errors.first(fields::PASSWORD),
        Some("must be at least 8 characters")
    );
    assert_eq!(
        errors.first(fields::CONFIRM_PASSWORD),
        Some("must match password")
    );
    assert_eq!(state.values().text(fields::EMAIL), Some(""));
}

#[tokio::test]
async fn account_step_cannot_be_revisited_once_left() {
    let flow = flow_with(AccountDirectory::with_taken(&[]));
    let mut state = flow.start();
    flow.submit(&mut state, credentials("grace@example.com")).await;

    assert_eq!(flow.current_step(&state).id(), ids::PERSONAL_DETAILS);
    assert!(!flow.can_go_back(&state));
    assert!(!flow.back(&mut state));
}

#[tokio::test]
async fn switching_to_civilian_drops_military_details() {
    let directory = AccountDirectory::with_taken(&[]);
    let flow = flow_with(directory.clone());
    let mut state = flow.start();
    flow.submit(&mut state, credentials("grace@example.com")).await;
    flow.submit(&mut state, personal_details()).await;
    flow.submit(&mut state, military_status("current")).await;
    flow.submit(&mut state, military_details()).await;
    assert_eq!(flow.current_step(&state).id(), ids::TECHNOLOGY);

    assert!(flow.back(&mut state));
    assert!(flow.back(&mut state));
    assert_eq!(flow.current_step(&state).id(), ids::MILITARY_STATUS);

    let outcome = flow.submit(&mut state, military_status("civilian")).await;
    assert_eq!(
        outcome,
        SubmitOutcome::Advanced {
            from: ids::MILITARY_STATUS.to_string(),
            to: ids::TECHNOLOGY.to_string(),
            step_number: 3,
        }
    );
    assert!(flow.is_last_step(&state));

    let outcome = flow.submit(&mut state, technology()).await;
    assert!(matches!(outcome, SubmitOutcome::Completed { .. }));
    let account = &directory.registered()[0];
    assert_eq!(account.military_status, "civilian");
    assert_eq!(account.branch_of_service, None);
    assert_eq!(account.pay_grade, None);
}

#[tokio::test]
async fn failed_account_creation_keeps_every_answer() {
    let flow = flow_with(AccountDirectory::offline());
    let mut state = flow.start();
    flow.submit(&mut state, credentials("grace@example.com")).await;
    flow.submit(&mut state, personal_details()).await;
    flow.submit(&mut state, military_status("spouse")).await;
    let last = state.step_number();

    let outcome = flow.submit(&mut state, technology()).await;

    assert_eq!(
        outcome,
        SubmitOutcome::Failed {
            step_id: ids::TECHNOLOGY.to_string(),
            message: "Network Error".to_string(),
        }
    );
    assert_eq!(state.step_number(), last);
    assert_eq!(state.values().text(fields::FIRST_NAME), Some("Grace"));
    assert_eq!(state.values().list(fields::DISCIPLINES), vec!["backend"]);
    assert!(!state.is_submitting());
}
