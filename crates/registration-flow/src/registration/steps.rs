use std::sync::Arc;

use super::gateway::{AccountGateway, EmailAvailabilityCheck};
use crate::flow::validation::{digits, matches, min_length};
use crate::flow::{FieldSpec, Inclusion, SelectOption, StepDescriptor};

pub mod fields {
    pub const EMAIL: &str = "email";
    pub const PASSWORD: &str = "password";
    pub const CONFIRM_PASSWORD: &str = "confirm_password";
    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "last_name";
    pub const ZIPCODE: &str = "zipcode";
    pub const MILITARY_STATUS: &str = "military_status";
    pub const BRANCH_OF_SERVICE: &str = "branch_of_service";
    pub const PAY_GRADE: &str = "pay_grade";
    pub const PROGRAMMING_LANGUAGES: &str = "programming_languages";
    pub const DISCIPLINES: &str = "disciplines";
}

pub mod ids {
    pub const INITIAL: &str = "initial";
    pub const PERSONAL_DETAILS: &str = "personal_details";
    pub const MILITARY_STATUS: &str = "military_status";
    pub const MILITARY_DETAILS: &str = "military_details";
    pub const TECHNOLOGY: &str = "technology";
}

/// Statuses that bring the military details step into the flow.
pub const SERVICE_MEMBER_STATUSES: [&str; 2] = ["current", "veteran"];

pub const MIN_PASSWORD_LENGTH: usize = 8;

fn options(pairs: &[(&str, &str)]) -> Vec<SelectOption> {
    pairs
        .iter()
        .map(|(value, label)| SelectOption::new(*value, *label))
        .collect()
}

/// Account credentials. Locked once left so the email check never reruns for a new address.
pub fn initial_step<G>(gateway: Arc<G>) -> StepDescriptor
where
    G: AccountGateway + 'static,
{
    StepDescriptor::new(ids::INITIAL, "Create your account")
        .field(FieldSpec::email(fields::EMAIL, "Email").required())
        .field(FieldSpec::password(fields::PASSWORD, "Password").required())
        .field(FieldSpec::password(fields::CONFIRM_PASSWORD, "Confirm Password").required())
        .rule(min_length(fields::PASSWORD, MIN_PASSWORD_LENGTH))
        .rule(matches(
            fields::CONFIRM_PASSWORD,
            fields::PASSWORD,
            "must match password",
        ))
        .action(Arc::new(EmailAvailabilityCheck::new(gateway)))
        .locks_on_leave()
}

pub fn personal_details_step() -> StepDescriptor {
    StepDescriptor::new(ids::PERSONAL_DETAILS, "Tell us about yourself")
        .field(FieldSpec::text(fields::FIRST_NAME, "First Name").required())
        .field(FieldSpec::text(fields::LAST_NAME, "Last Name").required())
        .field(FieldSpec::text(fields::ZIPCODE, "Zip Code").required())
        .rule(digits(fields::ZIPCODE, 5))
}

pub fn military_status_step() -> StepDescriptor {
    StepDescriptor::new(ids::MILITARY_STATUS, "Military status")
        .field(
            FieldSpec::select(
                fields::MILITARY_STATUS,
                "Which best describes you?",
                options(&[
                    ("current", "Current Service Member"),
                    ("veteran", "Veteran"),
                    ("spouse", "Military Spouse"),
                    ("civilian", "Civilian / No Affiliation"),
                ]),
            )
            .required(),
        )
}

/// Only shown to current service members and veterans.
pub fn military_details_step() -> StepDescriptor {
    StepDescriptor::new(ids::MILITARY_DETAILS, "Military details")
        .field(
            FieldSpec::select(
                fields::BRANCH_OF_SERVICE,
                "Branch of Service",
                options(&[
                    ("army", "Army"),
                    ("navy", "Navy"),
                    ("air_force", "Air Force"),
                    ("marine_corps", "Marine Corps"),
                    ("coast_guard", "Coast Guard"),
                    ("space_force", "Space Force"),
                ]),
            )
            .required(),
        )
        .field(FieldSpec::select(
            fields::PAY_GRADE,
            "Pay Grade",
            pay_grades(),
        ))
        .included(Inclusion::field_in(
            fields::MILITARY_STATUS,
            &SERVICE_MEMBER_STATUSES,
        ))
}

pub fn technology_step() -> StepDescriptor {
    StepDescriptor::new(ids::TECHNOLOGY, "Technology")
        .field(FieldSpec::multi_select(
            fields::PROGRAMMING_LANGUAGES,
            "Programming Languages",
            options(&[
                ("javascript", "JavaScript"),
                ("python", "Python"),
                ("ruby", "Ruby"),
                ("java", "Java"),
                ("csharp", "C#"),
                ("go", "Go"),
                ("rust", "Rust"),
                ("other", "Other"),
            ]),
        ))
        .field(FieldSpec::multi_select(
            fields::DISCIPLINES,
            "Disciplines",
            options(&[
                ("frontend", "Front-end"),
                ("backend", "Back-end"),
                ("devops", "DevOps"),
                ("data", "Data"),
                ("design", "Design"),
                ("mobile", "Mobile"),
                ("security", "Security"),
            ]),
        ))
}

/// Enlisted E-1..E-9, warrant W-1..W-5, officer O-1..O-10.
fn pay_grades() -> Vec<SelectOption> {
    [('E', 9), ('W', 5), ('O', 10)]
        .into_iter()
        .flat_map(|(prefix, top)| {
            (1..=top).map(move |grade| {
                let code = format!("{prefix}-{grade}");
                SelectOption::new(code.clone(), code)
            })
        })
        .collect()
}
