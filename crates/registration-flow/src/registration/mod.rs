//! The registration flow: account credentials, personal details, military background and
//! technology interests, finishing with account creation through an [`AccountGateway`].

mod gateway;
mod steps;

use std::sync::Arc;

pub use gateway::{AccountGateway, CreateAccount, EmailAvailabilityCheck, NewAccount, EMAIL_TAKEN};
pub use steps::{
    fields, ids, initial_step, military_details_step, military_status_step,
    personal_details_step, technology_step, MIN_PASSWORD_LENGTH, SERVICE_MEMBER_STATUSES,
};

use crate::flow::{ErrorNormalizer, FlowDefinitionError, FormFlow, StepDescriptor};

/// Candidate steps in declaration order.
pub fn registration_steps<G>(gateway: Arc<G>) -> Vec<StepDescriptor>
where
    G: AccountGateway + 'static,
{
    vec![
        initial_step(gateway),
        personal_details_step(),
        military_status_step(),
        military_details_step(),
        technology_step(),
    ]
}

pub fn registration_flow<G>(
    gateway: Arc<G>,
    normalizer: ErrorNormalizer,
) -> Result<FormFlow, FlowDefinitionError>
where
    G: AccountGateway + 'static,
{
    FormFlow::builder()
        .steps(registration_steps(Arc::clone(&gateway)))
        .final_submit(Arc::new(CreateAccount::new(gateway)))
        .normalizer(normalizer)
        .build()
}
