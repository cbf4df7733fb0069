use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use super::steps::{fields, SERVICE_MEMBER_STATUSES};
use crate::flow::{FieldErrors, FormValues, SubmitAction, SubmitError};

pub const EMAIL_TAKEN: &str = "has already been taken";

/// Account payload assembled from the accumulated registration answers.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct NewAccount {
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub zipcode: String,
    pub military_status: String,
    pub branch_of_service: Option<String>,
    pub pay_grade: Option<String>,
    pub programming_languages: Vec<String>,
    pub disciplines: Vec<String>,
}

impl NewAccount {
    /// Builds the payload, reporting every missing required answer at once.
    ///
    /// Military details are only carried when the status is a service-member status, so
    /// answers left behind by a step that later dropped out of the flow are ignored.
    pub fn from_values(values: &FormValues) -> Result<Self, SubmitError> {
        let mut missing = FieldErrors::new();
        let mut required = |field: &str| -> String {
            match values.text(field).map(str::trim) {
                Some(value) if !value.is_empty() => value.to_string(),
                _ => {
                    missing.add(field, "is required");
                    String::new()
                }
            }
        };

        let email = required(fields::EMAIL).to_ascii_lowercase();
        let password = required(fields::PASSWORD);
        let first_name = required(fields::FIRST_NAME);
        let last_name = required(fields::LAST_NAME);
        let zipcode = required(fields::ZIPCODE);
        let military_status = required(fields::MILITARY_STATUS);

        if !missing.is_empty() {
            return Err(SubmitError::FieldErrors(missing));
        }

        let serves = SERVICE_MEMBER_STATUSES.contains(&military_status.as_str());
        let optional = |field: &str| {
            values
                .text(field)
                .map(str::trim)
                .filter(|value| serves && !value.is_empty())
                .map(str::to_string)
        };

        Ok(Self {
            branch_of_service: optional(fields::BRANCH_OF_SERVICE),
            pay_grade: optional(fields::PAY_GRADE),
            programming_languages: owned_list(values, fields::PROGRAMMING_LANGUAGES),
            disciplines: owned_list(values, fields::DISCIPLINES),
            email,
            password,
            first_name,
            last_name,
            zipcode,
            military_status,
        })
    }
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("zipcode", &self.zipcode)
            .field("military_status", &self.military_status)
            .field("branch_of_service", &self.branch_of_service)
            .field("pay_grade", &self.pay_grade)
            .field("programming_languages", &self.programming_languages)
            .field("disciplines", &self.disciplines)
            .finish()
    }
}

fn owned_list(values: &FormValues, field: &str) -> Vec<String> {
    values.list(field).into_iter().map(str::to_string).collect()
}

/// Backend the registration flow talks to. Failures use the flow's error contract.
#[async_trait]
pub trait AccountGateway: Send + Sync {
    async fn email_available(&self, email: &str) -> Result<bool, SubmitError>;
    async fn register(&self, account: NewAccount) -> Result<(), SubmitError>;
}

/// Per-step action for the account page: rejects emails that are already registered.
pub struct EmailAvailabilityCheck<G> {
    gateway: Arc<G>,
}

impl<G> EmailAvailabilityCheck<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl<G> SubmitAction for EmailAvailabilityCheck<G>
where
    G: AccountGateway + 'static,
{
    async fn submit(&self, values: &FormValues) -> Result<(), SubmitError> {
        let email = values
            .text(fields::EMAIL)
            .map(|email| email.trim().to_ascii_lowercase())
            .unwrap_or_default();

        if self.gateway.email_available(&email).await? {
            Ok(())
        } else {
            Err(SubmitError::field(fields::EMAIL, EMAIL_TAKEN))
        }
    }
}

/// Final submission: turns the answers into a [`NewAccount`] and registers it.
pub struct CreateAccount<G> {
    gateway: Arc<G>,
}

impl<G> CreateAccount<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl<G> SubmitAction for CreateAccount<G>
where
    G: AccountGateway + 'static,
{
    async fn submit(&self, values: &FormValues) -> Result<(), SubmitError> {
        let account = NewAccount::from_values(values)?;
        tracing::debug!(email = %account.email, "registering account");
        self.gateway.register(account).await
    }
}
