#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use registration_flow::flow::{ErrorNormalizer, FormFlow, FormValues, SubmitError};
use registration_flow::registration::{fields, registration_flow, AccountGateway, NewAccount};
use serde_json::json;

/// Account backend double: a set of known emails plus every account registered.
#[derive(Default)]
pub struct AccountDirectory {
    taken: Mutex<BTreeSet<String>>,
    registered: Mutex<Vec<NewAccount>>,
    offline: bool,
}

impl AccountDirectory {
    pub fn with_taken(emails: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            taken: Mutex::new(emails.iter().map(|email| email.to_string()).collect()),
            ..Self::default()
        })
    }

    pub fn offline() -> Arc<Self> {
        Arc::new(Self {
            offline: true,
            ..Self::default()
        })
    }

    pub fn registered(&self) -> Vec<NewAccount> {
        self.registered.lock().expect("registered lock").clone()
    }
}

#[async_trait]
impl AccountGateway for AccountDirectory {
    async fn email_available(&self, email: &str) -> Result<bool, SubmitError> {
        Ok(!self.taken.lock().expect("taken lock").contains(email))
    }

    async fn register(&self, account: NewAccount) -> Result<(), SubmitError> {
        if self.offline {
            return Err(SubmitError::transport("Network Error"));
        }
        self.taken
            .lock()
            .expect("taken lock")
            .insert(account.email.clone());
        self.registered
            .lock()
            .expect("registered lock")
            .push(account);
        Ok(())
    }
}

pub fn flow_with(directory: Arc<AccountDirectory>) -> FormFlow {
    registration_flow(directory, ErrorNormalizer::default()).expect("registration flow builds")
}

pub fn credentials(email: &str) -> FormValues {
    FormValues::new()
        .with(fields::EMAIL, email)
        .with(fields::PASSWORD, "correct horse")
        .with(fields::CONFIRM_PASSWORD, "correct horse")
}

pub fn personal_details() -> FormValues {
    FormValues::new()
        .with(fields::FIRST_NAME, "Grace")
        .with(fields::LAST_NAME, "Hopper")
        .with(fields::ZIPCODE, "10001")
}

pub fn military_status(status: &str) -> FormValues {
    FormValues::new().with(fields::MILITARY_STATUS, status)
}

pub fn military_details() -> FormValues {
    FormValues::new()
        .with(fields::BRANCH_OF_SERVICE, "navy")
        .with(fields::PAY_GRADE, "O-10")
}

pub fn technology() -> FormValues {
    FormValues::new()
        .with(fields::PROGRAMMING_LANGUAGES, json!(["python", "rust"]))
        .with(fields::DISCIPLINES, json!(["backend"]))
}
