use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use registration_flow::config::FlowConfig;
use registration_flow::flow::SubmitError;
use registration_flow::registration::{
    fields, registration_flow, AccountGateway, NewAccount, EMAIL_TAKEN,
};
use registration_flow::session::{InMemorySessionStore, RegistrationService};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local account backend keyed by lowercase email.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAccountDirectory {
    accounts: Arc<Mutex<HashMap<String, Option<NewAccount>>>>,
}

impl InMemoryAccountDirectory {
    /// Marks `email` as registered without an account body, e.g. for demos.
    pub(crate) fn reserve(&self, email: &str) {
        let mut guard = self
            .accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        guard.insert(email.trim().to_ascii_lowercase(), None);
    }

    pub(crate) fn accounts(&self) -> Vec<NewAccount> {
        let guard = self
            .accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        guard.values().flatten().cloned().collect()
    }
}

fn unavailable() -> SubmitError {
    SubmitError::transport("account directory unavailable")
}

#[async_trait]
impl AccountGateway for InMemoryAccountDirectory {
    async fn email_available(&self, email: &str) -> Result<bool, SubmitError> {
        let guard = self.accounts.lock().map_err(|_| unavailable())?;
        Ok(!guard.contains_key(email))
    }

    async fn register(&self, account: NewAccount) -> Result<(), SubmitError> {
        let mut guard = self.accounts.lock().map_err(|_| unavailable())?;
        if guard.contains_key(&account.email) {
            return Err(SubmitError::field(fields::EMAIL, EMAIL_TAKEN));
        }
        info!(email = %account.email, "account registered");
        guard.insert(account.email.clone(), Some(account));
        Ok(())
    }
}

pub(crate) fn registration_service(
    directory: Arc<InMemoryAccountDirectory>,
    config: &FlowConfig,
) -> Result<Arc<RegistrationService<InMemorySessionStore>>, registration_flow::error::AppError> {
    let flow = registration_flow(directory, config.normalizer())?;
    let sessions = Arc::new(InMemorySessionStore::new());
    Ok(Arc::new(RegistrationService::new(flow, sessions)))
}
