use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::service::RegistrationService;
use super::store::{SessionError, SessionId, SessionStore};
use crate::error::AppError;
use crate::flow::{FormValues, SubmitOutcome};

/// Router exposing registration sessions over HTTP.
pub fn registration_router<S>(service: Arc<RegistrationService<S>>) -> Router
where
    S: SessionStore + 'static,
{
    Router::new()
        .route("/api/v1/registration/sessions", post(start_handler::<S>))
        .route(
            "/api/v1/registration/sessions/:session_id",
            get(view_handler::<S>).delete(abandon_handler::<S>),
        )
        .route(
            "/api/v1/registration/sessions/:session_id/submit",
            post(submit_handler::<S>),
        )
        .route(
            "/api/v1/registration/sessions/:session_id/back",
            post(back_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn start_handler<S>(
    State(service): State<Arc<RegistrationService<S>>>,
) -> Result<Response, AppError>
where
    S: SessionStore + 'static,
{
    let snapshot = service.start()?;
    Ok((StatusCode::CREATED, Json(snapshot)).into_response())
}

pub(crate) async fn view_handler<S>(
    State(service): State<Arc<RegistrationService<S>>>,
    Path(session_id): Path<String>,
) -> Result<Response, AppError>
where
    S: SessionStore + 'static,
{
    let id = SessionId::parse(&session_id)?;
    let view = service.view(&id)?;
    Ok((StatusCode::OK, Json(view)).into_response())
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<RegistrationService<S>>>,
    Path(session_id): Path<String>,
    Json(values): Json<FormValues>,
) -> Result<Response, AppError>
where
    S: SessionStore + 'static,
{
    let id = SessionId::parse(&session_id)?;
    let response = service.submit(&id, values).await?;
    let status = match response.outcome {
        SubmitOutcome::Invalid { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::OK,
    };
    Ok((status, Json(response)).into_response())
}

pub(crate) async fn back_handler<S>(
    State(service): State<Arc<RegistrationService<S>>>,
    Path(session_id): Path<String>,
) -> Result<Response, AppError>
where
    S: SessionStore + 'static,
{
    let id = SessionId::parse(&session_id)?;
    let response = service.back(&id)?;
    Ok((StatusCode::OK, Json(response)).into_response())
}

pub(crate) async fn abandon_handler<S>(
    State(service): State<Arc<RegistrationService<S>>>,
    Path(session_id): Path<String>,
) -> Result<Response, AppError>
where
    S: SessionStore + 'static,
{
    let id = SessionId::parse(&session_id)?;
    if service.abandon(&id)? {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(SessionError::NotFound(id.to_string()).into())
    }
}
