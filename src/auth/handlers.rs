use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{CredentialsRequest, MessageResponse},
        error::AuthError,
        validation::FieldError,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AuthError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!(error = %rejection, "unreadable register body");
        AuthError::Validation(vec![FieldError::new(
            "body",
            "Expected a JSON object with username and password",
        )])
    })?;

    state.auth.register(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created successfully")),
    ))
}

/// Every failure short of an internal one is the same 401, whatever the cause.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AuthError> {
    let Ok(Json(payload)) = payload else {
        warn!("unreadable login body");
        return Err(AuthError::InvalidCredentials);
    };

    if !state.auth.authenticate(&payload).await? {
        warn!("login rejected");
        return Err(AuthError::InvalidCredentials);
    }

    Ok(Json(MessageResponse::new("Authenticated successfully")))
}
