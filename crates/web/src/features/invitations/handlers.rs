use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    dto::invitation::{
        InvitationPreview, InvitationResolution, RegisterViaInvitationRequest,
        RegistrationResponse,
    },
    services::invitations,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::actor::Actor;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/invitations/{token}",
    params(
        ("token" = Uuid, Path, description = "Invitation token")
    ),
    responses(
        (status = 200, description = "Invitation details", body = InvitationPreview),
        (status = 404, description = "Unknown token")
    ),
    tag = "invitations"
)]
pub async fn get_invitation(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> Result<Response, WebError> {
    let preview = invitations::preview(&state.db, token).await?;

    Ok(Json(preview).into_response())
}

#[utoipa::path(
    post,
    path = "/api/invitations/{token}/accept",
    params(
        ("token" = Uuid, Path, description = "Invitation token")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Invitation bound to the acting user; `changed` is false when it already was", body = InvitationResolution),
        (status = 400, description = "Invitation was declined"),
        (status = 404, description = "Unknown token"),
        (status = 409, description = "Account already judges this competition")
    ),
    tag = "invitations"
)]
pub async fn accept_invitation(
    State(state): State<AppState>,
    Actor(user_id): Actor,
    Path(token): Path<Uuid>,
) -> Result<Response, WebError> {
    let resolution = invitations::resolve_invitation(&state.db, token, user_id).await?;

    Ok(Json(resolution).into_response())
}

#[utoipa::path(
    post,
    path = "/api/invitations/{token}/register",
    params(
        ("token" = Uuid, Path, description = "Invitation token")
    ),
    request_body = RegisterViaInvitationRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Account created and invitation resolved", body = RegistrationResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Unknown token"),
        (status = 409, description = "Email already registered")
    ),
    tag = "invitations"
)]
pub async fn register_via_invitation(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    Json(req): Json<RegisterViaInvitationRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let (user, resolution) = invitations::register_and_resolve(&state.db, token, &req).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse { user, resolution }),
    )
        .into_response())
}

#[utoipa::path(
    post,
    path = "/api/invitations/{token}/decline",
    params(
        ("token" = Uuid, Path, description = "Invitation token")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Judge invitation declined"),
        (status = 400, description = "Already accepted, or not a judge invitation"),
        (status = 404, description = "Unknown token")
    ),
    tag = "invitations"
)]
pub async fn decline_invitation(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> Result<Response, WebError> {
    invitations::decline_invitation(&state.db, token).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
