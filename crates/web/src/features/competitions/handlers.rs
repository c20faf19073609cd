use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    dto::competition::{
        AddParticipantRequest, BuildCompetitionRequest, CompetitionDashboard,
        CompetitionListItem, CompetitionResponse, TransitionStatusRequest,
        UpdateCompetitionRequest,
    },
    dto::invitation::InvitationOverview,
    models::Participant,
    services::{competitions, invitations},
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::actor::{Actor, MaybeActor};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/competitions",
    responses(
        (status = 200, description = "Open and closed competitions, most recently updated first", body = Vec<CompetitionListItem>)
    ),
    tag = "competitions"
)]
pub async fn list_competitions(State(state): State<AppState>) -> Result<Response, WebError> {
    let competitions = competitions::list_public(&state.db).await?;

    Ok(Json(competitions).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/{competition_id}",
    params(
        ("competition_id" = Uuid, Path, description = "Competition id")
    ),
    responses(
        (status = 200, description = "Competition with roster and leaderboard", body = CompetitionDashboard),
        (status = 404, description = "Competition not found or not visible")
    ),
    tag = "competitions"
)]
pub async fn get_competition(
    State(state): State<AppState>,
    MaybeActor(viewer): MaybeActor,
    Path(competition_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let dashboard = competitions::dashboard(&state.db, viewer, competition_id).await?;

    Ok(Json(dashboard).into_response())
}

#[utoipa::path(
    post,
    path = "/api/competitions",
    request_body = BuildCompetitionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Draft competition created with its invitations", body = CompetitionResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "competitions"
)]
pub async fn create_competition(
    State(state): State<AppState>,
    Actor(owner_id): Actor,
    Json(req): Json<BuildCompetitionRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let competition = competitions::build_competition(&state.db, owner_id, &req).await?;

    Ok((
        StatusCode::CREATED,
        Json(CompetitionResponse::from(competition)),
    )
        .into_response())
}

#[utoipa::path(
    put,
    path = "/api/competitions/{competition_id}",
    params(
        ("competition_id" = Uuid, Path, description = "Competition id")
    ),
    request_body = UpdateCompetitionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Competition updated", body = CompetitionResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Competition not found")
    ),
    tag = "competitions"
)]
pub async fn update_competition(
    State(state): State<AppState>,
    Actor(actor_id): Actor,
    Path(competition_id): Path<Uuid>,
    Json(req): Json<UpdateCompetitionRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let updated =
        competitions::update_competition(&state.db, actor_id, competition_id, &req).await?;

    Ok(Json(CompetitionResponse::from(updated)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/competitions/{competition_id}",
    params(
        ("competition_id" = Uuid, Path, description = "Competition id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Competition deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Competition not found")
    ),
    tag = "competitions"
)]
pub async fn delete_competition(
    State(state): State<AppState>,
    Actor(actor_id): Actor,
    Path(competition_id): Path<Uuid>,
) -> Result<Response, WebError> {
    competitions::delete_competition(&state.db, actor_id, competition_id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    post,
    path = "/api/competitions/{competition_id}/status",
    params(
        ("competition_id" = Uuid, Path, description = "Competition id")
    ),
    request_body = TransitionStatusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Status changed, or already in that status", body = CompetitionResponse),
        (status = 400, description = "Transition not allowed"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Competition not found"),
        (status = 409, description = "Concurrent update, retry")
    ),
    tag = "competitions"
)]
pub async fn transition_status(
    State(state): State<AppState>,
    Actor(actor_id): Actor,
    Path(competition_id): Path<Uuid>,
    Json(req): Json<TransitionStatusRequest>,
) -> Result<Response, WebError> {
    let competition =
        competitions::transition_status(&state.db, actor_id, competition_id, req.status).await?;

    Ok(Json(CompetitionResponse::from(competition)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/competitions/{competition_id}/participants",
    params(
        ("competition_id" = Uuid, Path, description = "Competition id")
    ),
    request_body = AddParticipantRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Participant added", body = Participant),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not the owner"),
        (status = 409, description = "Name already taken in this competition")
    ),
    tag = "competitions"
)]
pub async fn add_participant(
    State(state): State<AppState>,
    Actor(actor_id): Actor,
    Path(competition_id): Path<Uuid>,
    Json(req): Json<AddParticipantRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let participant = competitions::add_participant(
        &state.db,
        state.sink.as_ref(),
        actor_id,
        competition_id,
        &req,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(participant)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/{competition_id}/invitations",
    params(
        ("competition_id" = Uuid, Path, description = "Competition id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Judge and participant invitations", body = InvitationOverview),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Competition not found")
    ),
    tag = "competitions"
)]
pub async fn list_invitations(
    State(state): State<AppState>,
    Actor(actor_id): Actor,
    Path(competition_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let overview = invitations::overview(&state.db, actor_id, competition_id).await?;

    Ok(Json(overview).into_response())
}
