use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    dto::competition::CompetitionResponse,
    dto::score::{JudgingSheet, ScoreSubmission, SubmitScore, SubmitScoreRequest},
    services::scoring,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::actor::Actor;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/judging",
    responses(
        (status = 200, description = "Competitions the acting user judges", body = Vec<CompetitionResponse>),
        (status = 401, description = "Missing acting user")
    ),
    tag = "scores"
)]
pub async fn list_judged_competitions(
    State(state): State<AppState>,
    Actor(user_id): Actor,
) -> Result<Response, WebError> {
    let competitions = scoring::judged_competitions(&state.db, user_id).await?;

    let response: Vec<CompetitionResponse> = competitions
        .into_iter()
        .map(CompetitionResponse::from)
        .collect();

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/{competition_id}/judging",
    params(
        ("competition_id" = Uuid, Path, description = "Competition id")
    ),
    responses(
        (status = 200, description = "Every participant with the judge's current score", body = JudgingSheet),
        (status = 403, description = "Not an accepted judge of this competition"),
        (status = 404, description = "Competition not found")
    ),
    tag = "scores"
)]
pub async fn get_judging_sheet(
    State(state): State<AppState>,
    Actor(judge_id): Actor,
    Path(competition_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let sheet = scoring::judging_sheet(&state.db, judge_id, competition_id).await?;

    Ok(Json(sheet).into_response())
}

#[utoipa::path(
    post,
    path = "/api/competitions/{competition_id}/scores",
    params(
        ("competition_id" = Uuid, Path, description = "Competition id")
    ),
    request_body = SubmitScoreRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Score stored and ranking recomputed", body = ScoreSubmission),
        (status = 400, description = "Score out of range or competition not open"),
        (status = 403, description = "Not an accepted judge of this competition"),
        (status = 404, description = "Competition or participant not found"),
        (status = 409, description = "Concurrent update, retry")
    ),
    tag = "scores"
)]
pub async fn submit_score(
    State(state): State<AppState>,
    Actor(judge_id): Actor,
    Path(competition_id): Path<Uuid>,
    Json(req): Json<SubmitScoreRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let cmd = SubmitScore::from_request(judge_id, competition_id, req);
    let submission = scoring::submit_score(&state.db, state.sink.as_ref(), cmd).await?;

    Ok(Json(submission).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/competitions/{competition_id}/scores/{score_id}",
    params(
        ("competition_id" = Uuid, Path, description = "Competition id"),
        ("score_id" = Uuid, Path, description = "Score id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Score removed and ranking recomputed"),
        (status = 400, description = "Competition not open"),
        (status = 403, description = "Not an accepted judge of this competition"),
        (status = 404, description = "Score not found for this judge")
    ),
    tag = "scores"
)]
pub async fn delete_score(
    State(state): State<AppState>,
    Actor(judge_id): Actor,
    Path((competition_id, score_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, WebError> {
    scoring::delete_score(
        &state.db,
        state.sink.as_ref(),
        judge_id,
        competition_id,
        score_id,
    )
    .await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
