use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::{dto::ranking::LeaderboardResponse, services::competitions};
use uuid::Uuid;

use crate::error::WebError;
use crate::middleware::actor::MaybeActor;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/competitions/{competition_id}/leaderboard",
    params(
        ("competition_id" = Uuid, Path, description = "Competition id")
    ),
    responses(
        (status = 200, description = "Stored ranking, or a live computation when none was stored yet", body = LeaderboardResponse),
        (status = 404, description = "Competition not found or not visible")
    ),
    tag = "rankings"
)]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    MaybeActor(viewer): MaybeActor,
    Path(competition_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let leaderboard = competitions::visible_leaderboard(&state.db, viewer, competition_id).await?;

    Ok(Json(leaderboard).into_response())
}
