use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use super::handlers::{delete_score, get_judging_sheet, list_judged_competitions, submit_score};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/competitions/:competition_id/scores", post(submit_score))
        .route(
            "/competitions/:competition_id/scores/:score_id",
            delete(delete_score),
        )
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/judging", get(list_judged_competitions))
        .route("/competitions/:competition_id/judging", get(get_judging_sheet))
        .merge(protected)
}
