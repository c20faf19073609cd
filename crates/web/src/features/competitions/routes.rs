use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use super::handlers::{
    add_participant, create_competition, delete_competition, get_competition,
    list_competitions, list_invitations, transition_status, update_competition,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/competitions", post(create_competition))
        .route(
            "/competitions/:competition_id",
            put(update_competition).delete(delete_competition),
        )
        .route("/competitions/:competition_id/status", post(transition_status))
        .route(
            "/competitions/:competition_id/participants",
            post(add_participant),
        )
        .route(
            "/competitions/:competition_id/invitations",
            get(list_invitations),
        )
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/competitions", get(list_competitions))
        .route("/competitions/:competition_id", get(get_competition))
        .merge(protected)
}
