use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{
    accept_invitation, decline_invitation, get_invitation, register_via_invitation,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/invitations/:token/accept", post(accept_invitation))
        .route("/invitations/:token/register", post(register_via_invitation))
        .route("/invitations/:token/decline", post(decline_invitation))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/invitations/:token", get(get_invitation))
        .merge(protected)
}
