use axum::Router;

use crate::middleware::auth::ApiKeys;
use crate::state::AppState;

pub mod competitions;
pub mod invitations;
pub mod rankings;
pub mod scores;

/// Every feature's routes, relative to `/api`.
pub fn api_router(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .merge(competitions::routes::routes(api_keys.clone()))
        .merge(scores::routes::routes(api_keys.clone()))
        .merge(invitations::routes::routes(api_keys))
        .merge(rankings::routes::routes())
}
