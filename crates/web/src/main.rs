use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use storage::Database;
use storage::services::retry::RetryPolicy;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod middleware;
mod sink;
mod state;

use config::Config;
use features::{competitions, invitations, rankings, scores};
use middleware::auth::ApiKeys;
use sink::TracingSink;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        competitions::handlers::list_competitions,
        competitions::handlers::get_competition,
        competitions::handlers::create_competition,
        competitions::handlers::update_competition,
        competitions::handlers::delete_competition,
        competitions::handlers::transition_status,
        competitions::handlers::add_participant,
        competitions::handlers::list_invitations,
        rankings::handlers::get_leaderboard,
        scores::handlers::list_judged_competitions,
        scores::handlers::get_judging_sheet,
        scores::handlers::submit_score,
        scores::handlers::delete_score,
        invitations::handlers::get_invitation,
        invitations::handlers::accept_invitation,
        invitations::handlers::register_via_invitation,
        invitations::handlers::decline_invitation,
    ),
    components(
        schemas(
            storage::dto::competition::CompetitionDetails,
            storage::dto::competition::BuildCompetitionRequest,
            storage::dto::competition::UpdateCompetitionRequest,
            storage::dto::competition::TransitionStatusRequest,
            storage::dto::competition::AddParticipantRequest,
            storage::dto::competition::CompetitionResponse,
            storage::dto::competition::CompetitionListItem,
            storage::dto::competition::RosterEntry,
            storage::dto::competition::CompetitionDashboard,
            storage::dto::invitation::InvitationPreview,
            storage::dto::invitation::RegisterViaInvitationRequest,
            storage::dto::invitation::InvitationResolution,
            storage::dto::invitation::RegistrationResponse,
            storage::dto::invitation::JudgeInvitationRow,
            storage::dto::invitation::ParticipantInvitationRow,
            storage::dto::invitation::InvitationOverview,
            storage::dto::ranking::LeaderboardRow,
            storage::dto::ranking::LeaderboardSource,
            storage::dto::ranking::LeaderboardResponse,
            storage::dto::score::SubmitScoreRequest,
            storage::dto::score::ScoreResponse,
            storage::dto::score::ScoreSubmission,
            storage::dto::score::JudgingRow,
            storage::dto::score::JudgingSheet,
            storage::models::Competition,
            storage::models::CompetitionStatus,
            storage::models::Participant,
            storage::models::User,
            storage::models::UserRole,
            storage::models::InvitationKind,
            storage::models::AssignmentStatus,
        )
    ),
    tags(
        (name = "competitions", description = "Competition lifecycle and roster"),
        (name = "rankings", description = "Public leaderboards"),
        (name = "scores", description = "Judging and score submission"),
        (name = "invitations", description = "Judge and participant invitation links"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

fn app(state: AppState, api_keys: ApiKeys) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", features::api_router(api_keys))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting judging API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::connect(
        &config.database_url,
        config.database_max_connections,
        RetryPolicy::new(config.ranking_conflict_retries),
    )
    .await
    .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    if api_keys.count() == 0 {
        tracing::warn!("No API keys configured; every protected route will answer 401");
    }

    let state = AppState::new(db, Arc::new(TracingSink));

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, app(state, api_keys))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }

    tracing::info!("Received Ctrl+C, shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use sqlx::postgres::PgPoolOptions;
    use storage::services::notify::NullSink;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let state = AppState::new(Database::from_pool(pool), Arc::new(NullSink));

        app(state, ApiKeys::from_comma_separated("secret"))
    }

    async fn status(request: Request<Body>) -> StatusCode {
        test_app().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_mutating_routes_require_api_key() {
        let build = Request::builder()
            .method("POST")
            .uri("/api/competitions")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        assert_eq!(status(build).await, StatusCode::UNAUTHORIZED);

        let score = Request::builder()
            .method("POST")
            .uri(format!("/api/competitions/{}/scores", uuid::Uuid::new_v4()))
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        assert_eq!(status(score).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_acting_user_is_required_before_touching_storage() {
        let request = Request::builder()
            .uri("/api/judging")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status(request).await, StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .uri("/api/judging")
            .header("x-user-id", "not-a-uuid")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status(request).await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_ids_are_rejected() {
        let request = Request::builder()
            .uri("/api/competitions/not-a-uuid/leaderboard")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status(request).await, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/competitions",
            "/api/competitions/{competition_id}",
            "/api/competitions/{competition_id}/leaderboard",
            "/api/competitions/{competition_id}/scores",
            "/api/judging",
            "/api/invitations/{token}/accept",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
