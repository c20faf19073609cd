use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::ranking::LeaderboardRow;
use crate::models::{Competition, CompetitionStatus};

/// Title, description and rules of a competition
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CompetitionDetails {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: String,

    #[validate(length(max = 10000))]
    pub description: Option<String>,

    #[validate(length(max = 10000))]
    pub rules: Option<String>,
}

/// Request payload for building a competition in one go: details, the judges
/// to invite and the participant roster.
///
/// `judge_emails` is free text separated by commas, semicolons or newlines.
/// `participants` holds one `Name` or `Name <email>` per line.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct BuildCompetitionRequest {
    #[validate(nested)]
    pub details: CompetitionDetails,

    pub judge_emails: String,

    pub participants: String,
}

/// Request payload for editing an existing competition
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCompetitionRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    #[validate(length(max = 10000))]
    pub description: Option<String>,

    #[validate(length(max = 10000))]
    pub rules: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransitionStatusRequest {
    pub status: CompetitionStatus,
}

/// Request payload for adding a participant after the competition was built
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddParticipantRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
}

/// Response containing competition details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetitionResponse {
    pub competition_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub rules: Option<String>,
    pub status: CompetitionStatus,
    pub owner_id: Uuid,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

impl From<Competition> for CompetitionResponse {
    fn from(comp: Competition) -> Self {
        Self {
            competition_id: comp.competition_id,
            title: comp.title,
            description: comp.description,
            rules: comp.rules,
            status: comp.status,
            owner_id: comp.owner_id,
            created_at: comp.created_at,
            updated_at: comp.updated_at,
        }
    }
}

/// Row of the public competition listing
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CompetitionListItem {
    pub competition_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: CompetitionStatus,
    pub owner_name: String,
    pub participant_count: i64,
    pub updated_at: chrono::NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RosterEntry {
    pub participant_id: Uuid,
    pub display_name: String,
    pub claimed: bool,
    pub position: Option<i32>,
    pub aggregate_score: Option<Decimal>,
}

/// Competition page: details, roster and current standings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetitionDashboard {
    pub competition: CompetitionResponse,
    /// Participants and judge invitations both exist.
    pub ready_to_publish: bool,
    pub roster: Vec<RosterEntry>,
    pub leaderboard: Vec<LeaderboardRow>,
}
