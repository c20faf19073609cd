use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{AssignmentStatus, CompetitionStatus, InvitationKind, User};

/// What an invitation link shows before it is accepted
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvitationPreview {
    pub kind: InvitationKind,
    pub competition_id: Uuid,
    pub competition_title: String,
    pub competition_status: CompetitionStatus,
    pub default_email: Option<String>,
    pub claimed: bool,
}

/// Request payload for creating an account straight from an invitation link
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterViaInvitationRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvitationResolution {
    pub kind: InvitationKind,
    pub competition_id: Uuid,
    pub user_id: Uuid,
    /// False when the invitation was already resolved for this user.
    pub changed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct JudgeInvitationRow {
    pub assignment_id: Uuid,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub status: AssignmentStatus,
    pub user_id: Option<Uuid>,
    pub invitation_token: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ParticipantInvitationRow {
    pub participant_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub user_id: Option<Uuid>,
    pub invitation_token: Uuid,
}

/// Owner's view of every invitation issued for a competition
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvitationOverview {
    pub competition_id: Uuid,
    pub judges: Vec<JudgeInvitationRow>,
    pub participants: Vec<ParticipantInvitationRow>,
}

/// Account created from an invitation link, with the resolved invitation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegistrationResponse {
    pub user: User,
    pub resolution: InvitationResolution,
}
