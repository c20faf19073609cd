use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Result, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
}

text_enum!(AssignmentStatus, "judge assignment status", {
    Pending => "pending",
    Accepted => "accepted",
    Declined => "declined",
});

/// Judge invitation binding a (possibly not yet registered) judge to a competition.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct JudgeAssignment {
    pub assignment_id: Uuid,
    pub competition_id: Uuid,
    pub user_id: Option<Uuid>,
    pub invited_by: Option<Uuid>,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub status: AssignmentStatus,
    pub invitation_token: Uuid,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JudgeResolution {
    AlreadyAccepted,
    Accept,
}

impl JudgeAssignment {
    pub fn is_accepted_by(&self, user_id: Uuid) -> bool {
        self.status == AssignmentStatus::Accepted && self.user_id == Some(user_id)
    }

    pub fn resolve_for(&self, user_id: Uuid) -> Result<JudgeResolution> {
        match self.status {
            AssignmentStatus::Declined => Err(StorageError::validation(
                "this judge invitation was declined",
            )),
            AssignmentStatus::Accepted if self.user_id == Some(user_id) => {
                Ok(JudgeResolution::AlreadyAccepted)
            }
            AssignmentStatus::Accepted | AssignmentStatus::Pending => Ok(JudgeResolution::Accept),
        }
    }

    /// `Ok(false)` when the invitation was already declined.
    pub fn plan_decline(&self) -> Result<bool> {
        match self.status {
            AssignmentStatus::Pending => Ok(true),
            AssignmentStatus::Declined => Ok(false),
            AssignmentStatus::Accepted => Err(StorageError::validation(
                "an accepted judge invitation cannot be declined",
            )),
        }
    }
}
