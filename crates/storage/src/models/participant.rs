use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Participant {
    pub participant_id: Uuid,
    pub competition_id: Uuid,
    pub name: String,
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
    pub invitation_token: Uuid,
    pub invited_by: Option<Uuid>,
    /// Creation order, used to break ranking ties.
    pub enrollment_seq: i64,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    AlreadyClaimed,
    /// Bind the slot. `previous_user` is set when another account held it.
    Claim { previous_user: Option<Uuid> },
}

impl Participant {
    pub fn is_claimed(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn claim_outcome(&self, user_id: Uuid) -> ClaimOutcome {
        match self.user_id {
            Some(current) if current == user_id => ClaimOutcome::AlreadyClaimed,
            previous_user => ClaimOutcome::Claim { previous_user },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(user_id: Option<Uuid>) -> Participant {
        Participant {
            participant_id: Uuid::new_v4(),
            competition_id: Uuid::new_v4(),
            name: "Ana".to_string(),
            user_id,
            email: None,
            invitation_token: Uuid::new_v4(),
            invited_by: None,
            enrollment_seq: 1,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_unclaimed_slot_is_claimed() {
        let user = Uuid::new_v4();
        assert_eq!(
            participant(None).claim_outcome(user),
            ClaimOutcome::Claim {
                previous_user: None
            }
        );
    }

    #[test]
    fn test_same_user_is_idempotent() {
        let user = Uuid::new_v4();
        assert_eq!(
            participant(Some(user)).claim_outcome(user),
            ClaimOutcome::AlreadyClaimed
        );
    }

    #[test]
    fn test_other_user_rebinds() {
        let original = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert_eq!(
            participant(Some(original)).claim_outcome(other),
            ClaimOutcome::Claim {
                previous_user: Some(original)
            }
        );
    }
}
