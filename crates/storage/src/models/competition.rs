use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Result, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CompetitionStatus {
    #[default]
    Draft,
    Open,
    Closed,
}

text_enum!(CompetitionStatus, "competition status", {
    Draft => "draft",
    Open => "open",
    Closed => "closed",
});

impl CompetitionStatus {
    /// Only draft -> open and open -> closed exist.
    pub fn can_transition_to(self, target: CompetitionStatus) -> bool {
        matches!(
            (self, target),
            (Self::Draft, Self::Open) | (Self::Open, Self::Closed)
        )
    }

    pub fn accepts_scores(self) -> bool {
        self == Self::Open
    }

    /// Leaderboard and roster are visible to everyone.
    pub fn is_public(self) -> bool {
        matches!(self, Self::Open | Self::Closed)
    }

    pub fn requires_rules(self) -> bool {
        self.is_public()
    }

    pub fn ensure_accepts_scores(self) -> Result<()> {
        if self.accepts_scores() {
            Ok(())
        } else {
            Err(StorageError::validation(format!(
                "competition is {self}; scores can only be submitted while it is open"
            )))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Competition {
    pub competition_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub rules: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: CompetitionStatus,
    pub owner_id: Uuid,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

impl Competition {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    pub fn has_rules(&self) -> bool {
        self.rules.as_deref().is_some_and(|r| !r.trim().is_empty())
    }

    pub fn is_visible_to(&self, viewer: Option<Uuid>) -> bool {
        self.status.is_public() || viewer.is_some_and(|v| self.is_owned_by(v))
    }

    pub fn ensure_owner(&self, user_id: Uuid) -> Result<()> {
        if self.is_owned_by(user_id) {
            Ok(())
        } else {
            Err(StorageError::forbidden(
                "only the competition owner can perform this action",
            ))
        }
    }

    /// Checks a status change. `Ok(false)` means the competition is already in
    /// `target` and nothing needs to be written.
    pub fn plan_transition(&self, target: CompetitionStatus) -> Result<bool> {
        if self.status == target {
            return Ok(false);
        }

        if !self.status.can_transition_to(target) {
            return Err(StorageError::validation(format!(
                "cannot move competition from {} to {}",
                self.status, target
            )));
        }

        if target.requires_rules() && !self.has_rules() {
            return Err(StorageError::validation(
                "rules must be filled in before the competition leaves draft",
            ));
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn competition(status: CompetitionStatus, rules: Option<&str>) -> Competition {
        let now = chrono::Utc::now().naive_utc();
        Competition {
            competition_id: Uuid::new_v4(),
            title: "Regional Finals".to_string(),
            description: None,
            rules: rules.map(str::to_string),
            status,
            owner_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [
            CompetitionStatus::Draft,
            CompetitionStatus::Open,
            CompetitionStatus::Closed,
        ] {
            assert_eq!(status.as_str().parse::<CompetitionStatus>().unwrap(), status);
        }
        assert!("archived".parse::<CompetitionStatus>().is_err());
    }

    #[test]
    fn test_transitions_are_one_directional() {
        use CompetitionStatus::*;

        assert!(Draft.can_transition_to(Open));
        assert!(Open.can_transition_to(Closed));
        assert!(!Draft.can_transition_to(Closed));
        assert!(!Open.can_transition_to(Draft));
        assert!(!Closed.can_transition_to(Open));
        assert!(!Closed.can_transition_to(Draft));
    }

    #[test]
    fn test_only_open_accepts_scores() {
        assert!(CompetitionStatus::Draft.ensure_accepts_scores().is_err());
        assert!(CompetitionStatus::Open.ensure_accepts_scores().is_ok());
        assert!(CompetitionStatus::Closed.ensure_accepts_scores().is_err());
    }

    #[test]
    fn test_opening_requires_rules() {
        let blank = competition(CompetitionStatus::Draft, Some("   "));
        assert!(matches!(
            blank.plan_transition(CompetitionStatus::Open),
            Err(StorageError::Validation(_))
        ));

        let ready = competition(CompetitionStatus::Draft, Some("Best of three"));
        assert!(ready.plan_transition(CompetitionStatus::Open).unwrap());
    }

    #[test]
    fn test_same_status_is_a_no_op() {
        let open = competition(CompetitionStatus::Open, Some("rules"));
        assert!(!open.plan_transition(CompetitionStatus::Open).unwrap());
    }

    #[test]
    fn test_draft_is_only_visible_to_owner() {
        let draft = competition(CompetitionStatus::Draft, None);
        assert!(!draft.is_visible_to(None));
        assert!(!draft.is_visible_to(Some(Uuid::new_v4())));
        assert!(draft.is_visible_to(Some(draft.owner_id)));

        let closed = competition(CompetitionStatus::Closed, Some("rules"));
        assert!(closed.is_visible_to(None));
    }
}
