use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{JudgeAssignment, Participant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InvitationKind {
    Judge,
    Participant,
}

text_enum!(InvitationKind, "invitation kind", {
    Judge => "judge",
    Participant => "participant",
});

/// Tokens share one namespace across judge and participant invitations.
/// UUIDv4 draws from the OS CSPRNG.
pub fn new_invitation_token() -> Uuid {
    Uuid::new_v4()
}

/// Whatever a token points at.
#[derive(Debug, Clone)]
pub enum Invitation {
    Judge(JudgeAssignment),
    Participant(Participant),
}

impl Invitation {
    pub fn kind(&self) -> InvitationKind {
        match self {
            Self::Judge(_) => InvitationKind::Judge,
            Self::Participant(_) => InvitationKind::Participant,
        }
    }

    pub fn token(&self) -> Uuid {
        match self {
            Self::Judge(a) => a.invitation_token,
            Self::Participant(p) => p.invitation_token,
        }
    }

    pub fn competition_id(&self) -> Uuid {
        match self {
            Self::Judge(a) => a.competition_id,
            Self::Participant(p) => p.competition_id,
        }
    }

    /// Address to prefill on the acceptance form.
    pub fn default_email(&self) -> Option<&str> {
        match self {
            Self::Judge(a) => Some(a.email.as_str()),
            Self::Participant(p) => p.email.as_deref(),
        }
    }

    pub fn bound_user(&self) -> Option<Uuid> {
        match self {
            Self::Judge(a) => a.user_id,
            Self::Participant(p) => p.user_id,
        }
    }
}
