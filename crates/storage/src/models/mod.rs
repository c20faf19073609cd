use thiserror::Error;

/// Raised when a TEXT column or request field holds an unknown enum value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Enums persisted as lowercase TEXT columns.
macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::models::ParseEnumError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err($crate::models::ParseEnumError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::models::ParseEnumError;

            fn try_from(value: String) -> ::core::result::Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

mod competition;
mod email;
mod invitation;
mod judge_assignment;
mod participant;
mod ranking_entry;
mod score;
mod user;

pub use competition::{Competition, CompetitionStatus};
pub use email::NormalizedEmail;
pub use invitation::{Invitation, InvitationKind, new_invitation_token};
pub use judge_assignment::{AssignmentStatus, JudgeAssignment, JudgeResolution};
pub use participant::{ClaimOutcome, Participant};
pub use ranking_entry::RankingEntry;
pub use score::{Score, ScoreValue};
pub use user::{User, UserRole};

