use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
    Judge,
}

text_enum!(UserRole, "user role", {
    User => "user",
    Admin => "admin",
    Judge => "judge",
});

impl UserRole {
    /// Role after accepting a judge invitation. `None` when the current role
    /// already covers judging; capabilities are never downgraded.
    pub fn upgraded_for_judging(self) -> Option<UserRole> {
        match self {
            Self::User => Some(Self::Judge),
            Self::Judge | Self::Admin => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    pub created_at: chrono::NaiveDateTime,
}
