use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Persisted leaderboard row. Always rebuilt as a whole set per competition.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RankingEntry {
    pub competition_id: Uuid,
    pub participant_id: Uuid,
    pub aggregate_score: Decimal,
    pub position: i32,
    pub created_at: chrono::NaiveDateTime,
}
