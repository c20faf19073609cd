use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One leaderboard line, whether read from the snapshot or computed live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaderboardRow {
    pub participant_id: Uuid,
    pub display_name: String,
    pub aggregate_score: Decimal,
    pub position: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardSource {
    /// Served from the persisted ranking entries.
    Snapshot,
    /// No snapshot yet; aggregated from scores on read.
    Live,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardResponse {
    pub competition_id: Uuid,
    pub source: LeaderboardSource,
    pub rows: Vec<LeaderboardRow>,
}
