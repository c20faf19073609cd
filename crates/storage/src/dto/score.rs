use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::ranking::LeaderboardRow;
use crate::models::Score;

/// Request payload for submitting or updating a judge's score
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitScoreRequest {
    pub participant_id: Uuid,

    pub value: Decimal,

    #[validate(length(max = 2000, message = "Comment must be at most 2000 characters"))]
    pub comment: Option<String>,
}

/// Everything the scoring service needs to write one score.
#[derive(Debug, Clone)]
pub struct SubmitScore {
    pub judge_id: Uuid,
    pub participant_id: Uuid,
    pub competition_id: Uuid,
    pub value: Decimal,
    pub comment: Option<String>,
}

impl SubmitScore {
    pub fn from_request(judge_id: Uuid, competition_id: Uuid, req: SubmitScoreRequest) -> Self {
        Self {
            judge_id,
            participant_id: req.participant_id,
            competition_id,
            value: req.value,
            comment: req
                .comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoreResponse {
    pub score_id: Uuid,
    pub judge_id: Uuid,
    pub participant_id: Uuid,
    pub competition_id: Uuid,
    pub value: Decimal,
    pub comment: Option<String>,
    pub updated_at: chrono::NaiveDateTime,
}

impl From<Score> for ScoreResponse {
    fn from(score: Score) -> Self {
        Self {
            score_id: score.score_id,
            judge_id: score.judge_id,
            participant_id: score.participant_id,
            competition_id: score.competition_id,
            value: score.value,
            comment: score.comment,
            updated_at: score.updated_at,
        }
    }
}

/// The stored score together with the leaderboard it produced.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoreSubmission {
    pub score: ScoreResponse,
    pub leaderboard: Vec<LeaderboardRow>,
}

/// A participant as seen from one judge's scoring sheet.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct JudgingRow {
    pub participant_id: Uuid,
    pub display_name: String,
    pub score_id: Option<Uuid>,
    pub value: Option<Decimal>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JudgingSheet {
    pub competition_id: Uuid,
    pub rows: Vec<JudgingRow>,
    /// True while some participant has no score from this judge.
    pub needs_scores: bool,
}

impl JudgingSheet {
    pub fn new(competition_id: Uuid, rows: Vec<JudgingRow>) -> Self {
        let needs_scores = rows.iter().any(|r| r.score_id.is_none());
        Self {
            competition_id,
            rows,
            needs_scores,
        }
    }
}
