use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Result, StorageError};

/// A judge's mark, guaranteed to lie in `[0, 10]` with at most two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScoreValue(Decimal);

impl ScoreValue {
    pub const MIN: Decimal = Decimal::ZERO;
    pub const MAX: Decimal = Decimal::TEN;

    pub fn new(value: Decimal) -> Result<Self> {
        if value < Self::MIN || value > Self::MAX {
            return Err(StorageError::validation(format!(
                "invalid score: {value}. score must be in [0, 10]"
            )));
        }

        Ok(Self(
            value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        ))
    }

    pub fn value(self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for ScoreValue {
    type Error = StorageError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ScoreValue> for Decimal {
    fn from(value: ScoreValue) -> Self {
        value.value()
    }
}

/// One judge's evaluation of one participant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Score {
    pub score_id: Uuid,
    pub judge_id: Uuid,
    pub participant_id: Uuid,
    pub competition_id: Uuid,
    pub value: Decimal,
    pub comment: Option<String>,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}
