use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::dto::score::JudgingRow;
use crate::error::{Result, StorageError};
use crate::models::{Score, ScoreValue};

const SCORE_COLUMNS: &str =
    "score_id, judge_id, participant_id, competition_id, value, comment, created_at, updated_at";

pub struct ScoreRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> ScoreRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Insert the judge's score for a participant, or overwrite the existing one.
    pub async fn upsert(
        &mut self,
        judge_id: Uuid,
        participant_id: Uuid,
        competition_id: Uuid,
        value: ScoreValue,
        comment: Option<&str>,
    ) -> Result<Score> {
        let sql = format!(
            r#"
            INSERT INTO scores (judge_id, participant_id, competition_id, value, comment)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (judge_id, participant_id) DO UPDATE
            SET value = EXCLUDED.value, comment = EXCLUDED.comment, updated_at = NOW()
            RETURNING {SCORE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Score>(&sql)
            .bind(judge_id)
            .bind(participant_id)
            .bind(competition_id)
            .bind(value.value())
            .bind(comment)
            .fetch_one(&mut *self.conn)
            .await
            .map_err(|e| {
                let err = StorageError::from(e);
                if err.is_check_violation() {
                    StorageError::validation(format!("score rejected: {err}"))
                } else {
                    err
                }
            })
    }

    pub async fn find_for_judge(&mut self, score_id: Uuid, judge_id: Uuid) -> Result<Score> {
        let sql = format!("SELECT {SCORE_COLUMNS} FROM scores WHERE score_id = $1 AND judge_id = $2");

        sqlx::query_as::<_, Score>(&sql)
            .bind(score_id)
            .bind(judge_id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or(StorageError::NotFound)
    }

    pub async fn delete(&mut self, score_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM scores WHERE score_id = $1")
            .bind(score_id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    /// Every score value in a competition, keyed by participant.
    pub async fn values_for_competition(
        &mut self,
        competition_id: Uuid,
    ) -> Result<Vec<(Uuid, Decimal)>> {
        let rows = sqlx::query_as::<_, (Uuid, Decimal)>(
            "SELECT participant_id, value FROM scores WHERE competition_id = $1",
        )
        .bind(competition_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows)
    }

    /// Each participant with this judge's score, if any, ordered by name.
    pub async fn judging_rows(
        &mut self,
        competition_id: Uuid,
        judge_id: Uuid,
    ) -> Result<Vec<JudgingRow>> {
        let rows = sqlx::query_as::<_, JudgingRow>(
            r#"
            SELECT p.participant_id,
                   COALESCE(NULLIF(u.name, ''), p.name) AS display_name,
                   s.score_id,
                   s.value,
                   s.comment
            FROM participants p
            LEFT JOIN users u ON u.user_id = p.user_id
            LEFT JOIN scores s ON s.participant_id = p.participant_id AND s.judge_id = $2
            WHERE p.competition_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(competition_id)
        .bind(judge_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows)
    }
}
