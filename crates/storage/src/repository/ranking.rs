use sqlx::{FromRow, PgConnection, QueryBuilder};
use uuid::Uuid;

use crate::dto::ranking::LeaderboardRow;
use crate::error::Result;

/// A participant eligible for ranking, before scores are attached.
#[derive(Debug, Clone, FromRow)]
pub struct RankedParticipantRow {
    pub participant_id: Uuid,
    pub display_name: String,
    pub enrollment_seq: i64,
}

pub struct RankingRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> RankingRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn has_snapshot(&mut self, competition_id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM ranking_entries WHERE competition_id = $1)",
        )
        .bind(competition_id)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(exists)
    }

    pub async fn participants(&mut self, competition_id: Uuid) -> Result<Vec<RankedParticipantRow>> {
        let rows = sqlx::query_as::<_, RankedParticipantRow>(
            r#"
            SELECT p.participant_id,
                   COALESCE(NULLIF(u.name, ''), p.name) AS display_name,
                   p.enrollment_seq
            FROM participants p
            LEFT JOIN users u ON u.user_id = p.user_id
            WHERE p.competition_id = $1
            ORDER BY p.enrollment_seq
            "#,
        )
        .bind(competition_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows)
    }

    /// Drop every entry of the competition and insert `rows` in their place.
    /// Callers must run this inside a transaction so readers never see a
    /// partially replaced snapshot.
    pub async fn replace(&mut self, competition_id: Uuid, rows: &[LeaderboardRow]) -> Result<()> {
        sqlx::query("DELETE FROM ranking_entries WHERE competition_id = $1")
            .bind(competition_id)
            .execute(&mut *self.conn)
            .await?;

        if rows.is_empty() {
            return Ok(());
        }

        let mut query = QueryBuilder::new(
            "INSERT INTO ranking_entries (competition_id, participant_id, aggregate_score, position) ",
        );
        query.push_values(rows, |mut b, row| {
            b.push_bind(competition_id)
                .push_bind(row.participant_id)
                .push_bind(row.aggregate_score)
                .push_bind(row.position);
        });

        query.build().execute(&mut *self.conn).await?;

        Ok(())
    }

    /// Persisted leaderboard, by position.
    pub async fn snapshot(&mut self, competition_id: Uuid) -> Result<Vec<LeaderboardRow>> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT r.participant_id,
                   COALESCE(NULLIF(u.name, ''), p.name) AS display_name,
                   r.aggregate_score,
                   r.position
            FROM ranking_entries r
            INNER JOIN participants p ON p.participant_id = r.participant_id
            LEFT JOIN users u ON u.user_id = p.user_id
            WHERE r.competition_id = $1
            ORDER BY r.position
            "#,
        )
        .bind(competition_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows)
    }
}
