use sqlx::PgConnection;
use uuid::Uuid;

use crate::dto::competition::{CompetitionDetails, CompetitionListItem};
use crate::error::{Result, StorageError};
use crate::models::{Competition, CompetitionStatus};

const COMPETITION_COLUMNS: &str =
    "competition_id, title, description, rules, status, owner_id, created_at, updated_at";

/// Repository for Competition database operations
pub struct CompetitionRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> CompetitionRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Get a competition by ID
    pub async fn find_by_id(&mut self, id: Uuid) -> Result<Competition> {
        let sql = format!("SELECT {COMPETITION_COLUMNS} FROM competitions WHERE competition_id = $1");

        sqlx::query_as::<_, Competition>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or(StorageError::NotFound)
    }

    /// Get a competition by ID and hold its row lock until the transaction
    /// ends. Every write that feeds the ranking snapshot goes through here
    /// first, which serializes replacements per competition.
    pub async fn lock_by_id(&mut self, id: Uuid) -> Result<Competition> {
        let sql = format!(
            "SELECT {COMPETITION_COLUMNS} FROM competitions WHERE competition_id = $1 FOR UPDATE"
        );

        sqlx::query_as::<_, Competition>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or(StorageError::NotFound)
    }

    /// Open and closed competitions, most recently updated first
    pub async fn list_public(&mut self) -> Result<Vec<CompetitionListItem>> {
        let competitions = sqlx::query_as::<_, CompetitionListItem>(
            r#"
            SELECT c.competition_id, c.title, c.description, c.status,
                   u.name AS owner_name,
                   COUNT(p.participant_id) AS participant_count,
                   c.updated_at
            FROM competitions c
            INNER JOIN users u ON u.user_id = c.owner_id
            LEFT JOIN participants p ON p.competition_id = c.competition_id
            WHERE c.status IN ('open', 'closed')
            GROUP BY c.competition_id, u.name
            ORDER BY c.updated_at DESC
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(competitions)
    }

    /// Competitions where the user holds an accepted judge assignment
    pub async fn list_judged_by(&mut self, user_id: Uuid) -> Result<Vec<Competition>> {
        let sql = format!(
            r#"
            SELECT {cols}
            FROM competitions
            WHERE competition_id IN (
                SELECT competition_id FROM judge_assignments
                WHERE user_id = $1 AND status = 'accepted'
            )
            ORDER BY updated_at DESC
            "#,
            cols = COMPETITION_COLUMNS
        );

        let competitions = sqlx::query_as::<_, Competition>(&sql)
            .bind(user_id)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(competitions)
    }

    /// Create a new draft competition
    pub async fn create(&mut self, owner_id: Uuid, details: &CompetitionDetails) -> Result<Competition> {
        let sql = format!(
            r#"
            INSERT INTO competitions (title, description, rules, status, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COMPETITION_COLUMNS}
            "#
        );

        let competition = sqlx::query_as::<_, Competition>(&sql)
            .bind(&details.title)
            .bind(&details.description)
            .bind(&details.rules)
            .bind(CompetitionStatus::Draft.as_str())
            .bind(owner_id)
            .fetch_one(&mut *self.conn)
            .await
            .map_err(|e| {
                let err = StorageError::from(e);
                if err.is_foreign_key_violation() {
                    StorageError::NotFound
                } else {
                    err
                }
            })?;

        Ok(competition)
    }

    /// Update title, description and rules
    pub async fn update_details(
        &mut self,
        id: Uuid,
        title: &str,
        description: Option<&str>,
        rules: Option<&str>,
    ) -> Result<Competition> {
        let sql = format!(
            r#"
            UPDATE competitions
            SET title = $2, description = $3, rules = $4, updated_at = NOW()
            WHERE competition_id = $1
            RETURNING {COMPETITION_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Competition>(&sql)
            .bind(id)
            .bind(title)
            .bind(description)
            .bind(rules)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or(StorageError::NotFound)
    }

    pub async fn set_status(&mut self, id: Uuid, status: CompetitionStatus) -> Result<Competition> {
        let sql = format!(
            r#"
            UPDATE competitions
            SET status = $2, updated_at = NOW()
            WHERE competition_id = $1
            RETURNING {COMPETITION_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Competition>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or(StorageError::NotFound)
    }

    /// Participants and judge invitations both exist
    pub async fn ready_to_publish(&mut self, id: Uuid) -> Result<bool> {
        let ready = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM participants WHERE competition_id = $1)
               AND EXISTS (SELECT 1 FROM judge_assignments WHERE competition_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(ready)
    }

    /// Delete a competition by ID; participants, invitations, scores and
    /// ranking entries cascade.
    pub async fn delete(&mut self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM competitions WHERE competition_id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
