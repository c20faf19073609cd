use sqlx::PgConnection;
use uuid::Uuid;

use super::invitation::InvitationRepository;
use crate::dto::invitation::JudgeInvitationRow;
use crate::error::{Result, StorageError};
use crate::models::{AssignmentStatus, InvitationKind, JudgeAssignment, NormalizedEmail, new_invitation_token};

const ASSIGNMENT_COLUMNS: &str = "assignment_id, competition_id, user_id, invited_by, email, \
     status, invitation_token, created_at, updated_at";

pub struct JudgeAssignmentRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> JudgeAssignmentRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Issue a pending invitation for `email`.
    pub async fn create_pending(
        &mut self,
        competition_id: Uuid,
        email: &NormalizedEmail,
        invited_by: Option<Uuid>,
    ) -> Result<JudgeAssignment> {
        let token = new_invitation_token();
        InvitationRepository::new(&mut *self.conn)
            .register(token, InvitationKind::Judge, competition_id)
            .await?;

        let sql = format!(
            r#"
            INSERT INTO judge_assignments (competition_id, email, status, invitation_token, invited_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ASSIGNMENT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, JudgeAssignment>(&sql)
            .bind(competition_id)
            .bind(email.as_str())
            .bind(AssignmentStatus::Pending.as_str())
            .bind(token)
            .bind(invited_by)
            .fetch_one(&mut *self.conn)
            .await
            .map_err(|e| {
                StorageError::from(e).on_unique_violation(&format!(
                    "Judge '{email}' is already invited to this competition"
                ))
            })
    }

    pub async fn lock_by_token(&mut self, token: Uuid) -> Result<Option<JudgeAssignment>> {
        let sql = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM judge_assignments WHERE invitation_token = $1 FOR UPDATE"
        );

        let assignment = sqlx::query_as::<_, JudgeAssignment>(&sql)
            .bind(token)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(assignment)
    }

    /// The assignment bound to `user_id` in this competition, if any.
    pub async fn find_for_user(
        &mut self,
        competition_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<JudgeAssignment>> {
        let sql = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM judge_assignments \
             WHERE competition_id = $1 AND user_id = $2"
        );

        let assignment = sqlx::query_as::<_, JudgeAssignment>(&sql)
            .bind(competition_id)
            .bind(user_id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(assignment)
    }

    /// Bind `user_id` and mark the assignment accepted. `email` stays the
    /// address the invitation was sent to.
    pub async fn accept(&mut self, assignment_id: Uuid, user_id: Uuid) -> Result<JudgeAssignment> {
        let sql = format!(
            r#"
            UPDATE judge_assignments
            SET user_id = $2, status = $3, updated_at = NOW()
            WHERE assignment_id = $1
            RETURNING {ASSIGNMENT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, JudgeAssignment>(&sql)
            .bind(assignment_id)
            .bind(user_id)
            .bind(AssignmentStatus::Accepted.as_str())
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|e| {
                StorageError::from(e)
                    .on_unique_violation("This account is already a judge of this competition")
            })?
            .ok_or(StorageError::NotFound)
    }

    pub async fn decline(&mut self, assignment_id: Uuid) -> Result<JudgeAssignment> {
        let sql = format!(
            r#"
            UPDATE judge_assignments
            SET status = $2, updated_at = NOW()
            WHERE assignment_id = $1
            RETURNING {ASSIGNMENT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, JudgeAssignment>(&sql)
            .bind(assignment_id)
            .bind(AssignmentStatus::Declined.as_str())
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or(StorageError::NotFound)
    }

    pub async fn invitations(&mut self, competition_id: Uuid) -> Result<Vec<JudgeInvitationRow>> {
        let rows = sqlx::query_as::<_, JudgeInvitationRow>(
            r#"
            SELECT assignment_id, email, status, user_id, invitation_token
            FROM judge_assignments
            WHERE competition_id = $1
            ORDER BY created_at DESC, email
            "#,
        )
        .bind(competition_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows)
    }
}
