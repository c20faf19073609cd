use sqlx::PgConnection;
use uuid::Uuid;

use super::judge_assignment::JudgeAssignmentRepository;
use super::participant::ParticipantRepository;
use crate::error::Result;
use crate::models::{Invitation, InvitationKind};

/// Global token registry shared by judge and participant invitations.
pub struct InvitationRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> InvitationRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Reserve a token for a slot that is about to be inserted.
    pub async fn register(
        &mut self,
        token: Uuid,
        kind: InvitationKind,
        competition_id: Uuid,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO invitations (invitation_token, kind, competition_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(token)
        .bind(kind.as_str())
        .bind(competition_id)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Resolve a token to its slot, locking the slot row. `None` if unknown.
    pub async fn find_for_update(&mut self, token: Uuid) -> Result<Option<Invitation>> {
        let kind = sqlx::query_scalar::<_, String>(
            "SELECT kind FROM invitations WHERE invitation_token = $1",
        )
        .bind(token)
        .fetch_optional(&mut *self.conn)
        .await?;

        let Some(kind) = kind else {
            return Ok(None);
        };

        let invitation = match kind.parse::<InvitationKind>()? {
            InvitationKind::Judge => JudgeAssignmentRepository::new(&mut *self.conn)
                .lock_by_token(token)
                .await?
                .map(Invitation::Judge),
            InvitationKind::Participant => ParticipantRepository::new(&mut *self.conn)
                .lock_by_token(token)
                .await?
                .map(Invitation::Participant),
        };

        Ok(invitation)
    }
}
