use sqlx::PgConnection;
use uuid::Uuid;

use super::invitation::InvitationRepository;
use crate::dto::competition::RosterEntry;
use crate::dto::invitation::ParticipantInvitationRow;
use crate::error::{Result, StorageError};
use crate::models::{InvitationKind, NormalizedEmail, Participant, new_invitation_token};

const PARTICIPANT_COLUMNS: &str = "participant_id, competition_id, name, user_id, email, \
     invitation_token, invited_by, enrollment_seq, created_at";

pub struct ParticipantRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> ParticipantRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Insert a participant together with its invitation token.
    pub async fn create(
        &mut self,
        competition_id: Uuid,
        name: &str,
        email: Option<&NormalizedEmail>,
        invited_by: Option<Uuid>,
    ) -> Result<Participant> {
        let token = new_invitation_token();
        InvitationRepository::new(&mut *self.conn)
            .register(token, InvitationKind::Participant, competition_id)
            .await?;

        let sql = format!(
            r#"
            INSERT INTO participants (competition_id, name, email, invitation_token, invited_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PARTICIPANT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Participant>(&sql)
            .bind(competition_id)
            .bind(name)
            .bind(email.map(NormalizedEmail::as_str))
            .bind(token)
            .bind(invited_by)
            .fetch_one(&mut *self.conn)
            .await
            .map_err(|e| {
                StorageError::from(e).on_unique_violation(&format!(
                    "Participant '{name}' already exists in this competition"
                ))
            })
    }

    /// A participant of the given competition
    pub async fn find_in_competition(
        &mut self,
        competition_id: Uuid,
        participant_id: Uuid,
    ) -> Result<Participant> {
        let sql = format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants \
             WHERE competition_id = $1 AND participant_id = $2"
        );

        sqlx::query_as::<_, Participant>(&sql)
            .bind(competition_id)
            .bind(participant_id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or(StorageError::NotFound)
    }

    pub async fn lock_by_token(&mut self, token: Uuid) -> Result<Option<Participant>> {
        let sql = format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE invitation_token = $1 FOR UPDATE"
        );

        let participant = sqlx::query_as::<_, Participant>(&sql)
            .bind(token)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(participant)
    }

    /// Bind the slot to a user account and take over its email.
    pub async fn claim(
        &mut self,
        participant_id: Uuid,
        user_id: Uuid,
        email: Option<&str>,
    ) -> Result<Participant> {
        let sql = format!(
            r#"
            UPDATE participants
            SET user_id = $2, email = COALESCE($3, email)
            WHERE participant_id = $1
            RETURNING {PARTICIPANT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Participant>(&sql)
            .bind(participant_id)
            .bind(user_id)
            .bind(email)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or(StorageError::NotFound)
    }

    /// Roster ordered by name, with each participant's snapshot standing.
    pub async fn roster(&mut self, competition_id: Uuid) -> Result<Vec<RosterEntry>> {
        let roster = sqlx::query_as::<_, RosterEntry>(
            r#"
            SELECT p.participant_id,
                   COALESCE(NULLIF(u.name, ''), p.name) AS display_name,
                   p.user_id IS NOT NULL AS claimed,
                   r.position,
                   r.aggregate_score
            FROM participants p
            LEFT JOIN users u ON u.user_id = p.user_id
            LEFT JOIN ranking_entries r
                   ON r.participant_id = p.participant_id AND r.competition_id = p.competition_id
            WHERE p.competition_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(competition_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(roster)
    }

    pub async fn invitations(&mut self, competition_id: Uuid) -> Result<Vec<ParticipantInvitationRow>> {
        let rows = sqlx::query_as::<_, ParticipantInvitationRow>(
            r#"
            SELECT participant_id, name, email, user_id, invitation_token
            FROM participants
            WHERE competition_id = $1
            ORDER BY name
            "#,
        )
        .bind(competition_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows)
    }
}
