use sqlx::PgConnection;
use uuid::Uuid;

use super::retry;
use crate::Database;
use crate::dto::invitation::{
    InvitationOverview, InvitationPreview, InvitationResolution, RegisterViaInvitationRequest,
};
use crate::error::{Result, StorageError};
use crate::models::{
    ClaimOutcome, Invitation, InvitationKind, JudgeResolution, NormalizedEmail, User, UserRole,
};
use crate::repository::competition::CompetitionRepository;
use crate::repository::invitation::InvitationRepository;
use crate::repository::judge_assignment::JudgeAssignmentRepository;
use crate::repository::participant::ParticipantRepository;
use crate::repository::user::UserRepository;

async fn find_invitation(conn: &mut PgConnection, token: Uuid) -> Result<Invitation> {
    InvitationRepository::new(conn)
        .find_for_update(token)
        .await?
        .ok_or(StorageError::NotFound)
}

/// What the invitation link points at.
pub async fn preview(db: &Database, token: Uuid) -> Result<InvitationPreview> {
    let mut tx = db.pool().begin().await?;

    let invitation = find_invitation(&mut tx, token).await?;
    let competition = CompetitionRepository::new(&mut tx)
        .find_by_id(invitation.competition_id())
        .await?;

    tx.commit().await?;

    Ok(InvitationPreview {
        kind: invitation.kind(),
        competition_id: competition.competition_id,
        competition_title: competition.title,
        competition_status: competition.status,
        default_email: invitation.default_email().map(str::to_string),
        claimed: invitation.bound_user().is_some(),
    })
}

/// Bind `user` to the invitation's slot. Idempotent per user.
async fn attach_user(
    conn: &mut PgConnection,
    invitation: &Invitation,
    user: &User,
) -> Result<bool> {
    match invitation {
        Invitation::Judge(assignment) => {
            if let Some(role) = user.role.upgraded_for_judging() {
                UserRepository::new(conn).update_role(user.user_id, role).await?;
                tracing::info!(user_id = %user.user_id, "User granted judge role");
            }

            match assignment.resolve_for(user.user_id)? {
                JudgeResolution::AlreadyAccepted => Ok(false),
                JudgeResolution::Accept => {
                    JudgeAssignmentRepository::new(conn)
                        .accept(assignment.assignment_id, user.user_id)
                        .await?;
                    tracing::info!(
                        competition_id = %assignment.competition_id,
                        user_id = %user.user_id,
                        "Judge invitation accepted"
                    );
                    Ok(true)
                }
            }
        }
        Invitation::Participant(participant) => match participant.claim_outcome(user.user_id) {
            ClaimOutcome::AlreadyClaimed => Ok(false),
            ClaimOutcome::Claim { previous_user } => {
                let email = Some(user.email.as_str()).filter(|e| !e.is_empty());
                ParticipantRepository::new(conn)
                    .claim(participant.participant_id, user.user_id, email)
                    .await?;

                if let Some(previous) = previous_user {
                    tracing::warn!(
                        participant_id = %participant.participant_id,
                        previous_user = %previous,
                        user_id = %user.user_id,
                        "Participant slot rebound to a different user"
                    );
                } else {
                    tracing::info!(
                        participant_id = %participant.participant_id,
                        user_id = %user.user_id,
                        "Participant invitation claimed"
                    );
                }
                Ok(true)
            }
        },
    }
}

async fn resolve_once(db: &Database, token: Uuid, user_id: Uuid) -> Result<InvitationResolution> {
    let mut tx = db.pool().begin().await?;

    let invitation = find_invitation(&mut tx, token).await?;
    let user = UserRepository::new(&mut tx).lock_by_id(user_id).await?;
    let changed = attach_user(&mut tx, &invitation, &user).await?;

    tx.commit().await?;

    if !changed {
        tracing::debug!(%token, %user_id, "Invitation already resolved for this user");
    }

    Ok(InvitationResolution {
        kind: invitation.kind(),
        competition_id: invitation.competition_id(),
        user_id,
        changed,
    })
}

/// Bind an existing account to the judge or participant slot behind `token`.
///
/// Unknown tokens are `NotFound`. Resolving again with the same user changes
/// nothing. Ranking is not affected.
pub async fn resolve_invitation(
    db: &Database,
    token: Uuid,
    user_id: Uuid,
) -> Result<InvitationResolution> {
    retry::run(db.retry_policy(), "invitation resolution", || {
        resolve_once(db, token, user_id)
    })
    .await
}

/// Create an account from the invitation form and resolve the invitation with
/// it, atomically. Judges are registered with the judge role.
pub async fn register_and_resolve(
    db: &Database,
    token: Uuid,
    req: &RegisterViaInvitationRequest,
) -> Result<(User, InvitationResolution)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(StorageError::validation("Name is required"));
    }
    let email = NormalizedEmail::parse(&req.email)
        .ok_or_else(|| StorageError::validation("Email must be a valid address"))?;

    let mut tx = db.pool().begin().await?;

    let invitation = find_invitation(&mut tx, token).await?;
    let role = match invitation.kind() {
        InvitationKind::Judge => UserRole::Judge,
        InvitationKind::Participant => UserRole::User,
    };

    let user = UserRepository::new(&mut tx).create(name, &email, role).await?;
    let changed = attach_user(&mut tx, &invitation, &user).await?;

    tx.commit().await?;

    tracing::info!(user_id = %user.user_id, kind = %invitation.kind(), "Account registered from invitation");

    let resolution = InvitationResolution {
        kind: invitation.kind(),
        competition_id: invitation.competition_id(),
        user_id: user.user_id,
        changed,
    };

    Ok((user, resolution))
}

/// Turn down a pending judge invitation.
pub async fn decline_invitation(db: &Database, token: Uuid) -> Result<()> {
    let mut tx = db.pool().begin().await?;

    let assignment = match find_invitation(&mut tx, token).await? {
        Invitation::Judge(assignment) => assignment,
        Invitation::Participant(_) => {
            return Err(StorageError::validation(
                "participant invitations cannot be declined",
            ));
        }
    };

    if assignment.plan_decline()? {
        JudgeAssignmentRepository::new(&mut tx)
            .decline(assignment.assignment_id)
            .await?;
        tracing::info!(
            competition_id = %assignment.competition_id,
            email = %assignment.email,
            "Judge invitation declined"
        );
    }

    tx.commit().await?;

    Ok(())
}

/// Every invitation of a competition, for its owner.
pub async fn overview(db: &Database, actor_id: Uuid, competition_id: Uuid) -> Result<InvitationOverview> {
    let mut conn = db.pool().acquire().await?;

    CompetitionRepository::new(&mut conn)
        .find_by_id(competition_id)
        .await?
        .ensure_owner(actor_id)?;

    let judges = JudgeAssignmentRepository::new(&mut conn)
        .invitations(competition_id)
        .await?;
    let participants = ParticipantRepository::new(&mut conn)
        .invitations(competition_id)
        .await?;

    Ok(InvitationOverview {
        competition_id,
        judges,
        participants,
    })
}
