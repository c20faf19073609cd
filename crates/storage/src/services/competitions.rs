use uuid::Uuid;

use super::notify::{LeaderboardChanged, LeaderboardSink, publish};
use super::{ranking, retry};
use crate::Database;
use crate::dto::blueprint::{CompetitionBlueprint, non_blank};
use crate::dto::competition::{
    AddParticipantRequest, BuildCompetitionRequest, CompetitionDashboard, CompetitionListItem,
    CompetitionResponse, UpdateCompetitionRequest,
};
use crate::dto::ranking::LeaderboardResponse;
use crate::error::{Result, StorageError};
use crate::models::{Competition, CompetitionStatus, NormalizedEmail, Participant};
use crate::repository::competition::CompetitionRepository;
use crate::repository::judge_assignment::JudgeAssignmentRepository;
use crate::repository::participant::ParticipantRepository;
use crate::repository::user::UserRepository;

/// Persist a whole competition build as a draft: details, pending judge
/// invitations and tokenised participants. All or nothing.
pub async fn build_competition(
    db: &Database,
    owner_id: Uuid,
    req: &BuildCompetitionRequest,
) -> Result<Competition> {
    let blueprint = CompetitionBlueprint::from_request(req)?;

    let mut tx = db.pool().begin().await?;

    UserRepository::new(&mut tx).find_by_id(owner_id).await?;

    let competition = CompetitionRepository::new(&mut tx)
        .create(owner_id, &blueprint.details)
        .await?;

    for line in &blueprint.participants {
        ParticipantRepository::new(&mut tx)
            .create(
                competition.competition_id,
                &line.name,
                line.email.as_ref(),
                Some(owner_id),
            )
            .await?;
    }

    for email in &blueprint.judge_emails {
        JudgeAssignmentRepository::new(&mut tx)
            .create_pending(competition.competition_id, email, Some(owner_id))
            .await?;
    }

    tx.commit().await?;

    tracing::info!(
        competition_id = %competition.competition_id,
        %owner_id,
        participants = blueprint.participants.len(),
        judges = blueprint.judge_emails.len(),
        "Competition built"
    );

    Ok(competition)
}

/// Edit title, description and rules. Omitted fields are kept.
pub async fn update_competition(
    db: &Database,
    actor_id: Uuid,
    competition_id: Uuid,
    req: &UpdateCompetitionRequest,
) -> Result<Competition> {
    let mut tx = db.pool().begin().await?;

    let existing = CompetitionRepository::new(&mut tx)
        .lock_by_id(competition_id)
        .await?;
    existing.ensure_owner(actor_id)?;

    let title = match req.title.as_deref().map(str::trim) {
        Some("") => return Err(StorageError::validation("Competition title is required")),
        Some(title) => title.to_string(),
        None => existing.title.clone(),
    };
    let description = match req.description.as_deref() {
        Some(d) => non_blank(Some(d)),
        None => existing.description.clone(),
    };
    let rules = match req.rules.as_deref() {
        Some(r) => non_blank(Some(r)),
        None => existing.rules.clone(),
    };

    if existing.status.requires_rules() && rules.is_none() {
        return Err(StorageError::validation(
            "rules cannot be removed from a published competition",
        ));
    }

    let updated = CompetitionRepository::new(&mut tx)
        .update_details(
            competition_id,
            &title,
            description.as_deref(),
            rules.as_deref(),
        )
        .await?;

    tx.commit().await?;

    Ok(updated)
}

async fn transition_once(
    db: &Database,
    actor_id: Uuid,
    competition_id: Uuid,
    target: CompetitionStatus,
) -> Result<Competition> {
    let mut tx = db.pool().begin().await?;

    let competition = CompetitionRepository::new(&mut tx)
        .lock_by_id(competition_id)
        .await?;
    competition.ensure_owner(actor_id)?;

    if !competition.plan_transition(target)? {
        return Ok(competition);
    }

    let updated = CompetitionRepository::new(&mut tx)
        .set_status(competition_id, target)
        .await?;

    tx.commit().await?;

    tracing::info!(
        %competition_id,
        from = %competition.status,
        to = %target,
        "Competition status changed"
    );

    Ok(updated)
}

/// Move a competition along draft -> open -> closed.
pub async fn transition_status(
    db: &Database,
    actor_id: Uuid,
    competition_id: Uuid,
    target: CompetitionStatus,
) -> Result<Competition> {
    retry::run(db.retry_policy(), "status transition", || {
        transition_once(db, actor_id, competition_id, target)
    })
    .await
}

/// Delete a competition with its participants, invitations, scores and ranking.
pub async fn delete_competition(db: &Database, actor_id: Uuid, competition_id: Uuid) -> Result<()> {
    let mut tx = db.pool().begin().await?;

    CompetitionRepository::new(&mut tx)
        .lock_by_id(competition_id)
        .await?
        .ensure_owner(actor_id)?;

    CompetitionRepository::new(&mut tx)
        .delete(competition_id)
        .await?;

    tx.commit().await?;

    tracing::info!(%competition_id, "Competition deleted");

    Ok(())
}

async fn add_participant_once(
    db: &Database,
    actor_id: Uuid,
    competition_id: Uuid,
    name: &str,
    email: Option<&NormalizedEmail>,
) -> Result<(Participant, Option<LeaderboardChanged>)> {
    let mut tx = db.pool().begin().await?;

    CompetitionRepository::new(&mut tx)
        .lock_by_id(competition_id)
        .await?
        .ensure_owner(actor_id)?;

    let participant = ParticipantRepository::new(&mut tx)
        .create(competition_id, name, email, Some(actor_id))
        .await?;

    let rows = ranking::recompute_if_snapshot_exists(&mut tx, competition_id).await?;

    tx.commit().await?;

    Ok((
        participant,
        rows.map(|rows| LeaderboardChanged {
            competition_id,
            rows,
        }),
    ))
}

/// Add a participant to an existing competition. When a ranking snapshot
/// already exists it is rebuilt so the newcomer appears on it.
pub async fn add_participant(
    db: &Database,
    sink: &dyn LeaderboardSink,
    actor_id: Uuid,
    competition_id: Uuid,
    req: &AddParticipantRequest,
) -> Result<Participant> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(StorageError::validation("Participant name is required"));
    }

    let email = match req.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        Some(raw) => Some(
            NormalizedEmail::parse(raw)
                .ok_or_else(|| StorageError::validation("Email must be a valid address"))?,
        ),
        None => None,
    };

    let (participant, event) = retry::run(db.retry_policy(), "participant creation", || {
        add_participant_once(db, actor_id, competition_id, name, email.as_ref())
    })
    .await?;

    tracing::info!(
        %competition_id,
        participant_id = %participant.participant_id,
        "Participant added"
    );

    if let Some(event) = event {
        publish(sink, &event);
    }

    Ok(participant)
}

/// Open and closed competitions.
pub async fn list_public(db: &Database) -> Result<Vec<CompetitionListItem>> {
    let mut conn = db.pool().acquire().await?;
    CompetitionRepository::new(&mut conn).list_public().await
}

/// Competition page. Drafts are only visible to their owner; anyone else
/// gets `NotFound`.
pub async fn dashboard(
    db: &Database,
    viewer: Option<Uuid>,
    competition_id: Uuid,
) -> Result<CompetitionDashboard> {
    let mut conn = db.pool().acquire().await?;

    let competition = CompetitionRepository::new(&mut conn)
        .find_by_id(competition_id)
        .await?;
    if !competition.is_visible_to(viewer) {
        return Err(StorageError::NotFound);
    }

    let ready_to_publish = CompetitionRepository::new(&mut conn)
        .ready_to_publish(competition_id)
        .await?;
    let roster = ParticipantRepository::new(&mut conn)
        .roster(competition_id)
        .await?;
    let leaderboard = ranking::leaderboard_on(&mut conn, competition_id).await?;

    Ok(CompetitionDashboard {
        competition: CompetitionResponse::from(competition),
        ready_to_publish,
        roster,
        leaderboard: leaderboard.rows,
    })
}

/// Leaderboard with the same visibility rule as the dashboard.
pub async fn visible_leaderboard(
    db: &Database,
    viewer: Option<Uuid>,
    competition_id: Uuid,
) -> Result<LeaderboardResponse> {
    let mut conn = db.pool().acquire().await?;

    let competition = CompetitionRepository::new(&mut conn)
        .find_by_id(competition_id)
        .await?;
    if !competition.is_visible_to(viewer) {
        return Err(StorageError::NotFound);
    }

    ranking::leaderboard_on(&mut conn, competition_id).await
}
