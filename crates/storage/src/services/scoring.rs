use sqlx::PgConnection;
use uuid::Uuid;

use super::notify::{LeaderboardChanged, LeaderboardSink, publish};
use super::{ranking, retry};
use crate::Database;
use crate::dto::score::{JudgingSheet, ScoreResponse, ScoreSubmission, SubmitScore};
use crate::error::{Result, StorageError};
use crate::models::{Competition, ScoreValue};
use crate::repository::competition::CompetitionRepository;
use crate::repository::judge_assignment::JudgeAssignmentRepository;
use crate::repository::participant::ParticipantRepository;
use crate::repository::score::ScoreRepository;

/// Lock the competition and check that `judge_id` may score in it right now.
async fn lock_for_judging(
    conn: &mut PgConnection,
    competition_id: Uuid,
    judge_id: Uuid,
) -> Result<Competition> {
    let competition = CompetitionRepository::new(conn)
        .lock_by_id(competition_id)
        .await?;

    competition.status.ensure_accepts_scores()?;

    let accepted = JudgeAssignmentRepository::new(conn)
        .find_for_user(competition_id, judge_id)
        .await?
        .is_some_and(|a| a.is_accepted_by(judge_id));

    if !accepted {
        return Err(StorageError::forbidden(
            "only accepted judges of this competition can submit scores",
        ));
    }

    Ok(competition)
}

async fn submit_once(db: &Database, cmd: &SubmitScore, value: ScoreValue) -> Result<ScoreSubmission> {
    let mut tx = db.pool().begin().await?;

    lock_for_judging(&mut tx, cmd.competition_id, cmd.judge_id).await?;

    ParticipantRepository::new(&mut tx)
        .find_in_competition(cmd.competition_id, cmd.participant_id)
        .await?;

    let score = ScoreRepository::new(&mut tx)
        .upsert(
            cmd.judge_id,
            cmd.participant_id,
            cmd.competition_id,
            value,
            cmd.comment.as_deref(),
        )
        .await?;

    let leaderboard = ranking::recompute(&mut tx, cmd.competition_id).await?;

    tx.commit().await?;

    Ok(ScoreSubmission {
        score: ScoreResponse::from(score),
        leaderboard,
    })
}

/// Create or update a judge's score for a participant.
///
/// The score write and the ranking recomputation share one transaction; if
/// either fails nothing is persisted. The sink is informed only after commit.
pub async fn submit_score(
    db: &Database,
    sink: &dyn LeaderboardSink,
    cmd: SubmitScore,
) -> Result<ScoreSubmission> {
    let value = ScoreValue::new(cmd.value)?;

    let submission = retry::run(db.retry_policy(), "score submission", || {
        submit_once(db, &cmd, value)
    })
    .await?;

    tracing::info!(
        competition_id = %cmd.competition_id,
        participant_id = %cmd.participant_id,
        judge_id = %cmd.judge_id,
        value = %submission.score.value,
        "Score recorded"
    );

    publish(
        sink,
        &LeaderboardChanged {
            competition_id: cmd.competition_id,
            rows: submission.leaderboard.clone(),
        },
    );

    Ok(submission)
}

async fn delete_once(
    db: &Database,
    judge_id: Uuid,
    competition_id: Uuid,
    score_id: Uuid,
) -> Result<LeaderboardChanged> {
    let mut tx = db.pool().begin().await?;

    lock_for_judging(&mut tx, competition_id, judge_id).await?;

    let score = ScoreRepository::new(&mut tx)
        .find_for_judge(score_id, judge_id)
        .await?;
    if score.competition_id != competition_id {
        return Err(StorageError::NotFound);
    }

    ScoreRepository::new(&mut tx).delete(score_id).await?;

    let rows = ranking::recompute(&mut tx, competition_id).await?;

    tx.commit().await?;

    Ok(LeaderboardChanged {
        competition_id,
        rows,
    })
}

/// Withdraw one of the judge's own scores while the competition is open.
pub async fn delete_score(
    db: &Database,
    sink: &dyn LeaderboardSink,
    judge_id: Uuid,
    competition_id: Uuid,
    score_id: Uuid,
) -> Result<()> {
    let event = retry::run(db.retry_policy(), "score deletion", || {
        delete_once(db, judge_id, competition_id, score_id)
    })
    .await?;

    tracing::info!(%competition_id, %score_id, %judge_id, "Score deleted");

    publish(sink, &event);

    Ok(())
}

/// Every participant with the judge's current score.
pub async fn judging_sheet(db: &Database, judge_id: Uuid, competition_id: Uuid) -> Result<JudgingSheet> {
    let mut conn = db.pool().acquire().await?;

    CompetitionRepository::new(&mut conn)
        .find_by_id(competition_id)
        .await?;

    let accepted = JudgeAssignmentRepository::new(&mut conn)
        .find_for_user(competition_id, judge_id)
        .await?
        .is_some_and(|a| a.is_accepted_by(judge_id));
    if !accepted {
        return Err(StorageError::forbidden(
            "only accepted judges of this competition can open its judging sheet",
        ));
    }

    let rows = ScoreRepository::new(&mut conn)
        .judging_rows(competition_id, judge_id)
        .await?;

    Ok(JudgingSheet::new(competition_id, rows))
}

/// Competitions the user judges.
pub async fn judged_competitions(db: &Database, user_id: Uuid) -> Result<Vec<Competition>> {
    let mut conn = db.pool().acquire().await?;
    CompetitionRepository::new(&mut conn)
        .list_judged_by(user_id)
        .await
}
