//! Score writes and ranking recomputation against a real PostgreSQL.
//! Run with `DATABASE_URL=... cargo test -- --ignored`.

mod common;

use common::*;
use sqlx::PgPool;
use storage::Database;
use storage::dto::ranking::LeaderboardSource;
use storage::error::StorageError;
use storage::models::CompetitionStatus;
use storage::repository::ranking::RankingRepository;
use storage::services::notify::NullSink;
use storage::services::{competitions, ranking, scoring};

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_scores_rank_participants(pool: PgPool) {
    let db = Database::from_pool(pool);
    let sink = RecordingSink::default();
    let owner = create_user(&db, "Owner", "owner@example.com").await;
    let competition = build_competition(
        &db,
        &owner,
        &["j1@example.com", "j2@example.com"],
        &["A", "B", "C"],
    )
    .await;
    open(&db, &owner, &competition).await;
    let j1 = accepted_judge(&db, &owner, &competition, "j1@example.com").await;
    let j2 = accepted_judge(&db, &owner, &competition, "j2@example.com").await;
    let (a, _) = participant(&db, &owner, &competition, "A").await;
    let (b, _) = participant(&db, &owner, &competition, "B").await;

    scoring::submit_score(&db, &sink, score(&j1, &competition, a, "8")).await.unwrap();
    scoring::submit_score(&db, &sink, score(&j2, &competition, a, "9")).await.unwrap();
    let last = scoring::submit_score(&db, &sink, score(&j1, &competition, b, "7"))
        .await
        .unwrap();

    let names: Vec<&str> = last.leaderboard.iter().map(|r| r.display_name.as_str()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
    assert_eq!(
        last.leaderboard.iter().map(|r| r.position).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(last.leaderboard[0].aggregate_score, dec("8.50"));
    assert_eq!(last.leaderboard[2].aggregate_score, dec("0"));

    let stored = competitions::visible_leaderboard(&db, None, competition.competition_id)
        .await
        .unwrap();
    assert_eq!(stored.source, LeaderboardSource::Snapshot);
    assert_eq!(stored.rows, last.leaderboard);

    assert_eq!(sink.events().len(), 3);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_resubmission_updates_the_existing_score(pool: PgPool) {
    let db = Database::from_pool(pool);
    let owner = create_user(&db, "Owner", "owner@example.com").await;
    let competition = build_competition(&db, &owner, &["j@example.com"], &["A"]).await;
    open(&db, &owner, &competition).await;
    let judge = accepted_judge(&db, &owner, &competition, "j@example.com").await;
    let (a, _) = participant(&db, &owner, &competition, "A").await;

    let first = scoring::submit_score(&db, &NullSink, score(&judge, &competition, a, "4"))
        .await
        .unwrap();
    let second = scoring::submit_score(&db, &NullSink, score(&judge, &competition, a, "6"))
        .await
        .unwrap();

    assert_eq!(first.score.score_id, second.score.score_id);
    assert_eq!(second.leaderboard[0].aggregate_score, dec("6"));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scores")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_score_bounds(pool: PgPool) {
    let db = Database::from_pool(pool);
    let owner = create_user(&db, "Owner", "owner@example.com").await;
    let competition = build_competition(&db, &owner, &["j@example.com"], &["A"]).await;
    open(&db, &owner, &competition).await;
    let judge = accepted_judge(&db, &owner, &competition, "j@example.com").await;
    let (a, _) = participant(&db, &owner, &competition, "A").await;

    for bad in ["-0.01", "10.01"] {
        let err = scoring::submit_score(&db, &NullSink, score(&judge, &competition, a, bad))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)), "{bad} should be rejected");
    }

    for good in ["0", "10"] {
        scoring::submit_score(&db, &NullSink, score(&judge, &competition, a, good))
            .await
            .unwrap_or_else(|e| panic!("{good} should be accepted: {e}"));
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_scores_only_while_open(pool: PgPool) {
    let db = Database::from_pool(pool);
    let owner = create_user(&db, "Owner", "owner@example.com").await;
    let competition = build_competition(&db, &owner, &["j@example.com"], &["A"]).await;
    let judge = accepted_judge(&db, &owner, &competition, "j@example.com").await;
    let (a, _) = participant(&db, &owner, &competition, "A").await;

    let err = scoring::submit_score(&db, &NullSink, score(&judge, &competition, a, "5"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Validation(_)));

    open(&db, &owner, &competition).await;
    scoring::submit_score(&db, &NullSink, score(&judge, &competition, a, "5"))
        .await
        .unwrap();

    competitions::transition_status(
        &db,
        owner.user_id,
        competition.competition_id,
        CompetitionStatus::Closed,
    )
    .await
    .unwrap();
    let err = scoring::submit_score(&db, &NullSink, score(&judge, &competition, a, "6"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Validation(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_store_rejects_scores_for_draft_competition(pool: PgPool) {
    let db = Database::from_pool(pool);
    let owner = create_user(&db, "Owner", "owner@example.com").await;
    let competition = build_competition(&db, &owner, &["j@example.com"], &["A"]).await;
    let judge = accepted_judge(&db, &owner, &competition, "j@example.com").await;
    let (a, _) = participant(&db, &owner, &competition, "A").await;

    let result = sqlx::query(
        "INSERT INTO scores (judge_id, participant_id, competition_id, value) VALUES ($1, $2, $3, 5)",
    )
    .bind(judge.user_id)
    .bind(a)
    .bind(competition.competition_id)
    .execute(db.pool())
    .await;

    assert!(result.is_err());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_unaccepted_judge_is_forbidden(pool: PgPool) {
    let db = Database::from_pool(pool);
    let owner = create_user(&db, "Owner", "owner@example.com").await;
    let competition = build_competition(&db, &owner, &["j@example.com"], &["A"]).await;
    open(&db, &owner, &competition).await;
    let stranger = create_user(&db, "Stranger", "stranger@example.com").await;
    let (a, _) = participant(&db, &owner, &competition, "A").await;

    let err = scoring::submit_score(&db, &NullSink, score(&stranger, &competition, a, "5"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Forbidden(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_rolled_back_recompute_keeps_previous_snapshot(pool: PgPool) {
    let db = Database::from_pool(pool);
    let owner = create_user(&db, "Owner", "owner@example.com").await;
    let competition = build_competition(&db, &owner, &["j@example.com"], &["A", "B"]).await;
    open(&db, &owner, &competition).await;
    let judge = accepted_judge(&db, &owner, &competition, "j@example.com").await;
    let (b, _) = participant(&db, &owner, &competition, "B").await;

    let before = scoring::submit_score(&db, &NullSink, score(&judge, &competition, b, "9"))
        .await
        .unwrap()
        .leaderboard;

    let mut tx = db.pool().begin().await.unwrap();
    sqlx::query("DELETE FROM scores WHERE competition_id = $1")
        .bind(competition.competition_id)
        .execute(&mut *tx)
        .await
        .unwrap();
    let during = ranking::recompute(&mut tx, competition.competition_id)
        .await
        .unwrap();
    assert_ne!(during, before);
    tx.rollback().await.unwrap();

    let mut conn = db.pool().acquire().await.unwrap();
    let after = RankingRepository::new(&mut conn)
        .snapshot(competition.competition_id)
        .await
        .unwrap();
    assert_eq!(after, before);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_deleting_a_score_recomputes(pool: PgPool) {
    let db = Database::from_pool(pool);
    let owner = create_user(&db, "Owner", "owner@example.com").await;
    let competition = build_competition(&db, &owner, &["j@example.com"], &["A", "B"]).await;
    open(&db, &owner, &competition).await;
    let judge = accepted_judge(&db, &owner, &competition, "j@example.com").await;
    let (a, _) = participant(&db, &owner, &competition, "A").await;
    let (b, _) = participant(&db, &owner, &competition, "B").await;

    scoring::submit_score(&db, &NullSink, score(&judge, &competition, a, "3"))
        .await
        .unwrap();
    let submission = scoring::submit_score(&db, &NullSink, score(&judge, &competition, b, "8"))
        .await
        .unwrap();
    assert_eq!(submission.leaderboard[0].participant_id, b);

    scoring::delete_score(
        &db,
        &NullSink,
        judge.user_id,
        competition.competition_id,
        submission.score.score_id,
    )
    .await
    .unwrap();

    let board = competitions::visible_leaderboard(&db, None, competition.competition_id)
        .await
        .unwrap();
    assert_eq!(board.rows[0].participant_id, a);
    assert_eq!(board.rows[1].aggregate_score, dec("0"));

    let sheet = scoring::judging_sheet(&db, judge.user_id, competition.competition_id)
        .await
        .unwrap();
    assert!(sheet.needs_scores);
}
