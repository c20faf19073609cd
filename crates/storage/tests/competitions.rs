//! Competition lifecycle against a real PostgreSQL.

mod common;

use common::*;
use sqlx::PgPool;
use storage::Database;
use storage::dto::competition::{
    AddParticipantRequest, BuildCompetitionRequest, CompetitionDetails, UpdateCompetitionRequest,
};
use storage::dto::ranking::LeaderboardSource;
use storage::error::StorageError;
use storage::models::CompetitionStatus;
use storage::services::notify::NullSink;
use storage::services::{competitions, scoring};

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_build_creates_draft_with_roster(pool: PgPool) {
    let db = Database::from_pool(pool);
    let owner = create_user(&db, "Owner", "owner@example.com").await;
    let competition = build_competition(
        &db,
        &owner,
        &["j1@example.com", "J1@example.com", "j2@example.com"],
        &["Alice", "Bob <bob@example.com>", "alice"],
    )
    .await;

    assert_eq!(competition.status, CompetitionStatus::Draft);

    let dashboard = competitions::dashboard(&db, Some(owner.user_id), competition.competition_id)
        .await
        .unwrap();
    assert!(dashboard.ready_to_publish);
    assert_eq!(dashboard.roster.len(), 2);
    assert!(dashboard.roster.iter().all(|r| !r.claimed && r.position.is_none()));

    let overview = storage::services::invitations::overview(
        &db,
        owner.user_id,
        competition.competition_id,
    )
    .await
    .unwrap();
    assert_eq!(overview.judges.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_build_without_judges_persists_nothing(pool: PgPool) {
    let db = Database::from_pool(pool);
    let owner = create_user(&db, "Owner", "owner@example.com").await;

    let req = BuildCompetitionRequest {
        details: CompetitionDetails {
            title: "Spring Cup".to_string(),
            description: None,
            rules: None,
        },
        judge_emails: "not-an-email".to_string(),
        participants: "Alice".to_string(),
    };
    let err = competitions::build_competition(&db, owner.user_id, &req)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Validation(_)));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM competitions")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_drafts_are_hidden_from_everyone_but_the_owner(pool: PgPool) {
    let db = Database::from_pool(pool);
    let owner = create_user(&db, "Owner", "owner@example.com").await;
    let other = create_user(&db, "Other", "other@example.com").await;
    let competition = build_competition(&db, &owner, &["j@example.com"], &["A"]).await;

    let err = competitions::dashboard(&db, Some(other.user_id), competition.competition_id)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
    let err = competitions::visible_leaderboard(&db, None, competition.competition_id)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
    assert!(competitions::list_public(&db).await.unwrap().is_empty());

    open(&db, &owner, &competition).await;

    let listed = competitions::list_public(&db).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].owner_name, "Owner");
    assert_eq!(listed[0].participant_count, 1);

    let board = competitions::visible_leaderboard(&db, None, competition.competition_id)
        .await
        .unwrap();
    assert_eq!(board.source, LeaderboardSource::Live);
    assert_eq!(board.rows.len(), 1);
    assert_eq!(board.rows[0].position, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_status_transitions(pool: PgPool) {
    let db = Database::from_pool(pool);
    let owner = create_user(&db, "Owner", "owner@example.com").await;
    let other = create_user(&db, "Other", "other@example.com").await;
    let competition = build_competition(&db, &owner, &["j@example.com"], &["A"]).await;
    let id = competition.competition_id;

    let err = competitions::transition_status(&db, other.user_id, id, CompetitionStatus::Open)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Forbidden(_)));

    let err = competitions::transition_status(&db, owner.user_id, id, CompetitionStatus::Closed)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Validation(_)));

    let opened = competitions::transition_status(&db, owner.user_id, id, CompetitionStatus::Open)
        .await
        .unwrap();
    assert_eq!(opened.status, CompetitionStatus::Open);

    let again = competitions::transition_status(&db, owner.user_id, id, CompetitionStatus::Open)
        .await
        .unwrap();
    assert_eq!(again.status, CompetitionStatus::Open);

    competitions::transition_status(&db, owner.user_id, id, CompetitionStatus::Closed)
        .await
        .unwrap();
    let err = competitions::transition_status(&db, owner.user_id, id, CompetitionStatus::Open)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Validation(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_rules_cannot_be_removed_once_open(pool: PgPool) {
    let db = Database::from_pool(pool);
    let owner = create_user(&db, "Owner", "owner@example.com").await;
    let competition = build_competition(&db, &owner, &["j@example.com"], &["A"]).await;
    let id = competition.competition_id;

    let renamed = competitions::update_competition(
        &db,
        owner.user_id,
        id,
        &UpdateCompetitionRequest {
            title: Some("Autumn Cup".to_string()),
            description: None,
            rules: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.title, "Autumn Cup");
    assert_eq!(renamed.rules, competition.rules);

    open(&db, &owner, &competition).await;

    let err = competitions::update_competition(
        &db,
        owner.user_id,
        id,
        &UpdateCompetitionRequest {
            title: None,
            description: None,
            rules: Some("   ".to_string()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, StorageError::Validation(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_late_participant_joins_existing_snapshot(pool: PgPool) {
    let db = Database::from_pool(pool);
    let sink = RecordingSink::default();
    let owner = create_user(&db, "Owner", "owner@example.com").await;
    let competition = build_competition(&db, &owner, &["j@example.com"], &["A"]).await;
    open(&db, &owner, &competition).await;
    let judge = accepted_judge(&db, &owner, &competition, "j@example.com").await;
    let (a, _) = participant(&db, &owner, &competition, "A").await;

    scoring::submit_score(&db, &NullSink, score(&judge, &competition, a, "5"))
        .await
        .unwrap();

    let req = AddParticipantRequest {
        name: "Late".to_string(),
        email: None,
    };
    let late = competitions::add_participant(&db, &sink, owner.user_id, competition.competition_id, &req)
        .await
        .unwrap();

    let board = competitions::visible_leaderboard(&db, None, competition.competition_id)
        .await
        .unwrap();
    assert_eq!(board.source, LeaderboardSource::Snapshot);
    assert_eq!(board.rows.len(), 2);
    assert_eq!(board.rows[1].participant_id, late.participant_id);
    assert_eq!(sink.events().len(), 1);

    let err = competitions::add_participant(&db, &sink, owner.user_id, competition.competition_id, &req)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::ConstraintViolation(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_cascades(pool: PgPool) {
    let db = Database::from_pool(pool);
    let owner = create_user(&db, "Owner", "owner@example.com").await;
    let competition = build_competition(&db, &owner, &["j@example.com"], &["A", "B"]).await;
    open(&db, &owner, &competition).await;
    let judge = accepted_judge(&db, &owner, &competition, "j@example.com").await;
    let (a, _) = participant(&db, &owner, &competition, "A").await;
    scoring::submit_score(&db, &NullSink, score(&judge, &competition, a, "7"))
        .await
        .unwrap();

    competitions::delete_competition(&db, owner.user_id, competition.competition_id)
        .await
        .unwrap();

    for table in ["participants", "judge_assignments", "scores", "ranking_entries", "invitations"] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0, "{table} should be empty");
    }
}
