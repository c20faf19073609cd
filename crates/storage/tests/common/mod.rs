#![allow(dead_code)]

use std::sync::Mutex;

use rust_decimal::Decimal;
use storage::Database;
use storage::dto::competition::{BuildCompetitionRequest, CompetitionDetails};
use storage::dto::score::SubmitScore;
use storage::models::{Competition, CompetitionStatus, NormalizedEmail, User, UserRole};
use storage::repository::user::UserRepository;
use storage::services::notify::{LeaderboardChanged, LeaderboardSink, NotifyError};
use storage::services::{competitions, invitations};
use uuid::Uuid;

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<LeaderboardChanged>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<LeaderboardChanged> {
        self.events.lock().unwrap().clone()
    }
}

impl LeaderboardSink for RecordingSink {
    fn leaderboard_changed(&self, event: &LeaderboardChanged) -> Result<(), NotifyError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub async fn create_user(db: &Database, name: &str, email: &str) -> User {
    let mut conn = db.pool().acquire().await.unwrap();
    UserRepository::new(&mut conn)
        .create(name, &NormalizedEmail::parse(email).unwrap(), UserRole::User)
        .await
        .expect("user should be created")
}

pub async fn build_competition(
    db: &Database,
    owner: &User,
    judges: &[&str],
    participants: &[&str],
) -> Competition {
    let req = BuildCompetitionRequest {
        details: CompetitionDetails {
            title: "Spring Cup".to_string(),
            description: Some("Yearly showcase".to_string()),
            rules: Some("Scores from 0 to 10".to_string()),
        },
        judge_emails: judges.join(", "),
        participants: participants.join("\n"),
    };

    competitions::build_competition(db, owner.user_id, &req)
        .await
        .expect("competition should be built")
}

pub async fn open(db: &Database, owner: &User, competition: &Competition) {
    competitions::transition_status(
        db,
        owner.user_id,
        competition.competition_id,
        CompetitionStatus::Open,
    )
    .await
    .expect("competition should open");
}

pub async fn judge_token(db: &Database, owner: &User, competition: &Competition, email: &str) -> Uuid {
    invitations::overview(db, owner.user_id, competition.competition_id)
        .await
        .unwrap()
        .judges
        .into_iter()
        .find(|j| j.email == email)
        .expect("judge invitation should exist")
        .invitation_token
}

pub async fn participant(
    db: &Database,
    owner: &User,
    competition: &Competition,
    name: &str,
) -> (Uuid, Uuid) {
    let row = invitations::overview(db, owner.user_id, competition.competition_id)
        .await
        .unwrap()
        .participants
        .into_iter()
        .find(|p| p.name == name)
        .expect("participant should exist");

    (row.participant_id, row.invitation_token)
}

/// A judge account that has accepted its invitation.
pub async fn accepted_judge(
    db: &Database,
    owner: &User,
    competition: &Competition,
    email: &str,
) -> User {
    let judge = create_user(db, email, email).await;
    let token = judge_token(db, owner, competition, email).await;
    invitations::resolve_invitation(db, token, judge.user_id)
        .await
        .expect("judge invitation should resolve");
    judge
}

pub fn score(judge: &User, competition: &Competition, participant_id: Uuid, value: &str) -> SubmitScore {
    SubmitScore {
        judge_id: judge.user_id,
        participant_id,
        competition_id: competition.competition_id,
        value: dec(value),
        comment: None,
    }
}
