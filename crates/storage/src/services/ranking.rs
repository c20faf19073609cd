use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::dto::ranking::{LeaderboardResponse, LeaderboardRow, LeaderboardSource};
use crate::error::Result;
use crate::repository::competition::CompetitionRepository;
use crate::repository::ranking::RankingRepository;
use crate::repository::score::ScoreRepository;

/// A participant with every score it received.
#[derive(Debug, Clone)]
pub struct RankingCandidate {
    pub participant_id: Uuid,
    pub display_name: String,
    /// Creation order; lower ranks first on equal aggregates.
    pub enrollment_seq: i64,
    pub scores: Vec<Decimal>,
}

/// Arithmetic mean, exactly 0 without scores. Not rounded.
pub fn mean_score(scores: &[Decimal]) -> Decimal {
    if scores.is_empty() {
        return Decimal::ZERO;
    }

    let total: Decimal = scores.iter().copied().sum();
    total / Decimal::from(scores.len())
}

/// Two decimals, half away from zero.
pub fn round_aggregate(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Order candidates by mean descending, then creation order, and number them
/// 1..=N without gaps or shared positions.
pub fn compute_standings(candidates: Vec<RankingCandidate>) -> Vec<LeaderboardRow> {
    let mut scored: Vec<(Decimal, RankingCandidate)> = candidates
        .into_iter()
        .map(|c| (mean_score(&c.scores), c))
        .collect();

    scored.sort_by(|(mean_a, a), (mean_b, b)| {
        mean_b
            .cmp(mean_a)
            .then_with(|| a.enrollment_seq.cmp(&b.enrollment_seq))
    });

    scored
        .into_iter()
        .enumerate()
        .map(|(index, (mean, candidate))| LeaderboardRow {
            participant_id: candidate.participant_id,
            display_name: candidate.display_name,
            aggregate_score: round_aggregate(mean),
            position: index as i32 + 1,
        })
        .collect()
}

async fn load_candidates(
    conn: &mut PgConnection,
    competition_id: Uuid,
) -> Result<Vec<RankingCandidate>> {
    let participants = RankingRepository::new(conn)
        .participants(competition_id)
        .await?;
    let values = ScoreRepository::new(conn)
        .values_for_competition(competition_id)
        .await?;

    let mut by_participant: HashMap<Uuid, Vec<Decimal>> = HashMap::new();
    for (participant_id, value) in values {
        by_participant.entry(participant_id).or_default().push(value);
    }

    let candidates = participants
        .into_iter()
        .map(|p| RankingCandidate {
            scores: by_participant.remove(&p.participant_id).unwrap_or_default(),
            participant_id: p.participant_id,
            display_name: p.display_name,
            enrollment_seq: p.enrollment_seq,
        })
        .collect();

    Ok(candidates)
}

/// Rebuild the competition's ranking snapshot from its current scores.
///
/// Runs on the caller's connection, which must be inside the transaction of
/// the write that triggered it: the snapshot and that write commit or roll
/// back together. The competition row is locked first so two replacements
/// for the same competition never interleave.
pub async fn recompute(conn: &mut PgConnection, competition_id: Uuid) -> Result<Vec<LeaderboardRow>> {
    CompetitionRepository::new(conn)
        .lock_by_id(competition_id)
        .await?;

    let standings = compute_standings(load_candidates(conn, competition_id).await?);

    RankingRepository::new(conn)
        .replace(competition_id, &standings)
        .await?;

    tracing::info!(
        %competition_id,
        entries = standings.len(),
        "Ranking snapshot recomputed"
    );

    Ok(standings)
}

/// Recompute only when a snapshot already exists.
pub async fn recompute_if_snapshot_exists(
    conn: &mut PgConnection,
    competition_id: Uuid,
) -> Result<Option<Vec<LeaderboardRow>>> {
    if !RankingRepository::new(conn).has_snapshot(competition_id).await? {
        return Ok(None);
    }

    recompute(conn, competition_id).await.map(Some)
}

/// Current standings: the snapshot when one exists, otherwise computed live
/// from scores with the same rules.
pub async fn leaderboard_on(
    conn: &mut PgConnection,
    competition_id: Uuid,
) -> Result<LeaderboardResponse> {
    let snapshot = RankingRepository::new(conn).snapshot(competition_id).await?;

    let (source, rows) = if snapshot.is_empty() {
        let live = compute_standings(load_candidates(conn, competition_id).await?);
        (LeaderboardSource::Live, live)
    } else {
        (LeaderboardSource::Snapshot, snapshot)
    };

    Ok(LeaderboardResponse {
        competition_id,
        source,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn candidate(name: &str, seq: i64, scores: &[&str]) -> RankingCandidate {
        RankingCandidate {
            participant_id: Uuid::new_v4(),
            display_name: name.to_string(),
            enrollment_seq: seq,
            scores: scores.iter().map(|s| dec(s)).collect(),
        }
    }

    fn names(rows: &[LeaderboardRow]) -> Vec<&str> {
        rows.iter().map(|r| r.display_name.as_str()).collect()
    }

    #[test]
    fn test_mean_of_no_scores_is_zero() {
        assert_eq!(mean_score(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_orders_by_mean_and_rounds() {
        let rows = compute_standings(vec![
            candidate("C", 3, &[]),
            candidate("B", 2, &["7"]),
            candidate("A", 1, &["8", "9"]),
        ]);

        assert_eq!(names(&rows), vec!["A", "B", "C"]);
        assert_eq!(
            rows.iter().map(|r| r.position).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(rows[0].aggregate_score, dec("8.50"));
        assert_eq!(rows[0].aggregate_score.to_string(), "8.50");
        assert_eq!(rows[1].aggregate_score, dec("7"));
        assert_eq!(rows[2].aggregate_score, Decimal::ZERO);
    }

    #[test]
    fn test_ties_go_to_earlier_participant() {
        let rows = compute_standings(vec![
            candidate("Late", 9, &["6", "8"]),
            candidate("Early", 4, &["7"]),
            candidate("Middle", 5, &["9", "5"]),
        ]);

        assert_eq!(names(&rows), vec!["Early", "Middle", "Late"]);
    }

    #[test]
    fn test_zero_score_participants_keep_creation_order() {
        let rows = compute_standings(vec![
            candidate("Third", 30, &[]),
            candidate("First", 10, &[]),
            candidate("Second", 20, &[]),
        ]);

        assert_eq!(names(&rows), vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_positions_are_dense() {
        let candidates: Vec<RankingCandidate> = (0..25)
            .map(|i| {
                let score = format!("{}", i % 4);
                candidate(&format!("P{i}"), 100 - i, &[score.as_str(), "5"])
            })
            .collect();

        let rows = compute_standings(candidates);
        let mut positions: Vec<i32> = rows.iter().map(|r| r.position).collect();
        positions.sort_unstable();

        assert_eq!(positions, (1..=25).collect::<Vec<i32>>());
        assert!(rows.windows(2).all(|w| w[0].aggregate_score >= w[1].aggregate_score));
    }

    #[test]
    fn test_aggregate_rounds_half_away_from_zero() {
        // (8 + 8 + 8.01 + 8.01) / 4 = 8.005
        let rows = compute_standings(vec![candidate("A", 1, &["8", "8", "8.01", "8.01"])]);
        assert_eq!(rows[0].aggregate_score, dec("8.01"));

        assert_eq!(round_aggregate(dec("6.6666666")), dec("6.67"));
    }

    #[test]
    fn test_sorting_uses_unrounded_mean() {
        // 8.333.. rounds to 8.33 but still beats a flat 8.33 entered earlier.
        let rows = compute_standings(vec![
            candidate("Flat", 1, &["8.33"]),
            candidate("Thirds", 2, &["8", "8", "9"]),
        ]);

        assert_eq!(names(&rows), vec!["Thirds", "Flat"]);
        assert_eq!(rows[0].aggregate_score, rows[1].aggregate_score);
    }

    #[test]
    fn test_empty_competition_has_no_rows() {
        assert!(compute_standings(vec![]).is_empty());
    }
}
