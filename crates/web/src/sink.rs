use storage::services::notify::{LeaderboardChanged, LeaderboardSink, NotifyError};

/// Writes every leaderboard update to the log. Stands in for a live display.
#[derive(Debug, Default)]
pub struct TracingSink;

impl LeaderboardSink for TracingSink {
    fn leaderboard_changed(&self, event: &LeaderboardChanged) -> Result<(), NotifyError> {
        let leader = event.rows.first().map(|row| row.display_name.as_str());
        tracing::info!(
            competition_id = %event.competition_id,
            entries = event.rows.len(),
            leader = leader.unwrap_or("-"),
            "Leaderboard changed"
        );
        Ok(())
    }
}
