use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::ranking::LeaderboardRow;

/// Published after every committed recomputation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardChanged {
    pub competition_id: Uuid,
    pub rows: Vec<LeaderboardRow>,
}

#[derive(Debug, Error)]
#[error("leaderboard notification failed: {0}")]
pub struct NotifyError(pub String);

/// Receiver of leaderboard updates, e.g. a live display.
pub trait LeaderboardSink: Send + Sync {
    fn leaderboard_changed(&self, event: &LeaderboardChanged) -> Result<(), NotifyError>;
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LeaderboardSink for NullSink {
    fn leaderboard_changed(&self, _event: &LeaderboardChanged) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Deliver an event after commit. Failures are logged and never propagated.
pub fn publish(sink: &dyn LeaderboardSink, event: &LeaderboardChanged) {
    if let Err(e) = sink.leaderboard_changed(event) {
        tracing::warn!(
            competition_id = %event.competition_id,
            "Leaderboard notification dropped: {e}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FailingSink {
        calls: Mutex<u32>,
    }

    impl LeaderboardSink for FailingSink {
        fn leaderboard_changed(&self, _event: &LeaderboardChanged) -> Result<(), NotifyError> {
            *self.calls.lock().unwrap() += 1;
            Err(NotifyError("display offline".to_string()))
        }
    }

    #[test]
    fn test_sink_failure_is_swallowed() {
        let sink = FailingSink {
            calls: Mutex::new(0),
        };
        let event = LeaderboardChanged {
            competition_id: Uuid::new_v4(),
            rows: vec![],
        };

        publish(&sink, &event);

        assert_eq!(*sink.calls.lock().unwrap(), 1);
    }
}
