use std::sync::Arc;

use storage::Database;
use storage::services::notify::LeaderboardSink;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sink: Arc<dyn LeaderboardSink>,
}

impl AppState {
    pub fn new(db: Database, sink: Arc<dyn LeaderboardSink>) -> Self {
        Self { db, sink }
    }
}
