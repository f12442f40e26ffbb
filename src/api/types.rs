//! Shared types for the API layer.

use std::sync::Arc;

use rusqlite::Connection;

use crate::core_state::CoreState;
use crate::db::SqliteTrackingStore;
use crate::tracking::SymptomTracker;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }

    /// Tracker bound to an open connection.
    pub fn tracker<'c>(&self, conn: &'c Connection) -> SymptomTracker<SqliteTrackingStore<'c>> {
        SymptomTracker::new(SqliteTrackingStore::new(conn), self.core.taxonomy())
    }
}
