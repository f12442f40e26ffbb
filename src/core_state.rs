//! Shared application state for the REST surface.
//!
//! Holds the immutable taxonomy, the database location and the in-flight
//! questionnaire sessions. Wrapped in `Arc` at startup and handed to every
//! handler.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::assessment::{AssessmentError, AssessmentStep, Questionnaire};
use crate::config;
use crate::db;
use crate::taxonomy::DiseaseTaxonomy;

// ═══════════════════════════════════════════════════════════
// Sessions
// ═══════════════════════════════════════════════════════════

enum SessionSlot {
    Active(Questionnaire),
    /// Finished. Only the id is kept so late answers get a state error.
    Completed,
}

struct SessionEntry {
    slot: SessionSlot,
    last_activity: Instant,
}

impl SessionEntry {
    fn active(questionnaire: Questionnaire) -> Self {
        Self {
            slot: SessionSlot::Active(questionnaire),
            last_activity: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    taxonomy: Arc<DiseaseTaxonomy>,
    /// SQLite file for tracking records and saved assessments.
    pub db_path: PathBuf,
    /// Questionnaire sessions keyed by id, with a marker for finished ones.
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    /// Idle sessions older than this are dropped.
    session_ttl: Duration,
}

impl CoreState {
    pub fn new(taxonomy: DiseaseTaxonomy, db_path: PathBuf) -> Self {
        Self {
            taxonomy: Arc::new(taxonomy),
            db_path,
            sessions: RwLock::new(HashMap::new()),
            session_ttl: Duration::from_secs(config::ASSESSMENT_IDLE_TIMEOUT_SECS),
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn taxonomy(&self) -> Arc<DiseaseTaxonomy> {
        Arc::clone(&self.taxonomy)
    }

    /// Open a connection to the tracking database. Migrations run on open.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        db::open_database(&self.db_path).map_err(CoreError::Database)
    }

    // ── Questionnaire sessions ──────────────────────────────

    /// Starts a questionnaire. Sessions that finish immediately are not kept.
    pub fn start_assessment(&self) -> Result<(Uuid, AssessmentStep), CoreError> {
        let session = Questionnaire::start(self.taxonomy());
        let id = Uuid::new_v4();
        let step = session.step();

        let mut sessions = self.sessions.write().map_err(|_| CoreError::LockPoisoned)?;
        self.sweep_idle(&mut sessions);
        if !session.is_terminated() {
            sessions.insert(id, SessionEntry::active(session));
        }
        tracing::debug!(session = %id, "Assessment started");
        Ok((id, step))
    }

    /// Answers the pending question. A completed questionnaire is released and
    /// further answers on its id fail with `InvalidAnswerState`.
    pub fn answer_assessment(&self, id: &Uuid, has_symptom: bool) -> Result<AssessmentStep, CoreError> {
        let mut sessions = self.sessions.write().map_err(|_| CoreError::LockPoisoned)?;
        self.sweep_idle(&mut sessions);
        let entry = sessions.get_mut(id).ok_or(CoreError::SessionNotFound(*id))?;
        entry.touch();
        let SessionSlot::Active(session) = &mut entry.slot else {
            return Err(AssessmentError::InvalidAnswerState.into());
        };
        let step = session.answer(has_symptom)?;
        if session.is_terminated() {
            entry.slot = SessionSlot::Completed;
        }
        Ok(step)
    }

    /// Undoes the last answer. History of a completed session is gone.
    pub fn rewind_assessment(&self, id: &Uuid) -> Result<AssessmentStep, CoreError> {
        let mut sessions = self.sessions.write().map_err(|_| CoreError::LockPoisoned)?;
        self.sweep_idle(&mut sessions);
        let entry = sessions.get_mut(id).ok_or(CoreError::SessionNotFound(*id))?;
        entry.touch();
        match &mut entry.slot {
            SessionSlot::Active(session) => Ok(session.previous()?),
            SessionSlot::Completed => Err(AssessmentError::RewindUnavailable.into()),
        }
    }

    /// Sessions still waiting for an answer.
    pub fn active_sessions(&self) -> Result<usize, CoreError> {
        let sessions = self.sessions.read().map_err(|_| CoreError::LockPoisoned)?;
        Ok(sessions
            .values()
            .filter(|e| matches!(e.slot, SessionSlot::Active(_)))
            .count())
    }

    fn sweep_idle(&self, sessions: &mut HashMap<Uuid, SessionEntry>) {
        let before = sessions.len();
        sessions.retain(|_, e| e.last_activity.elapsed() <= self.session_ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, "Idle assessment sessions dropped");
        }
    }
}

// ═══════════════════════════════════════════════════════════
// CoreError
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("No assessment session {0}")]
    SessionNotFound(Uuid),
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
}
