use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::audit::evaluator::Evaluator;
use crate::audit::input::InputDraft;
use crate::audit::session::{AuditSession, SharedSession};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable scoring backend. Default: GeminiEvaluator.
    pub evaluator: Arc<dyn Evaluator>,
    /// Orchestrator state. Sole owner of the current report or error.
    pub session: SharedSession,
    /// The form fields as last edited or uploaded.
    pub draft: Arc<Mutex<InputDraft>>,
    pub audit_timeout: Duration,
}

impl AppState {
    pub fn new(evaluator: Arc<dyn Evaluator>, audit_timeout: Duration) -> Self {
        Self {
            evaluator,
            session: AuditSession::shared(),
            draft: Arc::new(Mutex::new(InputDraft::default())),
            audit_timeout,
        }
    }

    pub fn draft(&self) -> MutexGuard<'_, InputDraft> {
        self.draft.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
