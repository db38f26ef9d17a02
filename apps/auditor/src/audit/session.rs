//! Audit session: the orchestrator state machine.
//!
//! ```text
//! Idle ──submit──▶ Analyzing ──ok──▶ Result ──reset──▶ Idle
//!   ▲                  │ err/timeout/cancel
//!   └──────reset─── Failed ◀─┘   (Failed ──submit──▶ Analyzing)
//! ```
//!
//! The session is the only owner of the current report, error and in-flight flag.
//! It sits behind a std `Mutex` that is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::audit::evaluator::{EvaluationError, Evaluator};
use crate::audit::input::Submission;
use crate::audit::models::Report;
use crate::audit::validation::{check_report, ConsistencyWarning};

/// Prefix of every user-visible failure message.
pub const FAILURE_PREFIX: &str =
    "Analysis failed. Please ensure your API key is valid and try again. ";

pub type SharedSession = Arc<Mutex<AuditSession>>;

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("An analysis is already in progress")]
    Busy,

    #[error("A report is being shown; start over before submitting again")]
    ReportShown,

    #[error("Nothing to start over from")]
    NothingToReset,

    #[error("No analysis is in progress")]
    NotAnalyzing,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuditState {
    Idle,
    Analyzing {
        audit_id: Uuid,
        title: Option<String>,
        started_at: DateTime<Utc>,
    },
    Result {
        audit_id: Uuid,
        report: Box<Report>,
        warnings: Vec<ConsistencyWarning>,
    },
    Failed {
        audit_id: Uuid,
        message: String,
    },
}

/// Handle to an evaluation that has been started.
pub struct InFlight {
    pub audit_id: Uuid,
    pub cancel: CancellationToken,
}

pub struct AuditSession {
    state: AuditState,
    cancel: Option<CancellationToken>,
}

impl Default for AuditSession {
    fn default() -> Self {
        Self {
            state: AuditState::Idle,
            cancel: None,
        }
    }
}

impl AuditSession {
    pub fn shared() -> SharedSession {
        Arc::new(Mutex::new(Self::default()))
    }

    pub fn state(&self) -> &AuditState {
        &self.state
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.state, AuditState::Analyzing { .. })
    }

    pub fn report(&self) -> Option<&Report> {
        match &self.state {
            AuditState::Result { report, .. } => Some(&**report),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            AuditState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    /// `Idle | Failed → Analyzing`. Clears any previous error.
    pub fn begin(&mut self, submission: &Submission) -> Result<InFlight, SessionError> {
        match self.state {
            AuditState::Analyzing { .. } => return Err(SessionError::Busy),
            AuditState::Result { .. } => return Err(SessionError::ReportShown),
            AuditState::Idle | AuditState::Failed { .. } => {}
        }

        let audit_id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        self.state = AuditState::Analyzing {
            audit_id,
            title: submission.title.clone(),
            started_at: Utc::now(),
        };
        self.cancel = Some(cancel.clone());
        info!(%audit_id, content_len = submission.content.len(), "Audit submitted");
        Ok(InFlight { audit_id, cancel })
    }

    /// `Analyzing → Result | Failed`. Completions for any other audit are dropped.
    /// Returns whether the outcome was applied.
    pub fn finish(&mut self, audit_id: Uuid, outcome: Result<Report, EvaluationError>) -> bool {
        let current = match self.state {
            AuditState::Analyzing { audit_id: id, .. } => Some(id),
            _ => None,
        };
        if current != Some(audit_id) {
            warn!(%audit_id, "Discarding stale audit completion");
            return false;
        }

        self.cancel = None;
        self.state = match outcome {
            Ok(report) => {
                let warnings = check_report(&report);
                info!(
                    %audit_id,
                    overall_score = report.overall_score,
                    grade = %report.grade,
                    warnings = warnings.len(),
                    "Audit completed"
                );
                AuditState::Result {
                    audit_id,
                    report: Box::new(report),
                    warnings,
                }
            }
            Err(err) => {
                warn!(%audit_id, error = %err, "Audit failed");
                AuditState::Failed {
                    audit_id,
                    message: failure_message(&err),
                }
            }
        };
        true
    }

    /// Signals the in-flight evaluation to stop. The running task reports the
    /// cancellation through `finish`.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        match (&self.state, &self.cancel) {
            (AuditState::Analyzing { audit_id, .. }, Some(token)) => {
                info!(%audit_id, "Audit cancellation requested");
                token.cancel();
                Ok(())
            }
            _ => Err(SessionError::NotAnalyzing),
        }
    }

    /// `Result | Failed → Idle`, discarding the report or error.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        match self.state {
            AuditState::Result { .. } | AuditState::Failed { .. } => {
                self.state = AuditState::Idle;
                Ok(())
            }
            AuditState::Analyzing { .. } => Err(SessionError::Busy),
            AuditState::Idle => Err(SessionError::NothingToReset),
        }
    }
}

pub fn failure_message(err: &EvaluationError) -> String {
    format!("{FAILURE_PREFIX}{err}")
}

/// Locks the session, recovering the guard if a previous holder panicked.
pub fn lock(session: &SharedSession) -> MutexGuard<'_, AuditSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs one evaluation under a timeout, aborting early when `cancel` fires.
pub async fn run_evaluation(
    evaluator: &dyn Evaluator,
    submission: &Submission,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Report, EvaluationError> {
    let evaluation = evaluator.evaluate(&submission.content, submission.title.as_deref());
    tokio::select! {
        _ = cancel.cancelled() => Err(EvaluationError::Cancelled),
        outcome = tokio::time::timeout(timeout, evaluation) => {
            outcome.unwrap_or(Err(EvaluationError::Timeout(timeout)))
        }
    }
}

pub struct AuditHandle {
    pub audit_id: Uuid,
    pub task: JoinHandle<()>,
}

/// Moves the session to `Analyzing` and evaluates in a background task that writes the
/// outcome back into the session.
pub fn spawn_audit(
    session: SharedSession,
    evaluator: Arc<dyn Evaluator>,
    submission: Submission,
    timeout: Duration,
) -> Result<AuditHandle, SessionError> {
    let in_flight = lock(&session).begin(&submission)?;
    let audit_id = in_flight.audit_id;

    let task = tokio::spawn(async move {
        let outcome =
            run_evaluation(evaluator.as_ref(), &submission, timeout, &in_flight.cancel).await;
        lock(&session).finish(in_flight.audit_id, outcome);
    });

    Ok(AuditHandle { audit_id, task })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::evaluator::scripted::{ScriptedEvaluator, Step};
    use crate::audit::models::fixtures::{vector_db_model_json, vector_db_report};

    fn submission(content: &str, title: Option<&str>) -> Submission {
        Submission::new(content, title.map(String::from)).unwrap()
    }

    const TIMEOUT: Duration = Duration::from_secs(90);

    #[tokio::test]
    async fn test_submit_enters_analyzing_and_blocks_resubmission() {
        let session = AuditSession::shared();
        let evaluator = Arc::new(ScriptedEvaluator::new(vec![Step::Hang]));
        let handle = spawn_audit(
            session.clone(),
            evaluator.clone(),
            submission("Hello world", None),
            TIMEOUT,
        )
        .unwrap();

        assert!(lock(&session).is_analyzing());
        let second = spawn_audit(
            session.clone(),
            evaluator,
            submission("Again", None),
            TIMEOUT,
        );
        assert!(matches!(second, Err(SessionError::Busy)));
        handle.task.abort();
    }

    #[tokio::test]
    async fn test_missing_credential_fails_with_api_key_message() {
        let session = AuditSession::shared();
        let evaluator = Arc::new(ScriptedEvaluator::new(vec![Step::Fail(
            EvaluationError::Configuration,
        )]));
        let handle = spawn_audit(
            session.clone(),
            evaluator,
            submission("Hello world", Some("")),
            TIMEOUT,
        )
        .unwrap();
        handle.task.await.unwrap();

        let guard = lock(&session);
        let message = guard.error().expect("failed state");
        assert!(message.contains("API key"), "{message}");
        assert!(guard.report().is_none());
    }

    #[tokio::test]
    async fn test_success_keeps_scores_verbatim() {
        let session = AuditSession::shared();
        let content = "v".repeat(5_000);
        let evaluator = Arc::new(ScriptedEvaluator::new(vec![Step::Succeed(
            vector_db_report(),
        )]));
        let handle = spawn_audit(
            session.clone(),
            evaluator.clone(),
            submission(&content, Some("Vector DB Guide")),
            TIMEOUT,
        )
        .unwrap();
        handle.task.await.unwrap();

        let guard = lock(&session);
        let report = guard.report().expect("result state");
        assert_eq!(report.overall_score, 82.0);
        assert_eq!(report.grade, "A-");
        assert_eq!(report.breakdown.geo.score, 35.0);
        assert!(guard.error().is_none());
        assert_eq!(
            evaluator.calls.lock().unwrap()[0],
            (content, Some("Vector DB Guide".to_string()))
        );
    }

    #[tokio::test]
    async fn test_contract_violation_fails_without_report() {
        let mut body = vector_db_model_json();
        body["breakdown"].as_object_mut().unwrap().remove("SEO");
        let session = AuditSession::shared();
        let evaluator = Arc::new(ScriptedEvaluator::new(vec![Step::Respond(body)]));
        let handle =
            spawn_audit(session.clone(), evaluator, submission("text", None), TIMEOUT).unwrap();
        handle.task.await.unwrap();

        let guard = lock(&session);
        assert!(matches!(guard.state(), AuditState::Failed { .. }));
        assert!(guard.error().unwrap().contains("SEO"));
        assert!(guard.report().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_evaluation_times_out() {
        let session = AuditSession::shared();
        let evaluator = Arc::new(ScriptedEvaluator::new(vec![Step::Hang]));
        let handle =
            spawn_audit(session.clone(), evaluator, submission("text", None), TIMEOUT).unwrap();
        handle.task.await.unwrap();

        let message = lock(&session).error().unwrap().to_string();
        assert!(message.contains("timed out after 90s"), "{message}");
    }

    #[tokio::test]
    async fn test_cancel_moves_to_failed() {
        let session = AuditSession::shared();
        let evaluator = Arc::new(ScriptedEvaluator::new(vec![Step::Hang]));
        let handle =
            spawn_audit(session.clone(), evaluator, submission("text", None), TIMEOUT).unwrap();
        lock(&session).cancel().unwrap();
        handle.task.await.unwrap();

        let message = lock(&session).error().unwrap().to_string();
        assert!(message.contains("cancelled"), "{message}");
        assert_eq!(lock(&session).cancel(), Err(SessionError::NotAnalyzing));
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut session = AuditSession::default();
        let first = session.begin(&submission("one", None)).unwrap();
        session.finish(first.audit_id, Err(EvaluationError::Cancelled));
        session.reset().unwrap();
        let second = session.begin(&submission("two", None)).unwrap();

        assert!(!session.finish(first.audit_id, Ok(vector_db_report())));
        assert!(session.is_analyzing());
        assert!(session.finish(second.audit_id, Ok(vector_db_report())));
        assert!(session.report().is_some());
    }

    #[test]
    fn test_reset_and_resubmit_rules() {
        let mut session = AuditSession::default();
        assert_eq!(session.reset(), Err(SessionError::NothingToReset));

        let run = session.begin(&submission("one", None)).unwrap();
        assert_eq!(session.reset(), Err(SessionError::Busy));
        session.finish(run.audit_id, Ok(vector_db_report()));
        assert!(matches!(
            session.begin(&submission("two", None)),
            Err(SessionError::ReportShown)
        ));

        session.reset().unwrap();
        assert!(matches!(session.state(), AuditState::Idle));
        assert!(session.report().is_none());
    }

    #[test]
    fn test_failed_allows_resubmission_and_clears_error() {
        let mut session = AuditSession::default();
        let run = session.begin(&submission("one", None)).unwrap();
        session.finish(run.audit_id, Err(EvaluationError::Configuration));
        assert!(session.error().is_some());

        session.begin(&submission("two", None)).unwrap();
        assert!(session.error().is_none());
        assert!(session.is_analyzing());
    }
}
