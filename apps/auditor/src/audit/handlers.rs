//! Axum route handlers for the audit UI and JSON API.

use axum::{
    extract::{multipart::Field, Multipart, Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::audit::input::{check_file_name, decode_upload, Submission, UploadError};
use crate::audit::models::Report;
use crate::audit::presenter::ExpandedCategories;
use crate::audit::session::{lock, run_evaluation, spawn_audit, AuditState};
use crate::audit::validation::{check_report, ConsistencyWarning};
use crate::errors::AppError;
use crate::render::dashboard::render_dashboard_page;
use crate::render::form::{render_input_page, InputView};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub expand: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuditRequest {
    pub content: String,
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuditResponse {
    pub report: Report,
    pub warnings: Vec<ConsistencyWarning>,
}

// ────────────────────────────────────────────────────────────────────────────
// HTML handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /
///
/// Dashboard when a report is present, otherwise the input form (with the
/// analyzing indicator or last error).
pub async fn handle_index(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> Html<String> {
    let session = lock(&state.session);
    if let AuditState::Result {
        report, warnings, ..
    } = session.state()
    {
        let expanded = ExpandedCategories::parse(query.expand.as_deref());
        return Html(render_dashboard_page(report, warnings, &expanded));
    }

    let draft = state.draft();
    Html(render_input_page(&InputView {
        draft: &draft,
        analyzing: session.is_analyzing(),
        error: session.error(),
    }))
}

/// POST /audit
///
/// Saves the form fields and starts an audit. Blank content and submissions while
/// an audit is running are ignored.
pub async fn handle_submit(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let mut title = String::new();
    let mut content = String::new();
    while let Some(field) = next_field(&mut multipart).await? {
        match field.name() {
            Some("title") => title = field_text(field).await?,
            Some("content") => content = field_text(field).await?,
            _ => {}
        }
    }

    let Some(submission) = Submission::new(content.clone(), Some(title.clone())) else {
        info!("Ignoring submission with empty content");
        state.draft().edit(title, content);
        return Ok(Redirect::to("/"));
    };

    // a rejected submission must not overwrite the draft of the running audit
    match spawn_audit(
        state.session.clone(),
        state.evaluator.clone(),
        submission,
        state.audit_timeout,
    ) {
        Ok(handle) => {
            state.draft().edit(title, content);
            info!(audit_id = %handle.audit_id, "Audit task started");
        }
        Err(err) => warn!("Submission rejected: {err}"),
    }
    Ok(Redirect::to("/"))
}

/// POST /audit/cancel
pub async fn handle_cancel(State(state): State<AppState>) -> Redirect {
    if let Err(err) = lock(&state.session).cancel() {
        info!("Cancel ignored: {err}");
    }
    Redirect::to("/")
}

/// POST /audit/reset
///
/// Leaving a report starts from an empty form; leaving an error keeps the draft.
pub async fn handle_reset(State(state): State<AppState>) -> Redirect {
    let had_report = {
        let mut session = lock(&state.session);
        let had_report = session.report().is_some();
        if let Err(err) = session.reset() {
            info!("Reset ignored: {err}");
            return Redirect::to("/");
        }
        had_report
    };
    if had_report {
        state.draft().clear();
    }
    Redirect::to("/")
}

/// POST /input/upload
///
/// Keeps the typed title, replaces the content with the uploaded `.txt`/`.md` file.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let mut title = None;
    let mut content = None;
    let mut uploaded = None;

    while let Some(field) = next_field(&mut multipart).await? {
        match field.name() {
            Some("title") => title = Some(field_text(field).await?),
            Some("content") => content = Some(field_text(field).await?),
            Some("file") => {
                check_file_name(field.file_name())?;
                let file_name = field.file_name().unwrap_or_default().to_string();
                let ticket = state.draft().begin_upload();
                let raw = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
                info!(%file_name, bytes = raw.len(), "File uploaded");
                uploaded = Some((ticket, decode_upload(&raw)));
            }
            _ => {}
        }
    }

    let (ticket, text) = uploaded.ok_or(UploadError::MissingFile)?;

    let mut draft = state.draft();
    if !draft.is_current(ticket) {
        warn!("Discarding stale upload");
        return Ok(Redirect::to("/"));
    }
    if let Some(title) = title {
        draft.title = title;
    }
    if let Some(content) = content {
        draft.content = content;
    }
    draft.complete_upload(ticket, text);
    Ok(Redirect::to("/"))
}

/// GET /report/json-ld
///
/// The current report's JSON-LD suggestion, pretty-printed. Same text the copy
/// button places on the clipboard.
pub async fn handle_json_ld(State(state): State<AppState>) -> Result<Response, AppError> {
    let session = lock(&state.session);
    let report = session
        .report()
        .ok_or_else(|| AppError::NotFound("No report is available".to_string()))?;
    Ok((
        [(header::CONTENT_TYPE, "application/ld+json")],
        report.json_ld_pretty(),
    )
        .into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// JSON API handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/audits
///
/// Evaluates synchronously, outside the UI session.
pub async fn handle_api_audit(
    State(state): State<AppState>,
    Json(request): Json<AuditRequest>,
) -> Result<Json<AuditResponse>, AppError> {
    let submission = Submission::new(request.content, request.title)
        .ok_or_else(|| AppError::Validation("content cannot be empty".to_string()))?;

    let report = run_evaluation(
        state.evaluator.as_ref(),
        &submission,
        state.audit_timeout,
        &CancellationToken::new(),
    )
    .await?;
    let warnings = check_report(&report);

    Ok(Json(AuditResponse { report, warnings }))
}

/// GET /api/v1/session
pub async fn handle_api_session(State(state): State<AppState>) -> Json<AuditState> {
    Json(lock(&state.session).state().clone())
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart helpers
// ────────────────────────────────────────────────────────────────────────────

async fn next_field(multipart: &mut Multipart) -> Result<Option<Field<'_>>, AppError> {
    multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid form data: {e}")))
}

async fn field_text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid form field: {e}")))
}
