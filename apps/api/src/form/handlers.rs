use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::form::progress::Progress;
use crate::form::repeater::RemovalTicket;
use crate::form::validation::FieldAdvisory;
use crate::form::{Dispatch, Effect, FormEvent, PreviewDocument, ViewUpdate};
use crate::models::form::{EntryField, EntryId, EntryKind, FieldName, FieldValue, FormSnapshot};
use crate::persistence::{clear_snapshot, load_snapshot, save_snapshot};
use crate::render::render_fragment;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub form: FormSnapshot,
    pub pending_removals: Vec<EntryId>,
    pub view: ViewUpdate,
}

#[derive(Debug, Deserialize)]
pub struct SetFieldRequest {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct AddSkillRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SetEntryFieldRequest {
    pub field: EntryField,
    pub value: FieldValue,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub confirmed: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Event pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Applies one event under the session lock, then carries out the effects
/// that live outside the form: removal timers and clearing the saved copy.
pub async fn apply_event(state: &AppState, event: FormEvent) -> Result<Dispatch, AppError> {
    let grace = state.config.removal_grace;

    let dispatch = {
        let mut form = state.session.lock().await;
        match event {
            FormEvent::RemoveEntry { kind, id } if grace.is_zero() => Dispatch {
                view: form.remove_entry_now(kind, id)?,
                effect: Some(Effect::EntryRemoved { kind, id }),
            },
            event => form.dispatch(event)?,
        }
    };

    match &dispatch.effect {
        Some(Effect::RemovalScheduled { ticket }) => {
            schedule_removal(state, *ticket);
        }
        Some(Effect::Cleared) => {
            if let Err(e) = clear_snapshot(state.store.as_ref()).await {
                warn!("Failed to clear saved form data: {e}");
            }
        }
        _ => {}
    }

    Ok(dispatch)
}

/// Completes `ticket` once the grace period is over. A ticket that went stale
/// in the meantime (reset, cancel, re-request) is dropped.
fn schedule_removal(state: &AppState, ticket: RemovalTicket) {
    let session = state.session.clone();
    let grace = state.config.removal_grace;
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        let mut form = session.lock().await;
        if form.complete_removal(ticket).is_some() {
            debug!("Removed {} entry {}", ticket.kind.as_str(), ticket.id);
        } else {
            debug!(
                "Ignoring stale removal of {} entry {}",
                ticket.kind.as_str(),
                ticket.id
            );
        }
    });
}

fn parse_kind(kind: &str) -> Result<EntryKind, AppError> {
    EntryKind::parse(kind).ok_or_else(|| {
        AppError::Validation(format!(
            "Unknown section '{kind}', expected 'education' or 'experience'"
        ))
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/form/events
pub async fn handle_event(
    State(state): State<AppState>,
    Json(event): Json<FormEvent>,
) -> Result<Json<Dispatch>, AppError> {
    Ok(Json(apply_event(&state, event).await?))
}

/// GET /api/v1/form
pub async fn handle_get_form(State(state): State<AppState>) -> Json<FormResponse> {
    let form = state.session.lock().await;
    Json(FormResponse {
        form: form.snapshot(),
        pending_removals: form.pending_removals(),
        view: form.view(),
    })
}

/// GET /api/v1/form/progress
pub async fn handle_get_progress(State(state): State<AppState>) -> Json<Progress> {
    Json(state.session.lock().await.progress())
}

/// GET /api/v1/form/preview
pub async fn handle_get_preview(State(state): State<AppState>) -> Json<PreviewDocument> {
    Json(state.session.lock().await.preview())
}

/// GET /api/v1/form/preview/html
pub async fn handle_get_preview_html(State(state): State<AppState>) -> Html<String> {
    let preview = state.session.lock().await.preview();
    Html(render_fragment(&preview))
}

/// POST /api/v1/form/preview/toggle
pub async fn handle_toggle_preview(
    State(state): State<AppState>,
) -> Result<Json<Dispatch>, AppError> {
    Ok(Json(apply_event(&state, FormEvent::TogglePreview).await?))
}

/// GET /api/v1/form/validation
///
/// Advisory only: nothing is ever blocked on these.
pub async fn handle_get_validation(State(state): State<AppState>) -> Json<Vec<FieldAdvisory>> {
    Json(state.session.lock().await.advisories())
}

/// PUT /api/v1/form/fields/:name
pub async fn handle_set_field(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<SetFieldRequest>,
) -> Result<Json<Dispatch>, AppError> {
    let name = FieldName::parse(&name)
        .ok_or_else(|| AppError::Validation(format!("Unknown field '{name}'")))?;
    let event = FormEvent::SetField {
        name,
        value: req.value,
    };
    Ok(Json(apply_event(&state, event).await?))
}

/// POST /api/v1/form/skills
///
/// Empty or duplicate skills are not an error; the response effect says
/// whether the skill was added or rejected.
pub async fn handle_add_skill(
    State(state): State<AppState>,
    Json(req): Json<AddSkillRequest>,
) -> Result<Json<Dispatch>, AppError> {
    let event = FormEvent::AddSkill { text: req.text };
    Ok(Json(apply_event(&state, event).await?))
}

/// DELETE /api/v1/form/skills/:skill
pub async fn handle_remove_skill(
    State(state): State<AppState>,
    Path(skill): Path<String>,
) -> Result<Json<Dispatch>, AppError> {
    Ok(Json(apply_event(&state, FormEvent::RemoveSkill { skill }).await?))
}

/// POST /api/v1/form/entries/:kind
pub async fn handle_add_entry(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<Dispatch>, AppError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(apply_event(&state, FormEvent::AddEntry { kind }).await?))
}

/// PATCH /api/v1/form/entries/:kind/:id
pub async fn handle_set_entry_field(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, EntryId)>,
    Json(req): Json<SetEntryFieldRequest>,
) -> Result<Json<Dispatch>, AppError> {
    let event = FormEvent::SetEntryField {
        kind: parse_kind(&kind)?,
        id,
        field: req.field,
        value: req.value,
    };
    Ok(Json(apply_event(&state, event).await?))
}

/// DELETE /api/v1/form/entries/:kind/:id
///
/// The entry lingers for the configured grace period before it is detached.
/// With no grace period it is removed within the request.
pub async fn handle_remove_entry(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, EntryId)>,
) -> Result<Json<Dispatch>, AppError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(apply_event(&state, FormEvent::RemoveEntry { kind, id }).await?))
}

/// POST /api/v1/form/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Json(req): Json<ResetRequest>,
) -> Result<Json<Dispatch>, AppError> {
    let event = FormEvent::Reset {
        confirmed: req.confirmed,
    };
    Ok(Json(apply_event(&state, event).await?))
}

/// POST /api/v1/form/snapshot
///
/// Saves the current form right away, whether or not autosave is on.
pub async fn handle_save_snapshot(
    State(state): State<AppState>,
) -> Result<Json<FormSnapshot>, AppError> {
    let snapshot = state.session.lock().await.snapshot();
    save_snapshot(state.store.as_ref(), &snapshot).await?;
    info!("Saved form data to {}", state.store.backend());
    Ok(Json(snapshot))
}

/// POST /api/v1/form/snapshot/restore
pub async fn handle_restore_snapshot(
    State(state): State<AppState>,
) -> Result<Json<ViewUpdate>, AppError> {
    let snapshot = load_snapshot(state.store.as_ref())
        .await
        .ok_or_else(|| AppError::NotFound("No saved form data".to_string()))?;
    let view = state.session.lock().await.restore(snapshot);
    Ok(Json(view))
}
