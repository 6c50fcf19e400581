pub mod health;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::export::handlers as export;
use crate::form::handlers as form;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Form session
        .route("/api/v1/form", get(form::handle_get_form))
        .route("/api/v1/form/events", post(form::handle_event))
        .route("/api/v1/form/progress", get(form::handle_get_progress))
        .route("/api/v1/form/validation", get(form::handle_get_validation))
        .route("/api/v1/form/preview", get(form::handle_get_preview))
        .route(
            "/api/v1/form/preview/html",
            get(form::handle_get_preview_html),
        )
        .route(
            "/api/v1/form/preview/toggle",
            post(form::handle_toggle_preview),
        )
        .route("/api/v1/form/fields/:name", put(form::handle_set_field))
        .route("/api/v1/form/skills", post(form::handle_add_skill))
        .route(
            "/api/v1/form/skills/:skill",
            delete(form::handle_remove_skill),
        )
        .route("/api/v1/form/entries/:kind", post(form::handle_add_entry))
        .route(
            "/api/v1/form/entries/:kind/:id",
            patch(form::handle_set_entry_field).delete(form::handle_remove_entry),
        )
        .route("/api/v1/form/reset", post(form::handle_reset))
        .route("/api/v1/form/snapshot", post(form::handle_save_snapshot))
        .route(
            "/api/v1/form/snapshot/restore",
            post(form::handle_restore_snapshot),
        )
        // Export
        .route("/api/v1/export", post(export::handle_export))
        .route("/api/v1/export/status", get(export::handle_export_status))
        .with_state(state)
}
