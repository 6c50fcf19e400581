use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};

use tracing::debug;

use crate::errors::AppError;
use crate::export::{export_document, ExportStatus};
use crate::state::AppState;

/// POST /api/v1/export
///
/// Renders the current preview and streams back the document as a download.
/// Returns 409 while another export is running.
pub async fn handle_export(State(state): State<AppState>) -> Result<Response, AppError> {
    // Take a consistent snapshot, then release the session before the slow call.
    let (preview, full_name) = {
        let form = state.session.lock().await;
        (form.preview(), form.fields().full_name.clone())
    };

    let document =
        export_document(state.renderer.as_ref(), &state.exports, &preview, &full_name).await?;
    debug!("Sending '{}' ({} bytes)", document.filename, document.bytes.len());

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(document.content_type)),
            (header::CONTENT_DISPOSITION, document.content_disposition),
        ],
        document.bytes,
    )
        .into_response())
}

/// GET /api/v1/export/status
pub async fn handle_export_status(State(state): State<AppState>) -> Json<ExportStatus> {
    Json(state.exports.status())
}
