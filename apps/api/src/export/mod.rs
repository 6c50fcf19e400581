// Export: hands the rendered preview to the document renderer and tracks the
// single in-flight export.

pub mod handlers;
pub mod renderer;

use std::fmt::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::http::{header::InvalidHeaderValue, HeaderValue};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::form::PreviewDocument;
use crate::render::render_document;
use renderer::DocumentRenderer;

const FILENAME_SUFFIX: &str = "_Resume";
const DEFAULT_SUBJECT: &str = "Resume";
const EXTENSION: &str = ".pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSize {
    Letter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Portrait,
}

/// Page setup passed to the renderer along with the HTML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    pub page_size: PageSize,
    pub orientation: Orientation,
    /// Uniform margin, in inches.
    pub margin_in: f32,
    /// Rasterization scale factor.
    pub scale: f32,
    pub image_quality: f32,
    pub filename: String,
}

impl ExportOptions {
    /// US letter, portrait, half-inch margins, 2x raster.
    pub fn for_name(full_name: &str) -> Self {
        Self {
            page_size: PageSize::Letter,
            orientation: Orientation::Portrait,
            margin_in: 0.5,
            scale: 2.0,
            image_quality: 0.98,
            filename: export_filename(full_name),
        }
    }
}

/// `"Jane  Doe"` → `Jane_Doe_Resume.pdf`; a blank name → `Resume.pdf`.
/// Control characters, quotes and backslashes never reach the filename.
pub fn export_filename(full_name: &str) -> String {
    let cleaned: String = full_name
        .chars()
        .filter(|c| c.is_whitespace() || !(c.is_control() || matches!(*c, '"' | '\\')))
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    if words.is_empty() {
        format!("{DEFAULT_SUBJECT}{EXTENSION}")
    } else {
        format!("{}{FILENAME_SUFFIX}{EXTENSION}", words.join("_"))
    }
}

/// `Content-Disposition` for a download: a quoted ASCII fallback followed by
/// the RFC 6266 `filename*` form carrying the UTF-8 name.
pub fn content_disposition(filename: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    HeaderValue::from_str(&format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        percent_encode(filename)
    ))
}

/// RFC 5987 `attr-char` encoding.
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'!'
            | b'#'
            | b'$'
            | b'&'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~' => out.push(byte as char),
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Status tracking
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExportStatus {
    Idle,
    InProgress {
        filename: String,
        started_at: DateTime<Utc>,
    },
    Succeeded {
        filename: String,
        finished_at: DateTime<Utc>,
    },
    Failed {
        message: String,
        finished_at: DateTime<Utc>,
    },
}

impl ExportStatus {
    pub fn is_busy(&self) -> bool {
        matches!(self, ExportStatus::InProgress { .. })
    }
}

/// Serializes exports: at most one is in flight, and the busy flag is held
/// from invocation until success or failure.
#[derive(Debug)]
pub struct ExportGate {
    status: Mutex<ExportStatus>,
}

impl Default for ExportGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportGate {
    pub fn new() -> Self {
        Self {
            status: Mutex::new(ExportStatus::Idle),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ExportStatus> {
        // A poisoned lock still holds a valid status.
        self.status.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn status(&self) -> ExportStatus {
        self.lock().clone()
    }

    pub fn try_begin(self: &Arc<Self>, filename: &str) -> Result<ExportPermit, AppError> {
        let mut status = self.lock();
        if status.is_busy() {
            return Err(AppError::Conflict(
                "An export is already in progress".to_string(),
            ));
        }
        *status = ExportStatus::InProgress {
            filename: filename.to_string(),
            started_at: Utc::now(),
        };
        Ok(ExportPermit {
            gate: Arc::clone(self),
            filename: filename.to_string(),
            finished: false,
        })
    }
}

/// Held for the duration of one export. Dropping it unfinished (e.g. the
/// request was cancelled) records a failure so the gate never stays busy.
pub struct ExportPermit {
    gate: Arc<ExportGate>,
    filename: String,
    finished: bool,
}

impl ExportPermit {
    pub fn succeed(mut self) {
        self.finish(ExportStatus::Succeeded {
            filename: self.filename.clone(),
            finished_at: Utc::now(),
        });
    }

    pub fn fail(mut self, message: impl Into<String>) {
        self.finish(ExportStatus::Failed {
            message: message.into(),
            finished_at: Utc::now(),
        });
    }

    fn finish(&mut self, status: ExportStatus) {
        *self.gate.lock() = status;
        self.finished = true;
    }
}

impl Drop for ExportPermit {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Export of '{}' was abandoned", self.filename);
            self.finish(ExportStatus::Failed {
                message: "Export was interrupted".to_string(),
                finished_at: Utc::now(),
            });
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Export pipeline
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub filename: String,
    pub content_type: &'static str,
    pub content_disposition: HeaderValue,
    pub bytes: Bytes,
}

/// Renders `preview` to HTML, hands it to `renderer`, and records the
/// outcome on `gate`. Never touches form state.
pub async fn export_document(
    renderer: &dyn DocumentRenderer,
    gate: &Arc<ExportGate>,
    preview: &PreviewDocument,
    full_name: &str,
) -> Result<ExportedDocument, AppError> {
    let options = ExportOptions::for_name(full_name);
    let permit = gate.try_begin(&options.filename)?;

    info!(
        "Exporting '{}' via {} renderer",
        options.filename,
        renderer.backend()
    );
    let html = render_document(preview);

    let bytes = match renderer.render(&html, &options).await {
        Ok(bytes) => bytes,
        Err(e) => {
            permit.fail(e.to_string());
            return Err(AppError::Export(e.to_string()));
        }
    };

    // The download is only a success once its headers can be sent.
    let content_disposition = match content_disposition(&options.filename) {
        Ok(value) => value,
        Err(e) => {
            permit.fail(format!("Unusable filename '{}': {e}", options.filename));
            return Err(AppError::Export(e.to_string()));
        }
    };

    permit.succeed();
    info!("Export of '{}' finished ({} bytes)", options.filename, bytes.len());
    Ok(ExportedDocument {
        filename: options.filename,
        content_type: "application/pdf",
        content_disposition,
        bytes,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::export::renderer::RenderError;
    use crate::form::FormController;
    use crate::models::form::FieldName;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns canned bytes, or fails when `fail` is set.
    pub(crate) struct FakeRenderer {
        pub fail: bool,
        pub calls: AtomicUsize,
    }

    impl FakeRenderer {
        pub(crate) fn ok() -> Self {
            Self {
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DocumentRenderer for FakeRenderer {
        async fn render(&self, html: &str, _options: &ExportOptions) -> Result<Bytes, RenderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RenderError::Service {
                    status: 500,
                    message: "renderer crashed".to_string(),
                });
            }
            Ok(Bytes::from(format!("%PDF-FAKE {}", html.len())))
        }

        fn backend(&self) -> &'static str {
            "fake"
        }
    }

    #[test]
    fn test_filename_from_name() {
        assert_eq!(export_filename("Jane Doe"), "Jane_Doe_Resume.pdf");
        assert_eq!(export_filename("  Jane \t Q.  Doe "), "Jane_Q._Doe_Resume.pdf");
    }

    #[test]
    fn test_filename_drops_quotes_and_control_characters() {
        assert_eq!(export_filename("Jane \"JD\" Doe"), "Jane_JD_Doe_Resume.pdf");
        assert_eq!(export_filename("Jane\u{1}Doe"), "JaneDoe_Resume.pdf");
        assert_eq!(export_filename("Jane\\Doe"), "JaneDoe_Resume.pdf");
        assert_eq!(export_filename("Jane\tDoe"), "Jane_Doe_Resume.pdf");
    }

    #[test]
    fn test_content_disposition_ascii_name() {
        let value = content_disposition("Jane_Doe_Resume.pdf").unwrap();
        assert_eq!(
            value,
            "attachment; filename=\"Jane_Doe_Resume.pdf\"; filename*=UTF-8''Jane_Doe_Resume.pdf"
        );
    }

    #[test]
    fn test_content_disposition_utf8_name() {
        let filename = export_filename("Zoë Ångström");
        assert_eq!(filename, "Zoë_Ångström_Resume.pdf");
        let value = content_disposition(&filename).unwrap();
        assert_eq!(
            value,
            "attachment; filename=\"Zo__ngstr_m_Resume.pdf\"; \
             filename*=UTF-8''Zo%C3%AB_%C3%85ngstr%C3%B6m_Resume.pdf"
        );
    }

    #[test]
    fn test_filename_without_name() {
        assert_eq!(export_filename(""), "Resume.pdf");
        assert_eq!(export_filename("   "), "Resume.pdf");
    }

    #[test]
    fn test_default_options() {
        let options = ExportOptions::for_name("");
        assert_eq!(options.page_size, PageSize::Letter);
        assert_eq!(options.orientation, Orientation::Portrait);
        assert_eq!(options.margin_in, 0.5);
        assert_eq!(options.scale, 2.0);
        assert_eq!(options.filename, "Resume.pdf");
    }

    #[test]
    fn test_gate_rejects_second_export() {
        let gate = Arc::new(ExportGate::new());
        let permit = gate.try_begin("a.pdf").unwrap();
        assert!(gate.status().is_busy());
        assert!(matches!(gate.try_begin("b.pdf"), Err(AppError::Conflict(_))));
        permit.succeed();
        assert!(matches!(gate.status(), ExportStatus::Succeeded { .. }));
        assert!(gate.try_begin("b.pdf").is_ok());
    }

    #[test]
    fn test_dropped_permit_releases_gate() {
        let gate = Arc::new(ExportGate::new());
        drop(gate.try_begin("a.pdf").unwrap());
        assert!(matches!(gate.status(), ExportStatus::Failed { .. }));
        assert!(!gate.status().is_busy());
    }

    #[tokio::test]
    async fn test_export_success() {
        let mut form = FormController::new();
        form.set_field(FieldName::FullName, "Jane Doe".into());
        let renderer = FakeRenderer::ok();
        let gate = Arc::new(ExportGate::new());

        let doc = export_document(&renderer, &gate, &form.preview(), &form.fields().full_name)
            .await
            .unwrap();
        assert_eq!(doc.filename, "Jane_Doe_Resume.pdf");
        assert!(doc.bytes.starts_with(b"%PDF"));
        assert!(matches!(gate.status(), ExportStatus::Succeeded { .. }));
    }

    #[tokio::test]
    async fn test_export_failure_leaves_form_untouched() {
        let mut form = FormController::new();
        form.set_field(FieldName::FullName, "Jane Doe".into());
        let before = form.snapshot();
        let renderer = FakeRenderer::failing();
        let gate = Arc::new(ExportGate::new());

        let err = export_document(&renderer, &gate, &form.preview(), &form.fields().full_name)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Export(_)));
        assert_eq!(form.snapshot(), before);
        match gate.status() {
            ExportStatus::Failed { message, .. } => assert!(message.contains("renderer crashed")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
    }
}
