use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::export::renderer::DocumentRenderer;
use crate::export::ExportGate;
use crate::form::FormController;
use crate::persistence::SnapshotStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The one form session this process hosts. Every mutation happens under this lock.
    pub session: Arc<Mutex<FormController>>,
    /// Pluggable HTML → document renderer. Default: HttpDocumentRenderer.
    pub renderer: Arc<dyn DocumentRenderer>,
    /// Pluggable snapshot store. Redis when REDIS_URL is set, otherwise files.
    pub store: Arc<dyn SnapshotStore>,
    pub exports: Arc<ExportGate>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        session: FormController,
        renderer: Arc<dyn DocumentRenderer>,
        store: Arc<dyn SnapshotStore>,
        config: Config,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            renderer,
            store,
            exports: Arc::new(ExportGate::new()),
            config,
        }
    }
}
