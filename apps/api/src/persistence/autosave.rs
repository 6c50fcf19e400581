//! Debounced autosave. A change listener pings a channel on every form change;
//! a background task waits until the pings stop for the debounce window and
//! then writes one snapshot.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::form::{ChangeListener, FormController, ViewUpdate};
use crate::persistence::{save_snapshot, SnapshotStore};

pub struct AutosaveListener {
    tx: mpsc::UnboundedSender<()>,
}

impl ChangeListener for AutosaveListener {
    fn on_change(&mut self, _update: &ViewUpdate) {
        // The task only goes away at shutdown; nothing to save then.
        let _ = self.tx.send(());
    }
}

/// Starts the autosave task and subscribes its listener to `session`.
pub async fn enable_autosave(
    session: Arc<Mutex<FormController>>,
    store: Arc<dyn SnapshotStore>,
    debounce: Duration,
) -> JoinHandle<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(run_autosave(rx, session.clone(), store, debounce));
    session
        .lock()
        .await
        .subscribe(Box::new(AutosaveListener { tx }));
    handle
}

async fn run_autosave(
    mut rx: mpsc::UnboundedReceiver<()>,
    session: Arc<Mutex<FormController>>,
    store: Arc<dyn SnapshotStore>,
    debounce: Duration,
) {
    while rx.recv().await.is_some() {
        // Keep absorbing pings until the form has been quiet for `debounce`.
        loop {
            match tokio::time::timeout(debounce, rx.recv()).await {
                Ok(Some(())) => continue,
                Ok(None) | Err(_) => break,
            }
        }

        let snapshot = session.lock().await.snapshot();
        match save_snapshot(store.as_ref(), &snapshot).await {
            Ok(()) => debug!("Autosaved form to {}", store.backend()),
            Err(e) => warn!("Autosave to {} failed: {e}", store.backend()),
        }
    }
}
