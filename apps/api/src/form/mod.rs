// Form session core: state store, skill list, section repeater, progress and
// preview projection. Everything in here is synchronous; the HTTP layer owns
// the lock and the timers.

pub mod controller;
pub mod events;
pub mod handlers;
pub mod preview;
pub mod progress;
pub mod repeater;
pub mod skills;
pub mod validation;

pub use controller::{
    ChangeListener, Dispatch, Effect, FormController, FormError, TraceListener, ViewUpdate,
};
pub use events::FormEvent;
pub use preview::PreviewDocument;
