// src/lib.rs

//! Backend selection and startup glue for a small embedded display stack.
//!
//! One process-wide [`BackendSelector`] sits behind the free functions in
//! this module. Embedders that want their own instance (tests, tools driving
//! several registries) can use [`display::BackendSelector`] directly.

pub mod assets;
pub mod clock;
pub mod color;
pub mod config;
pub mod display;

pub use color::{make_color, Color, Palette};
pub use config::Config;
pub use display::{BackendKind, BackendSelector, DisplayError, Registration, Registry, ScreenHandle};

use once_cell::sync::Lazy;
use std::sync::{Mutex, MutexGuard};

static SELECTOR: Lazy<Mutex<BackendSelector>> = Lazy::new(|| Mutex::new(BackendSelector::new()));

fn selector() -> MutexGuard<'static, BackendSelector> {
    SELECTOR.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Initializes the configured backend on the process-wide selector.
pub fn initialize_backend(config: &Config) -> Result<Registration, DisplayError> {
    selector().initialize_backend(config)
}

/// Active screen of the default display.
pub fn active_screen() -> Result<ScreenHandle, DisplayError> {
    selector().active_screen()
}

/// Kind of the backend currently initialized, if any.
pub fn active_backend() -> Option<BackendKind> {
    selector().active_backend()
}

/// Closes the active backend so a new one can be initialized.
pub fn shutdown() -> Result<(), DisplayError> {
    selector().shutdown()
}

/// Runs `f` with exclusive access to the process-wide registry.
///
/// The global selector stays locked while `f` runs, so `f` must not call
/// any other free function of this crate (`active_screen`, `shutdown`, ...);
/// doing so deadlocks. Read what you need first, or use the registry passed
/// in.
pub fn with_registry<R>(f: impl FnOnce(&mut Registry) -> R) -> R {
    f(selector().registry_mut())
}
