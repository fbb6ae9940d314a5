// src/display/drivers/mod.rs
//! Concrete backends, one per `BackendKind`.

pub mod desktop;
pub mod evdev_pointer;
pub mod framebuffer;
pub mod headless;
pub mod x11;

pub use desktop::DesktopBackend;
pub use framebuffer::FramebufferBackend;
pub use headless::{HeadlessBackend, HeadlessSurface};

use crate::config::Config;
use crate::display::driver::Backend;
use crate::display::registry::Registry;
use crate::display::types::{BackendKind, Registration};
use log::warn;

/// Builds the (unopened) backend for `kind`.
pub fn create_backend(kind: BackendKind, config: &Config) -> Box<dyn Backend> {
    match kind {
        BackendKind::Framebuffer => Box::new(FramebufferBackend::new(config)),
        BackendKind::Desktop => Box::new(DesktopBackend::new(config)),
        BackendKind::None => Box::new(HeadlessBackend::new(config)),
    }
}

/// Removes what a backend registered: its input first, then its display.
pub(crate) fn release(registry: &mut Registry, registration: Registration) {
    if let Some(input) = registration.input {
        if let Err(e) = registry.unregister_input(input) {
            warn!("{} backend: input {} not released: {}", registration.backend, input.raw(), e);
        }
    }
    if let Err(e) = registry.unregister_display(registration.display) {
        warn!(
            "{} backend: display {} not released: {}",
            registration.backend,
            registration.display.raw(),
            e
        );
    }
}
