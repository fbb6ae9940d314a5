// src/display/manager.rs
//! BackendSelector - owns the registry and the one active backend.

use crate::config::{Config, ThemeConfig};
use crate::display::driver::Backend;
use crate::display::drivers::create_backend;
use crate::display::error::DisplayError;
use crate::display::registry::{Registry, Theme};
use crate::display::types::{BackendKind, Registration, ScreenHandle};
use log::{debug, info, warn};

/// Brings up exactly one backend at a time and hands out the registry it
/// registered into.
#[derive(Default)]
pub struct BackendSelector {
    registry: Registry,
    active: Option<ActiveBackend>,
}

struct ActiveBackend {
    backend: Box<dyn Backend>,
    registration: Registration,
}

impl BackendSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the configured backend and initializes it.
    ///
    /// Fails with `Misconfigured` when the config does not validate (both
    /// backend switches set, zero draw ratio or resolution, ...), and with
    /// `AlreadyInitialized` when a backend is still active. Neither case
    /// opens a device.
    pub fn initialize_backend(&mut self, config: &Config) -> Result<Registration, DisplayError> {
        config.validate()?;
        let kind = config.backend.resolve()?;
        self.ensure_inactive()?;
        info!("BackendSelector: Creating {} backend...", kind);
        let registration = self.initialize_with(create_backend(kind, config))?;
        self.registry
            .set_theme(registration.display, theme_from(&config.theme))?;
        Ok(registration)
    }

    /// Initializes an already constructed backend.
    pub fn initialize_with(
        &mut self,
        mut backend: Box<dyn Backend>,
    ) -> Result<Registration, DisplayError> {
        self.ensure_inactive()?;
        let kind = backend.kind();

        let metrics = backend.open().map_err(|e| {
            warn!("BackendSelector: {} backend failed to open: {}", kind, e);
            e
        })?;
        debug!(
            "BackendSelector: {} opened {}x{} {:?}",
            kind, metrics.width_px, metrics.height_px, metrics.pixel_format
        );

        let registration = match backend.register(&mut self.registry) {
            Ok(registration) => registration,
            Err(e) => {
                backend.close(&mut self.registry);
                return Err(e);
            }
        };
        // Displays registered beforehand must not shadow the backend's own.
        if let Err(e) = self.registry.set_default_display(registration.display) {
            backend.close(&mut self.registry);
            return Err(e);
        }
        info!(
            "BackendSelector: Initialized {} - display {} ({}x{}), input {}",
            kind,
            registration.display.raw(),
            registration.metrics.width_px,
            registration.metrics.height_px,
            registration
                .input
                .map_or_else(|| "none".to_string(), |id| id.raw().to_string())
        );

        self.active = Some(ActiveBackend {
            backend,
            registration,
        });
        Ok(registration)
    }

    fn ensure_inactive(&self) -> Result<(), DisplayError> {
        match &self.active {
            Some(active) => Err(DisplayError::AlreadyInitialized {
                active: active.registration.backend,
            }),
            None => Ok(()),
        }
    }

    /// Active screen of the default display.
    pub fn active_screen(&self) -> Result<ScreenHandle, DisplayError> {
        if self.active.is_none() {
            return Err(DisplayError::PreconditionViolation(
                "active_screen called before a backend was initialized",
            ));
        }
        self.registry
            .default_active_screen()
            .ok_or(DisplayError::PreconditionViolation(
                "no default display is registered",
            ))
    }

    pub fn active_backend(&self) -> Option<BackendKind> {
        self.active.as_ref().map(|a| a.registration.backend)
    }

    pub fn registration(&self) -> Option<Registration> {
        self.active.as_ref().map(|a| a.registration)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Closes the active backend and returns to the uninitialized state.
    pub fn shutdown(&mut self) -> Result<(), DisplayError> {
        let mut active = self.active.take().ok_or(DisplayError::PreconditionViolation(
            "shutdown called without an initialized backend",
        ))?;
        info!(
            "BackendSelector: Shutting down {} backend",
            active.registration.backend
        );
        active.backend.close(&mut self.registry);
        Ok(())
    }
}

fn theme_from(config: &ThemeConfig) -> Theme {
    Theme {
        primary: config.primary.main(),
        secondary: config.secondary.main(),
        dark: config.dark,
        ..Theme::default()
    }
}
