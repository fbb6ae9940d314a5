//! Desktop window backend.
//!
//! Needs the `desktop` cargo feature (X11). Without it the backend still
//! exists so selection stays a runtime decision, but `open()` reports it as
//! unavailable.

use crate::config::{Config, DesktopConfig, FALLBACK_RESOLUTION};
use crate::display::driver::Backend;
use crate::display::drivers::release;
use crate::display::error::DisplayError;
use crate::display::registry::Registry;
use crate::display::types::{BackendKind, DisplayMetrics, Registration};
use log::info;

#[cfg(feature = "desktop")]
use crate::display::driver::{DisplayDriver, InputDriver};
#[cfg(feature = "desktop")]
use crate::display::drivers::x11::{SharedWindow, X11Pointer, X11Sink, X11Window};
#[cfg(feature = "desktop")]
use crate::display::pixel::PixelFormat;
#[cfg(feature = "desktop")]
use std::sync::{Arc, Mutex};

#[cfg_attr(not(feature = "desktop"), allow(dead_code))]
pub struct DesktopBackend {
    desktop: DesktopConfig,
    resolution: (u32, u32),
    draw_ratio: u32,
    #[cfg(feature = "desktop")]
    window: Option<SharedWindow>,
    metrics: Option<DisplayMetrics>,
    registration: Option<Registration>,
}

impl DesktopBackend {
    pub fn new(config: &Config) -> Self {
        Self {
            desktop: config.desktop.clone(),
            resolution: config.display.resolution_or(FALLBACK_RESOLUTION),
            draw_ratio: config.display.draw_ratio,
            #[cfg(feature = "desktop")]
            window: None,
            metrics: None,
            registration: None,
        }
    }
}

impl Backend for DesktopBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Desktop
    }

    #[cfg(feature = "desktop")]
    fn open(&mut self) -> Result<DisplayMetrics, DisplayError> {
        let (width_px, height_px) = self.resolution;
        let window = X11Window::open(
            self.desktop.display_name.as_deref(),
            &self.desktop.title,
            width_px,
            height_px,
        )?;
        let metrics = DisplayMetrics {
            width_px,
            height_px,
            pixel_format: PixelFormat::Xrgb8888,
        };
        self.window = Some(Arc::new(Mutex::new(window)));
        self.metrics = Some(metrics);
        Ok(metrics)
    }

    #[cfg(not(feature = "desktop"))]
    fn open(&mut self) -> Result<DisplayMetrics, DisplayError> {
        Err(DisplayError::unavailable(
            BackendKind::Desktop,
            format!(
                "built without the `desktop` feature, cannot open window '{}'",
                self.desktop.title
            ),
        ))
    }

    #[cfg(feature = "desktop")]
    fn register(&mut self, registry: &mut Registry) -> Result<Registration, DisplayError> {
        let (window, metrics) = match (self.window.take(), self.metrics) {
            (Some(window), Some(metrics)) => (window, metrics),
            _ => {
                return Err(DisplayError::PreconditionViolation(
                    "desktop backend registered before open",
                ))
            }
        };
        let (hor_res, ver_res) = self.resolution;
        let sink = X11Sink {
            window: window.clone(),
        };
        let display = registry.register_display(DisplayDriver::new(
            hor_res,
            ver_res,
            self.draw_ratio,
            Box::new(sink),
        ));
        let input = registry
            .register_input_for(display, InputDriver::pointer(Box::new(X11Pointer { window })))?;

        let registration = Registration {
            backend: BackendKind::Desktop,
            display,
            input: Some(input),
            metrics,
        };
        self.registration = Some(registration);
        Ok(registration)
    }

    #[cfg(not(feature = "desktop"))]
    fn register(&mut self, _registry: &mut Registry) -> Result<Registration, DisplayError> {
        Err(DisplayError::PreconditionViolation(
            "desktop backend registered before open",
        ))
    }

    fn close(&mut self, registry: &mut Registry) {
        if let Some(registration) = self.registration.take() {
            release(registry, registration);
        }
        #[cfg(feature = "desktop")]
        {
            self.window = None;
        }
        self.metrics = None;
        info!(
            "DesktopBackend: closed ({}x{})",
            self.resolution.0, self.resolution.1
        );
    }
}
