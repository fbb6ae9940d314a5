// src/display/driver.rs
//! Backend trait and the driver objects backends hand to the registry.
//!
//! ## Lifecycle
//! 1. `open()` - acquire the device (fbdev node, X11 connection, ...) and
//!    discover its metrics. Nothing is registered yet, so a failure here
//!    leaves the registry untouched.
//! 2. `register()` - move the opened device into a `DisplayDriver` (and an
//!    optional `InputDriver`) and register them.
//! 3. `close()` - unregister what `register()` added. Device handles are
//!    released when the registry drops the driver objects.

use crate::color::Color;
use crate::display::error::DisplayError;
use crate::display::registry::Registry;
use crate::display::types::{Area, BackendKind, DisplayMetrics, PointerState, Registration};

/// One concrete display/input integration.
pub trait Backend: Send {
    fn kind(&self) -> BackendKind;

    /// Opens the underlying device. Must not touch the registry.
    fn open(&mut self) -> Result<DisplayMetrics, DisplayError>;

    /// Registers the opened device(s). Fails with `PreconditionViolation`
    /// if called before a successful `open()`.
    fn register(&mut self, registry: &mut Registry) -> Result<Registration, DisplayError>;

    /// Removes this backend's drivers from the registry.
    fn close(&mut self, registry: &mut Registry);
}

/// Receives rendered pixels for an area of the display.
pub trait FlushSink: Send {
    /// `pixels` holds exactly `area.pixel_count()` colors in row-major order,
    /// and `area` is already clipped to the display.
    fn flush(&mut self, area: &Area, pixels: &[Color]) -> Result<(), DisplayError>;
}

/// Produces pointer state on demand.
pub trait PointerSource: Send {
    fn read(&mut self) -> Result<PointerState, DisplayError>;
}

/// Display driver instance as stored by the registry.
pub struct DisplayDriver {
    pub hor_res: u32,
    pub ver_res: u32,
    /// Partial-refresh buffer is `hor_res * ver_res / draw_ratio` pixels.
    pub draw_ratio: u32,
    pub sink: Box<dyn FlushSink>,
}

impl DisplayDriver {
    pub fn new(hor_res: u32, ver_res: u32, draw_ratio: u32, sink: Box<dyn FlushSink>) -> Self {
        Self {
            hor_res,
            ver_res,
            draw_ratio: draw_ratio.max(1),
            sink,
        }
    }

    pub fn draw_buffer_len(&self) -> usize {
        (self.hor_res as usize * self.ver_res as usize) / self.draw_ratio as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pointer,
}

/// Input driver instance as stored by the registry.
pub struct InputDriver {
    pub kind: InputKind,
    pub source: Box<dyn PointerSource>,
}

impl InputDriver {
    pub fn pointer(source: Box<dyn PointerSource>) -> Self {
        Self {
            kind: InputKind::Pointer,
            source,
        }
    }
}
