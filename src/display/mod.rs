// src/display/mod.rs
//! Display/input backends and the registry they register into.
//!
//! - Backend: one concrete integration (fbdev + evdev, X11 window, headless)
//! - Registry: displays, screens, input drivers, default display, theme
//! - BackendSelector: picks a backend from the config and brings it up

pub mod driver;
pub mod drivers;
pub mod error;
pub mod manager;
pub mod pixel;
pub mod registry;
pub mod types;

pub use driver::{Backend, DisplayDriver, FlushSink, InputDriver, InputKind, PointerSource};
pub use error::DisplayError;
pub use manager::BackendSelector;
pub use pixel::PixelFormat;
pub use registry::{Registry, Theme};
pub use types::{
    Area, BackendKind, DisplayId, DisplayMetrics, InputId, PointerState, Registration,
    ScreenHandle, ScreenId,
};
