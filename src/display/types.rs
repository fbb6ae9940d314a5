// src/display/types.rs
//! Plain data exchanged between the selector, the registry and the backends.

use crate::display::pixel::PixelFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The backend family chosen at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Linux fbdev output with an optional evdev pointer.
    Framebuffer,
    /// A window on the desktop session (X11).
    Desktop,
    /// Headless in-memory surface, no input.
    None,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Framebuffer => "framebuffer",
            BackendKind::Desktop => "desktop",
            BackendKind::None => "none",
        };
        f.write_str(name)
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fbdev" | "framebuffer" | "fb" => Ok(BackendKind::Framebuffer),
            "desktop" | "x11" | "window" => Ok(BackendKind::Desktop),
            "none" | "headless" => Ok(BackendKind::None),
            other => Err(format!("unknown display backend '{}'", other)),
        }
    }
}

/// Registry key of a display driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayId(pub(crate) u32);

/// Registry key of an input driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputId(pub(crate) u32);

/// Registry key of a screen, unique across displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenId(pub(crate) u32);

impl DisplayId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl InputId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl ScreenId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Non-owning reference to a screen inside the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenHandle {
    pub display: DisplayId,
    pub screen: ScreenId,
}

/// Output geometry discovered when a backend opens its device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMetrics {
    pub width_px: u32,
    pub height_px: u32,
    pub pixel_format: PixelFormat,
}

/// What a successful initialization put into the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub backend: BackendKind,
    pub display: DisplayId,
    pub input: Option<InputId>,
    pub metrics: DisplayMetrics,
}

/// Inclusive rectangle in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Area {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// The whole surface of a `width` x `height` display. Sizes beyond
    /// `i32::MAX` are clamped to the coordinate range.
    pub fn full(width: u32, height: u32) -> Self {
        let last = |len: u32| (len.min(i32::MAX as u32) as i64 - 1) as i32;
        Self::new(0, 0, last(width), last(height))
    }

    pub fn width(&self) -> u32 {
        span(self.x1, self.x2)
    }

    pub fn height(&self) -> u32 {
        span(self.y1, self.y2)
    }

    pub fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn intersect(&self, other: &Area) -> Option<Area> {
        let area = Area::new(
            self.x1.max(other.x1),
            self.y1.max(other.y1),
            self.x2.min(other.x2),
            self.y2.min(other.y2),
        );
        if area.is_empty() {
            None
        } else {
            Some(area)
        }
    }
}

/// Inclusive length of `a..=b`, zero when `b < a`.
fn span(a: i32, b: i32) -> u32 {
    (b as i64 - a as i64 + 1).clamp(0, u32::MAX as i64) as u32
}

/// Last known pointer position and button state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerState {
    pub x: i32,
    pub y: i32,
    pub pressed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_kind_parses_aliases() {
        assert_eq!("fbdev".parse::<BackendKind>(), Ok(BackendKind::Framebuffer));
        assert_eq!(" Desktop ".parse::<BackendKind>(), Ok(BackendKind::Desktop));
        assert_eq!("headless".parse::<BackendKind>(), Ok(BackendKind::None));
        assert!("gtk3".parse::<BackendKind>().is_err());
    }

    #[test]
    fn area_dimensions_are_inclusive() {
        let area = Area::new(10, 20, 19, 24);
        assert_eq!(area.width(), 10);
        assert_eq!(area.height(), 5);
        assert_eq!(area.pixel_count(), 50);
    }

    #[test]
    fn extreme_coordinates_do_not_overflow() {
        let widest = Area::new(i32::MIN, 0, i32::MAX, 0);
        assert_eq!(widest.width(), u32::MAX);
        assert_eq!(widest.height(), 1);
        assert!(Area::new(i32::MAX, i32::MAX, i32::MIN, i32::MIN).is_empty());

        let huge = Area::full(u32::MAX, 3);
        assert_eq!(huge, Area::new(0, 0, i32::MAX - 1, 2));
        assert_eq!(Area::full(0, 0).pixel_count(), 0);
    }

    #[test]
    fn inverted_area_is_empty() {
        assert!(Area::new(5, 5, 4, 10).is_empty());
    }

    #[test]
    fn intersect_clips_to_bounds() {
        let screen = Area::full(100, 50);
        let clipped = Area::new(-10, 40, 20, 80).intersect(&screen).unwrap();
        assert_eq!(clipped, Area::new(0, 40, 20, 49));
        assert!(Area::new(200, 0, 210, 10).intersect(&screen).is_none());
    }
}
