//! Headless display backend: an in-memory surface with no input.

use crate::color::Color;
use crate::config::{Config, FALLBACK_RESOLUTION};
use crate::display::driver::{Backend, DisplayDriver, FlushSink};
use crate::display::drivers::release;
use crate::display::error::DisplayError;
use crate::display::pixel::PixelFormat;
use crate::display::registry::Registry;
use crate::display::types::{Area, BackendKind, DisplayMetrics, Registration};
use log::{info, trace};
use std::sync::{Arc, Mutex};

/// Pixels written by flushes, readable from outside the registry.
#[derive(Debug)]
pub struct HeadlessSurface {
    pub width_px: u32,
    pub height_px: u32,
    pub pixels: Vec<Color>,
    pub flush_count: usize,
}

impl HeadlessSurface {
    fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
            pixels: vec![Color::BLACK; width_px as usize * height_px as usize],
            flush_count: 0,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width_px || y >= self.height_px {
            return None;
        }
        self.pixels.get((y * self.width_px + x) as usize).copied()
    }
}

struct HeadlessSink {
    surface: Arc<Mutex<HeadlessSurface>>,
}

impl FlushSink for HeadlessSink {
    fn flush(&mut self, area: &Area, pixels: &[Color]) -> Result<(), DisplayError> {
        trace!("HeadlessBackend: flush {:?}", area);
        let mut surface = self
            .surface
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let stride = surface.width_px as usize;
        let row_len = area.width() as usize;
        for (row, y) in (area.y1..=area.y2).enumerate() {
            let dst = y as usize * stride + area.x1 as usize;
            let src = row * row_len;
            surface.pixels[dst..dst + row_len].copy_from_slice(&pixels[src..src + row_len]);
        }
        surface.flush_count += 1;
        Ok(())
    }
}

pub struct HeadlessBackend {
    width_px: u32,
    height_px: u32,
    draw_ratio: u32,
    surface: Arc<Mutex<HeadlessSurface>>,
    opened: bool,
    registration: Option<Registration>,
}

impl HeadlessBackend {
    pub fn new(config: &Config) -> Self {
        let (width_px, height_px) = config.display.resolution_or(FALLBACK_RESOLUTION);
        Self {
            width_px,
            height_px,
            draw_ratio: config.display.draw_ratio,
            surface: Arc::new(Mutex::new(HeadlessSurface::new(width_px, height_px))),
            opened: false,
            registration: None,
        }
    }

    /// Shared handle to the surface flushes land on.
    pub fn surface(&self) -> Arc<Mutex<HeadlessSurface>> {
        self.surface.clone()
    }
}

impl Backend for HeadlessBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::None
    }

    fn open(&mut self) -> Result<DisplayMetrics, DisplayError> {
        info!(
            "HeadlessBackend: open {}x{} surface",
            self.width_px, self.height_px
        );
        self.opened = true;
        Ok(DisplayMetrics {
            width_px: self.width_px,
            height_px: self.height_px,
            pixel_format: PixelFormat::Xrgb8888,
        })
    }

    fn register(&mut self, registry: &mut Registry) -> Result<Registration, DisplayError> {
        if !self.opened {
            return Err(DisplayError::PreconditionViolation(
                "headless backend registered before open",
            ));
        }
        let sink = HeadlessSink {
            surface: self.surface.clone(),
        };
        let display = registry.register_display(DisplayDriver::new(
            self.width_px,
            self.height_px,
            self.draw_ratio,
            Box::new(sink),
        ));
        let registration = Registration {
            backend: BackendKind::None,
            display,
            input: None,
            metrics: DisplayMetrics {
                width_px: self.width_px,
                height_px: self.height_px,
                pixel_format: PixelFormat::Xrgb8888,
            },
        };
        self.registration = Some(registration);
        Ok(registration)
    }

    fn close(&mut self, registry: &mut Registry) {
        if let Some(registration) = self.registration.take() {
            release(registry, registration);
        }
        self.opened = false;
        info!("HeadlessBackend: closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_before_open_is_rejected() {
        let mut backend = HeadlessBackend::new(&Config::default());
        let mut registry = Registry::new();
        assert!(matches!(
            backend.register(&mut registry),
            Err(DisplayError::PreconditionViolation(_))
        ));
        assert_eq!(registry.display_count(), 0);
    }

    #[test]
    fn flushes_land_on_the_shared_surface() {
        let mut config = Config::default();
        config.display.hor_res = Some(4);
        config.display.ver_res = Some(3);
        let mut backend = HeadlessBackend::new(&config);
        let surface = backend.surface();
        let mut registry = Registry::new();

        backend.open().unwrap();
        let reg = backend.register(&mut registry).unwrap();
        registry
            .flush(reg.display, &Area::new(1, 1, 2, 1), &[Color::WHITE, Color::WHITE])
            .unwrap();

        let surface = surface.lock().unwrap();
        assert_eq!(surface.flush_count, 1);
        assert_eq!(surface.pixel(1, 1), Some(Color::WHITE));
        assert_eq!(surface.pixel(0, 1), Some(Color::BLACK));
        assert_eq!(surface.pixel(4, 0), None);
    }

    #[test]
    fn close_unregisters_the_display() {
        let mut backend = HeadlessBackend::new(&Config::default());
        let mut registry = Registry::new();
        backend.open().unwrap();
        backend.register(&mut registry).unwrap();
        backend.close(&mut registry);
        assert_eq!(registry.display_count(), 0);
    }

    #[test_log::test]
    fn release_after_external_unregister_only_warns() {
        let mut backend = HeadlessBackend::new(&Config::default());
        let mut registry = Registry::new();
        backend.open().unwrap();
        let reg = backend.register(&mut registry).unwrap();

        registry.unregister_display(reg.display).unwrap();
        release(&mut registry, reg);
        backend.close(&mut registry);
        assert_eq!(registry.display_count(), 0);
    }
}
