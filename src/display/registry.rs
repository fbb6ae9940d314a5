// src/display/registry.rs
//! Process-wide display/input registry.
//!
//! Backends register their display and input drivers here; the rest of the
//! application only ever talks to the registry. Each display owns a list of
//! screens and remembers which one is loaded. The first registered display
//! becomes the default one, and input drivers bind to the default display at
//! registration time.

use crate::color::{Color, Palette};
use crate::display::driver::{DisplayDriver, InputDriver};
use crate::display::error::DisplayError;
use crate::display::types::{Area, DisplayId, InputId, PointerState, ScreenHandle, ScreenId};
use log::{debug, info, trace, warn};
use std::collections::BTreeMap;

/// Theme colors applied to a display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub primary: Color,
    pub secondary: Color,
    pub dark: bool,
    pub background: Color,
    pub background_opa: u8,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Palette::Blue.main(),
            secondary: Palette::Red.main(),
            dark: false,
            background: Color::rgb(100, 100, 100),
            background_opa: 128,
        }
    }
}

struct DisplayEntry {
    driver: DisplayDriver,
    draw_buffer: Vec<Color>,
    screens: Vec<ScreenId>,
    active: ScreenId,
    theme: Theme,
}

struct InputEntry {
    driver: InputDriver,
    display: DisplayId,
    last: PointerState,
}

#[derive(Default)]
pub struct Registry {
    displays: BTreeMap<DisplayId, DisplayEntry>,
    inputs: BTreeMap<InputId, InputEntry>,
    default_display: Option<DisplayId>,
    next_display: u32,
    next_input: u32,
    next_screen: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_screen(&mut self) -> ScreenId {
        self.next_screen += 1;
        ScreenId(self.next_screen)
    }

    /// Stores a display driver and loads a fresh default screen on it.
    pub fn register_display(&mut self, driver: DisplayDriver) -> DisplayId {
        self.next_display += 1;
        let id = DisplayId(self.next_display);
        let screen = self.alloc_screen();
        let draw_buffer = vec![Color::BLACK; driver.draw_buffer_len()];

        info!(
            "Registry: display {} registered ({}x{}, draw buffer {} px)",
            id.0,
            driver.hor_res,
            driver.ver_res,
            draw_buffer.len()
        );

        self.displays.insert(
            id,
            DisplayEntry {
                driver,
                draw_buffer,
                screens: vec![screen],
                active: screen,
                theme: Theme::default(),
            },
        );
        if self.default_display.is_none() {
            self.default_display = Some(id);
        }
        id
    }

    /// Binds an input driver to the current default display.
    pub fn register_input(&mut self, driver: InputDriver) -> Result<InputId, DisplayError> {
        let display = self.default_display.ok_or(DisplayError::PreconditionViolation(
            "input driver registered before any display",
        ))?;
        self.register_input_for(display, driver)
    }

    /// Binds an input driver to `display`, whether or not it is the default.
    pub fn register_input_for(
        &mut self,
        display: DisplayId,
        driver: InputDriver,
    ) -> Result<InputId, DisplayError> {
        if !self.displays.contains_key(&display) {
            return Err(DisplayError::UnknownDisplay(display.0));
        }
        self.next_input += 1;
        let id = InputId(self.next_input);
        info!(
            "Registry: input {} ({:?}) bound to display {}",
            id.0, driver.kind, display.0
        );
        self.inputs.insert(
            id,
            InputEntry {
                driver,
                display,
                last: PointerState::default(),
            },
        );
        Ok(id)
    }

    /// Display an input driver is bound to.
    pub fn input_display(&self, id: InputId) -> Option<DisplayId> {
        self.inputs.get(&id).map(|entry| entry.display)
    }

    /// Drops a display driver, its screens and every input bound to it.
    pub fn unregister_display(&mut self, id: DisplayId) -> Result<(), DisplayError> {
        if self.displays.remove(&id).is_none() {
            return Err(DisplayError::UnknownDisplay(id.0));
        }
        let bound: Vec<InputId> = self
            .inputs
            .iter()
            .filter(|(_, entry)| entry.display == id)
            .map(|(input, _)| *input)
            .collect();
        for input in bound {
            debug!("Registry: dropping input {} bound to display {}", input.0, id.0);
            self.inputs.remove(&input);
        }
        if self.default_display == Some(id) {
            self.default_display = self.displays.keys().next().copied();
        }
        info!("Registry: display {} unregistered", id.0);
        Ok(())
    }

    pub fn unregister_input(&mut self, id: InputId) -> Result<(), DisplayError> {
        self.inputs
            .remove(&id)
            .map(|_| info!("Registry: input {} unregistered", id.0))
            .ok_or(DisplayError::UnknownInput(id.0))
    }

    pub fn default_display(&self) -> Option<DisplayId> {
        self.default_display
    }

    pub fn set_default_display(&mut self, id: DisplayId) -> Result<(), DisplayError> {
        if !self.displays.contains_key(&id) {
            return Err(DisplayError::UnknownDisplay(id.0));
        }
        self.default_display = Some(id);
        Ok(())
    }

    pub fn display_count(&self) -> usize {
        self.displays.len()
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// `(hor_res, ver_res)` of a registered display.
    pub fn resolution(&self, id: DisplayId) -> Option<(u32, u32)> {
        self.displays
            .get(&id)
            .map(|entry| (entry.driver.hor_res, entry.driver.ver_res))
    }

    pub fn draw_buffer_len(&self, id: DisplayId) -> Option<usize> {
        self.displays.get(&id).map(|entry| entry.draw_buffer.len())
    }

    /// The screen currently loaded on `display`.
    pub fn active_screen(&self, display: DisplayId) -> Option<ScreenHandle> {
        self.displays.get(&display).map(|entry| ScreenHandle {
            display,
            screen: entry.active,
        })
    }

    /// The screen currently loaded on the default display.
    pub fn default_active_screen(&self) -> Option<ScreenHandle> {
        self.default_display.and_then(|id| self.active_screen(id))
    }

    /// Adds an (unloaded) screen to `display`.
    pub fn create_screen(&mut self, display: DisplayId) -> Result<ScreenHandle, DisplayError> {
        if !self.displays.contains_key(&display) {
            return Err(DisplayError::UnknownDisplay(display.0));
        }
        let screen = self.alloc_screen();
        if let Some(entry) = self.displays.get_mut(&display) {
            entry.screens.push(screen);
        }
        Ok(ScreenHandle { display, screen })
    }

    /// Makes `handle` the active screen of its display.
    pub fn load_screen(&mut self, handle: ScreenHandle) -> Result<(), DisplayError> {
        let entry = self
            .displays
            .get_mut(&handle.display)
            .ok_or(DisplayError::UnknownDisplay(handle.display.0))?;
        if !entry.screens.contains(&handle.screen) {
            return Err(DisplayError::PreconditionViolation(
                "screen does not belong to this display",
            ));
        }
        entry.active = handle.screen;
        debug!(
            "Registry: screen {} loaded on display {}",
            handle.screen.0, handle.display.0
        );
        Ok(())
    }

    pub fn set_theme(&mut self, display: DisplayId, theme: Theme) -> Result<(), DisplayError> {
        let entry = self
            .displays
            .get_mut(&display)
            .ok_or(DisplayError::UnknownDisplay(display.0))?;
        entry.theme = theme;
        Ok(())
    }

    pub fn theme(&self, display: DisplayId) -> Option<Theme> {
        self.displays.get(&display).map(|entry| entry.theme)
    }

    /// Forwards pixels for `area` to the display driver.
    ///
    /// `pixels` must cover the requested area exactly. Parts outside the
    /// display are clipped away before the driver sees them; a fully
    /// off-screen area is a no-op.
    pub fn flush(
        &mut self,
        display: DisplayId,
        area: &Area,
        pixels: &[Color],
    ) -> Result<(), DisplayError> {
        let entry = self
            .displays
            .get_mut(&display)
            .ok_or(DisplayError::UnknownDisplay(display.0))?;

        if pixels.len() != area.pixel_count() {
            return Err(DisplayError::InvalidFlush(format!(
                "area {}x{} needs {} pixels, got {}",
                area.width(),
                area.height(),
                area.pixel_count(),
                pixels.len()
            )));
        }

        let bounds = Area::full(entry.driver.hor_res, entry.driver.ver_res);
        let Some(clipped) = area.intersect(&bounds) else {
            trace!("Registry: flush of {:?} is off-screen, skipped", area);
            return Ok(());
        };

        if clipped == *area {
            return entry.driver.sink.flush(&clipped, pixels);
        }

        // Repack the visible rows into the draw buffer.
        let src_width = area.width() as usize;
        let dst_width = clipped.width() as usize;
        let needed = clipped.pixel_count();
        if entry.draw_buffer.len() < needed {
            entry.draw_buffer.resize(needed, Color::BLACK);
        }
        for (row, y) in (clipped.y1..=clipped.y2).enumerate() {
            let src_start = (y as i64 - area.y1 as i64) as usize * src_width
                + (clipped.x1 as i64 - area.x1 as i64) as usize;
            let dst_start = row * dst_width;
            entry.draw_buffer[dst_start..dst_start + dst_width]
                .copy_from_slice(&pixels[src_start..src_start + dst_width]);
        }
        entry
            .driver
            .sink
            .flush(&clipped, &entry.draw_buffer[..needed])
    }

    /// Reads one input driver and remembers the result.
    pub fn read_input(&mut self, id: InputId) -> Result<PointerState, DisplayError> {
        let entry = self
            .inputs
            .get_mut(&id)
            .ok_or(DisplayError::UnknownInput(id.0))?;
        let state = entry.driver.source.read()?;
        entry.last = state;
        Ok(state)
    }

    /// Reads every input driver. Drivers that fail keep their last state.
    pub fn poll_inputs(&mut self) -> Vec<(InputId, PointerState)> {
        let mut states = Vec::with_capacity(self.inputs.len());
        for (id, entry) in self.inputs.iter_mut() {
            match entry.driver.source.read() {
                Ok(state) => entry.last = state,
                Err(e) => warn!("Registry: input {} read failed: {}", id.0, e),
            }
            states.push((*id, entry.last));
        }
        states
    }

    pub fn last_pointer(&self, id: InputId) -> Option<PointerState> {
        self.inputs.get(&id).map(|entry| entry.last)
    }
}

#[cfg(test)]
mod tests;
