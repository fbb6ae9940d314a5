//! evdev pointer input for the framebuffer backend.
//!
//! Accepts both relative (mouse) and absolute (touchscreen) devices.
//! Positions are optionally axis-swapped, mapped from the calibration range
//! onto the display resolution and clamped to it.

use crate::config::Calibration;
use crate::display::driver::PointerSource;
use crate::display::error::DisplayError;
use crate::display::types::PointerState;
use evdev::{AbsoluteAxisType, Device, InputEvent, InputEventKind, Key, RelativeAxisType};
use log::{debug, info};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::Path;

/// Folds raw evdev events into a pointer position.
#[derive(Debug, Clone)]
pub(crate) struct PointerTracker {
    raw_x: i32,
    raw_y: i32,
    pressed: bool,
    hor_res: u32,
    ver_res: u32,
    calibration: Option<Calibration>,
    swap_axes: bool,
}

impl PointerTracker {
    pub(crate) fn new(
        hor_res: u32,
        ver_res: u32,
        calibration: Option<Calibration>,
        swap_axes: bool,
    ) -> Self {
        Self {
            raw_x: 0,
            raw_y: 0,
            pressed: false,
            hor_res: hor_res.max(1),
            ver_res: ver_res.max(1),
            calibration,
            swap_axes,
        }
    }

    pub(crate) fn apply(&mut self, event: &InputEvent) {
        match event.kind() {
            InputEventKind::RelAxis(RelativeAxisType::REL_X) => {
                self.raw_x = self.raw_x.saturating_add(event.value())
            }
            InputEventKind::RelAxis(RelativeAxisType::REL_Y) => {
                self.raw_y = self.raw_y.saturating_add(event.value())
            }
            InputEventKind::AbsAxis(AbsoluteAxisType::ABS_X)
            | InputEventKind::AbsAxis(AbsoluteAxisType::ABS_MT_POSITION_X) => {
                self.raw_x = event.value()
            }
            InputEventKind::AbsAxis(AbsoluteAxisType::ABS_Y)
            | InputEventKind::AbsAxis(AbsoluteAxisType::ABS_MT_POSITION_Y) => {
                self.raw_y = event.value()
            }
            InputEventKind::Key(Key::BTN_LEFT) | InputEventKind::Key(Key::BTN_TOUCH) => {
                self.pressed = event.value() != 0
            }
            _ => {}
        }
    }

    pub(crate) fn state(&self) -> PointerState {
        let (mut x, mut y) = if self.swap_axes {
            (self.raw_y, self.raw_x)
        } else {
            (self.raw_x, self.raw_y)
        };
        if let Some(cal) = self.calibration {
            x = map_range(x, cal.x_min, cal.x_max, self.hor_res);
            y = map_range(y, cal.y_min, cal.y_max, self.ver_res);
        }
        PointerState {
            x: x.clamp(0, self.hor_res as i32 - 1),
            y: y.clamp(0, self.ver_res as i32 - 1),
            pressed: self.pressed,
        }
    }
}

fn map_range(value: i32, in_min: i32, in_max: i32, out: u32) -> i32 {
    let span = (in_max as i64 - in_min as i64).max(1);
    ((value as i64 - in_min as i64) * out as i64 / span) as i32
}

/// An opened evdev device feeding a `PointerTracker`.
pub struct EvdevPointer {
    device: Device,
    tracker: PointerTracker,
}

impl EvdevPointer {
    pub fn open(
        path: &Path,
        hor_res: u32,
        ver_res: u32,
        calibration: Option<Calibration>,
        swap_axes: bool,
    ) -> io::Result<Self> {
        let device = Device::open(path)?;
        set_nonblocking(&device)?;
        info!(
            "EvdevPointer: opened {} ({})",
            path.display(),
            device.name().unwrap_or("unnamed")
        );
        Ok(Self {
            device,
            tracker: PointerTracker::new(hor_res, ver_res, calibration, swap_axes),
        })
    }
}

fn set_nonblocking(device: &Device) -> io::Result<()> {
    let fd = device.as_raw_fd();
    // SAFETY: fd is owned by `device` and stays open for the duration of the calls.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 || unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

impl PointerSource for EvdevPointer {
    fn read(&mut self) -> Result<PointerState, DisplayError> {
        match self.device.fetch_events() {
            Ok(events) => {
                for event in events {
                    self.tracker.apply(&event);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => {
                debug!("EvdevPointer: fetch_events failed: {}", e);
                return Err(DisplayError::Io(e));
            }
        }
        Ok(self.tracker.state())
    }
}
