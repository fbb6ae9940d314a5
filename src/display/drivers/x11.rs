#![cfg(feature = "desktop")]

//! X11 window used by the desktop backend.
//!
//! One window of fixed size backed by a client-side `0x00RRGGBB` buffer.
//! Flushes copy into the buffer and push the touched rectangle with
//! `XPutImage`. Pointer state comes from motion and button events drained
//! on every read.

use crate::color::Color;
use crate::display::driver::{FlushSink, PointerSource};
use crate::display::error::DisplayError;
use crate::display::types::{Area, BackendKind, PointerState};
use log::{debug, info, trace};
use std::ffi::CString;
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::sync::{Arc, Mutex};
use x11::xlib::*;

pub struct X11Window {
    display: *mut Display,
    window: Window,
    gc: GC,
    visual: *mut Visual,
    depth: c_int,
    width: u32,
    height: u32,
    backing: Vec<u32>,
    pointer: PointerState,
    close_requested: bool,
}

// SAFETY: every Xlib call goes through the owning Mutex, one thread at a time.
unsafe impl Send for X11Window {}

pub type SharedWindow = Arc<Mutex<X11Window>>;

impl X11Window {
    pub fn open(
        display_name: Option<&str>,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<Self, DisplayError> {
        let unavailable = |reason: String| DisplayError::unavailable(BackendKind::Desktop, reason);
        let name = display_name
            .map(CString::new)
            .transpose()
            .map_err(|_| unavailable("display name contains a NUL byte".to_string()))?;
        let title = CString::new(title)
            .map_err(|_| unavailable("window title contains a NUL byte".to_string()))?;

        unsafe {
            let display = XOpenDisplay(name.as_ref().map_or(ptr::null(), |n| n.as_ptr()));
            if display.is_null() {
                return Err(unavailable(format!(
                    "cannot connect to X server {}",
                    display_name.unwrap_or("$DISPLAY")
                )));
            }

            let screen = XDefaultScreen(display);
            let root = XRootWindow(display, screen);
            let visual = XDefaultVisual(display, screen);
            let depth = XDefaultDepth(display, screen);

            let window = XCreateSimpleWindow(
                display,
                root,
                0,
                0,
                width,
                height,
                1,
                XBlackPixel(display, screen),
                XBlackPixel(display, screen),
            );
            if window == 0 {
                XCloseDisplay(display);
                return Err(unavailable("XCreateSimpleWindow failed".to_string()));
            }

            XStoreName(display, window, title.as_ptr());
            XSelectInput(
                display,
                window,
                ExposureMask
                    | ButtonPressMask
                    | ButtonReleaseMask
                    | PointerMotionMask
                    | StructureNotifyMask,
            );

            let gc = XCreateGC(display, window, 0, ptr::null_mut());

            let mut wm_delete_window = XInternAtom(
                display,
                b"WM_DELETE_WINDOW\0".as_ptr() as *const c_char,
                0,
            );
            XSetWMProtocols(display, window, &mut wm_delete_window, 1);

            XMapWindow(display, window);
            XFlush(display);

            info!("X11Window: created {}x{} window (depth {})", width, height, depth);

            Ok(Self {
                display,
                window,
                gc,
                visual,
                depth,
                width,
                height,
                backing: vec![0; width as usize * height as usize],
                pointer: PointerState::default(),
                close_requested: false,
            })
        }
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    fn put_area(&mut self, area: &Area) {
        unsafe {
            let image = XCreateImage(
                self.display,
                self.visual,
                self.depth as u32,
                ZPixmap,
                0,
                self.backing.as_mut_ptr() as *mut c_char,
                self.width,
                self.height,
                32,
                0,
            );
            if image.is_null() {
                debug!("X11Window: XCreateImage failed, frame dropped");
                return;
            }
            XPutImage(
                self.display,
                self.window,
                self.gc,
                image,
                area.x1,
                area.y1,
                area.x1,
                area.y1,
                area.width(),
                area.height(),
            );
            // The backing buffer is ours; keep XDestroyImage from freeing it.
            (*image).data = ptr::null_mut();
            XDestroyImage(image);
            XFlush(self.display);
        }
    }

    fn pump_events(&mut self) {
        unsafe {
            while XPending(self.display) > 0 {
                let mut event: XEvent = std::mem::zeroed();
                XNextEvent(self.display, &mut event);
                match event.get_type() {
                    MotionNotify => {
                        let motion = event.motion;
                        self.pointer.x = motion.x;
                        self.pointer.y = motion.y;
                    }
                    ButtonPress | ButtonRelease => {
                        let button = event.button;
                        if button.button == Button1 {
                            self.pointer.pressed = event.get_type() == ButtonPress;
                            self.pointer.x = button.x;
                            self.pointer.y = button.y;
                        }
                    }
                    Expose => {
                        let full = Area::full(self.width, self.height);
                        self.put_area(&full);
                    }
                    ClientMessage => {
                        info!("X11Window: close requested by window manager");
                        self.close_requested = true;
                    }
                    _ => {}
                }
            }
        }
    }
}

impl Drop for X11Window {
    fn drop(&mut self) {
        info!("X11Window::drop() - Cleaning up");
        unsafe {
            if !self.gc.is_null() {
                XFreeGC(self.display, self.gc);
            }
            if self.window != 0 {
                XDestroyWindow(self.display, self.window);
            }
            if !self.display.is_null() {
                XCloseDisplay(self.display);
            }
        }
    }
}

pub struct X11Sink {
    pub window: SharedWindow,
}

impl FlushSink for X11Sink {
    fn flush(&mut self, area: &Area, pixels: &[Color]) -> Result<(), DisplayError> {
        trace!("X11Sink: flush {:?}", area);
        let mut window = self.window.lock().unwrap_or_else(|p| p.into_inner());
        let stride = window.width as usize;
        let row_len = area.width() as usize;
        for (row, y) in (area.y1..=area.y2).enumerate() {
            let dst = y as usize * stride + area.x1 as usize;
            for (col, color) in pixels[row * row_len..(row + 1) * row_len].iter().enumerate() {
                window.backing[dst + col] = color.full() & 0x00FF_FFFF;
            }
        }
        window.put_area(area);
        Ok(())
    }
}

pub struct X11Pointer {
    pub window: SharedWindow,
}

impl PointerSource for X11Pointer {
    fn read(&mut self) -> Result<PointerState, DisplayError> {
        let mut window = self.window.lock().unwrap_or_else(|p| p.into_inner());
        window.pump_events();
        Ok(window.pointer)
    }
}
