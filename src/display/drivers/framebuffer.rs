//! Linux fbdev display backend with an optional evdev pointer.
//!
//! The device memory is mmap'ed once at open time and flushes encode
//! colors straight into the mapping using the pixel format derived from
//! the variable screen info.

use crate::color::Color;
use crate::config::{Config, DisplayConfig, FramebufferConfig};
use crate::display::driver::{Backend, DisplayDriver, FlushSink, InputDriver};
use crate::display::drivers::evdev_pointer::EvdevPointer;
use crate::display::drivers::release;
use crate::display::error::DisplayError;
use crate::display::pixel::PixelFormat;
use crate::display::registry::Registry;
use crate::display::types::{Area, BackendKind, DisplayMetrics, Registration};
use log::{info, trace, warn};
use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
#[allow(dead_code)]
pub struct FbBitField {
    offset: u32,
    length: u32,
    msb_right: u32,
}

/// `struct fb_var_screeninfo` from `<linux/fb.h>`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
#[allow(dead_code)]
pub struct FbVarScreenInfo {
    xres: u32,
    yres: u32,
    xres_virtual: u32,
    yres_virtual: u32,
    xoffset: u32,
    yoffset: u32,
    bits_per_pixel: u32,
    grayscale: u32,
    red: FbBitField,
    green: FbBitField,
    blue: FbBitField,
    transp: FbBitField,
    nonstd: u32,
    activate: u32,
    height: u32,
    width: u32,
    accel_flags: u32,
    pixclock: u32,
    left_margin: u32,
    right_margin: u32,
    upper_margin: u32,
    lower_margin: u32,
    hsync_len: u32,
    vsync_len: u32,
    sync: u32,
    vmode: u32,
    rotate: u32,
    colorspace: u32,
    reserved: [u32; 4],
}

/// `struct fb_fix_screeninfo` from `<linux/fb.h>`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
#[allow(dead_code)]
pub struct FbFixScreenInfo {
    id: [u8; 16],
    smem_start: libc::c_ulong,
    smem_len: u32,
    fb_type: u32,
    type_aux: u32,
    visual: u32,
    xpanstep: u16,
    ypanstep: u16,
    ywrapstep: u16,
    line_length: u32,
    mmio_start: libc::c_ulong,
    mmio_len: u32,
    accel: u32,
    capabilities: u16,
    reserved: [u16; 2],
}

nix::ioctl_read_bad!(fbioget_vscreeninfo, 0x4600, FbVarScreenInfo);
nix::ioctl_read_bad!(fbioget_fscreeninfo, 0x4602, FbFixScreenInfo);

/// Where a pixel lives in framebuffer memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FbLayout {
    pub width: u32,
    pub height: u32,
    pub xoffset: u32,
    pub yoffset: u32,
    /// Bytes per line, padding included.
    pub stride: usize,
    pub format: PixelFormat,
}

/// Encodes `pixels` (row-major over `area`) into `memory`.
///
/// Pixels outside the native resolution, or past the end of `memory`, are
/// dropped.
pub fn blit(memory: &mut [u8], layout: &FbLayout, area: &Area, pixels: &[Color]) {
    let bpp = layout.format.bytes_per_pixel();
    let row_len = area.width() as usize;

    for (row, y) in (area.y1..=area.y2).enumerate() {
        if y < 0 {
            continue;
        }
        if y as u32 >= layout.height {
            break;
        }
        let line = (y as usize + layout.yoffset as usize) * layout.stride;
        for (col, x) in (area.x1..=area.x2).enumerate() {
            if x < 0 {
                continue;
            }
            if x as u32 >= layout.width {
                break;
            }
            let offset = line + (x as usize + layout.xoffset as usize) * bpp;
            if offset + bpp > memory.len() {
                return;
            }
            if let Some(&color) = pixels.get(row * row_len + col) {
                layout.format.encode(color, &mut memory[offset..offset + bpp]);
            }
        }
    }
}

/// An opened and mapped fbdev device.
pub struct FbDevice {
    _file: File,
    mmap: *mut u8,
    mmap_len: usize,
    layout: FbLayout,
}

// SAFETY: the mapping is only touched through &mut self methods.
unsafe impl Send for FbDevice {}

impl FbDevice {
    pub fn open(path: &Path) -> Result<Self, DisplayError> {
        let unavailable = |reason: String| DisplayError::unavailable(BackendKind::Framebuffer, reason);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| unavailable(format!("cannot open {}: {}", path.display(), e)))?;
        let fd = file.as_raw_fd();

        let mut var_info = FbVarScreenInfo::default();
        // SAFETY: var_info matches the kernel's fb_var_screeninfo layout.
        unsafe { fbioget_vscreeninfo(fd, &mut var_info) }.map_err(|errno| {
            unavailable(format!(
                "{} is not a framebuffer (FBIOGET_VSCREENINFO: {})",
                path.display(),
                errno
            ))
        })?;

        let mut fix_info = FbFixScreenInfo::default();
        // SAFETY: fix_info matches the kernel's fb_fix_screeninfo layout.
        unsafe { fbioget_fscreeninfo(fd, &mut fix_info) }.map_err(|errno| {
            unavailable(format!("FBIOGET_FSCREENINFO on {}: {}", path.display(), errno))
        })?;

        let format = PixelFormat::from_bitfields(
            var_info.bits_per_pixel,
            var_info.red.offset,
            var_info.blue.offset,
        )
        .ok_or_else(|| {
            unavailable(format!(
                "unsupported pixel depth {} bpp",
                var_info.bits_per_pixel
            ))
        })?;

        let mmap_len = fix_info.smem_len as usize;
        // SAFETY: mapping a device fd we own; the result is checked below.
        let mmap = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                mmap_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd,
                0,
            )
        };
        if mmap == libc::MAP_FAILED {
            return Err(unavailable(format!(
                "mmap of {} failed: {}",
                path.display(),
                std::io::Error::last_os_error()
            )));
        }

        info!(
            "FbDevice: opened {} {}x{} {:?} stride={}",
            path.display(),
            var_info.xres,
            var_info.yres,
            format,
            fix_info.line_length
        );

        Ok(Self {
            _file: file,
            mmap: mmap as *mut u8,
            mmap_len,
            layout: FbLayout {
                width: var_info.xres,
                height: var_info.yres,
                xoffset: var_info.xoffset,
                yoffset: var_info.yoffset,
                stride: fix_info.line_length as usize,
                format,
            },
        })
    }

    pub fn metrics(&self) -> DisplayMetrics {
        DisplayMetrics {
            width_px: self.layout.width,
            height_px: self.layout.height,
            pixel_format: self.layout.format,
        }
    }
}

impl FlushSink for FbDevice {
    fn flush(&mut self, area: &Area, pixels: &[Color]) -> Result<(), DisplayError> {
        trace!("FbDevice: flush {:?}", area);
        // SAFETY: mmap/mmap_len describe a live mapping owned by self.
        let memory = unsafe { std::slice::from_raw_parts_mut(self.mmap, self.mmap_len) };
        blit(memory, &self.layout, area, pixels);
        Ok(())
    }
}

impl Drop for FbDevice {
    fn drop(&mut self) {
        // SAFETY: unmapping the region mapped in `open`.
        unsafe {
            libc::munmap(self.mmap as *mut libc::c_void, self.mmap_len);
        }
        info!("FbDevice: unmapped");
    }
}

pub struct FramebufferBackend {
    device_path: PathBuf,
    fb: FramebufferConfig,
    display: DisplayConfig,
    device: Option<FbDevice>,
    pointer: Option<EvdevPointer>,
    resolution: (u32, u32),
    metrics: Option<DisplayMetrics>,
    registration: Option<Registration>,
}

impl FramebufferBackend {
    pub fn new(config: &Config) -> Self {
        Self {
            device_path: config.framebuffer.device.clone(),
            fb: config.framebuffer.clone(),
            display: config.display.clone(),
            device: None,
            pointer: None,
            resolution: (0, 0),
            metrics: None,
            registration: None,
        }
    }
}

impl Backend for FramebufferBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Framebuffer
    }

    fn open(&mut self) -> Result<DisplayMetrics, DisplayError> {
        let device = FbDevice::open(&self.device_path)?;
        let native = device.metrics();
        self.resolution = self
            .display
            .resolution_or((native.width_px, native.height_px));
        let metrics = DisplayMetrics {
            width_px: self.resolution.0,
            height_px: self.resolution.1,
            pixel_format: native.pixel_format,
        };

        // Missing pointer hardware does not prevent graphics output.
        self.pointer = match &self.fb.input_device {
            Some(path) => match EvdevPointer::open(
                path,
                self.resolution.0,
                self.resolution.1,
                self.fb.calibration,
                self.fb.swap_axes,
            ) {
                Ok(pointer) => Some(pointer),
                Err(e) => {
                    warn!(
                        "FramebufferBackend: no pointer input, {} unavailable: {}",
                        path.display(),
                        e
                    );
                    None
                }
            },
            None => None,
        };

        self.device = Some(device);
        self.metrics = Some(metrics);
        Ok(metrics)
    }

    fn register(&mut self, registry: &mut Registry) -> Result<Registration, DisplayError> {
        let (device, metrics) = match (self.device.take(), self.metrics) {
            (Some(device), Some(metrics)) => (device, metrics),
            _ => {
                return Err(DisplayError::PreconditionViolation(
                    "framebuffer backend registered before open",
                ))
            }
        };

        let (hor_res, ver_res) = self.resolution;
        let display = registry.register_display(DisplayDriver::new(
            hor_res,
            ver_res,
            self.display.draw_ratio,
            Box::new(device),
        ));
        let input = match self.pointer.take() {
            Some(pointer) => Some(
                registry.register_input_for(display, InputDriver::pointer(Box::new(pointer)))?,
            ),
            None => None,
        };

        let registration = Registration {
            backend: BackendKind::Framebuffer,
            display,
            input,
            metrics,
        };
        self.registration = Some(registration);
        Ok(registration)
    }

    fn close(&mut self, registry: &mut Registry) {
        if let Some(registration) = self.registration.take() {
            release(registry, registration);
        }
        self.device = None;
        self.pointer = None;
        info!("FramebufferBackend: closed");
    }
}
