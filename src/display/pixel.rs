// src/display/pixel.rs
//! Device pixel formats and color encoding for flushes.

use crate::color::Color;

/// Memory layout of one pixel on the output device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 16-bit little-endian RGB565.
    Rgb565,
    /// 24-bit, bytes in R, G, B order.
    Rgb888,
    /// 24-bit, bytes in B, G, R order.
    Bgr888,
    /// 32-bit, bytes in B, G, R, X order (`0xXXRRGGBB` little-endian).
    Xrgb8888,
    /// 32-bit, bytes in R, G, B, X order.
    Xbgr8888,
}

impl PixelFormat {
    /// Derives the format from fbdev screen info. Returns `None` for depths
    /// the flush path cannot encode.
    pub fn from_bitfields(bits_per_pixel: u32, red_offset: u32, blue_offset: u32) -> Option<Self> {
        match bits_per_pixel {
            16 => Some(PixelFormat::Rgb565),
            24 if blue_offset == 0 => Some(PixelFormat::Bgr888),
            24 if red_offset == 0 => Some(PixelFormat::Rgb888),
            32 if blue_offset == 0 => Some(PixelFormat::Xrgb8888),
            32 if red_offset == 0 => Some(PixelFormat::Xbgr8888),
            _ => None,
        }
    }

    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb565 => 2,
            PixelFormat::Rgb888 | PixelFormat::Bgr888 => 3,
            PixelFormat::Xrgb8888 | PixelFormat::Xbgr8888 => 4,
        }
    }

    /// Writes `color` into `out`, which must hold at least `bytes_per_pixel` bytes.
    pub fn encode(self, color: Color, out: &mut [u8]) {
        match self {
            PixelFormat::Rgb565 => {
                out[..2].copy_from_slice(&color.to_rgb565().to_le_bytes());
            }
            PixelFormat::Rgb888 => {
                out[0] = color.red();
                out[1] = color.green();
                out[2] = color.blue();
            }
            PixelFormat::Bgr888 => {
                out[0] = color.blue();
                out[1] = color.green();
                out[2] = color.red();
            }
            PixelFormat::Xrgb8888 => {
                out[0] = color.blue();
                out[1] = color.green();
                out[2] = color.red();
                out[3] = 0xFF;
            }
            PixelFormat::Xbgr8888 => {
                out[0] = color.red();
                out[1] = color.green();
                out[2] = color.blue();
                out[3] = 0xFF;
            }
        }
    }
}
