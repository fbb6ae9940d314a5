// src/color.rs

//! Packed color values, the material palette and `make_color`.
//!
//! Colors are stored as `0xAARRGGBB` in a `u32`, the 32-bit layout the
//! registry and every backend work in. Conversion to the device pixel
//! format happens only at flush time (see `display::pixel`).

use serde::{Deserialize, Serialize};

/// A packed 32-bit ARGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(u32);

impl Color {
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);

    /// Builds an opaque color from its channels.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Color(0xFF00_0000 | (red as u32) << 16 | (green as u32) << 8 | blue as u32)
    }

    /// Builds an opaque color from a `0xRRGGBB` literal. The top byte is ignored.
    pub const fn from_hex(hex: u32) -> Self {
        Color(0xFF00_0000 | (hex & 0x00FF_FFFF))
    }

    /// Wraps an already packed `0xAARRGGBB` value.
    pub const fn from_argb(full: u32) -> Self {
        Color(full)
    }

    pub const fn full(self) -> u32 {
        self.0
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Truncates to RGB565 (5 bits red, 6 green, 5 blue).
    pub const fn to_rgb565(self) -> u16 {
        let r = (self.red() >> 3) as u16;
        let g = (self.green() >> 2) as u16;
        let b = (self.blue() >> 3) as u16;
        (r << 11) | (g << 5) | b
    }

    /// Linear mix of two colors; `ratio` 255 yields `self`, 0 yields `other`.
    pub fn mix(self, other: Color, ratio: u8) -> Color {
        let blend = |a: u8, b: u8| -> u8 {
            ((a as u16 * ratio as u16 + b as u16 * (255 - ratio as u16) + 127) / 255) as u8
        };
        Color::rgb(
            blend(self.red(), other.red()),
            blend(self.green(), other.green()),
            blend(self.blue(), other.blue()),
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Pure color constructor; alpha is always fully opaque.
pub fn make_color(red: u8, green: u8, blue: u8) -> Color {
    Color::rgb(red, green, blue)
}

/// Material design main palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    Red,
    Pink,
    Purple,
    DeepPurple,
    Indigo,
    Blue,
    LightBlue,
    Cyan,
    Teal,
    Green,
    LightGreen,
    Lime,
    Yellow,
    Amber,
    Orange,
    DeepOrange,
    Brown,
    BlueGrey,
    Grey,
}

impl Palette {
    pub const ALL: [Palette; 19] = [
        Palette::Red,
        Palette::Pink,
        Palette::Purple,
        Palette::DeepPurple,
        Palette::Indigo,
        Palette::Blue,
        Palette::LightBlue,
        Palette::Cyan,
        Palette::Teal,
        Palette::Green,
        Palette::LightGreen,
        Palette::Lime,
        Palette::Yellow,
        Palette::Amber,
        Palette::Orange,
        Palette::DeepOrange,
        Palette::Brown,
        Palette::BlueGrey,
        Palette::Grey,
    ];

    /// The main (500) shade of the palette entry.
    pub const fn main(self) -> Color {
        let hex = match self {
            Palette::Red => 0xF44336,
            Palette::Pink => 0xE91E63,
            Palette::Purple => 0x9C27B0,
            Palette::DeepPurple => 0x673AB7,
            Palette::Indigo => 0x3F51B5,
            Palette::Blue => 0x2196F3,
            Palette::LightBlue => 0x03A9F4,
            Palette::Cyan => 0x00BCD4,
            Palette::Teal => 0x009688,
            Palette::Green => 0x4CAF50,
            Palette::LightGreen => 0x8BC34A,
            Palette::Lime => 0xCDDC39,
            Palette::Yellow => 0xFFEB3B,
            Palette::Amber => 0xFFC107,
            Palette::Orange => 0xFF9800,
            Palette::DeepOrange => 0xFF5722,
            Palette::Brown => 0x795548,
            Palette::BlueGrey => 0x607D8B,
            Palette::Grey => 0x9E9E9E,
        };
        Color::from_hex(hex)
    }
}
