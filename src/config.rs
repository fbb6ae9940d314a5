// src/config.rs

//! Configuration for the display/input backends.
//!
//! The structs deserialize from a JSON file; every field has a default so a
//! partial (or absent) file is fine. The backend family can also be chosen
//! with the `DISPLAY_BACKEND` environment variable, which overrides
//! whatever the file says.

use crate::color::Palette;
use crate::display::{BackendKind, DisplayError};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable selecting the backend family.
pub const BACKEND_ENV_VAR: &str = "DISPLAY_BACKEND";

// --- Top-Level Configuration Structure ---

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Which backend family to bring up.
    pub backend: BackendSelection,
    /// Logical resolution and draw buffer sizing.
    pub display: DisplayConfig,
    /// fbdev/evdev device settings.
    pub framebuffer: FramebufferConfig,
    /// Desktop window settings.
    pub desktop: DesktopConfig,
    /// Theme applied right after registration.
    pub theme: ThemeConfig,
    /// Optional directory of opaque asset blobs.
    pub assets_dir: Option<PathBuf>,
}

// --- Backend Selection ---

/// Mutually exclusive backend switches. Both off selects the headless
/// backend; both on is a misconfiguration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BackendSelection {
    pub framebuffer: bool,
    pub desktop: bool,
}

impl BackendSelection {
    pub fn only(kind: BackendKind) -> Self {
        Self {
            framebuffer: kind == BackendKind::Framebuffer,
            desktop: kind == BackendKind::Desktop,
        }
    }

    pub fn resolve(&self) -> Result<BackendKind, DisplayError> {
        match (self.framebuffer, self.desktop) {
            (true, false) => Ok(BackendKind::Framebuffer),
            (false, true) => Ok(BackendKind::Desktop),
            (false, false) => Ok(BackendKind::None),
            (true, true) => Err(DisplayError::Misconfigured(
                "framebuffer and desktop backends are mutually exclusive".to_string(),
            )),
        }
    }
}

// --- Display Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Horizontal resolution. `None` on the framebuffer backend means
    /// "use the device's native resolution".
    pub hor_res: Option<u32>,
    /// Vertical resolution, same rule as `hor_res`.
    pub ver_res: Option<u32>,
    /// Draw buffer is `hor_res * ver_res / draw_ratio` pixels. Must be >= 1.
    pub draw_ratio: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            hor_res: None,
            ver_res: None,
            draw_ratio: 10,
        }
    }
}

/// Largest resolution per axis; coordinates are `i32`.
pub const MAX_RESOLUTION: u32 = i32::MAX as u32;

/// Resolution used by backends with no native size (desktop, headless).
pub const FALLBACK_RESOLUTION: (u32, u32) = (800, 480);

impl DisplayConfig {
    /// Configured resolution, falling back to `native` per axis.
    pub fn resolution_or(&self, native: (u32, u32)) -> (u32, u32) {
        (self.hor_res.unwrap_or(native.0), self.ver_res.unwrap_or(native.1))
    }
}

// --- Framebuffer Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FramebufferConfig {
    /// fbdev character device.
    pub device: PathBuf,
    /// evdev pointer device. `None` disables pointer input.
    pub input_device: Option<PathBuf>,
    /// Raw axis range reported by the device, mapped onto the resolution.
    pub calibration: Option<Calibration>,
    /// Swap the X and Y axes before calibration.
    pub swap_axes: bool,
}

impl Default for FramebufferConfig {
    fn default() -> Self {
        FramebufferConfig {
            device: PathBuf::from("/dev/fb0"),
            input_device: Some(PathBuf::from("/dev/input/event0")),
            calibration: None,
            swap_axes: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Calibration {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

// --- Desktop Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    /// X display name (e.g. ":0"). `None` uses `$DISPLAY`.
    pub display_name: Option<String>,
    /// Window title.
    pub title: String,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        DesktopConfig {
            display_name: None,
            title: "display-glue".to_string(),
        }
    }
}

// --- Theme Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub primary: Palette,
    pub secondary: Palette,
    pub dark: bool,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        ThemeConfig {
            primary: Palette::Blue,
            secondary: Palette::Red,
            dark: false,
        }
    }
}

impl Config {
    /// Reads a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        info!("Config: loaded {}", path.display());
        Ok(config)
    }

    /// Loads `path` if given, otherwise the defaults, then applies the
    /// `DISPLAY_BACKEND` override.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Ok(value) = std::env::var(BACKEND_ENV_VAR) {
            config.apply_backend_override(&value)?;
        }
        Ok(config)
    }

    /// Replaces the backend selection with the one named by `value`.
    pub fn apply_backend_override(&mut self, value: &str) -> Result<()> {
        let kind: BackendKind = value
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .with_context(|| format!("Invalid {} value", BACKEND_ENV_VAR))?;
        debug!("Config: {} selects the {} backend", BACKEND_ENV_VAR, kind);
        self.backend = BackendSelection::only(kind);
        Ok(())
    }

    pub fn validate(&self) -> Result<(), DisplayError> {
        self.backend.resolve()?;
        if self.display.draw_ratio == 0 {
            return Err(DisplayError::Misconfigured(
                "display.draw_ratio must be at least 1".to_string(),
            ));
        }
        if self.display.hor_res == Some(0) || self.display.ver_res == Some(0) {
            return Err(DisplayError::Misconfigured(
                "display resolution must be non-zero".to_string(),
            ));
        }
        let too_large = |res: Option<u32>| res.is_some_and(|r| r > MAX_RESOLUTION);
        if too_large(self.display.hor_res) || too_large(self.display.ver_res) {
            return Err(DisplayError::Misconfigured(format!(
                "display resolution must be at most {} per axis",
                MAX_RESOLUTION
            )));
        }
        if let Some(cal) = self.framebuffer.calibration {
            if cal.x_min >= cal.x_max || cal.y_min >= cal.y_max {
                return Err(DisplayError::Misconfigured(format!(
                    "empty calibration range {:?}",
                    cal
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_select_headless_backend() {
        let config = Config::default();
        assert_eq!(config.backend.resolve().unwrap(), BackendKind::None);
        assert_eq!(config.framebuffer.device, PathBuf::from("/dev/fb0"));
        assert_eq!(config.display.draw_ratio, 10);
    }

    #[test]
    fn both_backends_is_misconfigured() {
        let selection = BackendSelection {
            framebuffer: true,
            desktop: true,
        };
        assert!(matches!(
            selection.resolve(),
            Err(DisplayError::Misconfigured(_))
        ));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: Config = serde_json::from_str(
            r#"{ "backend": { "framebuffer": true }, "display": { "hor_res": 480 } }"#,
        )
        .unwrap();
        assert_eq!(config.backend.resolve().unwrap(), BackendKind::Framebuffer);
        assert_eq!(config.display.resolution_or((1024, 600)), (480, 600));
        assert_eq!(config.desktop.title, "display-glue");
    }

    #[test]
    fn override_replaces_selection() {
        let mut config = Config::default();
        config.backend.framebuffer = true;
        config.apply_backend_override("desktop").unwrap();
        assert_eq!(config.backend.resolve().unwrap(), BackendKind::Desktop);
        assert!(config.apply_backend_override("gtk").is_err());
    }

    #[test]
    fn validate_rejects_zero_draw_ratio_and_bad_calibration() {
        let mut config = Config::default();
        config.display.draw_ratio = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.framebuffer.calibration = Some(Calibration {
            x_min: 100,
            x_max: 100,
            y_min: 0,
            y_max: 10,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_resolution_outside_coordinate_range() {
        let mut config = Config::default();
        config.display.hor_res = Some(MAX_RESOLUTION);
        assert!(config.validate().is_ok());

        config.display.ver_res = Some(MAX_RESOLUTION + 1);
        assert!(matches!(
            config.validate(),
            Err(DisplayError::Misconfigured(_))
        ));
    }

    #[test]
    fn load_reads_file_and_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        std::fs::File::create(&good)
            .unwrap()
            .write_all(br#"{ "theme": { "primary": "teal", "dark": true } }"#)
            .unwrap();
        let config = Config::load(&good).unwrap();
        assert_eq!(config.theme.primary, Palette::Teal);
        assert!(config.theme.dark);

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        let err = Config::load(&bad).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse"));
    }
}
