// src/assets.rs

//! Static assets: the demo line points and opaque image blobs.
//!
//! Blobs are never decoded here. Each regular file in the asset directory
//! becomes one named byte buffer, keyed by its file name.

use anyhow::{Context, Result};
use log::{debug, info};
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i16,
    pub y: i16,
}

/// Points of the demo polyline.
pub const LINE_POINTS: [Point; 5] = [
    Point { x: 5, y: 5 },
    Point { x: 70, y: 70 },
    Point { x: 120, y: 10 },
    Point { x: 180, y: 60 },
    Point { x: 240, y: 10 },
];

/// Named, immutable binary blobs.
#[derive(Debug, Default)]
pub struct Assets {
    blobs: BTreeMap<String, Vec<u8>>,
}

impl Assets {
    /// Reads every regular file directly inside `dir`. Subdirectories are skipped.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut blobs = BTreeMap::new();
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read asset directory {}", dir.display()))?;
        for entry in entries {
            let entry = entry
                .with_context(|| format!("Failed to list asset directory {}", dir.display()))?;
            let path = entry.path();
            if !entry.file_type()?.is_file() {
                debug!("Assets: skipping {}", path.display());
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let bytes = std::fs::read(&path)
                .with_context(|| format!("Failed to read asset {}", path.display()))?;
            debug!("Assets: {} ({} bytes)", name, bytes.len());
            blobs.insert(name, bytes);
        }
        Ok(Self { blobs })
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.blobs.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blobs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

static ASSETS: OnceCell<Assets> = OnceCell::new();

/// Loads the process-wide assets on first success; later calls return the
/// same set and ignore `dir`. A failed load leaves nothing cached.
pub fn load_assets(dir: Option<&Path>) -> Result<&'static Assets> {
    ASSETS.get_or_try_init(|| {
        let assets = match dir {
            Some(dir) => Assets::load_dir(dir)?,
            None => Assets::default(),
        };
        info!("Assets: loaded {} blob(s)", assets.len());
        Ok(assets)
    })
}
