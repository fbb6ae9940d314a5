// src/main.rs

//! Demo binary: bring up the configured backend, paint a palette test
//! pattern, poll the pointer for a few seconds, then shut down.
//!
//! Usage: `display-glue [config.json]`. `DISPLAY_BACKEND` overrides the
//! backend named in the file.

use anyhow::Context;
use display_glue::assets::{load_assets, LINE_POINTS};
use display_glue::clock::format_local_time;
use display_glue::display::Area;
use display_glue::{make_color, Color, Config, Palette};
use log::{debug, info};
use std::path::PathBuf;
use std::time::{Duration, Instant};

const POLL_DURATION: Duration = Duration::from_secs(3);
const POLL_INTERVAL: Duration = Duration::from_millis(20);

fn main() -> anyhow::Result<()> {
    // Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = Config::load_or_default(config_path.as_deref())
        .context("Failed to load configuration")?;

    let assets = load_assets(config.assets_dir.as_deref()).context("Failed to load assets")?;
    debug!("Assets: {:?}", assets.names().collect::<Vec<_>>());

    let registration =
        display_glue::initialize_backend(&config).context("Failed to initialize display backend")?;
    let screen = display_glue::active_screen()?;
    info!(
        "Started {} backend at {} - screen {} on display {}",
        registration.backend,
        format_local_time("%D %H:%M").unwrap_or_default(),
        screen.screen.raw(),
        screen.display.raw()
    );

    let width = registration.metrics.width_px;
    let height = registration.metrics.height_px;
    display_glue::with_registry(|registry| -> anyhow::Result<()> {
        let band_width = (width / Palette::ALL.len() as u32).max(1);
        for (i, palette) in Palette::ALL.iter().enumerate() {
            let x1 = i as u32 * band_width;
            if x1 >= width {
                break;
            }
            let area = Area::new(x1 as i32, 0, (x1 + band_width - 1) as i32, height as i32 - 1);
            let pixels = vec![palette.main(); area.pixel_count()];
            registry.flush(registration.display, &area, &pixels)?;
        }
        let marker = make_color(255, 255, 255);
        for point in LINE_POINTS {
            let area = Area::new(point.x as i32, point.y as i32, point.x as i32, point.y as i32);
            registry.flush(registration.display, &area, &[marker])?;
        }
        Ok(())
    })
    .context("Failed to paint test pattern")?;

    if registration.input.is_some() {
        let deadline = Instant::now() + POLL_DURATION;
        let mut last = None;
        while Instant::now() < deadline {
            for (id, state) in display_glue::with_registry(|registry| registry.poll_inputs()) {
                if last != Some(state) {
                    info!(
                        "Input {}: ({}, {}) {}",
                        id.raw(),
                        state.x,
                        state.y,
                        if state.pressed { "pressed" } else { "released" }
                    );
                    last = Some(state);
                }
                if state.pressed {
                    paint_cursor(registration.display, state.x, state.y)?;
                }
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    display_glue::shutdown().context("Failed to shut down display backend")?;
    info!("Exiting");
    Ok(())
}

fn paint_cursor(display: display_glue::display::DisplayId, x: i32, y: i32) -> anyhow::Result<()> {
    let area = Area::new(x - 1, y - 1, x + 1, y + 1);
    let pixels = [Color::WHITE; 9];
    display_glue::with_registry(|registry| registry.flush(display, &area, &pixels))?;
    Ok(())
}
