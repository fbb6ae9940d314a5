// src/display/registry/tests.rs

use super::*;
use crate::display::driver::{FlushSink, PointerSource};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use test_log::test;

type FlushLog = Arc<Mutex<Vec<(Area, Vec<Color>)>>>;

struct RecordingSink {
    log: FlushLog,
}

impl FlushSink for RecordingSink {
    fn flush(&mut self, area: &Area, pixels: &[Color]) -> Result<(), DisplayError> {
        self.log.lock().unwrap().push((*area, pixels.to_vec()));
        Ok(())
    }
}

struct ScriptedPointer {
    script: VecDeque<Result<PointerState, DisplayError>>,
}

impl PointerSource for ScriptedPointer {
    fn read(&mut self) -> Result<PointerState, DisplayError> {
        self.script
            .pop_front()
            .unwrap_or(Ok(PointerState::default()))
    }
}

fn display(width: u32, height: u32) -> (DisplayDriver, FlushLog) {
    let log: FlushLog = Arc::new(Mutex::new(Vec::new()));
    let sink = RecordingSink { log: log.clone() };
    (DisplayDriver::new(width, height, 10, Box::new(sink)), log)
}

#[test]
fn first_display_becomes_default_with_an_active_screen() {
    let mut registry = Registry::new();
    assert!(registry.default_active_screen().is_none());

    let (driver, _) = display(320, 240);
    let id = registry.register_display(driver);

    assert_eq!(registry.default_display(), Some(id));
    let screen = registry.default_active_screen().unwrap();
    assert_eq!(screen.display, id);
    assert_eq!(registry.draw_buffer_len(id), Some(320 * 240 / 10));
}

#[test]
fn second_display_does_not_steal_default() {
    let mut registry = Registry::new();
    let (a, _) = display(10, 10);
    let (b, _) = display(20, 20);
    let first = registry.register_display(a);
    let second = registry.register_display(b);
    assert_eq!(registry.default_display(), Some(first));

    registry.unregister_display(first).unwrap();
    assert_eq!(registry.default_display(), Some(second));
}

#[test]
fn input_without_display_is_a_precondition_violation() {
    let mut registry = Registry::new();
    let pointer = ScriptedPointer {
        script: VecDeque::new(),
    };
    let err = registry
        .register_input(InputDriver::pointer(Box::new(pointer)))
        .unwrap_err();
    assert!(matches!(err, DisplayError::PreconditionViolation(_)));
    assert_eq!(registry.input_count(), 0);
}

#[test]
fn unregistering_display_drops_bound_inputs() {
    let mut registry = Registry::new();
    let (driver, _) = display(10, 10);
    let id = registry.register_display(driver);
    let pointer = ScriptedPointer {
        script: VecDeque::new(),
    };
    registry
        .register_input(InputDriver::pointer(Box::new(pointer)))
        .unwrap();

    registry.unregister_display(id).unwrap();
    assert_eq!(registry.input_count(), 0);
    assert_eq!(registry.display_count(), 0);
    assert!(registry.default_display().is_none());
    assert!(matches!(
        registry.unregister_display(id),
        Err(DisplayError::UnknownDisplay(_))
    ));
}

#[test]
fn load_screen_switches_active_screen() {
    let mut registry = Registry::new();
    let (driver, _) = display(10, 10);
    let id = registry.register_display(driver);
    let initial = registry.active_screen(id).unwrap();

    let created = registry.create_screen(id).unwrap();
    assert_eq!(registry.active_screen(id), Some(initial));

    registry.load_screen(created).unwrap();
    assert_eq!(registry.active_screen(id), Some(created));
}

#[test]
fn load_screen_rejects_foreign_screen() {
    let mut registry = Registry::new();
    let (a, _) = display(10, 10);
    let (b, _) = display(10, 10);
    let first = registry.register_display(a);
    let second = registry.register_display(b);
    let foreign = registry.create_screen(second).unwrap();

    let err = registry
        .load_screen(ScreenHandle {
            display: first,
            screen: foreign.screen,
        })
        .unwrap_err();
    assert!(matches!(err, DisplayError::PreconditionViolation(_)));
}

#[test]
fn flush_forwards_in_bounds_area_unchanged() {
    let mut registry = Registry::new();
    let (driver, log) = display(8, 8);
    let id = registry.register_display(driver);

    let area = Area::new(1, 1, 2, 2);
    let pixels = vec![Palette::Green.main(); 4];
    registry.flush(id, &area, &pixels).unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].0, area);
    assert_eq!(log[0].1, pixels);
}

#[test]
fn flush_rejects_size_mismatch() {
    let mut registry = Registry::new();
    let (driver, log) = display(8, 8);
    let id = registry.register_display(driver);

    let err = registry
        .flush(id, &Area::new(0, 0, 3, 3), &[Color::WHITE; 3])
        .unwrap_err();
    assert!(matches!(err, DisplayError::InvalidFlush(_)));
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn flush_clips_partially_visible_area() {
    let mut registry = Registry::new();
    let (driver, log) = display(4, 4);
    let id = registry.register_display(driver);

    // 3x2 area hanging off the right edge; only column x=3 is visible.
    let area = Area::new(2, 0, 4, 1);
    let pixels: Vec<Color> = (0..6u8).map(|v| Color::rgb(v, 0, 0)).collect();
    registry.flush(id, &area, &pixels).unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log[0].0, Area::new(2, 0, 3, 1));
    let reds: Vec<u8> = log[0].1.iter().map(|c| c.red()).collect();
    assert_eq!(reds, vec![0, 1, 3, 4]);
}

#[test]
fn flush_fully_off_screen_is_a_no_op() {
    let mut registry = Registry::new();
    let (driver, log) = display(4, 4);
    let id = registry.register_display(driver);

    registry
        .flush(id, &Area::new(10, 10, 10, 10), &[Color::WHITE])
        .unwrap();
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn poll_inputs_keeps_last_state_on_error() {
    let mut registry = Registry::new();
    let (driver, _) = display(100, 100);
    registry.register_display(driver);

    let pressed = PointerState {
        x: 5,
        y: 6,
        pressed: true,
    };
    let pointer = ScriptedPointer {
        script: VecDeque::from(vec![
            Ok(pressed),
            Err(DisplayError::Io(std::io::Error::other("unplugged"))),
        ]),
    };
    let id = registry
        .register_input(InputDriver::pointer(Box::new(pointer)))
        .unwrap();

    assert_eq!(registry.poll_inputs(), vec![(id, pressed)]);
    assert_eq!(registry.poll_inputs(), vec![(id, pressed)]);
    assert_eq!(registry.last_pointer(id), Some(pressed));
}

#[test]
fn theme_defaults_and_updates() {
    let mut registry = Registry::new();
    let (driver, _) = display(10, 10);
    let id = registry.register_display(driver);
    assert_eq!(registry.theme(id), Some(Theme::default()));

    let theme = Theme {
        dark: true,
        ..Theme::default()
    };
    registry.set_theme(id, theme).unwrap();
    assert_eq!(registry.theme(id).map(|t| t.dark), Some(true));
}

#[test]
fn flush_of_extreme_area_is_rejected_without_panicking() {
    let mut registry = Registry::new();
    let (driver, log) = display(5, 5);
    let id = registry.register_display(driver);

    let err = registry
        .flush(id, &Area::new(i32::MIN, 0, i32::MAX, 0), &[])
        .unwrap_err();
    assert!(matches!(err, DisplayError::InvalidFlush(_)));

    registry
        .flush(id, &Area::new(i32::MAX, i32::MAX, i32::MAX, i32::MAX), &[Color::WHITE])
        .unwrap();
    registry
        .flush(id, &Area::new(i32::MIN, i32::MIN, i32::MIN, i32::MIN), &[Color::WHITE])
        .unwrap();
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn input_can_bind_to_a_non_default_display() {
    let mut registry = Registry::new();
    let (first, _) = display(10, 10);
    let (second, _) = display(20, 20);
    let first = registry.register_display(first);
    let second = registry.register_display(second);
    let pointer = ScriptedPointer {
        script: VecDeque::new(),
    };

    let input = registry
        .register_input_for(second, InputDriver::pointer(Box::new(pointer)))
        .unwrap();
    assert_eq!(registry.default_display(), Some(first));
    assert_eq!(registry.input_display(input), Some(second));

    registry.unregister_display(first).unwrap();
    assert_eq!(registry.input_count(), 1);
    registry.unregister_display(second).unwrap();
    assert_eq!(registry.input_count(), 0);

    let pointer = ScriptedPointer {
        script: VecDeque::new(),
    };
    assert!(matches!(
        registry.register_input_for(second, InputDriver::pointer(Box::new(pointer))),
        Err(DisplayError::UnknownDisplay(_))
    ));
}
