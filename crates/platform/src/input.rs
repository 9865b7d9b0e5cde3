//! Per-frame input context: pressed keys, accumulated mouse/scroll deltas,
//! gamepad snapshots and the frame clock. The event loop feeds events in;
//! the scene drains the state once per frame. No globals.

use std::{collections::HashSet, time::Instant};

use corelib::camera::CameraMove;
use gilrs::{Axis, Button, Gilrs};
use winit::{
    event::{ElementState, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
};

/// Analog magnitudes below this are treated as exactly zero (stick drift).
pub const DEAD_ZONE: f32 = 0.01;

/// Trackpads report pixel scrolling; one wheel line is about this much.
const SCROLL_PIXELS_PER_LINE: f64 = 20.0;

/// Frames longer than this (resize drag, breakpoint) are clamped so the
/// camera does not teleport on the next update.
const MAX_FRAME_DT: f32 = 0.1;

const MOVE_BINDINGS: [(KeyCode, CameraMove); 6] = [
    (KeyCode::KeyW, CameraMove::Forward),
    (KeyCode::KeyS, CameraMove::Backward),
    (KeyCode::KeyA, CameraMove::Left),
    (KeyCode::KeyD, CameraMove::Right),
    (KeyCode::Space, CameraMove::Up),
    (KeyCode::ShiftLeft, CameraMove::Down),
];

/// Keyboard and mouse state between frames. Mouse and scroll deltas
/// accumulate across events and reset when taken.
#[derive(Debug, Default)]
pub struct InputState {
    pressed: HashSet<KeyCode>,
    mouse_delta: (f64, f64),
    scroll_lines: f32,
}

impl InputState {
    pub fn key_event(&mut self, key: PhysicalKey, state: ElementState) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        match state {
            ElementState::Pressed => {
                self.pressed.insert(code);
            }
            ElementState::Released => {
                self.pressed.remove(&code);
            }
        }
    }

    #[inline]
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    /// Camera movement directions for the currently held keys.
    pub fn active_moves(&self) -> impl Iterator<Item = CameraMove> + '_ {
        MOVE_BINDINGS
            .iter()
            .filter(|(key, _)| self.is_pressed(*key))
            .map(|&(_, direction)| direction)
    }

    pub fn add_mouse_delta(&mut self, delta: (f64, f64)) {
        self.mouse_delta.0 += delta.0;
        self.mouse_delta.1 += delta.1;
    }

    /// Accumulated mouse motion since the last take; resets to zero.
    pub fn take_mouse_delta(&mut self) -> (f64, f64) {
        std::mem::take(&mut self.mouse_delta)
    }

    pub fn add_scroll(&mut self, delta: MouseScrollDelta) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => (pos.y / SCROLL_PIXELS_PER_LINE) as f32,
        };
        self.scroll_lines += lines;
    }

    /// Accumulated scroll lines since the last take; resets to zero.
    pub fn take_scroll(&mut self) -> f32 {
        std::mem::take(&mut self.scroll_lines)
    }
}

/// One frame of stick input after dead-zone filtering, in the axis
/// convention the camera expects (stick up is negative Y).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PadAxes {
    pub left_x: f32,
    pub left_y: f32,
    pub right_x: f32,
    pub right_y: f32,
}

impl PadAxes {
    /// Zero every axis whose magnitude is below `dead_zone`.
    pub fn filtered(self, dead_zone: f32) -> Self {
        let squelch = |v: f32| if v.abs() < dead_zone { 0.0 } else { v };
        Self {
            left_x: squelch(self.left_x),
            left_y: squelch(self.left_y),
            right_x: squelch(self.right_x),
            right_y: squelch(self.right_y),
        }
    }

    pub fn any_active(&self) -> bool {
        [self.left_x, self.left_y, self.right_x, self.right_y]
            .iter()
            .any(|v| *v != 0.0)
    }
}

/// Gamepad snapshot for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PadInput {
    pub axes: PadAxes,
    pub quit: bool,
}

/// Polls the first active gamepad. Missing gamepad support degrades to a
/// warning at startup; `poll` then always returns the idle snapshot.
pub struct Gamepads {
    gilrs: Option<Gilrs>,
    active: Option<gilrs::GamepadId>,
}

impl Gamepads {
    pub fn new() -> Self {
        let gilrs = match Gilrs::new() {
            Ok(gilrs) => {
                for (_, pad) in gilrs.gamepads() {
                    log::info!("Gamepad connected: {}", pad.name());
                }
                Some(gilrs)
            }
            Err(err) => {
                log::warn!("Gamepad support unavailable: {err}");
                None
            }
        };
        Self {
            gilrs,
            active: None,
        }
    }

    /// Drain pending gamepad events and snapshot the active pad's sticks
    /// and quit button.
    pub fn poll(&mut self) -> PadInput {
        let Some(gilrs) = self.gilrs.as_mut() else {
            return PadInput::default();
        };
        while let Some(event) = gilrs.next_event() {
            self.active = Some(event.id);
        }
        let Some(id) = self.active else {
            return PadInput::default();
        };
        let pad = gilrs.gamepad(id);
        if !pad.is_connected() {
            return PadInput::default();
        }

        // gilrs reports stick up as +1; the camera formulas were tuned
        // against the GLFW convention where up is -1, so Y axes flip here.
        let axes = PadAxes {
            left_x: pad.value(Axis::LeftStickX),
            left_y: -pad.value(Axis::LeftStickY),
            right_x: pad.value(Axis::RightStickX),
            right_y: -pad.value(Axis::RightStickY),
        }
        .filtered(DEAD_ZONE);
        PadInput {
            axes,
            quit: pad.is_pressed(Button::East),
        }
    }
}

/// Wall-clock frame timer.
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Seconds since the previous tick, clamped to [`MAX_FRAME_DT`].
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        dt.min(MAX_FRAME_DT)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn tracks_key_press_and_release() {
        let mut input = InputState::default();
        input.key_event(PhysicalKey::Code(KeyCode::KeyW), ElementState::Pressed);
        assert!(input.is_pressed(KeyCode::KeyW));
        let moves: Vec<_> = input.active_moves().collect();
        assert_eq!(moves, vec![CameraMove::Forward]);

        input.key_event(PhysicalKey::Code(KeyCode::KeyW), ElementState::Released);
        assert!(!input.is_pressed(KeyCode::KeyW));
        assert_eq!(input.active_moves().count(), 0);
    }

    #[test]
    fn simultaneous_keys_yield_all_directions() {
        let mut input = InputState::default();
        input.key_event(PhysicalKey::Code(KeyCode::KeyW), ElementState::Pressed);
        input.key_event(PhysicalKey::Code(KeyCode::KeyD), ElementState::Pressed);
        input.key_event(PhysicalKey::Code(KeyCode::ShiftLeft), ElementState::Pressed);
        let moves: Vec<_> = input.active_moves().collect();
        assert_eq!(
            moves,
            vec![CameraMove::Forward, CameraMove::Right, CameraMove::Down]
        );
    }

    #[test]
    fn mouse_deltas_accumulate_until_taken() {
        let mut input = InputState::default();
        input.add_mouse_delta((3.0, -1.0));
        input.add_mouse_delta((2.0, 4.0));
        assert_eq!(input.take_mouse_delta(), (5.0, 3.0));
        assert_eq!(input.take_mouse_delta(), (0.0, 0.0));
    }

    #[test]
    fn scroll_lines_accumulate_and_reset() {
        let mut input = InputState::default();
        input.add_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        input.add_scroll(MouseScrollDelta::LineDelta(0.0, -3.0));
        assert_eq!(input.take_scroll(), -2.0);
        assert_eq!(input.take_scroll(), 0.0);
    }

    #[test]
    fn pixel_scroll_converts_to_lines() {
        let mut input = InputState::default();
        input.add_scroll(MouseScrollDelta::PixelDelta(PhysicalPosition::new(
            0.0, 40.0,
        )));
        assert!((input.take_scroll() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn dead_zone_squelches_drift() {
        let axes = PadAxes {
            left_x: 0.009,
            left_y: -0.0099,
            right_x: 0.01,
            right_y: -0.6,
        };
        let filtered = axes.filtered(DEAD_ZONE);
        assert_eq!(filtered.left_x, 0.0);
        assert_eq!(filtered.left_y, 0.0);
        assert_eq!(filtered.right_x, 0.01);
        assert_eq!(filtered.right_y, -0.6);
        assert!(filtered.any_active());
        assert!(!PadAxes::default().any_active());
    }

    #[test]
    fn frame_clock_dt_is_small_and_positive() {
        let mut clock = FrameClock::new();
        let dt = clock.tick();
        assert!(dt >= 0.0);
        assert!(dt <= MAX_FRAME_DT);
    }
}
