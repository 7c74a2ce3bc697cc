//! Command variants and their execution policies
//!
//! | Variant        | Fires                                 | Continuous |
//! |----------------|---------------------------------------|------------|
//! | `Keys`         | press on non-zero, release on zero    | no         |
//! | `MouseButton`  | press on non-zero, release on zero    | no         |
//! | `MouseMove`    | every call above `delta`              | yes        |
//! | `MouseWheel`   | once per crossing above `delta`       | no         |
//!
//! Conditions such as "already pressed" or "below threshold" are silent
//! no-ops. Only the output surface can make `execute` fail.

use crate::mapping::mapping_config::{ActionConfig, MouseAxis};
use crate::output::{Key, MouseButton, OutputError, OutputSurface, Point};
use tracing::debug;

/// One state of a key toggle, with the index of its successor
#[derive(Clone, Debug, PartialEq)]
struct KeyState {
    keys: Vec<Key>,
    next: usize,
}

/// Holds keys while the input is non-zero
///
/// With several states the toggle cycles: every release advances to the
/// successor of the state whose keys were held.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyToggle {
    states: Vec<KeyState>,
    current: usize,
    /// Keys currently held, in press order
    pressed: Vec<Key>,
    combo: bool,
}

impl KeyToggle {
    pub fn new(keys: Vec<Key>, combo: bool) -> Self {
        Self {
            states: vec![KeyState { keys, next: 0 }],
            current: 0,
            pressed: Vec::new(),
            combo,
        }
    }

    /// Builds a cycling toggle from `(keys, next index)` pairs
    fn cycling(states: Vec<(Vec<Key>, usize)>, combo: bool) -> Self {
        Self {
            states: states
                .into_iter()
                .map(|(keys, next)| KeyState { keys, next })
                .collect(),
            current: 0,
            pressed: Vec::new(),
            combo,
        }
    }

    pub fn current_state(&self) -> usize {
        self.current
    }

    pub fn is_pressed(&self) -> bool {
        !self.pressed.is_empty()
    }

    fn execute(&mut self, surface: &mut dyn OutputSurface, value: f32) -> Result<(), OutputError> {
        if value != 0.0 {
            let Some(state) = self.states.get(self.current) else {
                return Ok(());
            };
            for key in &state.keys {
                if !self.pressed.contains(key) {
                    surface.press_key(key)?;
                    self.pressed.push(key.clone());
                }
            }
            return Ok(());
        }

        if self.pressed.is_empty() {
            return Ok(());
        }
        let mut held = std::mem::take(&mut self.pressed);
        if self.combo {
            held.reverse();
        }
        for key in &held {
            surface.release_key(key)?;
        }
        if let Some(state) = self.states.get(self.current) {
            if state.next != self.current {
                debug!("Key toggle advancing state {} -> {}", self.current, state.next);
            }
            self.current = state.next;
        }
        Ok(())
    }
}

/// Holds a mouse button while the input is non-zero
#[derive(Clone, Debug, PartialEq)]
pub struct MouseButtonToggle {
    button: MouseButton,
    pressed: bool,
}

impl MouseButtonToggle {
    pub fn new(button: MouseButton) -> Self {
        Self {
            button,
            pressed: false,
        }
    }

    fn execute(&mut self, surface: &mut dyn OutputSurface, value: f32) -> Result<(), OutputError> {
        if value != 0.0 {
            if !self.pressed {
                surface.press_mouse_button(self.button)?;
                self.pressed = true;
            }
        } else if self.pressed {
            surface.release_mouse_button(self.button)?;
            self.pressed = false;
        }
        Ok(())
    }
}

/// Moves the pointer along one axis by `round(value * max_move)` per call
#[derive(Clone, Debug, PartialEq)]
pub struct MouseMove {
    axis: MouseAxis,
    max_move: i32,
    delta: f32,
}

impl MouseMove {
    pub fn new(axis: MouseAxis, max_move: i32, delta: f32) -> Self {
        Self {
            axis,
            max_move,
            delta,
        }
    }

    fn execute(&mut self, surface: &mut dyn OutputSurface, value: f32) -> Result<(), OutputError> {
        if value.abs() < self.delta {
            return Ok(());
        }
        let base = surface.mouse_position()?;
        let offset = (value * self.max_move as f32).round() as i32;
        let target = match self.axis {
            MouseAxis::X => Point::new(base.x.saturating_add(offset), base.y),
            MouseAxis::Y => Point::new(base.x, base.y.saturating_add(offset)),
        };
        surface.move_mouse(target)
    }
}

/// Scrolls `sign(value) * max_move` once per crossing above `delta`
///
/// A hysteresis latch: after firing, further values above `delta` with the
/// same sign do nothing until a value at or below `delta` re-arms it. A sign
/// change above `delta` is a new crossing.
#[derive(Clone, Debug, PartialEq)]
pub struct MouseWheel {
    max_move: i32,
    delta: f32,
    /// Sign of the last fired scroll while the latch is closed
    latched: Option<i32>,
}

impl MouseWheel {
    pub fn new(max_move: i32, delta: f32) -> Self {
        Self {
            max_move,
            delta,
            latched: None,
        }
    }

    fn execute(&mut self, surface: &mut dyn OutputSurface, value: f32) -> Result<(), OutputError> {
        if value.abs() <= self.delta {
            self.latched = None;
            return Ok(());
        }
        let sign = if value < 0.0 { -1 } else { 1 };
        if self.latched == Some(sign) {
            return Ok(());
        }
        surface.scroll_wheel(sign * self.max_move)?;
        self.latched = Some(sign);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Keys(KeyToggle),
    MouseButton(MouseButtonToggle),
    MouseMove(MouseMove),
    MouseWheel(MouseWheel),
}

impl Command {
    /// Builds the runtime command for a validated action
    pub fn from_action(action: &ActionConfig) -> Self {
        match action {
            ActionConfig::Keys { keys, combo } => Command::Keys(KeyToggle::new(keys.clone(), *combo)),
            ActionConfig::States { states, combo } => {
                let resolved = states
                    .iter()
                    .enumerate()
                    .map(|(index, state)| {
                        let next = match &state.next {
                            Some(id) => states.iter().position(|s| &s.id == id).unwrap_or(index),
                            None => (index + 1) % states.len(),
                        };
                        (state.keys.clone(), next)
                    })
                    .collect();
                Command::Keys(KeyToggle::cycling(resolved, *combo))
            }
            ActionConfig::MouseButton { button } => {
                Command::MouseButton(MouseButtonToggle::new(*button))
            }
            ActionConfig::MouseMove {
                axis,
                max_move,
                delta,
            } => Command::MouseMove(MouseMove::new(*axis, *max_move, *delta)),
            ActionConfig::MouseWheel { max_move, delta } => {
                Command::MouseWheel(MouseWheel::new(*max_move, *delta))
            }
        }
    }

    /// Whether the command must be re-executed every tick while held
    pub fn is_continuous(&self) -> bool {
        matches!(self, Command::MouseMove(_))
    }

    pub fn execute(&mut self, surface: &mut dyn OutputSurface, value: f32) -> Result<(), OutputError> {
        match self {
            Command::Keys(toggle) => toggle.execute(surface, value),
            Command::MouseButton(toggle) => toggle.execute(surface, value),
            Command::MouseMove(mouse_move) => mouse_move.execute(surface, value),
            Command::MouseWheel(wheel) => wheel.execute(surface, value),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Command::Keys(_) => "keys",
            Command::MouseButton(_) => "mouse_button",
            Command::MouseMove(_) => "mouse_move",
            Command::MouseWheel(_) => "mouse_wheel",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::recording::{RecordingSurface, SurfaceAction};

    fn keys(names: &[&str]) -> Vec<Key> {
        names.iter().map(|n| Key::new(n).unwrap()).collect()
    }

    fn run(command: &mut Command, surface: &mut RecordingSurface, values: &[f32]) {
        for value in values {
            command.execute(surface, *value).unwrap();
        }
    }

    #[test]
    fn wheel_fires_once_while_above_delta() {
        let mut surface = RecordingSurface::new();
        let mut wheel = Command::MouseWheel(MouseWheel::new(100, 0.5));

        run(&mut wheel, &mut surface, &[0.7, 0.6]);

        assert_eq!(surface.actions(), vec![SurfaceAction::Wheel(100)]);
    }

    #[test]
    fn wheel_rearms_after_dropping_below_delta() {
        let mut surface = RecordingSurface::new();
        let mut wheel = Command::MouseWheel(MouseWheel::new(100, 0.5));

        run(&mut wheel, &mut surface, &[0.7, 0.3, 0.8]);

        assert_eq!(
            surface.actions(),
            vec![SurfaceAction::Wheel(100), SurfaceAction::Wheel(100)]
        );
    }

    #[test]
    fn wheel_ignores_values_at_the_boundary() {
        let mut surface = RecordingSurface::new();
        let mut wheel = Command::MouseWheel(MouseWheel::new(100, 0.5));

        run(&mut wheel, &mut surface, &[0.5]);

        assert!(surface.actions().is_empty());
    }

    #[test]
    fn wheel_scrolls_backwards_for_negative_values() {
        let mut surface = RecordingSurface::new();
        let mut wheel = Command::MouseWheel(MouseWheel::new(100, 0.5));

        run(&mut wheel, &mut surface, &[-0.7]);

        assert_eq!(surface.actions(), vec![SurfaceAction::Wheel(-100)]);
    }

    #[test]
    fn wheel_stays_latched_through_a_long_deflection() {
        let mut surface = RecordingSurface::new();
        let mut wheel = Command::MouseWheel(MouseWheel::new(100, 0.5));

        run(&mut wheel, &mut surface, &[0.7, 0.8, 0.8, 0.9, 1.0]);

        assert_eq!(surface.actions(), vec![SurfaceAction::Wheel(100)]);
    }

    #[test]
    fn wheel_fires_again_when_the_sign_flips() {
        let mut surface = RecordingSurface::new();
        let mut wheel = Command::MouseWheel(MouseWheel::new(3, 0.5));

        run(&mut wheel, &mut surface, &[0.9, -0.9]);

        assert_eq!(
            surface.actions(),
            vec![SurfaceAction::Wheel(3), SurfaceAction::Wheel(-3)]
        );
    }

    #[test]
    fn mouse_move_y() {
        let mut surface = RecordingSurface::at(Point::new(30, 60));
        let mut command = Command::MouseMove(MouseMove::new(MouseAxis::Y, 10, 0.0));

        run(&mut command, &mut surface, &[1.0]);

        assert_eq!(surface.actions(), vec![SurfaceAction::MouseMove(Point::new(30, 70))]);
    }

    #[test]
    fn mouse_move_x() {
        let mut surface = RecordingSurface::at(Point::new(30, 60));
        let mut command = Command::MouseMove(MouseMove::new(MouseAxis::X, 10, 0.0));

        run(&mut command, &mut surface, &[1.0]);

        assert_eq!(surface.actions(), vec![SurfaceAction::MouseMove(Point::new(40, 60))]);
    }

    #[test]
    fn mouse_move_rounds_partial_deflection() {
        let mut surface = RecordingSurface::at(Point::new(30, 60));
        let mut command = Command::MouseMove(MouseMove::new(MouseAxis::X, 10, 0.0));

        run(&mut command, &mut surface, &[-0.36]);

        assert_eq!(surface.actions(), vec![SurfaceAction::MouseMove(Point::new(26, 60))]);
    }

    #[test]
    fn mouse_move_saturates_at_the_coordinate_limit() {
        let mut surface = RecordingSurface::at(Point::new(960, -540));
        let mut x = Command::MouseMove(MouseMove::new(MouseAxis::X, i32::MAX, 0.0));
        let mut y = Command::MouseMove(MouseMove::new(MouseAxis::Y, i32::MAX, 0.0));

        run(&mut x, &mut surface, &[1.0]);
        run(&mut y, &mut surface, &[-1.0]);

        assert_eq!(
            surface.actions(),
            vec![
                SurfaceAction::MouseMove(Point::new(i32::MAX, -540)),
                SurfaceAction::MouseMove(Point::new(960, i32::MIN)),
            ]
        );
    }

    #[test]
    fn mouse_move_below_delta_does_nothing() {
        let mut surface = RecordingSurface::at(Point::new(30, 60));
        let mut command = Command::MouseMove(MouseMove::new(MouseAxis::Y, 10, 0.7));

        run(&mut command, &mut surface, &[0.6]);

        assert!(surface.actions().is_empty());
    }

    #[test]
    fn key_toggle_presses_once_while_held() {
        let mut surface = RecordingSurface::new();
        let mut command = Command::Keys(KeyToggle::new(keys(&["a"]), false));

        run(&mut command, &mut surface, &[1.0, 1.0, 0.0]);

        assert_eq!(
            surface.actions(),
            vec![
                SurfaceAction::KeyDown("a".into()),
                SurfaceAction::KeyUp("a".into())
            ]
        );
    }

    #[test]
    fn key_toggle_release_without_press_is_silent() {
        let mut surface = RecordingSurface::new();
        let mut command = Command::Keys(KeyToggle::new(keys(&["a"]), false));

        run(&mut command, &mut surface, &[0.0, 0.0]);

        assert!(surface.actions().is_empty());
    }

    #[test]
    fn plain_toggle_releases_in_declared_order() {
        let mut surface = RecordingSurface::new();
        let mut command = Command::Keys(KeyToggle::new(keys(&["up", "left"]), false));

        run(&mut command, &mut surface, &[1.0, 0.0]);

        assert_eq!(
            surface.actions(),
            vec![
                SurfaceAction::KeyDown("up".into()),
                SurfaceAction::KeyDown("left".into()),
                SurfaceAction::KeyUp("up".into()),
                SurfaceAction::KeyUp("left".into()),
            ]
        );
    }

    #[test]
    fn combo_releases_in_reverse_order() {
        let mut surface = RecordingSurface::new();
        let mut command = Command::Keys(KeyToggle::new(keys(&["ctrl", "alt", "t"]), true));

        run(&mut command, &mut surface, &[1.0, 0.0]);

        assert_eq!(
            surface.actions(),
            vec![
                SurfaceAction::KeyDown("ctrl".into()),
                SurfaceAction::KeyDown("alt".into()),
                SurfaceAction::KeyDown("t".into()),
                SurfaceAction::KeyUp("t".into()),
                SurfaceAction::KeyUp("alt".into()),
                SurfaceAction::KeyUp("ctrl".into()),
            ]
        );
    }

    #[test]
    fn cycling_toggle_advances_on_release() {
        let action = ActionConfig::States {
            combo: false,
            states: vec![
                crate::mapping::mapping_config::StateConfig {
                    id: "one".into(),
                    keys: keys(&["1"]),
                    next: None,
                },
                crate::mapping::mapping_config::StateConfig {
                    id: "two".into(),
                    keys: keys(&["2"]),
                    next: Some("one".into()),
                },
            ],
        };
        let mut surface = RecordingSurface::new();
        let Command::Keys(mut toggle) = Command::from_action(&action) else {
            panic!("states should build a key toggle");
        };

        assert_eq!(toggle.current_state(), 0);
        toggle.execute(&mut surface, 1.0).unwrap();
        assert!(toggle.is_pressed());
        assert_eq!(toggle.current_state(), 0);
        toggle.execute(&mut surface, 0.0).unwrap();
        assert!(!toggle.is_pressed());
        assert_eq!(toggle.current_state(), 1);

        let mut command = Command::Keys(toggle);
        run(&mut command, &mut surface, &[1.0, 0.0, 1.0, 0.0]);

        assert_eq!(
            surface.actions(),
            vec![
                SurfaceAction::KeyDown("1".into()),
                SurfaceAction::KeyUp("1".into()),
                SurfaceAction::KeyDown("2".into()),
                SurfaceAction::KeyUp("2".into()),
                SurfaceAction::KeyDown("1".into()),
                SurfaceAction::KeyUp("1".into()),
            ]
        );
    }

    #[test]
    fn mouse_button_latches() {
        let mut surface = RecordingSurface::new();
        let mut command = Command::MouseButton(MouseButtonToggle::new(MouseButton::Left));

        run(&mut command, &mut surface, &[1.0, 0.5, 0.0, 0.0]);

        assert_eq!(
            surface.actions(),
            vec![
                SurfaceAction::ButtonDown(MouseButton::Left),
                SurfaceAction::ButtonUp(MouseButton::Left)
            ]
        );
    }

    #[test]
    fn only_mouse_move_is_continuous() {
        assert!(Command::MouseMove(MouseMove::new(MouseAxis::X, 1, 0.0)).is_continuous());
        assert!(!Command::MouseWheel(MouseWheel::new(1, 0.5)).is_continuous());
        assert!(!Command::Keys(KeyToggle::new(keys(&["a"]), false)).is_continuous());
        assert!(!Command::MouseButton(MouseButtonToggle::new(MouseButton::Right)).is_continuous());
    }

    #[test]
    fn surface_errors_are_returned() {
        let mut surface = RecordingSurface::new();
        surface.should_fail = true;
        let mut command = Command::Keys(KeyToggle::new(keys(&["a"]), false));

        assert!(command.execute(&mut surface, 1.0).is_err());
    }
}
