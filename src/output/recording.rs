//! Recording surface for unit tests
//!
//! Every call is appended to a shared log so that tests can hand the surface
//! to the translator by value and still inspect what was emitted, in order.

use super::{Key, MouseButton, OutputError, OutputSurface, Point};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceAction {
    KeyDown(String),
    KeyUp(String),
    MouseMove(Point),
    Wheel(i32),
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    log: Arc<Mutex<Vec<SurfaceAction>>>,
    /// Fixed pointer position reported by `mouse_position`
    pub position: Point,
    /// When set, every call fails with `OutputError::Surface`
    pub should_fail: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(position: Point) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Handle onto the shared action log
    pub fn log(&self) -> Arc<Mutex<Vec<SurfaceAction>>> {
        Arc::clone(&self.log)
    }

    pub fn actions(&self) -> Vec<SurfaceAction> {
        self.log.lock().unwrap().clone()
    }

    fn record(&mut self, action: SurfaceAction) -> Result<(), OutputError> {
        if self.should_fail {
            return Err(OutputError::Surface("mock failure".into()));
        }
        self.log.lock().unwrap().push(action);
        Ok(())
    }
}

impl OutputSurface for RecordingSurface {
    fn press_key(&mut self, key: &Key) -> Result<(), OutputError> {
        self.record(SurfaceAction::KeyDown(key.name().to_string()))
    }

    fn release_key(&mut self, key: &Key) -> Result<(), OutputError> {
        self.record(SurfaceAction::KeyUp(key.name().to_string()))
    }

    fn mouse_position(&mut self) -> Result<Point, OutputError> {
        if self.should_fail {
            return Err(OutputError::Surface("mock failure".into()));
        }
        Ok(self.position)
    }

    fn move_mouse(&mut self, target: Point) -> Result<(), OutputError> {
        self.record(SurfaceAction::MouseMove(target))
    }

    fn scroll_wheel(&mut self, amount: i32) -> Result<(), OutputError> {
        self.record(SurfaceAction::Wheel(amount))
    }

    fn press_mouse_button(&mut self, button: MouseButton) -> Result<(), OutputError> {
        self.record(SurfaceAction::ButtonDown(button))
    }

    fn release_mouse_button(&mut self, button: MouseButton) -> Result<(), OutputError> {
        self.record(SurfaceAction::ButtonUp(button))
    }
}
