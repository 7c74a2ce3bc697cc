//! Virtual desktop that logs every synthetic action
//!
//! Keeps its own pointer position clamped to the configured screen bounds and
//! the set of keys and mouse buttons currently held, so repeated presses and
//! stray releases show up in the log.

use super::{Key, MouseButton, OutputError, OutputSurface, Point};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Screen bounds of the virtual desktop
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

// Screen sizes beyond i32 are capped to the largest coordinate
fn pixels(size: u32) -> i32 {
    i32::try_from(size).unwrap_or(i32::MAX)
}

#[derive(Debug)]
pub struct TracingSurface {
    screen: ScreenConfig,
    cursor: Point,
    held_keys: HashSet<Key>,
    held_buttons: HashSet<MouseButton>,
}

impl TracingSurface {
    /// Creates a surface with the pointer in the middle of the screen
    pub fn new(screen: ScreenConfig) -> Self {
        let cursor = Point::new(pixels(screen.width) / 2, pixels(screen.height) / 2);
        info!(
            "Virtual desktop {}x{} ready, pointer at {}",
            screen.width, screen.height, cursor
        );
        Self {
            screen,
            cursor,
            held_keys: HashSet::new(),
            held_buttons: HashSet::new(),
        }
    }

    fn clamp(&self, point: Point) -> Point {
        let max_x = pixels(self.screen.width.saturating_sub(1));
        let max_y = pixels(self.screen.height.saturating_sub(1));
        Point::new(point.x.clamp(0, max_x), point.y.clamp(0, max_y))
    }
}

impl OutputSurface for TracingSurface {
    fn press_key(&mut self, key: &Key) -> Result<(), OutputError> {
        if !self.held_keys.insert(key.clone()) {
            warn!("Key {} pressed while already held", key);
        }
        info!("Key down: {}", key);
        Ok(())
    }

    fn release_key(&mut self, key: &Key) -> Result<(), OutputError> {
        if !self.held_keys.remove(key) {
            debug!("Key {} released without a matching press", key);
        }
        info!("Key up: {}", key);
        Ok(())
    }

    fn mouse_position(&mut self) -> Result<Point, OutputError> {
        Ok(self.cursor)
    }

    fn move_mouse(&mut self, target: Point) -> Result<(), OutputError> {
        let clamped = self.clamp(target);
        if clamped != target {
            debug!("Pointer target {} clamped to {}", target, clamped);
        }
        if clamped != self.cursor {
            debug!("Pointer: {} -> {}", self.cursor, clamped);
        }
        self.cursor = clamped;
        Ok(())
    }

    fn scroll_wheel(&mut self, amount: i32) -> Result<(), OutputError> {
        info!("Wheel: {:+}", amount);
        Ok(())
    }

    fn press_mouse_button(&mut self, button: MouseButton) -> Result<(), OutputError> {
        self.held_buttons.insert(button);
        info!("Mouse button down: {:?} at {}", button, self.cursor);
        Ok(())
    }

    fn release_mouse_button(&mut self, button: MouseButton) -> Result<(), OutputError> {
        self.held_buttons.remove(&button);
        info!("Mouse button up: {:?} at {}", button, self.cursor);
        Ok(())
    }
}
