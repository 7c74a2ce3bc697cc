//! Output surface for synthetic keyboard and mouse actions
//!
//! Commands never talk to the desktop directly. They go through an
//! [`OutputSurface`], which keeps the mapping engine independent of how
//! key presses and pointer motion are realised on the host.
//!
//! ```text
//! Command ──► OutputSurface ──► (virtual desktop | recorder | OS backend)
//! ```

pub mod tracing_surface;

#[cfg(test)]
pub mod recording;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use tracing_surface::{ScreenConfig, TracingSurface};

/// Errors raised by an output surface
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OutputError {
    #[error("Invalid key name: {0:?}")]
    InvalidKey(String),

    #[error("Surface failure: {0}")]
    Surface(String),
}

/// Screen position in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Keyboard key, identified by its lowercase name (`"enter"`, `"a"`, `"f5"`)
///
/// Names are normalised on construction so that `"Enter"` and `"enter"` refer
/// to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key(String);

impl Key {
    pub fn new(name: &str) -> Result<Self, OutputError> {
        let name = name.trim();
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(OutputError::InvalidKey(name.to_string()));
        }
        Ok(Self(name.to_ascii_lowercase()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Key {
    type Error = OutputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Key::new(&value)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Sink for synthetic input
///
/// All calls are synchronous and expected to return quickly. A surface may
/// fail (for example when the display connection is gone); callers log the
/// error and carry on.
pub trait OutputSurface: Send {
    fn press_key(&mut self, key: &Key) -> Result<(), OutputError>;

    fn release_key(&mut self, key: &Key) -> Result<(), OutputError>;

    /// Current pointer position
    fn mouse_position(&mut self) -> Result<Point, OutputError>;

    /// Moves the pointer to an absolute position
    fn move_mouse(&mut self, target: Point) -> Result<(), OutputError>;

    /// Scrolls by `amount` notches; positive values scroll down
    fn scroll_wheel(&mut self, amount: i32) -> Result<(), OutputError>;

    fn press_mouse_button(&mut self, button: MouseButton) -> Result<(), OutputError>;

    fn release_mouse_button(&mut self, button: MouseButton) -> Result<(), OutputError>;
}
