//! Hat switch (POV) decoding
//!
//! The hat reports one of nine discrete values. `0.0` is neutral, the other
//! eight walk clockwise from north-west in steps of `0.125`:
//!
//! ```text
//!   0.125  0.25  0.375
//!     NW    N     NE
//!   1.0 W   ·   E 0.5
//!     SW    S     SE
//!   0.875  0.75  0.625
//! ```

use crate::mapping::MappingError;

/// Control identifier used by the hat switch
pub const HAT_IDENTIFIER: &str = "pov";

/// Logical name of the neutral hat position
pub const RELEASE_POV: &str = "RELEASE_POV";

/// Hat value reported in the neutral position
pub const HAT_CENTER: f32 = 0.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HatDirection {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

pub const ALL_DIRECTIONS: [HatDirection; 8] = [
    HatDirection::North,
    HatDirection::NorthEast,
    HatDirection::East,
    HatDirection::SouthEast,
    HatDirection::South,
    HatDirection::SouthWest,
    HatDirection::West,
    HatDirection::NorthWest,
];

impl HatDirection {
    /// Raw value the hat reports for this direction
    pub const fn value(self) -> f32 {
        match self {
            HatDirection::NorthWest => 0.125,
            HatDirection::North => 0.25,
            HatDirection::NorthEast => 0.375,
            HatDirection::East => 0.5,
            HatDirection::SouthEast => 0.625,
            HatDirection::South => 0.75,
            HatDirection::SouthWest => 0.875,
            HatDirection::West => 1.0,
        }
    }

    /// Logical command name bound to this direction in the mapping graph
    pub const fn logical_name(self) -> &'static str {
        match self {
            HatDirection::North => "NP",
            HatDirection::NorthEast => "NEP",
            HatDirection::East => "EP",
            HatDirection::SouthEast => "SEP",
            HatDirection::South => "SP",
            HatDirection::SouthWest => "SWP",
            HatDirection::West => "WP",
            HatDirection::NorthWest => "NWP",
        }
    }

    /// Combines four d-pad buttons into a hat direction
    ///
    /// Opposing buttons cancel each other out. Returns `None` when the pad is
    /// neutral.
    pub fn from_dpad(up: bool, down: bool, left: bool, right: bool) -> Option<Self> {
        let vertical = up as i8 - down as i8;
        let horizontal = right as i8 - left as i8;
        match (vertical, horizontal) {
            (1, 0) => Some(HatDirection::North),
            (1, 1) => Some(HatDirection::NorthEast),
            (0, 1) => Some(HatDirection::East),
            (-1, 1) => Some(HatDirection::SouthEast),
            (-1, 0) => Some(HatDirection::South),
            (-1, -1) => Some(HatDirection::SouthWest),
            (0, -1) => Some(HatDirection::West),
            (1, -1) => Some(HatDirection::NorthWest),
            _ => None,
        }
    }
}

/// Decodes a raw hat value
///
/// `Ok(None)` is the neutral position. The mapping is only total over the
/// nine defined values; anything else is an error.
pub fn decode_hat(value: f32) -> Result<Option<HatDirection>, MappingError> {
    if value == HAT_CENTER {
        return Ok(None);
    }
    ALL_DIRECTIONS
        .into_iter()
        .find(|direction| direction.value() == value)
        .map(Some)
        .ok_or(MappingError::UnknownHatValue(value))
}
