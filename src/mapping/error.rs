//! Error definitions for the mapping module

use thiserror::Error;

/// Errors raised while building commands or translating events
///
/// The two decode variants signal a mismatch between the device and the
/// decoding tables. They are never recovered from inside the translator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    /// The hat switch reported a value outside the nine known positions
    #[error("Cannot find this value in POV: {0}")]
    UnknownHatValue(f32),

    /// A hat release arrived while no direction was remembered
    #[error("Hat switch released without a remembered direction")]
    ReleaseWithoutDirection,

    /// The mapping graph is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),
}
