//! Mapping of controller events onto keyboard and mouse commands
//!
//! ```text
//! ControlEvent ──► translator ──► factory ──► command ──► OutputSurface
//!                      │                         ▲
//!                      └──► active (continuous) ─┘ every tick
//! ```
//!
//! The mapping graph is read from TOML ([`mapping_config`]) and compiled once
//! into commands by the [`factory`].

pub mod active;
pub mod command;
pub mod error;
pub mod factory;
pub mod hat;
pub mod mapping_config;
pub mod translator;

pub use active::{ActiveCommand, ActiveCommands};
pub use command::Command;
pub use error::MappingError;
pub use factory::{CommandFactory, CommandId};
pub use hat::HatDirection;
pub use mapping_config::{ActionConfig, MappingConfig};
pub use translator::EventTranslator;
