//! Logical name → command lookup
//!
//! Commands are built once from the mapping graph. Bindings with identical
//! configuration share one command, so two names bound to the same action
//! also share its latch state and its active entry.

use crate::mapping::command::Command;
use crate::mapping::mapping_config::{ActionConfig, MappingConfig};
use crate::mapping::MappingError;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// Configuration identity of a command
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(pub usize);

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct CommandFactory {
    names: HashMap<String, CommandId>,
    commands: Vec<Command>,
}

impl CommandFactory {
    pub fn from_config(config: &MappingConfig) -> Result<Self, MappingError> {
        config.validate()?;

        let mut actions: Vec<&ActionConfig> = Vec::new();
        let mut factory = Self::default();
        for (name, action) in &config.bindings {
            let id = match actions.iter().position(|known| *known == action) {
                Some(index) => {
                    debug!("Binding {} shares command #{}", name, index);
                    CommandId(index)
                }
                None => {
                    actions.push(action);
                    factory.commands.push(Command::from_action(action));
                    CommandId(factory.commands.len() - 1)
                }
            };
            factory.names.insert(name.clone(), id);
        }

        info!(
            "Built {} commands for {} bindings",
            factory.command_count(),
            factory.names.len()
        );
        Ok(factory)
    }

    pub fn lookup(&self, name: &str) -> Option<CommandId> {
        self.names.get(name).copied()
    }

    pub fn get(&self, id: CommandId) -> Option<&Command> {
        self.commands.get(id.0)
    }

    pub fn get_mut(&mut self, id: CommandId) -> Option<&mut Command> {
        self.commands.get_mut(id.0)
    }

    pub fn is_continuous(&self, id: CommandId) -> bool {
        self.get(id).is_some_and(Command::is_continuous)
    }

    /// Number of distinct commands after deduplication
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }
}
