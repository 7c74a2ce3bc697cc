//! Active command set
//!
//! Continuous commands stay armed between ticks. The set holds at most one
//! entry per [`CommandId`]; arming a command that is already present replaces
//! the old entry in place.

use crate::controller::controller::ControllerId;
use crate::mapping::factory::CommandId;

#[derive(Clone, Debug, PartialEq)]
pub struct ActiveCommand {
    pub command: CommandId,
    /// Value re-executed on every tick
    pub value: f32,
    pub controller: ControllerId,
}

#[derive(Debug, Default)]
pub struct ActiveCommands {
    entries: Vec<ActiveCommand>,
}

impl ActiveCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, command: CommandId, value: f32, controller: ControllerId) {
        let entry = ActiveCommand {
            command,
            value,
            controller,
        };
        match self.entries.iter_mut().find(|e| e.command == command) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Removes the entry of `command`, if armed
    pub fn release(&mut self, command: CommandId) -> Option<ActiveCommand> {
        let index = self.entries.iter().position(|e| e.command == command)?;
        Some(self.entries.remove(index))
    }

    /// Drops every entry owned by `controller` and returns how many went
    pub fn purge_controller(&mut self, controller: ControllerId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.controller != controller);
        before - self.entries.len()
    }

    pub fn contains(&self, command: CommandId) -> bool {
        self.entries.iter().any(|e| e.command == command)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveCommand> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
