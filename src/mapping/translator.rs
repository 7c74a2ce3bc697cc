//! Event translator
//!
//! Turns raw control events into logical names, looks the name up in the
//! command factory and drives the command. Continuous commands are armed in
//! the active set and re-executed by [`EventTranslator::tick`].
//!
//! ```text
//! ControlEvent ──► logical name ──► CommandFactory ──► execute
//!                                                   └─► ActiveCommands (continuous)
//! ```

use crate::controller::controller::{ControlEvent, ControllerId};
use crate::mapping::active::ActiveCommands;
use crate::mapping::factory::{CommandFactory, CommandId};
use crate::mapping::hat::{decode_hat, HAT_IDENTIFIER, RELEASE_POV};
use crate::mapping::MappingError;
use crate::output::OutputSurface;
use std::borrow::Cow;
use tracing::{debug, warn};

/// Logical names of the ten numbered buttons
const BUTTON_NAMES: [&str; 10] = [
    "A", "B", "X", "Y", "LB", "RB", "BACK", "START", "LS", "RS",
];

fn is_hat(identifier: &str) -> bool {
    identifier.eq_ignore_ascii_case(HAT_IDENTIFIER)
}

/// Maps a control identifier and its raw value to a logical name
pub fn logical_name(identifier: &str, value: f32) -> Result<Cow<'_, str>, MappingError> {
    if is_hat(identifier) {
        let name = match decode_hat(value)? {
            Some(direction) => direction.logical_name(),
            None => RELEASE_POV,
        };
        return Ok(Cow::Borrowed(name));
    }
    let button = identifier
        .parse::<usize>()
        .ok()
        .and_then(|index| BUTTON_NAMES.get(index));
    match button {
        Some(name) if identifier.len() == 1 => Ok(Cow::Borrowed(*name)),
        _ => Ok(Cow::Borrowed(identifier)),
    }
}

pub struct EventTranslator {
    factory: CommandFactory,
    surface: Box<dyn OutputSurface>,
    active: ActiveCommands,
    /// Command bound to the hat direction currently held
    last_direction: Option<CommandId>,
}

impl EventTranslator {
    pub fn new(factory: CommandFactory, surface: Box<dyn OutputSurface>) -> Self {
        Self {
            factory,
            surface,
            active: ActiveCommands::new(),
            last_direction: None,
        }
    }

    pub fn active(&self) -> &ActiveCommands {
        &self.active
    }

    pub fn last_direction(&self) -> Option<CommandId> {
        self.last_direction
    }

    pub fn on_event(
        &mut self,
        controller: ControllerId,
        event: &ControlEvent,
    ) -> Result<(), MappingError> {
        let name = logical_name(&event.identifier, event.value)?;

        if let Some(id) = self.factory.lookup(&name) {
            let mut value = event.value;
            if is_hat(&event.identifier) {
                value = if value == 0.0 { 0.0 } else { 1.0 };
                // Rolling the hat to a new direction without passing neutral
                if let Some(previous) = self.last_direction.filter(|p| *p != id) {
                    debug!("Hat moved on from {} without release", previous);
                    self.finish(previous);
                }
                self.last_direction = Some(id);
            }

            debug!("{} -> {} ({}) = {:.4}", event.identifier, name, id, value);
            self.execute(id, value);

            if self.factory.is_continuous(id) {
                self.release(id);
                if value != 0.0 {
                    self.active.arm(id, value, controller);
                }
            }
            return Ok(());
        }

        if name == RELEASE_POV {
            let id = self
                .last_direction
                .take()
                .ok_or(MappingError::ReleaseWithoutDirection)?;
            debug!("Hat released, finishing {}", id);
            self.finish(id);
            return Ok(());
        }

        debug!("No binding for {} ({})", name, event.identifier);
        Ok(())
    }

    /// Re-executes every armed continuous command with its last value
    pub fn tick(&mut self) {
        let armed: Vec<(CommandId, f32)> =
            self.active.iter().map(|e| (e.command, e.value)).collect();
        for (id, value) in armed {
            self.execute(id, value);
        }
    }

    /// Drops the entries owned by `controller` without executing them
    pub fn remove_controller(&mut self, controller: ControllerId) -> usize {
        let purged = self.active.purge_controller(controller);
        if purged > 0 {
            debug!("Purged {} active commands of controller {}", purged, controller);
        }
        purged
    }

    /// Ends a hat command: continuous ones are released, others executed with zero
    fn finish(&mut self, id: CommandId) {
        if self.factory.is_continuous(id) {
            self.release(id);
        } else {
            self.execute(id, 0.0);
        }
    }

    /// Executes an armed command with zero, then drops its entry
    fn release(&mut self, id: CommandId) {
        if !self.active.contains(id) {
            return;
        }
        self.execute(id, 0.0);
        self.active.release(id);
    }

    fn execute(&mut self, id: CommandId, value: f32) {
        let Some(command) = self.factory.get_mut(id) else {
            warn!("Command {} vanished from the factory", id);
            return;
        };
        if let Err(e) = command.execute(self.surface.as_mut(), value) {
            warn!("Command {} ({}) failed: {}", id, command.kind(), e);
        }
    }
}
