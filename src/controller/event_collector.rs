use gilrs::{Axis, Button, Event, EventType, GamepadId, Gilrs};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

use crate::controller::controller::{ControlEvent, Controller, ControllerError, ControllerId};
use crate::mapping::hat::{HatDirection, HAT_CENTER, HAT_IDENTIFIER};

// Collector settings
#[derive(Clone, Debug)]
pub struct CollectorSettings {
    pub joystick_deadzone: f32,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            joystick_deadzone: 0.05,
        }
    }
}

// Pressed state of the four d-pad buttons
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct DpadState {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl DpadState {
    fn hat_value(&self) -> f32 {
        HatDirection::from_dpad(self.up, self.down, self.left, self.right)
            .map(HatDirection::value)
            .unwrap_or(HAT_CENTER)
    }
}

/// Turns gilrs input into control events, per controller
///
/// D-pad buttons are folded into one hat control. Axis and hat values are
/// only reported when they change.
#[derive(Debug, Default)]
pub struct EventConverter {
    deadzone: f32,
    dpads: HashMap<ControllerId, DpadState>,
    last_values: HashMap<(ControllerId, &'static str), f32>,
}

impl EventConverter {
    pub fn new(deadzone: f32) -> Self {
        Self {
            deadzone,
            ..Self::default()
        }
    }

    pub fn button(&mut self, id: ControllerId, button: Button, pressed: bool) -> Option<ControlEvent> {
        let dpad = self.dpads.entry(id).or_default();
        let slot = match button {
            Button::DPadUp => Some(&mut dpad.up),
            Button::DPadDown => Some(&mut dpad.down),
            Button::DPadLeft => Some(&mut dpad.left),
            Button::DPadRight => Some(&mut dpad.right),
            _ => None,
        };
        if let Some(slot) = slot {
            *slot = pressed;
            let value = dpad.hat_value();
            return self.changed(id, HAT_IDENTIFIER, value);
        }

        let identifier = map_button(button)?;
        let value = if pressed { 1.0 } else { 0.0 };
        Some(ControlEvent::new(identifier, value))
    }

    pub fn axis(&mut self, id: ControllerId, axis: Axis, raw: f32) -> Option<ControlEvent> {
        let identifier = map_axis(axis)?;
        let mut value = apply_deadzone(raw, self.deadzone);
        // gilrs reports stick up as positive, the screen grows downwards
        if matches!(axis, Axis::LeftStickY | Axis::RightStickY) {
            value = -value;
        }
        self.changed(id, identifier, value)
    }

    /// Forgets everything about a controller
    pub fn forget(&mut self, id: ControllerId) {
        self.dpads.remove(&id);
        self.last_values.retain(|(owner, _), _| *owner != id);
    }

    fn changed(&mut self, id: ControllerId, identifier: &'static str, value: f32) -> Option<ControlEvent> {
        let last = self.last_values.insert((id, identifier), value);
        match last {
            Some(previous) if previous == value => None,
            None if value == 0.0 => None,
            _ => Some(ControlEvent::new(identifier, value)),
        }
    }
}

// gilrs context shared by the registry and every controller handle
struct GilrsHub {
    gilrs: Gilrs,
    converter: EventConverter,
    queues: HashMap<ControllerId, VecDeque<ControlEvent>>,
}

impl GilrsHub {
    // Moves pending gilrs events into the queues of tracked controllers
    fn pump(&mut self) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            let controller = usize::from(id);
            let converted = match event {
                EventType::ButtonPressed(button, _) => self.converter.button(controller, button, true),
                EventType::ButtonReleased(button, _) => {
                    self.converter.button(controller, button, false)
                }
                EventType::AxisChanged(axis, value, _) => self.converter.axis(controller, axis, value),
                EventType::Connected => {
                    info!("Gamepad {} connected", controller);
                    None
                }
                EventType::Disconnected => {
                    warn!("Gamepad {} disconnected", controller);
                    self.converter.forget(controller);
                    None
                }
                other => {
                    debug!("Unhandled event type: {:?}", other);
                    None
                }
            };

            let Some(converted) = converted else { continue };
            match self.queues.get_mut(&controller) {
                Some(queue) => {
                    debug!("Gamepad {} queued {}", controller, converted);
                    queue.push_back(converted);
                }
                None => debug!("Skipping event from untracked gamepad {}", controller),
            }
        }
    }
}

/// Gamepad enumeration backed by gilrs
#[derive(Clone)]
pub struct GilrsRegistry {
    hub: Arc<Mutex<GilrsHub>>,
}

impl GilrsRegistry {
    pub fn new(settings: Option<CollectorSettings>) -> Result<Self, ControllerError> {
        let settings = settings.unwrap_or_default();
        info!("Initializing gilrs controller interface with {:?}", settings);

        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(ControllerError::InitializationError(e.to_string()));
            }
        };

        for (id, gamepad) in gilrs.gamepads() {
            info!("  ID: {}, Name: {}, UUID: {:?}", id, gamepad.name(), gamepad.uuid());
        }

        Ok(Self {
            hub: Arc::new(Mutex::new(GilrsHub {
                gilrs,
                converter: EventConverter::new(settings.joystick_deadzone),
                queues: HashMap::new(),
            })),
        })
    }

    /// Ids of the gamepads gilrs currently reports as connected
    pub fn connected_ids(&self) -> Result<Vec<ControllerId>, ControllerError> {
        let mut hub = self.hub.lock().map_err(|_| ControllerError::RegistryPoisoned)?;
        hub.pump();
        let mut ids: Vec<ControllerId> = hub.gilrs.gamepads().map(|(id, _)| usize::from(id)).collect();
        ids.sort_unstable();
        Ok(ids)
    }

    /// One controller handle per connected gamepad
    pub fn controllers(&self) -> Result<Vec<Box<dyn Controller>>, ControllerError> {
        let mut hub = self.hub.lock().map_err(|_| ControllerError::RegistryPoisoned)?;
        hub.pump();

        let found: Vec<(GamepadId, String)> = hub
            .gilrs
            .gamepads()
            .map(|(id, gamepad)| (id, gamepad.name().to_string()))
            .collect();

        let connected: Vec<ControllerId> = found.iter().map(|(id, _)| usize::from(*id)).collect();
        hub.queues.retain(|id, _| connected.contains(id));

        let mut controllers: Vec<Box<dyn Controller>> = Vec::with_capacity(found.len());
        for (gamepad_id, name) in found {
            let id = usize::from(gamepad_id);
            hub.queues.entry(id).or_default();
            debug!("Handing out controller {} ({})", id, name);
            controllers.push(Box::new(GilrsController {
                id,
                gamepad_id,
                name,
                hub: Arc::clone(&self.hub),
            }));
        }
        controllers.sort_by_key(|c| c.id());
        Ok(controllers)
    }
}

/// Handle to one gilrs gamepad
pub struct GilrsController {
    id: ControllerId,
    gamepad_id: GamepadId,
    name: String,
    hub: Arc<Mutex<GilrsHub>>,
}

impl Controller for GilrsController {
    fn id(&self) -> ControllerId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn poll(&mut self) -> bool {
        let Ok(mut hub) = self.hub.lock() else {
            error!("gilrs hub lock poisoned, dropping controller {}", self.id);
            return false;
        };
        hub.pump();
        if hub.gilrs.connected_gamepad(self.gamepad_id).is_none() {
            hub.queues.remove(&self.id);
            hub.converter.forget(self.id);
            return false;
        }
        true
    }

    fn drain_events(&mut self) -> Vec<ControlEvent> {
        match self.hub.lock() {
            Ok(mut hub) => hub
                .queues
                .get_mut(&self.id)
                .map(|queue| queue.drain(..).collect())
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }
}

// Helper function to map gilrs Button to a numbered control identifier
fn map_button(button: Button) -> Option<&'static str> {
    match button {
        Button::South => Some("0"),
        Button::East => Some("1"),
        Button::West => Some("2"),
        Button::North => Some("3"),
        Button::LeftTrigger => Some("4"),
        Button::RightTrigger => Some("5"),
        Button::Select => Some("6"),
        Button::Start => Some("7"),
        Button::LeftThumb => Some("8"),
        Button::RightThumb => Some("9"),
        _ => None,
    }
}

fn map_axis(axis: Axis) -> Option<&'static str> {
    match axis {
        Axis::LeftStickX => Some("x"),
        Axis::LeftStickY => Some("y"),
        Axis::RightStickX => Some("rx"),
        Axis::RightStickY => Some("ry"),
        Axis::LeftZ => Some("z"),
        Axis::RightZ => Some("rz"),
        _ => None,
    }
}

// Helper function to apply deadzone to analog stick values
fn apply_deadzone(value: f32, deadzone: f32) -> f32 {
    if value.abs() < deadzone {
        0.0
    } else {
        // Rescale the value to the range outside the deadzone
        let sign = if value < 0.0 { -1.0 } else { 1.0 };
        sign * (value.abs() - deadzone) / (1.0 - deadzone)
    }
}
