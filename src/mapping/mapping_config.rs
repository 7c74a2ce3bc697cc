//! Mapping graph: logical control name → action
//!
//! The graph is plain data, loaded once at startup and never mutated while the
//! poller runs. Buttons may cycle through several states; each state names the
//! keys it emits and the state that follows it.
//!
//! ```toml
//! [bindings.A]
//! action = "keys"
//! keys = ["enter"]
//!
//! [bindings.X]
//! action = "states"
//! [[bindings.X.states]]
//! id = "copy"
//! keys = ["ctrl", "c"]
//! next = "paste"
//! [[bindings.X.states]]
//! id = "paste"
//! keys = ["ctrl", "v"]
//!
//! [bindings.x]
//! action = "mouse_move"
//! axis = "x"
//! max_move = 15
//! delta = 0.1
//! ```

use crate::mapping::MappingError;
use crate::output::{Key, MouseButton};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Screen axis driven by a mouse-move binding
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseAxis {
    X,
    Y,
}

/// One state of a cycling button
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct StateConfig {
    pub id: String,
    pub keys: Vec<Key>,
    /// Follow-up state; defaults to the next state in declaration order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Action bound to a logical control name
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionConfig {
    /// Hold keys while the control is pressed
    Keys {
        keys: Vec<Key>,
        /// Release in reverse press order
        #[serde(default)]
        combo: bool,
    },
    /// Hold the keys of the current state, advance to the next state on release
    States {
        #[serde(default)]
        combo: bool,
        states: Vec<StateConfig>,
    },
    MouseButton {
        button: MouseButton,
    },
    /// Move the pointer along one axis every tick while deflected
    MouseMove {
        axis: MouseAxis,
        max_move: i32,
        #[serde(default)]
        delta: f32,
    },
    /// Scroll once each time the value crosses `delta`
    MouseWheel {
        max_move: i32,
        delta: f32,
    },
}

impl ActionConfig {
    pub fn validate(&self) -> Result<(), MappingError> {
        match self {
            ActionConfig::Keys { keys, .. } => {
                if keys.is_empty() {
                    return Err(MappingError::Config("key list cannot be empty".into()));
                }
            }
            ActionConfig::States { states, .. } => {
                if states.is_empty() {
                    return Err(MappingError::Config("state list cannot be empty".into()));
                }
                let mut ids = HashSet::new();
                for state in states {
                    if !ids.insert(state.id.as_str()) {
                        return Err(MappingError::Config(format!(
                            "duplicate state id {:?}",
                            state.id
                        )));
                    }
                }
                for state in states {
                    if let Some(next) = &state.next {
                        if !ids.contains(next.as_str()) {
                            return Err(MappingError::Config(format!(
                                "state {:?} points to unknown state {:?}",
                                state.id, next
                            )));
                        }
                    }
                }
            }
            ActionConfig::MouseButton { .. } => {}
            ActionConfig::MouseMove {
                max_move, delta, ..
            }
            | ActionConfig::MouseWheel { max_move, delta } => {
                if *max_move <= 0 {
                    return Err(MappingError::Config(format!(
                        "max_move must be positive, got {}",
                        max_move
                    )));
                }
                if !(0.0..=1.0).contains(delta) {
                    return Err(MappingError::Config(format!(
                        "delta must be within 0.0..=1.0, got {}",
                        delta
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Complete mapping graph, keyed by logical name
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
pub struct MappingConfig {
    #[serde(default)]
    pub bindings: BTreeMap<String, ActionConfig>,
}

impl MappingConfig {
    pub fn validate(&self) -> Result<(), MappingError> {
        if self.bindings.is_empty() {
            return Err(MappingError::Config("mapping has no bindings".into()));
        }
        for (name, action) in &self.bindings {
            action
                .validate()
                .map_err(|e| MappingError::Config(format!("binding {:?}: {}", name, e)))?;
        }
        Ok(())
    }

    /// Layout used when no configuration file exists yet
    ///
    /// Face buttons type, the bumpers click, the hat acts as arrow keys, the
    /// left stick drives the pointer and the right stick scrolls.
    pub fn default_config() -> Self {
        let mut bindings = BTreeMap::new();
        let mut keys = |name: &str, names: &[&str], combo: bool| {
            let keys = names
                .iter()
                .filter_map(|n| Key::new(n).ok())
                .collect();
            bindings.insert(name.to_string(), ActionConfig::Keys { keys, combo });
        };

        keys("A", &["enter"], false);
        keys("B", &["escape"], false);
        keys("Y", &["tab"], false);
        keys("BACK", &["alt", "tab"], true);
        keys("START", &["space"], false);
        keys("NP", &["up"], false);
        keys("NEP", &["up", "right"], false);
        keys("EP", &["right"], false);
        keys("SEP", &["down", "right"], false);
        keys("SP", &["down"], false);
        keys("SWP", &["down", "left"], false);
        keys("WP", &["left"], false);
        keys("NWP", &["up", "left"], false);

        bindings.insert(
            "X".to_string(),
            ActionConfig::States {
                states: vec![
                    StateConfig {
                        id: "copy".into(),
                        keys: ["ctrl", "c"].iter().filter_map(|n| Key::new(n).ok()).collect(),
                        next: Some("paste".into()),
                    },
                    StateConfig {
                        id: "paste".into(),
                        keys: ["ctrl", "v"].iter().filter_map(|n| Key::new(n).ok()).collect(),
                        next: Some("copy".into()),
                    },
                ],
                combo: true,
            },
        );
        bindings.insert(
            "LB".to_string(),
            ActionConfig::MouseButton {
                button: MouseButton::Left,
            },
        );
        bindings.insert(
            "RB".to_string(),
            ActionConfig::MouseButton {
                button: MouseButton::Right,
            },
        );
        bindings.insert(
            "LS".to_string(),
            ActionConfig::MouseButton {
                button: MouseButton::Middle,
            },
        );
        bindings.insert(
            "x".to_string(),
            ActionConfig::MouseMove {
                axis: MouseAxis::X,
                max_move: 15,
                delta: 0.1,
            },
        );
        bindings.insert(
            "y".to_string(),
            ActionConfig::MouseMove {
                axis: MouseAxis::Y,
                max_move: 15,
                delta: 0.1,
            },
        );
        bindings.insert(
            "ry".to_string(),
            ActionConfig::MouseWheel {
                max_move: 3,
                delta: 0.5,
            },
        );

        Self { bindings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[bindings.A]
action = "keys"
keys = ["Enter"]

[bindings.BACK]
action = "keys"
keys = ["alt", "tab"]
combo = true

[bindings.X]
action = "states"
[[bindings.X.states]]
id = "one"
keys = ["1"]
next = "two"
[[bindings.X.states]]
id = "two"
keys = ["2"]

[bindings.LB]
action = "mouse_button"
button = "left"

[bindings.x]
action = "mouse_move"
axis = "x"
max_move = 10

[bindings.rz]
action = "mouse_wheel"
max_move = 100
delta = 0.5
"#;

    #[test]
    fn parses_every_action_kind() {
        let config: MappingConfig = toml::from_str(SAMPLE).unwrap();
        config.validate().unwrap();

        assert_eq!(
            config.bindings["A"],
            ActionConfig::Keys {
                keys: vec![Key::new("enter").unwrap()],
                combo: false
            }
        );
        assert!(matches!(
            config.bindings["BACK"],
            ActionConfig::Keys { combo: true, .. }
        ));
        match &config.bindings["X"] {
            ActionConfig::States { states, combo } => {
                assert!(!combo);
                assert_eq!(states.len(), 2);
                assert_eq!(states[0].next.as_deref(), Some("two"));
                assert_eq!(states[1].next, None);
            }
            other => panic!("unexpected action {:?}", other),
        }
        assert_eq!(
            config.bindings["x"],
            ActionConfig::MouseMove {
                axis: MouseAxis::X,
                max_move: 10,
                delta: 0.0
            }
        );
        assert_eq!(
            config.bindings["LB"],
            ActionConfig::MouseButton {
                button: MouseButton::Left
            }
        );
    }

    #[test]
    fn rejects_invalid_key_names() {
        let broken = r#"
[bindings.A]
action = "keys"
keys = ["ctrl+c"]
"#;
        assert!(toml::from_str::<MappingConfig>(broken).is_err());
    }

    #[test]
    fn rejects_dangling_next_state() {
        let config = MappingConfig {
            bindings: BTreeMap::from([(
                "X".to_string(),
                ActionConfig::States {
                    states: vec![StateConfig {
                        id: "one".into(),
                        keys: vec![Key::new("a").unwrap()],
                        next: Some("missing".into()),
                    }],
                    combo: false,
                },
            )]),
        };
        assert!(matches!(config.validate(), Err(MappingError::Config(_))));
    }

    #[test]
    fn rejects_out_of_range_delta() {
        let action = ActionConfig::MouseWheel {
            max_move: 3,
            delta: 1.5,
        };
        assert!(action.validate().is_err());
    }

    #[test]
    fn default_config_is_valid_and_survives_toml() {
        let config = MappingConfig::default_config();
        config.validate().unwrap();

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: MappingConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
