use crate::gamepad::snapshot::{ButtonState, Gamepad};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Event categories listeners can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamepadEventType {
    ButtonPress,
    ButtonRelease,
    AxisChange,
    Connect,
    Disconnect,
}

impl GamepadEventType {
    pub const ALL: [GamepadEventType; 5] = [
        GamepadEventType::ButtonPress,
        GamepadEventType::ButtonRelease,
        GamepadEventType::AxisChange,
        GamepadEventType::Connect,
        GamepadEventType::Disconnect,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GamepadEventType::ButtonPress => "buttonpress",
            GamepadEventType::ButtonRelease => "buttonrelease",
            GamepadEventType::AxisChange => "axischange",
            GamepadEventType::Connect => "connect",
            GamepadEventType::Disconnect => "disconnect",
        }
    }
}

impl fmt::Display for GamepadEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown gamepad event type: {0}")]
pub struct UnknownEventType(pub String);

impl FromStr for GamepadEventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GamepadEventType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventType(s.to_string()))
    }
}

/// Payload passed to listeners
///
/// Which optional fields are set depends on the category:
///
/// | category                      | fields                               |
/// |-------------------------------|--------------------------------------|
/// | `connect` / `disconnect`      | `gamepad`                            |
/// | `buttonpress` / `buttonrelease` | `gamepad`, `button`, `button_index` |
/// | `axischange`                  | `gamepad`, `axis_value`, `axis_index` |
#[derive(Clone, Debug, PartialEq)]
pub struct GamepadEventDetail {
    pub gamepad: Arc<Gamepad>,
    pub button: Option<ButtonState>,
    pub button_index: Option<usize>,
    pub axis_value: Option<f64>,
    pub axis_index: Option<usize>,
}

impl GamepadEventDetail {
    pub fn device(gamepad: Arc<Gamepad>) -> Self {
        Self {
            gamepad,
            button: None,
            button_index: None,
            axis_value: None,
            axis_index: None,
        }
    }

    pub fn button(gamepad: Arc<Gamepad>, button: ButtonState, index: usize) -> Self {
        Self {
            button: Some(button),
            button_index: Some(index),
            ..Self::device(gamepad)
        }
    }

    pub fn axis(gamepad: Arc<Gamepad>, value: f64, index: usize) -> Self {
        Self {
            axis_value: Some(value),
            axis_index: Some(index),
            ..Self::device(gamepad)
        }
    }
}

// Detected transition, ready for dispatch
#[derive(Clone, Debug, PartialEq)]
pub struct GamepadEvent {
    pub event_type: GamepadEventType,
    pub detail: GamepadEventDetail,
}
