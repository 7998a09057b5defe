//! Transition detection between two consecutive snapshots of one device
//!
//! Only the `pressed` edge of a button produces an event; `touched` and `value` changes
//! are carried in the payload but never trigger anything on their own. Axes are compared
//! with exact equality, so a noisy stick reports every wobble.

use crate::gamepad::event::{GamepadEvent, GamepadEventDetail, GamepadEventType};
use crate::gamepad::snapshot::{Gamepad, Snapshot};
use std::sync::Arc;
use tracing::debug;

/// Compare the gamepad's current state with the previous snapshot for its slot
///
/// Returns button transitions in index order followed by axis transitions in index
/// order. With no previous snapshot every button counts as released and every axis as
/// unknown.
pub fn detect_transitions(
    gamepad: &Arc<Gamepad>,
    previous: Option<&Snapshot>,
) -> Vec<GamepadEvent> {
    let mut events = button_transitions(gamepad, previous);
    events.extend(axis_transitions(gamepad, previous));

    if !events.is_empty() {
        debug!(
            "Slot {} produced {} transitions",
            gamepad.index,
            events.len()
        );
    }
    events
}

fn button_transitions(gamepad: &Arc<Gamepad>, previous: Option<&Snapshot>) -> Vec<GamepadEvent> {
    let previous_buttons = previous.map(|s| s.buttons.as_slice()).unwrap_or_default();

    gamepad
        .state
        .buttons
        .iter()
        .enumerate()
        .filter_map(|(i, button)| {
            let was_pressed = previous_buttons.get(i).map(|b| b.pressed);
            let event_type = match (button.pressed, was_pressed) {
                (true, None | Some(false)) => GamepadEventType::ButtonPress,
                (false, Some(true)) => GamepadEventType::ButtonRelease,
                _ => return None,
            };
            Some(GamepadEvent {
                event_type,
                detail: GamepadEventDetail::button(Arc::clone(gamepad), *button, i),
            })
        })
        .collect()
}

fn axis_transitions(gamepad: &Arc<Gamepad>, previous: Option<&Snapshot>) -> Vec<GamepadEvent> {
    let previous_axes = previous.map(|s| s.axes.as_slice()).unwrap_or_default();

    gamepad
        .state
        .axes
        .iter()
        .enumerate()
        .filter(|&(i, value)| previous_axes.get(i) != Some(value))
        .map(|(i, &value)| GamepadEvent {
            event_type: GamepadEventType::AxisChange,
            detail: GamepadEventDetail::axis(Arc::clone(gamepad), value, i),
        })
        .collect()
}
