//! Dispatch commands and queued key events

use serde::{Deserialize, Serialize};
use settop_driver::KeyCode;

/// What a caller asks a session to do
///
/// Key commands are queued and delivered by the session's worker in dispatch
/// order; `Reconnect` is handled synchronously by the session itself and
/// never enters the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Full press-and-release of a key
    KeyPress(KeyCode),
    /// Key transition to pressed (for press-and-hold)
    KeyDown(KeyCode),
    /// Key transition to released
    KeyUp(KeyCode),
    /// Start a worker, or with `force` restart one even while connected
    Reconnect { force: bool },
}

impl Command {
    /// The queueable event for this command, `None` for `Reconnect`
    pub(crate) fn key_event(self) -> Option<KeyEvent> {
        match self {
            Command::KeyPress(code) => Some(KeyEvent::new(KeyAction::Press, code)),
            Command::KeyDown(code) => Some(KeyEvent::new(KeyAction::Down, code)),
            Command::KeyUp(code) => Some(KeyEvent::new(KeyAction::Up, code)),
            Command::Reconnect { .. } => None,
        }
    }
}

/// The shape of a queued key delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAction {
    /// Press and release in one delivery
    Press,
    /// Transition to pressed
    Down,
    /// Transition to released
    Up,
}

/// One pending key event in a session's queue
///
/// Immutable once created; ownership moves from the dispatching caller to
/// the queue and from there into a worker's drained batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub action: KeyAction,
    pub code: KeyCode,
}

impl KeyEvent {
    pub fn new(action: KeyAction, code: KeyCode) -> Self {
        Self { action, code }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_commands_map_to_events() {
        assert_eq!(
            Command::KeyPress(KeyCode::OK).key_event(),
            Some(KeyEvent::new(KeyAction::Press, KeyCode::OK))
        );
        assert_eq!(
            Command::KeyDown(KeyCode::DPAD_UP).key_event(),
            Some(KeyEvent::new(KeyAction::Down, KeyCode::DPAD_UP))
        );
        assert_eq!(
            Command::KeyUp(KeyCode::DPAD_UP).key_event(),
            Some(KeyEvent::new(KeyAction::Up, KeyCode::DPAD_UP))
        );
    }

    #[test]
    fn test_reconnect_never_queues() {
        assert_eq!(Command::Reconnect { force: true }.key_event(), None);
        assert_eq!(Command::Reconnect { force: false }.key_event(), None);
    }
}
