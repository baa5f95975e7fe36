//! Keyboard state for the render loop.
//!
//! The only key the orrery reacts to is Escape, but state is tracked for every
//! physical key so a key held across frames and a tap between two redraws are
//! both seen.

use std::collections::HashSet;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Key that closes the window.
pub const EXIT_KEY: PhysicalKey = PhysicalKey::Code(KeyCode::Escape);

/// Minimal description of a key event, independent of winit's platform data.
#[derive(Debug, Clone, Copy)]
pub struct RawKeyEvent {
    pub key: PhysicalKey,
    pub state: ElementState,
    pub repeat: bool,
}

/// Keys currently held, and keys that went down since the last frame.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<PhysicalKey>,
    pressed_this_frame: HashSet<PhysicalKey>,
}

impl KeyboardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_event(&mut self, event: &KeyEvent) {
        self.process_raw(RawKeyEvent {
            key: event.physical_key,
            state: event.state,
            repeat: event.repeat,
        });
    }

    /// Auto-repeat events carry no new information and are dropped.
    pub fn process_raw(&mut self, event: RawKeyEvent) {
        match (event.state, event.repeat) {
            (_, true) => {}
            (ElementState::Pressed, false) => {
                self.held.insert(event.key);
                self.pressed_this_frame.insert(event.key);
            }
            (ElementState::Released, false) => {
                self.held.remove(&event.key);
            }
        }
    }

    #[must_use]
    pub fn is_pressed(&self, key: PhysicalKey) -> bool {
        self.held.contains(&key)
    }

    #[must_use]
    pub fn just_pressed(&self, key: PhysicalKey) -> bool {
        self.pressed_this_frame.contains(&key)
    }

    /// Escape is held, or was tapped since the last frame.
    #[must_use]
    pub fn exit_requested(&self) -> bool {
        self.is_pressed(EXIT_KEY) || self.just_pressed(EXIT_KEY)
    }

    /// Start a new frame.
    pub fn clear_transients(&mut self) {
        self.pressed_this_frame.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> RawKeyEvent {
        RawKeyEvent {
            key: PhysicalKey::Code(code),
            state: ElementState::Pressed,
            repeat: false,
        }
    }

    fn release(code: KeyCode) -> RawKeyEvent {
        RawKeyEvent {
            state: ElementState::Released,
            ..press(code)
        }
    }

    #[test]
    fn test_no_exit_initially() {
        let kb = KeyboardState::new();
        assert!(!kb.exit_requested());
        assert!(!kb.is_pressed(EXIT_KEY));
    }

    #[test]
    fn test_escape_held_requests_exit() {
        let mut kb = KeyboardState::new();
        kb.process_raw(press(KeyCode::Escape));
        kb.clear_transients();
        assert!(kb.exit_requested());
    }

    #[test]
    fn test_escape_tap_between_frames_requests_exit() {
        let mut kb = KeyboardState::new();
        kb.process_raw(press(KeyCode::Escape));
        kb.process_raw(release(KeyCode::Escape));
        assert!(!kb.is_pressed(EXIT_KEY));
        assert!(kb.exit_requested());

        kb.clear_transients();
        assert!(!kb.exit_requested());
    }

    #[test]
    fn test_other_keys_do_not_exit() {
        let mut kb = KeyboardState::new();
        for code in [KeyCode::KeyQ, KeyCode::Space, KeyCode::Enter] {
            kb.process_raw(press(code));
        }
        assert!(!kb.exit_requested());
        assert!(kb.is_pressed(PhysicalKey::Code(KeyCode::Space)));
    }

    #[test]
    fn test_repeat_ignored() {
        let mut kb = KeyboardState::new();
        kb.process_raw(RawKeyEvent {
            repeat: true,
            ..press(KeyCode::Escape)
        });
        assert!(!kb.exit_requested());
    }

    #[test]
    fn test_release_clears_held() {
        let mut kb = KeyboardState::new();
        kb.process_raw(press(KeyCode::KeyW));
        kb.process_raw(release(KeyCode::KeyW));
        kb.clear_transients();
        assert!(!kb.is_pressed(PhysicalKey::Code(KeyCode::KeyW)));
        assert!(!kb.just_pressed(PhysicalKey::Code(KeyCode::KeyW)));
    }
}
