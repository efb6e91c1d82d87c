// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Keyboard event payloads.

pub use keyboard_types::{Code, KeyState, Modifiers};

/// A single physical key transition.
///
/// Every transition is forwarded, auto-repeat included; repeats carry
/// `repeat == true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Whether the key went down or up.
    pub state: KeyState,
    /// The native key code (X11 keycode, Win32 virtual key, KD key id).
    pub platform_code: u32,
    /// The platform independent physical key.
    pub code: Code,
    /// The character produced by this key, if the platform told us.
    pub char: Option<char>,
    /// Modifier state at the time of the event.
    pub mods: Modifiers,
    /// `true` if this transition is part of an auto-repeat sequence.
    pub repeat: bool,
}

impl KeyEvent {
    /// `true` for a key press.
    pub fn is_pressed(&self) -> bool {
        self.state == KeyState::Down
    }
}
