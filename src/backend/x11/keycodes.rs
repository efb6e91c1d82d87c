// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! X11 keycode, modifier and button conversions.

use keyboard_types::{Code, Modifiers};
use tracing::warn;

use crate::backend::shared::code_from_set1;
use crate::mouse::{MouseButton, MouseButtons};

// Core protocol KeyButMask bits.
const SHIFT_MASK: u16 = 1;
const LOCK_MASK: u16 = 1 << 1;
const CONTROL_MASK: u16 = 1 << 2;
const MOD1_MASK: u16 = 1 << 3;
const MOD2_MASK: u16 = 1 << 4;
const MOD4_MASK: u16 = 1 << 6;
const BUTTON1_MASK: u16 = 1 << 8;
const BUTTON2_MASK: u16 = 1 << 9;
const BUTTON3_MASK: u16 = 1 << 10;

/// Map a hardware keycode to a physical key.
///
/// With the evdev driver (the only one anyone uses) the keycode is the evdev
/// code plus 8.
pub fn code_from_keycode(keycode: u8) -> Code {
    let evdev = u16::from(keycode).saturating_sub(8);
    match evdev {
        96 => Code::NumpadEnter,
        97 => Code::ControlRight,
        98 => Code::NumpadDivide,
        100 => Code::AltRight,
        102 => Code::Home,
        103 => Code::ArrowUp,
        104 => Code::PageUp,
        105 => Code::ArrowLeft,
        106 => Code::ArrowRight,
        107 => Code::End,
        108 => Code::ArrowDown,
        109 => Code::PageDown,
        110 => Code::Insert,
        111 => Code::Delete,
        0..=88 => code_from_set1(evdev),
        _ => Code::Unidentified,
    }
}

// Extracts the keyboard modifiers from the `state` field of an input event.
pub fn key_mods(state: u16) -> Modifiers {
    let mut ret = Modifiers::empty();
    let key_masks = [
        (SHIFT_MASK, Modifiers::SHIFT),
        (CONTROL_MASK, Modifiers::CONTROL),
        // X11's mod keys are configurable, but this seems
        // like a reasonable default for US keyboards, at least,
        // where the "windows" key seems to be MOD_MASK_4.
        (MOD1_MASK, Modifiers::ALT),
        (MOD2_MASK, Modifiers::NUM_LOCK),
        (MOD4_MASK, Modifiers::META),
        (LOCK_MASK, Modifiers::CAPS_LOCK),
    ];
    for (mask, modifiers) in key_masks {
        if state & mask != 0 {
            ret |= modifiers;
        }
    }
    ret
}

// Extracts the mouse buttons from the `state` field of an input event.
pub fn mouse_buttons(state: u16) -> MouseButtons {
    let mut buttons = MouseButtons::new();
    let button_masks = [
        (BUTTON1_MASK, MouseButton::Left),
        (BUTTON2_MASK, MouseButton::Middle),
        (BUTTON3_MASK, MouseButton::Right),
    ];
    for (mask, button) in button_masks {
        if state & mask != 0 {
            buttons.insert(button);
        }
    }
    buttons
}

pub fn mouse_button(button: u8) -> MouseButton {
    match button {
        1 => MouseButton::Left,
        2 => MouseButton::Middle,
        3 => MouseButton::Right,
        // buttons 4 through 7 are for scrolling.
        4..=7 => MouseButton::None,
        8 => MouseButton::X1,
        9 => MouseButton::X2,
        _ => {
            warn!("unknown mouse button code {}", button);
            MouseButton::None
        }
    }
}

/// Wheel notches for a scroll "button", as `(rotation, horizontal)`.
///
/// X doesn't have dedicated scroll events: it uses mouse buttons instead.
/// Buttons 4/5 are vertical; 6/7 are horizontal. Shift turns a vertical
/// wheel horizontal.
pub fn wheel_rotation(button: u8, state: u16) -> Option<(f32, bool)> {
    let shift = state & SHIFT_MASK != 0;
    match button {
        4 => Some((-1.0, shift)),
        5 => Some((1.0, shift)),
        6 => Some((-1.0, true)),
        7 => Some((1.0, true)),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn evdev_offset() {
        // 38 is 'a' on every evdev keymap.
        assert_eq!(code_from_keycode(38), Code::KeyA);
        assert_eq!(code_from_keycode(9), Code::Escape);
        assert_eq!(code_from_keycode(113), Code::ArrowLeft);
        assert_eq!(code_from_keycode(3), Code::Unidentified);
    }

    #[test]
    fn state_bits() {
        let mods = key_mods(SHIFT_MASK | CONTROL_MASK);
        assert!(mods.contains(Modifiers::SHIFT));
        assert!(mods.contains(Modifiers::CONTROL));
        assert!(!mods.contains(Modifiers::ALT));

        let buttons = mouse_buttons(BUTTON1_MASK | BUTTON3_MASK);
        assert!(buttons.contains(MouseButton::Left));
        assert!(buttons.contains(MouseButton::Right));
        assert!(!buttons.contains(MouseButton::Middle));
    }

    #[test]
    fn wheel_buttons() {
        assert_eq!(wheel_rotation(4, 0), Some((-1.0, false)));
        assert_eq!(wheel_rotation(5, SHIFT_MASK), Some((1.0, true)));
        assert_eq!(wheel_rotation(7, 0), Some((1.0, true)));
        assert_eq!(wheel_rotation(1, 0), None);
    }
}
