// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Key code tables shared by the backends.

use keyboard_types::Code;

/// Map a PC/AT set 1 scan code to a physical key.
///
/// Linux evdev codes 1 through 88 are the same numbers, so the X11 backend
/// uses this for hardware keycodes (minus 8) as well. Codes outside that
/// block differ between platforms and are handled by the callers.
pub fn code_from_set1(scancode: u16) -> Code {
    match scancode {
        0x01 => Code::Escape,
        0x02 => Code::Digit1,
        0x03 => Code::Digit2,
        0x04 => Code::Digit3,
        0x05 => Code::Digit4,
        0x06 => Code::Digit5,
        0x07 => Code::Digit6,
        0x08 => Code::Digit7,
        0x09 => Code::Digit8,
        0x0A => Code::Digit9,
        0x0B => Code::Digit0,
        0x0C => Code::Minus,
        0x0D => Code::Equal,
        0x0E => Code::Backspace,
        0x0F => Code::Tab,
        0x10 => Code::KeyQ,
        0x11 => Code::KeyW,
        0x12 => Code::KeyE,
        0x13 => Code::KeyR,
        0x14 => Code::KeyT,
        0x15 => Code::KeyY,
        0x16 => Code::KeyU,
        0x17 => Code::KeyI,
        0x18 => Code::KeyO,
        0x19 => Code::KeyP,
        0x1A => Code::BracketLeft,
        0x1B => Code::BracketRight,
        0x1C => Code::Enter,
        0x1D => Code::ControlLeft,
        0x1E => Code::KeyA,
        0x1F => Code::KeyS,
        0x20 => Code::KeyD,
        0x21 => Code::KeyF,
        0x22 => Code::KeyG,
        0x23 => Code::KeyH,
        0x24 => Code::KeyJ,
        0x25 => Code::KeyK,
        0x26 => Code::KeyL,
        0x27 => Code::Semicolon,
        0x28 => Code::Quote,
        0x29 => Code::Backquote,
        0x2A => Code::ShiftLeft,
        0x2B => Code::Backslash,
        0x2C => Code::KeyZ,
        0x2D => Code::KeyX,
        0x2E => Code::KeyC,
        0x2F => Code::KeyV,
        0x30 => Code::KeyB,
        0x31 => Code::KeyN,
        0x32 => Code::KeyM,
        0x33 => Code::Comma,
        0x34 => Code::Period,
        0x35 => Code::Slash,
        0x36 => Code::ShiftRight,
        0x37 => Code::NumpadMultiply,
        0x38 => Code::AltLeft,
        0x39 => Code::Space,
        0x3A => Code::CapsLock,
        0x3B => Code::F1,
        0x3C => Code::F2,
        0x3D => Code::F3,
        0x3E => Code::F4,
        0x3F => Code::F5,
        0x40 => Code::F6,
        0x41 => Code::F7,
        0x42 => Code::F8,
        0x43 => Code::F9,
        0x44 => Code::F10,
        0x45 => Code::NumLock,
        0x46 => Code::ScrollLock,
        0x47 => Code::Numpad7,
        0x48 => Code::Numpad8,
        0x49 => Code::Numpad9,
        0x4A => Code::NumpadSubtract,
        0x4B => Code::Numpad4,
        0x4C => Code::Numpad5,
        0x4D => Code::Numpad6,
        0x4E => Code::NumpadAdd,
        0x4F => Code::Numpad1,
        0x50 => Code::Numpad2,
        0x51 => Code::Numpad3,
        0x52 => Code::Numpad0,
        0x53 => Code::NumpadDecimal,
        0x56 => Code::IntlBackslash,
        0x57 => Code::F11,
        0x58 => Code::F12,
        _ => Code::Unidentified,
    }
}
