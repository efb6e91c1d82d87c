// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Scan code conversion for key messages.

use keyboard_types::Code;

use super::message::Message;
use crate::backend::shared::code_from_set1;

/// The scan code of a key message and whether it carried the `E0` prefix.
pub fn scan_code(msg: &Message) -> (u16, bool) {
    let lparam = msg.lparam as u32;
    let scancode = ((lparam >> 16) & 0xff) as u16;
    let extended = lparam & (1 << 24) != 0;
    (scancode, extended)
}

/// Whether a key down message is an auto-repeat (bit 30: key was already down).
pub fn is_repeat(msg: &Message) -> bool {
    (msg.lparam as u32) & (1 << 30) != 0
}

/// Map a set 1 scan code, with its extended flag, to a physical key.
pub fn code_from_scancode(scancode: u16, extended: bool) -> Code {
    if !extended {
        return code_from_set1(scancode);
    }
    match scancode {
        0x1C => Code::NumpadEnter,
        0x1D => Code::ControlRight,
        0x35 => Code::NumpadDivide,
        0x38 => Code::AltRight,
        0x47 => Code::Home,
        0x48 => Code::ArrowUp,
        0x49 => Code::PageUp,
        0x4B => Code::ArrowLeft,
        0x4D => Code::ArrowRight,
        0x4F => Code::End,
        0x50 => Code::ArrowDown,
        0x51 => Code::PageDown,
        0x52 => Code::Insert,
        0x53 => Code::Delete,
        0x5B => Code::MetaLeft,
        0x5C => Code::MetaRight,
        0x5D => Code::ContextMenu,
        _ => Code::Unidentified,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::backend::windows::message::WM_KEYDOWN;
    use test_log::test;

    #[test]
    fn extended_keys() {
        assert_eq!(code_from_scancode(0x48, false), Code::Numpad8);
        assert_eq!(code_from_scancode(0x48, true), Code::ArrowUp);
        assert_eq!(code_from_scancode(0x1E, false), Code::KeyA);
    }

    #[test]
    fn lparam_fields() {
        let lparam = (1 << 30) | (1 << 24) | (0x4B << 16) | 1;
        let msg = Message::new(1, WM_KEYDOWN, 0x25, lparam);
        assert_eq!(scan_code(&msg), (0x4B, true));
        assert!(is_repeat(&msg));
    }
}
