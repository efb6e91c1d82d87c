// Copyright 2018 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Window messages, as the pump sees them.
//!
//! The numeric values are fixed by the Win32 ABI; they are repeated here so
//! the pump builds (and is tested) on every platform.

/// A raw `HWND` value.
pub type Hwnd = usize;

/// One message taken off a thread's queue or received by a window procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub hwnd: Hwnd,
    pub msg: u32,
    pub wparam: usize,
    pub lparam: isize,
}

impl Message {
    pub fn new(hwnd: Hwnd, msg: u32, wparam: usize, lparam: isize) -> Message {
        Message {
            hwnd,
            msg,
            wparam,
            lparam,
        }
    }

    /// The signed client coordinates packed into `lparam` by mouse messages.
    pub fn lparam_point(&self) -> (i32, i32) {
        let l = self.lparam as u32;
        (loword(l) as i16 as i32, hiword(l) as i16 as i32)
    }

    /// The unsigned width and height packed into `lparam` by `WM_SIZE`.
    pub fn lparam_size(&self) -> (u32, u32) {
        let l = self.lparam as u32;
        (loword(l) as u32, hiword(l) as u32)
    }
}

#[inline]
pub fn loword(l: u32) -> u16 {
    (l & 0xffff) as u16
}

#[inline]
pub fn hiword(l: u32) -> u16 {
    ((l >> 16) & 0xffff) as u16
}

/// Pack two 16-bit values the way `MAKELPARAM` does.
#[inline]
pub fn make_lparam(lo: i32, hi: i32) -> isize {
    (((hi as u32 & 0xffff) << 16) | (lo as u32 & 0xffff)) as i32 as isize
}

pub const WM_DESTROY: u32 = 0x0002;
pub const WM_MOVE: u32 = 0x0003;
pub const WM_SIZE: u32 = 0x0005;
pub const WM_SETFOCUS: u32 = 0x0007;
pub const WM_KILLFOCUS: u32 = 0x0008;
pub const WM_PAINT: u32 = 0x000F;
pub const WM_CLOSE: u32 = 0x0010;
pub const WM_SHOWWINDOW: u32 = 0x0018;
pub const WM_SETCURSOR: u32 = 0x0020;
pub const WM_NCDESTROY: u32 = 0x0082;
pub const WM_KEYDOWN: u32 = 0x0100;
pub const WM_KEYUP: u32 = 0x0101;
pub const WM_SYSKEYDOWN: u32 = 0x0104;
pub const WM_SYSKEYUP: u32 = 0x0105;
pub const WM_MOUSEMOVE: u32 = 0x0200;
pub const WM_LBUTTONDOWN: u32 = 0x0201;
pub const WM_LBUTTONUP: u32 = 0x0202;
pub const WM_RBUTTONDOWN: u32 = 0x0204;
pub const WM_RBUTTONUP: u32 = 0x0205;
pub const WM_MBUTTONDOWN: u32 = 0x0207;
pub const WM_MBUTTONUP: u32 = 0x0208;
pub const WM_MOUSEWHEEL: u32 = 0x020A;
pub const WM_XBUTTONDOWN: u32 = 0x020B;
pub const WM_XBUTTONUP: u32 = 0x020C;
pub const WM_MOUSEHWHEEL: u32 = 0x020E;
pub const WM_CAPTURECHANGED: u32 = 0x0215;
pub const WM_ENTERSIZEMOVE: u32 = 0x0231;
pub const WM_EXITSIZEMOVE: u32 = 0x0232;
pub const WM_TOUCH: u32 = 0x0240;
pub const WM_MOUSELEAVE: u32 = 0x02A3;

pub const SIZE_RESTORED: usize = 0;
pub const SIZE_MINIMIZED: usize = 1;
pub const SIZE_MAXIMIZED: usize = 2;
pub const SIZE_MAXSHOW: usize = 3;
pub const SIZE_MAXHIDE: usize = 4;

pub const HTCLIENT: u16 = 1;
pub const WHEEL_DELTA: i16 = 120;
pub const XBUTTON1: u16 = 0x0001;
pub const XBUTTON2: u16 = 0x0002;

pub const WS_OVERLAPPED: u32 = 0x0000_0000;
pub const WS_POPUP: u32 = 0x8000_0000;
pub const WS_CHILD: u32 = 0x4000_0000;
pub const WS_CAPTION: u32 = 0x00C0_0000;
pub const WS_SYSMENU: u32 = 0x0008_0000;
pub const WS_THICKFRAME: u32 = 0x0004_0000;
pub const WS_MINIMIZEBOX: u32 = 0x0002_0000;
pub const WS_MAXIMIZEBOX: u32 = 0x0001_0000;
pub const WS_OVERLAPPEDWINDOW: u32 =
    WS_OVERLAPPED | WS_CAPTION | WS_SYSMENU | WS_THICKFRAME | WS_MINIMIZEBOX | WS_MAXIMIZEBOX;
pub const WS_EX_TOPMOST: u32 = 0x0000_0008;
pub const WS_EX_APPWINDOW: u32 = 0x0004_0000;

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn packed_coordinates() {
        let msg = Message::new(1, WM_MOUSEMOVE, 0, make_lparam(-5, 300));
        assert_eq!(msg.lparam_point(), (-5, 300));
        let msg = Message::new(1, WM_SIZE, 0, make_lparam(1024, 768));
        assert_eq!(msg.lparam_size(), (1024, 768));
    }
}
