// Copyright 2018 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! A [`MessageSource`] on the calling thread's Win32 message queue.
//!
//! Windows whose class uses [`queue_wndproc`] get their messages recorded in
//! a per-thread queue. The default handling runs inside the window procedure
//! right away, since most of it (painting, sizing loops, cursor shape) can't
//! wait for the pump. `WM_CLOSE` is the exception: it is held back so the
//! sink decides whether the window goes away.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::marker::PhantomData;
use std::mem;
use std::ptr::null_mut;

use tracing::warn;
use winapi::shared::minwindef::{FALSE, LPARAM, LRESULT, TRUE, UINT, WPARAM};
use winapi::shared::windef::{HWND, POINT, RECT};
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::winuser::*;

use super::keycodes::scan_code;
use super::message::{
    self, loword, Hwnd, Message, HTCLIENT, WM_CLOSE, WM_PAINT, WM_NCDESTROY, WM_SETCURSOR,
    WM_TOUCH,
};
use super::{MessageSource, TouchInput, TouchPhase};
use crate::geometry::{Point, Rect};
use crate::keyboard::Modifiers;

thread_local! {
    static QUEUE: RefCell<VecDeque<Message>> = RefCell::new(VecDeque::new());
    static DAMAGE: RefCell<HashMap<Hwnd, Rect>> = RefCell::new(HashMap::new());
    static HIDDEN_CURSOR: RefCell<HashSet<Hwnd>> = RefCell::new(HashSet::new());
    static TOUCHES: RefCell<HashMap<Hwnd, VecDeque<Vec<TouchInput>>>> =
        RefCell::new(HashMap::new());
}

fn push(msg: Message) {
    QUEUE.with(|q| q.borrow_mut().push_back(msg));
}

/// The window procedure for classes whose messages go through [`Win32Source`].
///
/// # Safety
///
/// Only to be called by the system as a window procedure.
pub unsafe extern "system" fn queue_wndproc(
    hwnd: HWND,
    msg: UINT,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let message = Message::new(hwnd as Hwnd, msg, wparam, lparam);
    match msg {
        WM_CLOSE => {
            push(message);
            0
        }
        WM_PAINT => {
            let mut rect: RECT = mem::zeroed();
            if GetUpdateRect(hwnd, &mut rect, FALSE) != FALSE {
                let damage = Rect::new(
                    rect.left,
                    rect.top,
                    (rect.right - rect.left).max(0) as u32,
                    (rect.bottom - rect.top).max(0) as u32,
                );
                DAMAGE.with(|d| d.borrow_mut().insert(hwnd as Hwnd, damage));
            }
            push(message);
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }
        WM_TOUCH => {
            // The input handle has to be read and closed here; the default
            // window procedure closes it too.
            stash_touch(hwnd as Hwnd, decode_touch(hwnd, wparam, lparam));
            push(message);
            0
        }
        WM_NCDESTROY => {
            let hwnd_key = hwnd as Hwnd;
            DAMAGE.with(|d| d.borrow_mut().remove(&hwnd_key));
            HIDDEN_CURSOR.with(|h| h.borrow_mut().remove(&hwnd_key));
            TOUCHES.with(|t| t.borrow_mut().remove(&hwnd_key));
            push(message);
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }
        WM_SETCURSOR
            if loword(lparam as u32) == HTCLIENT
                && HIDDEN_CURSOR.with(|h| h.borrow().contains(&(hwnd as Hwnd))) =>
        {
            SetCursor(null_mut());
            push(message);
            TRUE as LRESULT
        }
        _ => {
            push(message);
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }
    }
}

fn stash_touch(hwnd: Hwnd, inputs: Vec<TouchInput>) {
    TOUCHES.with(|t| t.borrow_mut().entry(hwnd).or_default().push_back(inputs));
}

/// The contacts of the oldest `WM_TOUCH` not yet handed to the pump.
fn take_touch(hwnd: Hwnd) -> Vec<TouchInput> {
    TOUCHES.with(|t| {
        let mut t = t.borrow_mut();
        let inputs = t.get_mut(&hwnd).and_then(VecDeque::pop_front);
        if t.get(&hwnd).map_or(false, VecDeque::is_empty) {
            t.remove(&hwnd);
        }
        inputs.unwrap_or_default()
    })
}

/// Read and close the input handle of a `WM_TOUCH` message.
unsafe fn decode_touch(hwnd: HWND, wparam: WPARAM, lparam: LPARAM) -> Vec<TouchInput> {
    let count = loword(wparam as u32) as usize;
    let handle = lparam as HTOUCHINPUT;
    let mut raw: Vec<TOUCHINPUT> = vec![mem::zeroed(); count];
    let ok = GetTouchInputInfo(
        handle,
        count as UINT,
        raw.as_mut_ptr(),
        mem::size_of::<TOUCHINPUT>() as i32,
    );
    CloseTouchInputHandle(handle);
    if ok == FALSE {
        warn!("failed to GetTouchInputInfo: {}", GetLastError());
        return Vec::new();
    }
    raw.iter()
        .map(|input| {
            let phase = if input.dwFlags & TOUCHEVENTF_DOWN != 0 {
                TouchPhase::Down
            } else if input.dwFlags & TOUCHEVENTF_UP != 0 {
                TouchPhase::Up
            } else {
                TouchPhase::Move
            };
            // Touch coordinates are in hundredths of a screen pixel.
            let mut point = POINT {
                x: input.x / 100,
                y: input.y / 100,
            };
            ScreenToClient(hwnd, &mut point);
            TouchInput {
                id: input.dwID,
                phase,
                pos: Point::new(point.x, point.y),
            }
        })
        .collect()
}

/// The Win32 message queue of the current thread.
pub struct Win32Source {
    // Message queues belong to a thread.
    _not_send: PhantomData<*const ()>,
}

impl Win32Source {
    pub fn new() -> Win32Source {
        Win32Source {
            _not_send: PhantomData,
        }
    }
}

impl Default for Win32Source {
    fn default() -> Self {
        Win32Source::new()
    }
}

impl MessageSource for Win32Source {
    fn next_message(&mut self) -> Option<Message> {
        loop {
            if let Some(msg) = QUEUE.with(|q| q.borrow_mut().pop_front()) {
                return Some(msg);
            }
            unsafe {
                let mut msg: MSG = mem::zeroed();
                if PeekMessageW(&mut msg, null_mut(), 0, 0, PM_REMOVE) == FALSE {
                    return None;
                }
                // Routes into queue_wndproc; thread messages have no window
                // and are dropped here.
                DispatchMessageW(&msg);
            }
        }
    }

    fn default_handling(&mut self, msg: &Message) {
        // Everything but WM_CLOSE was already defaulted in the window procedure.
        if msg.msg == message::WM_CLOSE {
            unsafe {
                DestroyWindow(msg.hwnd as HWND);
            }
        }
    }

    fn set_capture(&mut self, hwnd: Hwnd) {
        unsafe {
            SetCapture(hwnd as HWND);
        }
    }

    fn release_capture(&mut self) {
        unsafe {
            if ReleaseCapture() == FALSE {
                warn!("failed to release mouse capture: {}", GetLastError());
            }
        }
    }

    fn track_mouse_leave(&mut self, hwnd: Hwnd) {
        let mut desc = TRACKMOUSEEVENT {
            cbSize: mem::size_of::<TRACKMOUSEEVENT>() as u32,
            dwFlags: TME_LEAVE,
            hwndTrack: hwnd as HWND,
            dwHoverTime: HOVER_DEFAULT,
        };
        unsafe {
            if TrackMouseEvent(&mut desc) == FALSE {
                warn!("failed to TrackMouseEvent: {}", GetLastError());
            }
        }
    }

    fn set_cursor_hidden(&mut self, hwnd: Hwnd, hidden: bool) {
        HIDDEN_CURSOR.with(|h| {
            let mut h = h.borrow_mut();
            if hidden {
                h.insert(hwnd);
            } else {
                h.remove(&hwnd);
            }
        });
        if hidden {
            unsafe {
                SetCursor(null_mut());
            }
        }
    }

    fn query_insets(&mut self, hwnd: Hwnd) -> Option<[i32; 4]> {
        unsafe {
            let hwnd = hwnd as HWND;
            let mut outer: RECT = mem::zeroed();
            let mut client: RECT = mem::zeroed();
            let mut origin = POINT { x: 0, y: 0 };
            if GetWindowRect(hwnd, &mut outer) == FALSE
                || GetClientRect(hwnd, &mut client) == FALSE
                || ClientToScreen(hwnd, &mut origin) == FALSE
            {
                return None;
            }
            Some([
                origin.x - outer.left,
                outer.right - (origin.x + client.right),
                origin.y - outer.top,
                outer.bottom - (origin.y + client.bottom),
            ])
        }
    }

    fn screen_to_client(&mut self, hwnd: Hwnd, pos: Point) -> Point {
        let mut point = POINT { x: pos.x, y: pos.y };
        unsafe {
            if ScreenToClient(hwnd as HWND, &mut point) == FALSE {
                return pos;
            }
        }
        Point::new(point.x, point.y)
    }

    fn update_rect(&mut self, hwnd: Hwnd) -> Option<Rect> {
        DAMAGE.with(|d| d.borrow_mut().remove(&hwnd))
    }

    fn touch_inputs(&mut self, msg: &Message) -> Vec<TouchInput> {
        take_touch(msg.hwnd)
    }

    fn translate_char(&mut self, msg: &Message) -> Option<char> {
        let (scancode, _) = scan_code(msg);
        let mut state = [0u8; 256];
        let mut buf = [0u16; 4];
        let len = unsafe {
            if GetKeyboardState(state.as_mut_ptr()) == FALSE {
                return None;
            }
            ToUnicode(
                msg.wparam as UINT,
                UINT::from(scancode),
                state.as_ptr(),
                buf.as_mut_ptr(),
                buf.len() as i32,
                0,
            )
        };
        if len < 1 {
            return None;
        }
        char::decode_utf16(buf[..len as usize].iter().copied())
            .next()
            .and_then(Result::ok)
            .filter(|c| !c.is_control())
    }

    fn modifiers(&mut self) -> Modifiers {
        let down = |vk: i32| unsafe { GetKeyState(vk) < 0 };
        let toggled = |vk: i32| unsafe { GetKeyState(vk) & 1 != 0 };
        let mut mods = Modifiers::empty();
        mods.set(Modifiers::SHIFT, down(VK_SHIFT));
        mods.set(Modifiers::CONTROL, down(VK_CONTROL));
        mods.set(Modifiers::ALT, down(VK_MENU));
        mods.set(Modifiers::META, down(VK_LWIN) || down(VK_RWIN));
        mods.set(Modifiers::CAPS_LOCK, toggled(VK_CAPITAL));
        mods.set(Modifiers::NUM_LOCK, toggled(VK_NUMLOCK));
        mods
    }
}
