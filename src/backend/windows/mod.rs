// Copyright 2018 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Win32 event pump.
//!
//! [`Win32Pump`] consumes [`Message`]s from a [`MessageSource`]. On Windows,
//! [`Win32Source`] provides them from the thread's message queue.

pub mod keycodes;
pub mod message;
mod pump;
#[cfg(windows)]
mod source;

pub use message::{Hwnd, Message};
pub use pump::Win32Pump;
#[cfg(windows)]
pub use source::{queue_wndproc, Win32Source};

use crate::geometry::{Point, Rect};
use crate::keyboard::Modifiers;
use crate::window::{WindowBuilder, WindowLevel};
use message::*;

/// The phase of one `WM_TOUCH` contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Down,
    Move,
    Up,
}

/// One contact out of a `WM_TOUCH` message, in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchInput {
    pub id: u32,
    pub phase: TouchPhase,
    pub pos: Point,
}

/// The thread message queue plus the Win32 calls the pump needs.
pub trait MessageSource {
    /// The next message, or `None` when the queue is drained.
    fn next_message(&mut self) -> Option<Message>;

    /// Give a message we didn't consume to the system's default handling.
    fn default_handling(&mut self, msg: &Message);

    fn set_capture(&mut self, hwnd: Hwnd);

    fn release_capture(&mut self);

    /// Ask for a `WM_MOUSELEAVE` when the pointer leaves `hwnd`.
    fn track_mouse_leave(&mut self, hwnd: Hwnd);

    fn set_cursor_hidden(&mut self, hwnd: Hwnd, hidden: bool);

    /// Frame thickness of `hwnd` as `[left, right, top, bottom]`.
    fn query_insets(&mut self, hwnd: Hwnd) -> Option<[i32; 4]>;

    fn screen_to_client(&mut self, hwnd: Hwnd, pos: Point) -> Point;

    /// The region of `hwnd` waiting to be painted.
    fn update_rect(&mut self, hwnd: Hwnd) -> Option<Rect>;

    /// The contacts of a `WM_TOUCH` message, in client coordinates.
    fn touch_inputs(&mut self, msg: &Message) -> Vec<TouchInput>;

    /// The character a key down message produces, if any.
    fn translate_char(&mut self, msg: &Message) -> Option<char>;

    fn modifiers(&mut self) -> Modifiers;
}

/// `(style, ex_style)` for a new top-level or child window.
pub fn window_styles(builder: &WindowBuilder) -> (u32, u32) {
    let mut style = WS_OVERLAPPEDWINDOW;
    let mut ex_style = 0;
    if !builder.is_resizable() {
        style &= !(WS_THICKFRAME | WS_MAXIMIZEBOX);
    }
    if !builder.has_titlebar() {
        style &= !(WS_MINIMIZEBOX | WS_SYSMENU | WS_CAPTION);
        style |= WS_POPUP;
    }
    if builder.parent().is_some() {
        style &= !WS_POPUP;
        style |= WS_CHILD;
    } else {
        ex_style |= WS_EX_APPWINDOW;
    }
    // There is no bottom-most extended style; the window factory keeps those
    // at HWND_BOTTOM with SetWindowPos instead.
    if builder.level() == WindowLevel::AlwaysOnTop {
        ex_style |= WS_EX_TOPMOST;
    }
    (style, ex_style)
}
