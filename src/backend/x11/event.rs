// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Decoded X11 events.
//!
//! These mirror the handful of core protocol and XInput2 fields the pump
//! needs. The connection layer fills them in from the wire; tests build
//! them by hand.

use super::Atoms;

/// An X11 window id.
pub type XWindow = u32;

/// The `mode` of a FocusIn/FocusOut event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMode {
    Normal,
    Grab,
    Ungrab,
    WhileGrabbed,
}

/// The phase of an XInput2 touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Begin,
    Update,
    End,
}

/// The subset of X11 events that feed the reconciler.
///
/// For structural notifications `event` is the window whose event mask
/// selected the notification and `window` is the window it is about. They
/// differ when the notification came from a child through
/// `SubstructureNotify`.
#[derive(Debug, Clone, PartialEq)]
pub enum XEvent {
    Configure {
        event: XWindow,
        window: XWindow,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
        /// Sent by the window manager with root-relative coordinates.
        synthetic: bool,
    },
    Map {
        event: XWindow,
        window: XWindow,
    },
    Unmap {
        event: XWindow,
        window: XWindow,
    },
    Reparent {
        event: XWindow,
        window: XWindow,
        parent: XWindow,
    },
    Destroy {
        event: XWindow,
        window: XWindow,
    },
    Focus {
        window: XWindow,
        focused: bool,
        mode: FocusMode,
    },
    Key {
        window: XWindow,
        pressed: bool,
        keycode: u8,
        time: u32,
        state: u16,
        /// The character from the connection's keymap lookup, if any.
        char: Option<char>,
    },
    Button {
        window: XWindow,
        pressed: bool,
        button: u8,
        x: i16,
        y: i16,
        state: u16,
    },
    Motion {
        window: XWindow,
        x: i16,
        y: i16,
        state: u16,
    },
    Crossing {
        window: XWindow,
        entered: bool,
        x: i16,
        y: i16,
    },
    ClientMessage {
        window: XWindow,
        type_: u32,
        data0: u32,
    },
    Property {
        window: XWindow,
        atom: u32,
    },
    Expose {
        window: XWindow,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    },
    Touch {
        window: XWindow,
        phase: TouchPhase,
        /// The XI2 touch id; unique per device while the touch lasts.
        detail: u32,
        x: f64,
        y: f64,
    },
    /// Anything else. Ignored.
    Other,
}

/// The parts of `_NET_WM_STATE` the reconciler tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetWmState {
    pub hidden: bool,
    pub maximized_horz: bool,
    pub maximized_vert: bool,
    pub fullscreen: bool,
}

impl NetWmState {
    /// Parse the atom list of a `_NET_WM_STATE` property.
    pub fn from_atoms(values: &[u32], atoms: &Atoms) -> NetWmState {
        let mut state = NetWmState::default();
        for &atom in values {
            if atom == atoms.net_wm_state_hidden {
                state.hidden = true;
            } else if atom == atoms.net_wm_state_maximized_horz {
                state.maximized_horz = true;
            } else if atom == atoms.net_wm_state_maximized_vert {
                state.maximized_vert = true;
            } else if atom == atoms.net_wm_state_fullscreen {
                state.fullscreen = true;
            }
        }
        state
    }
}
