// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! X11 event pump.
//!
//! The pump reads decoded events from an [`XEventSource`]. With the `x11`
//! feature, [`XcbSource`] provides one on top of an `x11rb` connection.

#[cfg(all(
    feature = "x11",
    any(target_os = "freebsd", target_os = "linux", target_os = "openbsd")
))]
mod connection;
mod event;
pub mod keycodes;
mod pump;
mod touch;

#[cfg(all(
    feature = "x11",
    any(target_os = "freebsd", target_os = "linux", target_os = "openbsd")
))]
pub use connection::XcbSource;
pub use event::{FocusMode, NetWmState, TouchPhase, XEvent, XWindow};
pub use pump::X11Pump;
pub use touch::TouchIdMap;

use crate::window::{WindowBuilder, WindowLevel};

macro_rules! log_x11 {
    ($val:expr) => {
        match $val {
            Ok(v) => Some(v),
            Err(e) => {
                // Errors here almost always mean the connection went away;
                // the next poll will report that.
                tracing::error!("X11 error: {}", e);
                None
            }
        }
    };
}
pub(crate) use log_x11;

/// The atoms the pump compares against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Atoms {
    pub wm_protocols: u32,
    pub wm_delete_window: u32,
    pub net_wm_state: u32,
    pub net_wm_state_hidden: u32,
    pub net_wm_state_maximized_horz: u32,
    pub net_wm_state_maximized_vert: u32,
    pub net_wm_state_fullscreen: u32,
    pub net_wm_state_above: u32,
    pub net_wm_state_below: u32,
    pub net_frame_extents: u32,
}

impl Atoms {
    /// The atom names, in field order.
    pub const NAMES: [&'static str; 10] = [
        "WM_PROTOCOLS",
        "WM_DELETE_WINDOW",
        "_NET_WM_STATE",
        "_NET_WM_STATE_HIDDEN",
        "_NET_WM_STATE_MAXIMIZED_HORZ",
        "_NET_WM_STATE_MAXIMIZED_VERT",
        "_NET_WM_STATE_FULLSCREEN",
        "_NET_WM_STATE_ABOVE",
        "_NET_WM_STATE_BELOW",
        "_NET_FRAME_EXTENTS",
    ];

    /// Build from interned values given in [`Atoms::NAMES`] order.
    pub fn from_interned(values: [u32; 10]) -> Atoms {
        let [
            wm_protocols,
            wm_delete_window,
            net_wm_state,
            net_wm_state_hidden,
            net_wm_state_maximized_horz,
            net_wm_state_maximized_vert,
            net_wm_state_fullscreen,
            net_wm_state_above,
            net_wm_state_below,
            net_frame_extents,
        ] = values;
        Atoms {
            wm_protocols,
            wm_delete_window,
            net_wm_state,
            net_wm_state_hidden,
            net_wm_state_maximized_horz,
            net_wm_state_maximized_vert,
            net_wm_state_fullscreen,
            net_wm_state_above,
            net_wm_state_below,
            net_frame_extents,
        }
    }
}

/// Where an [`X11Pump`] gets its events and window properties from.
pub trait XEventSource {
    /// The next queued event, without blocking.
    fn poll_event(&mut self) -> anyhow::Result<Option<XEvent>>;

    fn atoms(&self) -> &Atoms;

    /// The root window of the screen our windows live on.
    fn root(&self) -> XWindow;

    /// Read `_NET_WM_STATE` of `window`.
    fn net_wm_state(&mut self, window: XWindow) -> anyhow::Result<NetWmState>;

    /// Read `_NET_FRAME_EXTENTS` of `window` as `[left, right, top, bottom]`.
    fn frame_extents(&mut self, window: XWindow) -> anyhow::Result<Option<[i32; 4]>>;
}

/// The `_NET_WM_STATE` atoms a new window should start with.
pub fn initial_net_wm_state(builder: &WindowBuilder, atoms: &Atoms) -> Vec<u32> {
    match builder.level() {
        WindowLevel::Normal => Vec::new(),
        WindowLevel::AlwaysOnTop => vec![atoms.net_wm_state_above],
        WindowLevel::AlwaysOnBottom => vec![atoms.net_wm_state_below],
    }
}
