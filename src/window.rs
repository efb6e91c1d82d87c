// Copyright 2018 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Platform independent window types.

use std::fmt;

use bitflags::bitflags;

use crate::geometry::{Point, Size};
use crate::state::DEFAULT_TOUCH_SLOTS;

/// An opaque native window identifier.
///
/// This is an X11 `Window`, a Win32 `HWND`, a `KDWindow*` or an AppKit
/// `NSWindow*`, widened to 64 bits. The platform owns the window; holding a
/// `WindowHandle` keeps nothing alive.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowHandle(u64);

impl WindowHandle {
    /// Create a handle from a raw native value.
    pub const fn from_raw(raw: u64) -> WindowHandle {
        WindowHandle(raw)
    }

    /// Get the raw native value.
    pub const fn into_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "WindowHandle(0x{:x})", self.0)
    }
}

/// Levels in the window system - Z order for display purposes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum WindowLevel {
    /// A normal top level window.
    #[default]
    Normal,
    /// A window that stays above other windows.
    AlwaysOnTop,
    /// A window that stays below other windows.
    AlwaysOnBottom,
}

bitflags! {
    /// Reconciled boolean window state.
    pub struct WindowFlags: u32 {
        const VISIBLE = 1;
        const FOCUSED = 1 << 1;
        const MINIMIZED = 1 << 2;
        const MAXIMIZED_HORZ = 1 << 3;
        const MAXIMIZED_VERT = 1 << 4;
        const FULLSCREEN = 1 << 5;
        const ALWAYS_ON_TOP = 1 << 6;
        const ALWAYS_ON_BOTTOM = 1 << 7;
        const IS_CHILD = 1 << 8;
    }
}

/// Creation-time configuration for a window.
///
/// This is consumed once, when the platform window is created, to pick the
/// initial native styles and to seed the window's reconciled state. It plays
/// no part in the steady-state event loop.
#[derive(Debug, Clone)]
pub struct WindowBuilder {
    pub(crate) size: Size,
    pub(crate) position: Option<Point>,
    pub(crate) resizable: bool,
    pub(crate) show_titlebar: bool,
    pub(crate) level: WindowLevel,
    pub(crate) parent: Option<WindowHandle>,
    pub(crate) touch_slots: usize,
    pub(crate) wants_plane: bool,
}

impl Default for WindowBuilder {
    fn default() -> Self {
        WindowBuilder {
            size: Size::new(640, 480),
            position: None,
            resizable: true,
            show_titlebar: true,
            level: WindowLevel::Normal,
            parent: None,
            touch_slots: DEFAULT_TOUCH_SLOTS,
            wants_plane: false,
        }
    }
}

impl WindowBuilder {
    /// Create a new `WindowBuilder` with default settings.
    pub fn new() -> WindowBuilder {
        WindowBuilder::default()
    }

    /// Set the window's initial client area size, in pixels.
    ///
    /// Zero dimensions are bumped to one pixel; a visible window never has
    /// an empty client area.
    pub fn set_size(&mut self, size: Size) {
        self.size = Size::new(size.width.max(1), size.height.max(1));
    }

    /// Set the initial position. Without this, the platform picks one.
    pub fn set_position(&mut self, position: Point) {
        self.position = Some(position);
    }

    /// Set whether the window should be resizable.
    pub fn resizable(&mut self, resizable: bool) {
        self.resizable = resizable;
    }

    /// Set whether the window should have a titlebar and decorations.
    pub fn show_titlebar(&mut self, show_titlebar: bool) {
        self.show_titlebar = show_titlebar;
    }

    /// Sets the initial [`WindowLevel`].
    pub fn set_level(&mut self, level: WindowLevel) {
        self.level = level;
    }

    /// Make this a child of `parent`.
    pub fn set_parent(&mut self, parent: WindowHandle) {
        self.parent = Some(parent);
    }

    /// Set how many concurrent touch contacts are tracked.
    pub fn set_touch_slots(&mut self, slots: usize) {
        self.touch_slots = slots.min(u8::MAX as usize + 1);
    }

    /// Request a compositor plane for this window.
    pub fn request_plane(&mut self, wants_plane: bool) {
        self.wants_plane = wants_plane;
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn is_resizable(&self) -> bool {
        self.resizable
    }

    pub fn has_titlebar(&self) -> bool {
        self.show_titlebar
    }

    pub fn level(&self) -> WindowLevel {
        self.level
    }

    pub fn parent(&self) -> Option<WindowHandle> {
        self.parent
    }

    /// The flags a freshly created window starts with.
    pub fn initial_flags(&self) -> WindowFlags {
        let mut flags = WindowFlags::empty();
        match self.level {
            WindowLevel::Normal => {}
            WindowLevel::AlwaysOnTop => flags |= WindowFlags::ALWAYS_ON_TOP,
            WindowLevel::AlwaysOnBottom => flags |= WindowFlags::ALWAYS_ON_BOTTOM,
        }
        if self.parent.is_some() {
            flags |= WindowFlags::IS_CHILD;
        }
        flags
    }
}
