// Copyright 2023 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! The canonical event model.
//!
//! Every backend translates its native events into [`WindowEvent`]s. The
//! variants carry only what a toolkit needs; native wire formats stop at the
//! backend boundary.

use crate::geometry::{Insets, Point, Rect, Size};
use crate::keyboard::{KeyEvent, Modifiers};
use crate::mouse::{MouseButton, MouseButtons};
use crate::window::WindowHandle;

/// A platform independent change to a window or its input state.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    /// The client area changed size.
    Resize {
        size: Size,
        during_live_resize: bool,
    },
    /// The client area moved.
    Move(Point),
    InsetsChanged(Insets),
    VisibilityChanged(bool),
    FocusChanged(bool),
    MaximizedChanged {
        horizontal: bool,
        vertical: bool,
    },
    FullscreenChanged(bool),
    /// The user asked for the window to close; the sink decides whether it does.
    DestroyRequested,
    /// The platform has torn the window down.
    Destroyed,
    Reparented(Option<WindowHandle>),
    Key(KeyEvent),
    Pointer(PointerEvent),
    Touch(TouchEvent),
    /// A region of the window needs to be painted again.
    Repaint(Rect),
}

/// What kind of pointer event this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Pressed,
    Released,
    Moved,
    Entered,
    Exited,
    WheelRotated,
}

/// A mouse (or mouse-like) pointer event.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// The button whose state changed, or [`MouseButton::None`].
    pub button: MouseButton,
    /// Buttons logically held down after this event.
    pub buttons: MouseButtons,
    pub pos: Point,
    /// Wheel rotation in notches for [`PointerKind::WheelRotated`], zero otherwise.
    /// Positive values scroll down (or right, for horizontal wheels).
    pub rotation: f32,
    /// `true` if the wheel rotation is horizontal.
    pub horizontal: bool,
    pub mods: Modifiers,
}

/// The phase of a touch contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchKind {
    Pressed,
    Released,
    Moved,
}

/// A touch contact event.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub kind: TouchKind,
    /// The stable small identity of this contact for its lifetime.
    pub slot: u8,
    pub pos: Point,
    /// Normalized pressure; `1.0` when the hardware doesn't report it.
    pub pressure: f32,
}

impl WindowEvent {
    /// A short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            WindowEvent::Resize { .. } => "resize",
            WindowEvent::Move(_) => "move",
            WindowEvent::InsetsChanged(_) => "insets",
            WindowEvent::VisibilityChanged(_) => "visibility",
            WindowEvent::FocusChanged(_) => "focus",
            WindowEvent::MaximizedChanged { .. } => "maximized",
            WindowEvent::FullscreenChanged(_) => "fullscreen",
            WindowEvent::DestroyRequested => "destroy-requested",
            WindowEvent::Destroyed => "destroyed",
            WindowEvent::Reparented(_) => "reparented",
            WindowEvent::Key(_) => "key",
            WindowEvent::Pointer(_) => "pointer",
            WindowEvent::Touch(_) => "touch",
            WindowEvent::Repaint(_) => "repaint",
        }
    }
}
