// Copyright 2018 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! The upward notification sink.

use crate::event::{PointerEvent, TouchEvent, WindowEvent};
use crate::geometry::{Insets, Point, Rect, Size};
use crate::keyboard::KeyEvent;
use crate::window::WindowHandle;

/// Toolkit behavior, supplied by the toolkit.
///
/// There is one method per [`WindowEvent`] variant. Every method returns a
/// continuation flag: `true` to keep dispatching, `false` if the window (or
/// the toolkit object behind it) is gone and the pump should stop draining
/// its current batch. A handler may destroy its window synchronously; that
/// is what `false` is for.
///
/// The methods take `&mut self`. The pump never holds a borrow of its own
/// state while calling in, but it does hold the sink's `RefCell`, so a
/// handler must not re-enter its own sink.
pub trait EventSink {
    /// The client area size changed.
    #[allow(unused_variables)]
    fn resized(&mut self, window: WindowHandle, size: Size, during_live_resize: bool) -> bool {
        true
    }

    /// The client area moved.
    #[allow(unused_variables)]
    fn moved(&mut self, window: WindowHandle, pos: Point) -> bool {
        true
    }

    #[allow(unused_variables)]
    fn insets_changed(&mut self, window: WindowHandle, insets: Insets) -> bool {
        true
    }

    #[allow(unused_variables)]
    fn visibility_changed(&mut self, window: WindowHandle, visible: bool) -> bool {
        true
    }

    #[allow(unused_variables)]
    fn focus_changed(&mut self, window: WindowHandle, focused: bool) -> bool {
        true
    }

    #[allow(unused_variables)]
    fn maximized_changed(&mut self, window: WindowHandle, horizontal: bool, vertical: bool) -> bool {
        true
    }

    #[allow(unused_variables)]
    fn fullscreen_changed(&mut self, window: WindowHandle, fullscreen: bool) -> bool {
        true
    }

    /// Called when the user asks to close the window, for example by
    /// clicking the little "X" in the titlebar.
    ///
    /// The window stays open unless the toolkit destroys it.
    #[allow(unused_variables)]
    fn destroy_requested(&mut self, window: WindowHandle) -> bool {
        true
    }

    /// The platform has destroyed the window. This is the last call for it.
    #[allow(unused_variables)]
    fn destroyed(&mut self, window: WindowHandle) -> bool {
        true
    }

    #[allow(unused_variables)]
    fn reparented(&mut self, window: WindowHandle, parent: Option<WindowHandle>) -> bool {
        true
    }

    #[allow(unused_variables)]
    fn key(&mut self, window: WindowHandle, event: &KeyEvent) -> bool {
        true
    }

    #[allow(unused_variables)]
    fn pointer(&mut self, window: WindowHandle, event: &PointerEvent) -> bool {
        true
    }

    #[allow(unused_variables)]
    fn touch(&mut self, window: WindowHandle, event: &TouchEvent) -> bool {
        true
    }

    /// Part of the window needs to be painted again.
    #[allow(unused_variables)]
    fn repaint(&mut self, window: WindowHandle, rect: Rect) -> bool {
        true
    }
}

/// Call the sink method matching `event`.
pub fn dispatch_event(sink: &mut dyn EventSink, window: WindowHandle, event: &WindowEvent) -> bool {
    match event {
        WindowEvent::Resize {
            size,
            during_live_resize,
        } => sink.resized(window, *size, *during_live_resize),
        WindowEvent::Move(pos) => sink.moved(window, *pos),
        WindowEvent::InsetsChanged(insets) => sink.insets_changed(window, *insets),
        WindowEvent::VisibilityChanged(visible) => sink.visibility_changed(window, *visible),
        WindowEvent::FocusChanged(focused) => sink.focus_changed(window, *focused),
        WindowEvent::MaximizedChanged {
            horizontal,
            vertical,
        } => sink.maximized_changed(window, *horizontal, *vertical),
        WindowEvent::FullscreenChanged(fullscreen) => sink.fullscreen_changed(window, *fullscreen),
        WindowEvent::DestroyRequested => sink.destroy_requested(window),
        WindowEvent::Destroyed => sink.destroyed(window),
        WindowEvent::Reparented(parent) => sink.reparented(window, *parent),
        WindowEvent::Key(event) => sink.key(window, event),
        WindowEvent::Pointer(event) => sink.pointer(window, event),
        WindowEvent::Touch(event) => sink.touch(window, event),
        WindowEvent::Repaint(rect) => sink.repaint(window, *rect),
    }
}
