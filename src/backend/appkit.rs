// Copyright 2019 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! AppKit delegate entry points.
//!
//! AppKit has no event queue we could drain; it calls into the window
//! delegate and content view from its own run loop. The Objective-C glue
//! forwards those calls to the functions here, which reconcile and deliver
//! immediately. Screen rectangles arrive in Cocoa coordinates (origin at the
//! bottom left of the primary screen) and are flipped here. The content view
//! is flipped, so view coordinates already have a top-left origin.

use tracing::trace;

use crate::display::{Delivery, Display};
use crate::geometry::{Point, Rect};
use crate::keyboard::{KeyEvent, Modifiers};
use crate::mouse::MouseButton;
use crate::reconcile::Events;
use crate::window::WindowHandle;

/// An `NSRect`, in points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NsRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NsRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> NsRect {
        NsRect {
            x,
            y,
            width,
            height,
        }
    }

    fn top(&self) -> f64 {
        self.y + self.height
    }

    fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// One `NSWindow` and its flipped content view.
#[derive(Debug, Clone, Copy)]
pub struct AppKitWindow {
    handle: WindowHandle,
    /// Height of the primary screen, for flipping screen coordinates.
    screen_height: f64,
}

impl AppKitWindow {
    pub fn new(handle: WindowHandle, screen_height: f64) -> AppKitWindow {
        AppKitWindow {
            handle,
            screen_height,
        }
    }

    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    /// `windowDidResize:` / `windowDidMove:` with the window frame and the
    /// content rect, both in screen coordinates.
    pub fn frame_changed(
        &self,
        display: &mut Display,
        frame: NsRect,
        content: NsRect,
        live_resize: bool,
    ) -> Delivery {
        let x = content.x.round() as i32;
        let y = (self.screen_height - content.top()).round() as i32;
        let width = content.width.round().max(0.0) as u32;
        let height = content.height.round().max(0.0) as u32;
        let insets = [
            (content.x - frame.x).round() as i32,
            (frame.right() - content.right()).round() as i32,
            (frame.top() - content.top()).round() as i32,
            (content.y - frame.y).round() as i32,
        ];
        display.reconcile(self.handle, |data| {
            let mut events = if live_resize {
                data.on_live_resize(x, y, width, height)
            } else {
                data.on_geometry_changed(x, y, width, height)
            };
            let [l, r, t, b] = insets;
            events.extend(data.on_insets_probe(l, r, t, b));
            events
        })
    }

    /// The window was ordered on or off screen.
    pub fn visibility_changed(&self, display: &mut Display, visible: bool) -> Delivery {
        display.reconcile(self.handle, |data| data.on_visibility(visible))
    }

    /// `windowDidBecomeKey:` / `windowDidResignKey:`.
    pub fn key_status_changed(&self, display: &mut Display, is_key: bool) -> Delivery {
        display.reconcile(self.handle, |data| data.on_focus(is_key))
    }

    /// `windowDidMiniaturize:` / `windowDidDeminiaturize:`.
    pub fn miniaturized(&self, display: &mut Display, miniaturized: bool) -> Delivery {
        display.reconcile(self.handle, |data| data.on_minimized(miniaturized))
    }

    /// `windowDidEnterFullScreen:` / `windowDidExitFullScreen:`.
    pub fn full_screen_changed(&self, display: &mut Display, full_screen: bool) -> Delivery {
        display.reconcile(self.handle, |data| data.on_fullscreen_toggle(full_screen))
    }

    /// `windowDidResize:` after a zoom; AppKit has no per-axis zoom.
    pub fn zoomed(&self, display: &mut Display, zoomed: bool) -> Delivery {
        display.reconcile(self.handle, |data| data.on_maximize_restore(zoomed, zoomed))
    }

    /// `windowShouldClose:`. The glue answers NO; closing is up to the sink.
    pub fn should_close(&self, display: &mut Display) -> Delivery {
        display.reconcile(self.handle, |data| data.on_close_signal())
    }

    /// `windowWillClose:`. The handle is freed after this.
    pub fn will_close(&self, display: &mut Display) -> Delivery {
        display.confirm_destroyed(self.handle)
    }

    pub fn key(&self, display: &mut Display, event: KeyEvent) -> Delivery {
        display.reconcile(self.handle, |data| data.on_key(event))
    }

    pub fn mouse_button(
        &self,
        display: &mut Display,
        pressed: bool,
        button: MouseButton,
        pos: Point,
        mods: Modifiers,
    ) -> Delivery {
        display.reconcile(self.handle, |data| {
            data.on_pointer_button(pressed, button, pos, mods)
        })
    }

    pub fn mouse_moved(&self, display: &mut Display, pos: Point, mods: Modifiers) -> Delivery {
        display.reconcile(self.handle, |data| data.on_pointer_move(pos, mods))
    }

    /// `mouseEntered:` / `mouseExited:` from the view's tracking area.
    pub fn mouse_crossing(&self, display: &mut Display, entered: bool, pos: Point) -> Delivery {
        display.reconcile(self.handle, |data| data.on_pointer_crossing(entered, pos))
    }

    /// `scrollWheel:` with the event's `deltaX`/`deltaY` in lines.
    pub fn scroll_wheel(
        &self,
        display: &mut Display,
        delta_x: f64,
        delta_y: f64,
        pos: Point,
        mods: Modifiers,
    ) -> Delivery {
        display.reconcile(self.handle, |data| {
            // Cocoa deltas are positive when scrolling up or left.
            let mut events = Events::new();
            if delta_y != 0.0 {
                events.extend(data.on_pointer_wheel(-delta_y as f32, false, pos, mods));
            }
            if delta_x != 0.0 {
                events.extend(data.on_pointer_wheel(-delta_x as f32, true, pos, mods));
            }
            events
        })
    }

    /// `drawRect:` with the dirty rect in (flipped) view coordinates.
    pub fn draw_rect(&self, display: &mut Display, dirty: NsRect) -> Delivery {
        let rect = Rect::new(
            dirty.x.floor() as i32,
            dirty.y.floor() as i32,
            dirty.width.ceil().max(0.0) as u32,
            dirty.height.ceil().max(0.0) as u32,
        );
        trace!("{:?}: drawRect {:?}", self.handle, rect);
        display.reconcile(self.handle, |data| data.on_repaint(rect))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::{Insets, Size};
    use crate::test_util::Recorder;
    use crate::window::WindowBuilder;
    use crate::WindowEvent;
    use test_log::test;

    #[test]
    fn frame_is_flipped() {
        let mut display = Display::new();
        let sink = Recorder::new();
        let handle = WindowHandle::from_raw(0x7f00_1000);
        display
            .create_window(handle, &WindowBuilder::new(), &sink)
            .unwrap();
        let window = AppKitWindow::new(handle, 1000.0);
        // A titlebar of 28 points, no side borders.
        let frame = NsRect::new(100.0, 300.0, 800.0, 628.0);
        let content = NsRect::new(100.0, 300.0, 800.0, 600.0);
        window.frame_changed(&mut display, frame, content, false);
        window.visibility_changed(&mut display, true);
        assert_eq!(
            sink.borrow().events,
            vec![
                WindowEvent::Resize {
                    size: Size::new(800, 600),
                    during_live_resize: false
                },
                WindowEvent::Move(Point::new(100, 100)),
                WindowEvent::InsetsChanged(Insets::new(0, 0, 28, 0).unwrap()),
                WindowEvent::FocusChanged(false),
                WindowEvent::VisibilityChanged(true),
            ]
        );
    }

    #[test]
    fn close_then_will_close() {
        let mut display = Display::new();
        let sink = Recorder::new();
        let handle = WindowHandle::from_raw(0x7f00_2000);
        display
            .create_window(handle, &WindowBuilder::new(), &sink)
            .unwrap();
        let window = AppKitWindow::new(handle, 1000.0);
        window.visibility_changed(&mut display, true);
        sink.borrow_mut().clear();

        window.scroll_wheel(&mut display, 0.0, 2.0, Point::ORIGIN, Modifiers::empty());
        window.should_close(&mut display);
        window.will_close(&mut display);
        assert_eq!(
            window.key_status_changed(&mut display, true),
            Delivery::UnknownHandle
        );
        assert_eq!(
            sink.borrow().names(),
            vec!["pointer", "destroy-requested", "destroyed"]
        );
    }
}
