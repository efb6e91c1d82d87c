// Copyright 2023 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::event::{PointerEvent, TouchEvent, WindowEvent};
use crate::geometry::{Insets, Point, Rect, Size};
use crate::keyboard::KeyEvent;
use crate::sink::EventSink;
use crate::window::WindowHandle;

/// Which event makes a [`Recorder`] return `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    Resize,
    Focus,
    Destroyed,
}

impl Stop {
    fn matches(self, event: &WindowEvent) -> bool {
        matches!(
            (self, event),
            (Stop::Resize, WindowEvent::Resize { .. })
                | (Stop::Focus, WindowEvent::FocusChanged(_))
                | (Stop::Destroyed, WindowEvent::Destroyed)
        )
    }
}

/// A sink that remembers everything it is told.
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<WindowEvent>,
    pub windows: Vec<WindowHandle>,
    stop: Option<Stop>,
}

impl Recorder {
    pub fn new() -> Rc<RefCell<Recorder>> {
        Rc::new(RefCell::new(Recorder::default()))
    }

    pub fn stopping_at(stop: Stop) -> Rc<RefCell<Recorder>> {
        Rc::new(RefCell::new(Recorder {
            stop: Some(stop),
            ..Default::default()
        }))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.iter().map(WindowEvent::name).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.windows.clear();
    }

    fn record(&mut self, window: WindowHandle, event: WindowEvent) -> bool {
        let stop = self.stop.map(|s| s.matches(&event)).unwrap_or(false);
        self.events.push(event);
        self.windows.push(window);
        !stop
    }
}

impl EventSink for Recorder {
    fn resized(&mut self, window: WindowHandle, size: Size, during_live_resize: bool) -> bool {
        self.record(
            window,
            WindowEvent::Resize {
                size,
                during_live_resize,
            },
        )
    }

    fn moved(&mut self, window: WindowHandle, pos: Point) -> bool {
        self.record(window, WindowEvent::Move(pos))
    }

    fn insets_changed(&mut self, window: WindowHandle, insets: Insets) -> bool {
        self.record(window, WindowEvent::InsetsChanged(insets))
    }

    fn visibility_changed(&mut self, window: WindowHandle, visible: bool) -> bool {
        self.record(window, WindowEvent::VisibilityChanged(visible))
    }

    fn focus_changed(&mut self, window: WindowHandle, focused: bool) -> bool {
        self.record(window, WindowEvent::FocusChanged(focused))
    }

    fn maximized_changed(&mut self, window: WindowHandle, horizontal: bool, vertical: bool) -> bool {
        self.record(
            window,
            WindowEvent::MaximizedChanged {
                horizontal,
                vertical,
            },
        )
    }

    fn fullscreen_changed(&mut self, window: WindowHandle, fullscreen: bool) -> bool {
        self.record(window, WindowEvent::FullscreenChanged(fullscreen))
    }

    fn destroy_requested(&mut self, window: WindowHandle) -> bool {
        self.record(window, WindowEvent::DestroyRequested)
    }

    fn destroyed(&mut self, window: WindowHandle) -> bool {
        self.record(window, WindowEvent::Destroyed)
    }

    fn reparented(&mut self, window: WindowHandle, parent: Option<WindowHandle>) -> bool {
        self.record(window, WindowEvent::Reparented(parent))
    }

    fn key(&mut self, window: WindowHandle, event: &KeyEvent) -> bool {
        self.record(window, WindowEvent::Key(event.clone()))
    }

    fn pointer(&mut self, window: WindowHandle, event: &PointerEvent) -> bool {
        self.record(window, WindowEvent::Pointer(event.clone()))
    }

    fn touch(&mut self, window: WindowHandle, event: &TouchEvent) -> bool {
        self.record(window, WindowEvent::Touch(event.clone()))
    }

    fn repaint(&mut self, window: WindowHandle, rect: Rect) -> bool {
        self.record(window, WindowEvent::Repaint(rect))
    }
}
