// Copyright 2023 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! The state reconciler.
//!
//! Each operation takes one decoded platform signal, folds it into the
//! window's [`UserData`], and returns the canonical events that signal
//! produces: none if nothing actually changed, one or more otherwise.
//!
//! While a window is in its creation phase, state probes are recorded but
//! nothing is emitted, and input is dropped. The first completed show moves
//! the window to [`Lifecycle::Live`] and emits one catch-up batch describing
//! the current state. [`UserData::on_destroy_confirmed`] is the only
//! operation that emits during creation.

use tracing::{debug, trace};

use crate::event::{PointerEvent, PointerKind, TouchEvent, TouchKind, WindowEvent};
use crate::geometry::{Geometry, Insets, Point, Rect, Size};
use crate::keyboard::{KeyEvent, Modifiers};
use crate::mouse::MouseButton;
use crate::state::{Lifecycle, UserData};
use crate::window::{WindowFlags, WindowHandle};

/// An ordered batch of events produced by one reconciler call.
pub type Events = Vec<WindowEvent>;

impl UserData {
    fn is_live(&self) -> bool {
        self.lifecycle == Lifecycle::Live
    }

    /// Fold a full geometry probe into the stored state.
    ///
    /// A size change yields `Resize`, a position change yields `Move`; when
    /// both change, `Resize` comes first. Probes with an empty size keep the
    /// stored size.
    pub fn on_geometry_changed(&mut self, x: i32, y: i32, width: u32, height: u32) -> Events {
        self.reconcile_geometry(Geometry::new(x, y, width, height), false)
    }

    /// Like [`on_geometry_changed`](Self::on_geometry_changed), for probes
    /// that arrive while the user is dragging a window edge.
    pub fn on_live_resize(&mut self, x: i32, y: i32, width: u32, height: u32) -> Events {
        self.reconcile_geometry(Geometry::new(x, y, width, height), true)
    }

    /// A size-only probe; the stored position is kept.
    pub fn on_resized(&mut self, size: Size, during_live_resize: bool) -> Events {
        let geometry = Geometry {
            width: size.width,
            height: size.height,
            ..self.geometry
        };
        self.reconcile_geometry(geometry, during_live_resize)
    }

    /// A position-only probe; the stored size is kept.
    pub fn on_moved(&mut self, pos: Point) -> Events {
        let geometry = Geometry {
            x: pos.x,
            y: pos.y,
            ..self.geometry
        };
        self.reconcile_geometry(geometry, false)
    }

    fn reconcile_geometry(&mut self, mut probe: Geometry, during_live_resize: bool) -> Events {
        if probe.size().is_empty() {
            trace!("{:?}: ignoring empty size {:?}", self.handle, probe.size());
            probe.width = self.geometry.width;
            probe.height = self.geometry.height;
        }
        let old = self.geometry;
        if probe == old {
            return Events::new();
        }
        self.geometry = probe;
        if !self.is_live() {
            return Events::new();
        }
        let mut events = Events::new();
        if probe.size() != old.size() {
            events.push(WindowEvent::Resize {
                size: probe.size(),
                during_live_resize,
            });
        }
        if probe.position() != old.position() {
            events.push(WindowEvent::Move(probe.position()));
        }
        events
    }

    /// Fold a decoration insets probe into the stored state.
    ///
    /// Partially known probes are refused, and a known value never regresses
    /// to the "unknown" sentinel.
    pub fn on_insets_probe(&mut self, left: i32, right: i32, top: i32, bottom: i32) -> Events {
        let insets = match Insets::new(left, right, top, bottom) {
            Some(insets) if insets.is_known() => insets,
            Some(_) => return Events::new(),
            None => {
                debug!(
                    "{:?}: refusing partial insets ({left}, {right}, {top}, {bottom})",
                    self.handle
                );
                return Events::new();
            }
        };
        if insets == self.insets {
            return Events::new();
        }
        self.insets = insets;
        if !self.is_live() {
            return Events::new();
        }
        vec![WindowEvent::InsetsChanged(insets)]
    }

    /// The window became visible or hidden.
    ///
    /// Becoming visible during the creation phase completes the first show.
    pub fn on_visibility(&mut self, now_visible: bool) -> Events {
        match self.lifecycle {
            Lifecycle::Creating if now_visible => self.on_shown(),
            Lifecycle::Creating => {
                self.flags.remove(WindowFlags::VISIBLE);
                Events::new()
            }
            Lifecycle::Live => {
                self.hidden_by_minimize = false;
                self.flip(WindowFlags::VISIBLE, now_visible)
                    .map(WindowEvent::VisibilityChanged)
                    .into_iter()
                    .collect()
            }
            Lifecycle::Destroying => Events::new(),
        }
    }

    /// The first explicit show completed.
    ///
    /// Moves the window from `Creating` to `Live` and returns the catch-up
    /// batch: `Resize`, `Move`, `InsetsChanged` (when known), `FocusChanged`,
    /// `MaximizedChanged` and `FullscreenChanged` (when set), and finally
    /// `VisibilityChanged`. On a live window this is a plain visibility probe.
    pub fn on_shown(&mut self) -> Events {
        match self.lifecycle {
            Lifecycle::Creating => {}
            Lifecycle::Live => return self.on_visibility(true),
            Lifecycle::Destroying => return Events::new(),
        }
        self.lifecycle = Lifecycle::Live;
        self.flags.insert(WindowFlags::VISIBLE);
        self.flags.remove(WindowFlags::MINIMIZED);
        self.hidden_by_minimize = false;
        debug!("{:?}: creation phase over", self.handle);

        let mut events = vec![
            WindowEvent::Resize {
                size: self.geometry.size(),
                during_live_resize: false,
            },
            WindowEvent::Move(self.geometry.position()),
        ];
        if self.insets.is_known() {
            events.push(WindowEvent::InsetsChanged(self.insets));
        }
        events.push(WindowEvent::FocusChanged(
            self.flags.contains(WindowFlags::FOCUSED),
        ));
        let horizontal = self.flags.contains(WindowFlags::MAXIMIZED_HORZ);
        let vertical = self.flags.contains(WindowFlags::MAXIMIZED_VERT);
        if horizontal || vertical {
            events.push(WindowEvent::MaximizedChanged {
                horizontal,
                vertical,
            });
        }
        if self.flags.contains(WindowFlags::FULLSCREEN) {
            events.push(WindowEvent::FullscreenChanged(true));
        }
        events.push(WindowEvent::VisibilityChanged(true));
        events
    }

    /// The window gained or lost keyboard focus.
    ///
    /// Losing focus while holding pointer capture with no button down drops
    /// the capture. That is local cleanup, not an event.
    pub fn on_focus(&mut self, now_focused: bool) -> Events {
        if self.lifecycle == Lifecycle::Destroying {
            return Events::new();
        }
        let changed = self.flip(WindowFlags::FOCUSED, now_focused);
        if !now_focused && self.pointer.captured && self.pointer.buttons.is_empty() {
            debug!("{:?}: releasing pointer capture on focus loss", self.handle);
            self.pointer.captured = false;
        }
        if !self.is_live() {
            return Events::new();
        }
        changed
            .map(WindowEvent::FocusChanged)
            .into_iter()
            .collect()
    }

    /// The maximized state changed (or was re-reported).
    pub fn on_maximize_restore(&mut self, horizontal: bool, vertical: bool) -> Events {
        if self.lifecycle == Lifecycle::Destroying {
            return Events::new();
        }
        let old = (
            self.flags.contains(WindowFlags::MAXIMIZED_HORZ),
            self.flags.contains(WindowFlags::MAXIMIZED_VERT),
        );
        if old == (horizontal, vertical) {
            return Events::new();
        }
        self.flags.set(WindowFlags::MAXIMIZED_HORZ, horizontal);
        self.flags.set(WindowFlags::MAXIMIZED_VERT, vertical);
        if !self.is_live() {
            return Events::new();
        }
        vec![WindowEvent::MaximizedChanged {
            horizontal,
            vertical,
        }]
    }

    pub fn on_fullscreen_toggle(&mut self, now: bool) -> Events {
        if self.lifecycle == Lifecycle::Destroying {
            return Events::new();
        }
        let changed = self.flip(WindowFlags::FULLSCREEN, now);
        if !self.is_live() {
            return Events::new();
        }
        changed
            .map(WindowEvent::FullscreenChanged)
            .into_iter()
            .collect()
    }

    /// The window was iconified or restored.
    ///
    /// A minimized window is reported as hidden. Restoring only reports it
    /// visible again if minimizing is what hid it; repeated reports of the
    /// same state emit nothing.
    pub fn on_minimized(&mut self, now: bool) -> Events {
        if self.lifecycle == Lifecycle::Destroying
            || self.flip(WindowFlags::MINIMIZED, now).is_none()
        {
            return Events::new();
        }
        let visible = if now {
            self.hidden_by_minimize = self.flags.contains(WindowFlags::VISIBLE);
            false
        } else if std::mem::take(&mut self.hidden_by_minimize) {
            true
        } else {
            return Events::new();
        };
        if !self.is_live() {
            return Events::new();
        }
        self.flip(WindowFlags::VISIBLE, visible)
            .map(WindowEvent::VisibilityChanged)
            .into_iter()
            .collect()
    }

    /// The user asked to close the window. Never deduplicated.
    pub fn on_close_signal(&mut self) -> Events {
        if !self.is_live() {
            return Events::new();
        }
        vec![WindowEvent::DestroyRequested]
    }

    /// The platform destroyed the window.
    ///
    /// Always emits `Destroyed`, even during creation. From here on the
    /// registry no longer hands this data out.
    pub fn on_destroy_confirmed(&mut self) -> Events {
        if self.lifecycle == Lifecycle::Destroying {
            return Events::new();
        }
        self.lifecycle = Lifecycle::Destroying;
        self.flags.remove(WindowFlags::VISIBLE | WindowFlags::FOCUSED);
        self.pointer = Default::default();
        self.touch.clear();
        vec![WindowEvent::Destroyed]
    }

    /// The window moved to a new parent; `None` means it is top level.
    pub fn on_reparent(&mut self, parent: Option<WindowHandle>) -> Events {
        if self.lifecycle == Lifecycle::Destroying || self.parent == parent {
            return Events::new();
        }
        self.parent = parent;
        self.flags.set(WindowFlags::IS_CHILD, parent.is_some());
        if !self.is_live() {
            return Events::new();
        }
        vec![WindowEvent::Reparented(parent)]
    }

    /// A touch contact went down.
    ///
    /// When every slot is taken the contact is dropped and nothing is emitted.
    pub fn on_touch_begin(&mut self, platform_id: u64, pos: Point, pressure: f32) -> Events {
        if !self.is_live() {
            return Events::new();
        }
        match self.touch.begin(platform_id, pos) {
            Ok(slot) => vec![WindowEvent::Touch(TouchEvent {
                kind: TouchKind::Pressed,
                slot,
                pos,
                pressure,
            })],
            Err(e) => {
                debug!("{:?}: dropping touch {platform_id}: {e}", self.handle);
                Events::new()
            }
        }
    }

    pub fn on_touch_update(&mut self, platform_id: u64, pos: Point, pressure: f32) -> Events {
        if !self.is_live() {
            return Events::new();
        }
        match self.touch.update(platform_id, pos) {
            Some(slot) => vec![WindowEvent::Touch(TouchEvent {
                kind: TouchKind::Moved,
                slot,
                pos,
                pressure,
            })],
            None => Events::new(),
        }
    }

    /// A touch contact lifted. Its slot becomes free again.
    pub fn on_touch_end(&mut self, platform_id: u64) -> Events {
        if !self.is_live() {
            return Events::new();
        }
        match self.touch.end(platform_id) {
            Some((slot, pos)) => vec![WindowEvent::Touch(TouchEvent {
                kind: TouchKind::Released,
                slot,
                pos,
                pressure: 0.0,
            })],
            None => Events::new(),
        }
    }

    /// A physical key transition. Never deduplicated.
    pub fn on_key(&mut self, event: KeyEvent) -> Events {
        if !self.is_live() {
            return Events::new();
        }
        vec![WindowEvent::Key(event)]
    }

    /// A pointer button went down or up.
    ///
    /// The first button down takes capture and the last button up releases it.
    pub fn on_pointer_button(
        &mut self,
        pressed: bool,
        button: MouseButton,
        pos: Point,
        mods: Modifiers,
    ) -> Events {
        if !self.is_live() || button.is_none() {
            return Events::new();
        }
        let kind = if pressed {
            self.pointer.buttons.insert(button);
            self.pointer.captured = true;
            PointerKind::Pressed
        } else {
            self.pointer.buttons.remove(button);
            if self.pointer.buttons.is_empty() {
                self.pointer.captured = false;
            }
            PointerKind::Released
        };
        vec![WindowEvent::Pointer(
            self.pointer_event(kind, button, pos, mods),
        )]
    }

    pub fn on_pointer_move(&mut self, pos: Point, mods: Modifiers) -> Events {
        if !self.is_live() {
            return Events::new();
        }
        vec![WindowEvent::Pointer(self.pointer_event(
            PointerKind::Moved,
            MouseButton::None,
            pos,
            mods,
        ))]
    }

    /// The pointer entered or left the client area. Flip-only.
    pub fn on_pointer_crossing(&mut self, entered: bool, pos: Point) -> Events {
        if !self.is_live() || self.pointer.inside == entered {
            return Events::new();
        }
        self.pointer.inside = entered;
        let kind = if entered {
            PointerKind::Entered
        } else {
            PointerKind::Exited
        };
        vec![WindowEvent::Pointer(self.pointer_event(
            kind,
            MouseButton::None,
            pos,
            Modifiers::empty(),
        ))]
    }

    /// The wheel turned by `rotation` notches.
    pub fn on_pointer_wheel(
        &mut self,
        rotation: f32,
        horizontal: bool,
        pos: Point,
        mods: Modifiers,
    ) -> Events {
        if !self.is_live() || rotation == 0.0 {
            return Events::new();
        }
        let mut event =
            self.pointer_event(PointerKind::WheelRotated, MouseButton::None, pos, mods);
        event.rotation = rotation;
        event.horizontal = horizontal;
        vec![WindowEvent::Pointer(event)]
    }

    /// The platform took pointer capture away from us.
    pub fn on_capture_lost(&mut self) {
        self.pointer.captured = false;
        self.pointer.buttons.clear();
    }

    /// Show or hide the pointer while it is over the client area.
    pub fn set_pointer_visible(&mut self, visible: bool) {
        self.pointer.visible = visible;
    }

    /// Part of the window needs painting.
    pub fn on_repaint(&mut self, rect: Rect) -> Events {
        if !self.is_live() || rect.size.is_empty() {
            return Events::new();
        }
        vec![WindowEvent::Repaint(rect)]
    }

    /// Set `flag` to `now`, returning `Some(now)` if that was a change.
    fn flip(&mut self, flag: WindowFlags, now: bool) -> Option<bool> {
        if self.flags.contains(flag) == now {
            None
        } else {
            self.flags.set(flag, now);
            Some(now)
        }
    }

    fn pointer_event(
        &self,
        kind: PointerKind,
        button: MouseButton,
        pos: Point,
        mods: Modifiers,
    ) -> PointerEvent {
        PointerEvent {
            kind,
            button,
            buttons: self.pointer.buttons,
            pos,
            rotation: 0.0,
            horizontal: false,
            mods,
        }
    }
}
