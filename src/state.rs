// Copyright 2023 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Per-window user data: the only mutable state the core owns.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::error::Error;
use crate::geometry::{Geometry, Insets, Point};
use crate::mouse::MouseButtons;
use crate::sink::EventSink;
use crate::window::{WindowBuilder, WindowFlags, WindowHandle};

/// How many touch contacts are tracked unless configured otherwise.
pub const DEFAULT_TOUCH_SLOTS: usize = 10;

/// Where a window is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Created, but the first show hasn't completed. Nothing is emitted.
    Creating,
    /// Shown at least once; events flow.
    Live,
    /// The platform confirmed destruction. Lookups fail from here on.
    Destroying,
}

/// Pointer bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerState {
    /// We hold (or believe we hold) the native pointer capture.
    pub captured: bool,
    /// The pointer is inside the client area.
    pub inside: bool,
    /// The pointer should be drawn while over the client area.
    pub visible: bool,
    /// Buttons logically held down.
    pub buttons: MouseButtons,
}

impl Default for PointerState {
    fn default() -> Self {
        PointerState {
            captured: false,
            inside: false,
            visible: true,
            buttons: MouseButtons::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Contact {
    platform_id: u64,
    last: Point,
}

/// Maps platform touch ids to small, stable slot indices.
///
/// The table has a fixed capacity; a slot keeps its index from touch-down to
/// the matching touch-up and is only reused after that.
#[derive(Debug, Clone)]
pub struct TouchTracker {
    slots: Vec<Option<Contact>>,
}

impl TouchTracker {
    pub fn with_capacity(capacity: usize) -> TouchTracker {
        TouchTracker {
            slots: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of contacts currently down.
    pub fn active(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn slot_of(&self, platform_id: u64) -> Option<u8> {
        self.slots
            .iter()
            .position(|s| matches!(s, Some(c) if c.platform_id == platform_id))
            .map(|idx| idx as u8)
    }

    /// Claim the first free slot for `platform_id`.
    ///
    /// A contact that is already down keeps its slot.
    pub fn begin(&mut self, platform_id: u64, pos: Point) -> Result<u8, Error> {
        if let Some(slot) = self.slot_of(platform_id) {
            self.slots[slot as usize] = Some(Contact {
                platform_id,
                last: pos,
            });
            return Ok(slot);
        }
        match self.slots.iter().position(Option::is_none) {
            Some(idx) => {
                self.slots[idx] = Some(Contact {
                    platform_id,
                    last: pos,
                });
                Ok(idx as u8)
            }
            None => Err(Error::TouchCapacityExceeded {
                capacity: self.capacity(),
            }),
        }
    }

    /// Record a new position for a contact that is down.
    pub fn update(&mut self, platform_id: u64, pos: Point) -> Option<u8> {
        let slot = self.slot_of(platform_id)?;
        if let Some(contact) = self.slots[slot as usize].as_mut() {
            contact.last = pos;
        }
        Some(slot)
    }

    /// Release a contact, returning its slot and last known position.
    pub fn end(&mut self, platform_id: u64) -> Option<(u8, Point)> {
        let slot = self.slot_of(platform_id)?;
        self.slots[slot as usize]
            .take()
            .map(|contact| (slot, contact.last))
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }
}

/// The reconciled state of one live window.
///
/// Only the reconciler (see the `reconcile` module) mutates this.
pub struct UserData {
    pub(crate) handle: WindowHandle,
    pub(crate) geometry: Geometry,
    pub(crate) insets: Insets,
    pub(crate) flags: WindowFlags,
    pub(crate) parent: Option<WindowHandle>,
    pub(crate) pointer: PointerState,
    pub(crate) touch: TouchTracker,
    pub(crate) lifecycle: Lifecycle,
    /// The window was visible when it was minimized; restoring shows it again.
    pub(crate) hidden_by_minimize: bool,
    pub(crate) sink: Option<Weak<RefCell<dyn EventSink>>>,
}

impl UserData {
    pub(crate) fn new(handle: WindowHandle, builder: &WindowBuilder) -> UserData {
        let position = builder.position().unwrap_or(Point::ORIGIN);
        let size = builder.size();
        UserData {
            handle,
            geometry: Geometry::new(position.x, position.y, size.width, size.height),
            insets: Insets::UNKNOWN,
            flags: builder.initial_flags(),
            parent: builder.parent(),
            pointer: PointerState::default(),
            touch: TouchTracker::with_capacity(builder.touch_slots),
            lifecycle: Lifecycle::Creating,
            hidden_by_minimize: false,
            sink: None,
        }
    }

    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn insets(&self) -> Insets {
        self.insets
    }

    pub fn flags(&self) -> WindowFlags {
        self.flags
    }

    pub fn parent(&self) -> Option<WindowHandle> {
        self.parent
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn touch(&self) -> &TouchTracker {
        &self.touch
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// `true` until the first show completes.
    pub fn in_creation_phase(&self) -> bool {
        self.lifecycle == Lifecycle::Creating
    }

    /// Attach the sink that receives this window's events.
    ///
    /// Only a weak reference is kept; dropping the last strong reference
    /// severs the sink.
    pub fn set_sink<S: EventSink + 'static>(&mut self, sink: &Rc<RefCell<S>>) {
        let sink: Rc<RefCell<dyn EventSink>> = sink.clone();
        self.sink = Some(Rc::downgrade(&sink));
    }

    /// Forget the sink. Further events for this window are dropped.
    pub fn detach_sink(&mut self) {
        self.sink = None;
    }

    /// A clone of the weak sink reference, for delivery outside the borrow.
    pub(crate) fn sink(&self) -> Option<Weak<RefCell<dyn EventSink>>> {
        self.sink.clone()
    }
}
