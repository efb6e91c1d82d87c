// Copyright 2023 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! The per-connection context shared by a backend's pump and window factory.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use tracing::{debug, error, trace, warn};

use crate::error::Error;
use crate::event::WindowEvent;
use crate::handle::{UserDataKey, WindowRegistry};
use crate::plane::{PlaneId, PlanePool};
use crate::reconcile::Events;
use crate::sink::{dispatch_event, EventSink};
use crate::state::UserData;
use crate::window::{WindowBuilder, WindowHandle};

/// What happened to a batch of events on its way to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Every event was delivered, or there was nothing to deliver.
    Delivered,
    /// The sink returned `false`; the rest of the batch was dropped and the
    /// pump should stop draining.
    Aborted,
    /// The sink was severed or busy; the batch was dropped.
    SinkUnavailable,
    /// The event named a window we don't know (any more); it was dropped.
    UnknownHandle,
}

impl Delivery {
    /// `false` when the pump must stop its current batch.
    pub fn should_continue(self) -> bool {
        self != Delivery::Aborted
    }
}

/// One native connection: an X11 display, a Win32 UI thread, a KD context.
///
/// Everything here is single threaded. Window creation and destruction
/// requested from other threads must be marshaled onto the thread that
/// drives this display before calling in.
pub struct Display {
    registry: WindowRegistry,
    planes: Option<Arc<PlanePool>>,
    plane_of: HashMap<WindowHandle, PlaneId>,
}

impl Default for Display {
    fn default() -> Self {
        Display::new()
    }
}

impl Display {
    pub fn new() -> Display {
        Display {
            registry: WindowRegistry::new(),
            planes: None,
            plane_of: HashMap::new(),
        }
    }

    /// A display whose windows may ask for a compositor plane from `pool`.
    pub fn with_plane_pool(pool: Arc<PlanePool>) -> Display {
        Display {
            planes: Some(pool),
            ..Display::new()
        }
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    /// Bind a newly created native window.
    ///
    /// Call this before handing the window to anyone else. The window starts
    /// in its creation phase.
    pub fn create_window<S: EventSink + 'static>(
        &mut self,
        handle: WindowHandle,
        builder: &WindowBuilder,
        sink: &Rc<RefCell<S>>,
    ) -> Result<UserDataKey, Error> {
        if self.registry.data_mut_any(handle).is_some() {
            error!("create_window: {:?} is already bound", handle);
            return Err(Error::AlreadyBound(handle));
        }
        if builder.wants_plane {
            let plane = self
                .planes
                .as_ref()
                .ok_or(Error::PlanesExhausted)
                .and_then(|pool| pool.acquire(handle))?;
            self.plane_of.insert(handle, plane);
        }
        let key = match self.registry.create(handle, builder) {
            Ok(key) => key,
            Err(e) => {
                self.release_plane(handle);
                return Err(e);
            }
        };
        if let Some(data) = self.registry.get_mut(key) {
            data.set_sink(sink);
        }
        Ok(key)
    }

    /// The plane held by `handle`, if it asked for one.
    pub fn plane(&self, handle: WindowHandle) -> Option<PlaneId> {
        self.plane_of.get(&handle).copied()
    }

    /// Tear down a window whose native handle is gone.
    ///
    /// Emits `Destroyed` (unless already emitted), delivers it, and frees the
    /// user data. Destroying a handle twice is [`Error::DoubleFree`].
    pub fn destroy_window(&mut self, handle: WindowHandle) -> Result<Delivery, Error> {
        let (events, sink) = match self.registry.data_mut_any(handle) {
            Some(data) => (data.on_destroy_confirmed(), data.sink()),
            None => {
                // Tells a double free apart from a handle we never saw.
                return Err(self
                    .registry
                    .destroy(handle)
                    .err()
                    .unwrap_or(Error::UnknownHandle(handle)));
            }
        };
        let delivery = deliver(handle, sink, &events);
        self.registry.destroy(handle)?;
        self.release_plane(handle);
        Ok(delivery)
    }

    /// Stop delivering events for `handle`. The window stays bound.
    pub fn detach_sink(&mut self, handle: WindowHandle) {
        if let Some(data) = self.registry.data_mut_any(handle) {
            data.detach_sink();
        }
    }

    /// Read the reconciled state of a live window.
    pub fn window(&self, handle: WindowHandle) -> Option<&UserData> {
        let key = self.registry.lookup(handle)?;
        self.registry.get(key)
    }

    /// Run one reconciler operation against `handle` and deliver the result.
    ///
    /// Unknown or destroyed handles are logged and dropped.
    pub fn reconcile<F>(&mut self, handle: WindowHandle, op: F) -> Delivery
    where
        F: FnOnce(&mut UserData) -> Events,
    {
        let (events, sink) = match self
            .registry
            .lookup(handle)
            .and_then(|key| self.registry.get_mut(key))
        {
            Some(data) => (op(data), data.sink()),
            None => {
                debug!("{}", Error::UnknownHandle(handle));
                return Delivery::UnknownHandle;
            }
        };
        deliver(handle, sink, &events)
    }

    /// Like [`reconcile`](Self::reconcile), but for destroy confirmations
    /// coming out of a native event queue.
    pub fn confirm_destroyed(&mut self, handle: WindowHandle) -> Delivery {
        match self.destroy_window(handle) {
            Ok(delivery) => delivery,
            Err(e) => {
                debug!("dropping destroy notification: {}", e);
                Delivery::UnknownHandle
            }
        }
    }

    fn release_plane(&mut self, handle: WindowHandle) {
        if self.plane_of.remove(&handle).is_some() {
            if let Some(pool) = &self.planes {
                pool.release(handle);
            }
        }
    }
}

/// Hand `events` to `sink` in order, stopping at the first `false`.
pub fn deliver(
    handle: WindowHandle,
    sink: Option<Weak<RefCell<dyn EventSink>>>,
    events: &[WindowEvent],
) -> Delivery {
    if events.is_empty() {
        return Delivery::Delivered;
    }
    let sink = match sink.and_then(|weak| weak.upgrade()) {
        Some(sink) => sink,
        None => {
            debug!(
                "{:?}: {}, dropping {} event(s)",
                handle,
                Error::SinkUnavailable,
                events.len()
            );
            return Delivery::SinkUnavailable;
        }
    };
    let mut sink = match sink.try_borrow_mut() {
        Ok(sink) => sink,
        Err(_) => {
            warn!(
                "{:?}: sink is already borrowed, dropping {} event(s)",
                handle,
                events.len()
            );
            return Delivery::SinkUnavailable;
        }
    };
    for event in events {
        trace!("{:?}: {:?}", handle, event);
        if !dispatch_event(&mut *sink, handle, event) {
            debug!("{:?}: sink stopped dispatch at {}", handle, event.name());
            return Delivery::Aborted;
        }
    }
    Delivery::Delivered
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::{Point, Size};
    use crate::plane::PlanePool;
    use crate::test_util::{Recorder, Stop};
    use static_assertions as sa;
    use test_log::test;

    sa::assert_not_impl_any!(Display: Send, Sync);

    const W: WindowHandle = WindowHandle::from_raw(0x42);

    #[test]
    fn batch_stops_at_false() {
        let sink = Recorder::stopping_at(Stop::Resize);
        let events = vec![
            WindowEvent::Resize {
                size: Size::new(10, 10),
                during_live_resize: false,
            },
            WindowEvent::Move(Point::new(1, 1)),
            WindowEvent::FocusChanged(true),
        ];
        let weak: Weak<RefCell<dyn EventSink>> = {
            let strong: Rc<RefCell<dyn EventSink>> = sink.clone();
            Rc::downgrade(&strong)
        };
        assert_eq!(deliver(W, Some(weak), &events), Delivery::Aborted);
        assert_eq!(sink.borrow().names(), vec!["resize"]);
    }

    #[test]
    fn severed_sink_is_unavailable() {
        let mut display = Display::new();
        let sink = Recorder::new();
        display.create_window(W, &WindowBuilder::new(), &sink).unwrap();
        drop(sink);
        let delivery = display.reconcile(W, |d| d.on_shown());
        assert_eq!(delivery, Delivery::SinkUnavailable);
        assert!(delivery.should_continue());
    }

    #[test]
    fn destroy_delivers_then_frees() {
        let mut display = Display::new();
        let sink = Recorder::new();
        display.create_window(W, &WindowBuilder::new(), &sink).unwrap();
        assert_eq!(display.destroy_window(W).unwrap(), Delivery::Delivered);
        assert_eq!(sink.borrow().names(), vec!["destroyed"]);
        assert!(display.window(W).is_none());
        assert!(matches!(display.destroy_window(W), Err(Error::DoubleFree(_))));
        assert_eq!(display.confirm_destroyed(W), Delivery::UnknownHandle);
        assert_eq!(display.reconcile(W, |d| d.on_focus(true)), Delivery::UnknownHandle);
    }

    #[test]
    fn refused_destroy_still_frees() {
        let mut display = Display::new();
        let sink = Recorder::stopping_at(Stop::Destroyed);
        display.create_window(W, &WindowBuilder::new(), &sink).unwrap();
        display.reconcile(W, |d| d.on_shown());
        assert_eq!(display.destroy_window(W).unwrap(), Delivery::Aborted);
        assert_eq!(sink.borrow().names().last(), Some(&"destroyed"));
        assert!(display.registry().is_empty());
        assert!(display.window(W).is_none());
    }

    #[test]
    fn catch_up_stops_where_the_sink_says() {
        let mut display = Display::new();
        let sink = Recorder::stopping_at(Stop::Focus);
        display.create_window(W, &WindowBuilder::new(), &sink).unwrap();
        assert_eq!(display.reconcile(W, |d| d.on_shown()), Delivery::Aborted);
        assert_eq!(sink.borrow().names(), vec!["resize", "move", "focus"]);
        // The state moved on even though delivery stopped.
        assert!(!display.window(W).unwrap().in_creation_phase());
    }

    #[test]
    fn one_sink_for_many_windows() {
        let mut display = Display::new();
        let sink = Recorder::new();
        let other = WindowHandle::from_raw(0x43);
        display.create_window(W, &WindowBuilder::new(), &sink).unwrap();
        display
            .create_window(other, &WindowBuilder::new(), &sink)
            .unwrap();
        display.reconcile(W, |d| d.on_shown());
        display.reconcile(other, |d| d.on_shown());
        sink.borrow_mut().clear();

        display.reconcile(other, |d| d.on_focus(true));
        display.reconcile(W, |d| d.on_close_signal());
        let sink = sink.borrow();
        assert_eq!(sink.names(), vec!["focus", "destroy-requested"]);
        assert_eq!(sink.windows, vec![other, W]);
    }

    #[test]
    fn create_twice_is_an_error() {
        let mut display = Display::new();
        let sink = Recorder::new();
        display.create_window(W, &WindowBuilder::new(), &sink).unwrap();
        assert!(matches!(
            display.create_window(W, &WindowBuilder::new(), &sink),
            Err(Error::AlreadyBound(_))
        ));
    }

    #[test]
    fn planes_follow_window_lifetime() {
        let pool = Arc::new(PlanePool::new(1));
        let mut display = Display::with_plane_pool(pool.clone());
        let sink = Recorder::new();
        let mut builder = WindowBuilder::new();
        builder.request_plane(true);

        display.create_window(W, &builder, &sink).unwrap();
        let plane = display.plane(W).unwrap();
        assert_eq!(pool.owner(plane), Some(W));

        let other = WindowHandle::from_raw(0x43);
        assert!(matches!(
            display.create_window(other, &builder, &sink),
            Err(Error::PlanesExhausted)
        ));
        assert!(display.registry().lookup(other).is_none());

        display.destroy_window(W).unwrap();
        assert_eq!(pool.owner(plane), None);
    }
}
