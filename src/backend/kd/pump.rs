// Copyright 2023 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use tracing::{debug, trace, warn};

use super::event::{KdEvent, KdEventKind, KdPointerIndex, KdWindowProperty};
use super::KdEventSource;
use crate::display::{Delivery, Display};
use crate::error::Error;
use crate::geometry::Point;
use crate::handle::UserDataKey;
use crate::keyboard::Modifiers;
use crate::mouse::MouseButton;
use crate::pump::{EventPump, PumpConfig, PumpStatus};
use crate::reconcile::Events;
use crate::window::WindowHandle;

/// Drains a [`KdEventSource`] into a [`Display`].
pub struct KdPump<S> {
    source: S,
    config: PumpConfig,
    /// The registered window and the `userptr` its events carry.
    window: Option<(WindowHandle, u64)>,
    pointer: Point,
    select: bool,
}

impl<S: KdEventSource> KdPump<S> {
    pub fn new(source: S) -> KdPump<S> {
        KdPump::with_config(source, PumpConfig::default())
    }

    pub fn with_config(source: S, config: PumpConfig) -> KdPump<S> {
        KdPump {
            source,
            config,
            window: None,
            pointer: Point::ORIGIN,
            select: false,
        }
    }

    /// Route events to `handle`.
    ///
    /// Its KD window must have been created with `key.to_raw()` as `userptr`.
    pub fn register(&mut self, handle: WindowHandle, key: UserDataKey) {
        debug!("KD window {:?} registered", handle);
        self.window = Some((handle, key.to_raw()));
        self.pointer = Point::ORIGIN;
        self.select = false;
    }

    pub fn unregister(&mut self) {
        self.window = None;
    }

    /// The `userptr` events must carry to be accepted.
    pub fn userptr(&self) -> Option<u64> {
        self.window.map(|(_, userptr)| userptr)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    fn handle_event(&mut self, display: &mut Display, ev: KdEvent) -> Delivery {
        let handle = match self.window {
            Some((handle, userptr)) if userptr == ev.userptr => handle,
            _ => {
                trace!("dropping KD event for userptr {:#x}", ev.userptr);
                return Delivery::UnknownHandle;
            }
        };
        // The tag still has to resolve to this window; a stale generation
        // means the window was destroyed and the slot reused.
        let registry = display.registry();
        let current = registry
            .lookup_raw(ev.userptr)
            .and_then(|key| registry.get(key))
            .map(|data| data.handle());
        if current != Some(handle) {
            debug!("dropping KD event with stale userptr {:#x}", ev.userptr);
            return Delivery::UnknownHandle;
        }

        match ev.kind {
            KdEventKind::WindowPropertyChange(property) => match property {
                KdWindowProperty::Size => match self.source.window_size() {
                    Ok(size) => display.reconcile(handle, |data| data.on_resized(size, false)),
                    Err(e) => {
                        warn!("failed to query KD window size: {}", e);
                        Delivery::Delivered
                    }
                },
                KdWindowProperty::Visibility => match self.source.window_visible() {
                    Ok(visible) => display.reconcile(handle, |data| data.on_visibility(visible)),
                    Err(e) => {
                        warn!("failed to query KD window visibility: {}", e);
                        Delivery::Delivered
                    }
                },
                KdWindowProperty::Focus => match self.source.window_focused() {
                    Ok(focused) => display.reconcile(handle, |data| data.on_focus(focused)),
                    Err(e) => {
                        warn!("failed to query KD window focus: {}", e);
                        Delivery::Delivered
                    }
                },
                KdWindowProperty::Other(property) => {
                    trace!("ignoring KD window property {}", property);
                    Delivery::Delivered
                }
            },
            KdEventKind::WindowClose => display.reconcile(handle, |data| data.on_close_signal()),
            KdEventKind::Pointer { index, value } => {
                let pos = self.pointer;
                match index {
                    KdPointerIndex::X | KdPointerIndex::Y => {
                        let moved = match index {
                            KdPointerIndex::X => Point::new(value, pos.y),
                            _ => Point::new(pos.x, value),
                        };
                        if moved == pos {
                            return Delivery::Delivered;
                        }
                        self.pointer = moved;
                        display.reconcile(handle, |data| {
                            data.on_pointer_move(moved, Modifiers::empty())
                        })
                    }
                    KdPointerIndex::Select => {
                        let pressed = value != 0;
                        if pressed == self.select {
                            return Delivery::Delivered;
                        }
                        self.select = pressed;
                        display.reconcile(handle, |data| {
                            let mut events = Events::new();
                            if pressed {
                                events.extend(data.on_pointer_crossing(true, pos));
                            }
                            events.extend(data.on_pointer_button(
                                pressed,
                                MouseButton::Left,
                                pos,
                                Modifiers::empty(),
                            ));
                            events
                        })
                    }
                }
            }
            KdEventKind::Other => Delivery::Delivered,
        }
    }
}

impl<S: KdEventSource> EventPump for KdPump<S> {
    fn pump(&mut self, display: &mut Display) -> Result<PumpStatus, Error> {
        let mut status = PumpStatus::new();
        while status.processed < self.config.batch_limit {
            let ev = match self.source.wait_event(Duration::ZERO)? {
                Some(ev) => ev,
                None => break,
            };
            let delivery = self.handle_event(display, ev);
            if !status.record(delivery) {
                debug!("dispatch stopped after {} events", status.processed);
                break;
            }
        }
        Ok(status)
    }
}
