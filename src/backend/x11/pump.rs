// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

use std::collections::{HashMap, VecDeque};

use tracing::{debug, trace};

use super::event::{FocusMode, TouchPhase, XEvent, XWindow};
use super::keycodes::{code_from_keycode, key_mods, mouse_button, mouse_buttons, wheel_rotation};
use super::touch::TouchIdMap;
use super::{log_x11, XEventSource};
use crate::display::{Delivery, Display};
use crate::error::Error;
use crate::geometry::{Point, Rect, Size};
use crate::keyboard::{KeyEvent, KeyState, Modifiers};
use crate::pump::{EventPump, PumpConfig, PumpStatus};
use crate::reconcile::Events;
use crate::window::WindowHandle;

fn handle_of(window: XWindow) -> WindowHandle {
    WindowHandle::from_raw(u64::from(window))
}

/// Drains an [`XEventSource`] into a [`Display`].
pub struct X11Pump<S> {
    source: S,
    config: PumpConfig,
    /// Events read ahead while peeking.
    pending: VecDeque<XEvent>,
    touches: TouchIdMap,
    /// Window-manager frames our top-level windows were reparented into.
    frames: HashMap<XWindow, XWindow>,
    /// The press half of a detected auto-repeat pair: (window, keycode, time).
    repeat_press: Option<(XWindow, u8, u32)>,
}

impl<S: XEventSource> X11Pump<S> {
    pub fn new(source: S) -> X11Pump<S> {
        X11Pump::with_config(source, PumpConfig::default())
    }

    pub fn with_config(source: S, config: PumpConfig) -> X11Pump<S> {
        X11Pump {
            source,
            config,
            pending: VecDeque::new(),
            touches: TouchIdMap::new(),
            frames: HashMap::new(),
            repeat_press: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    fn next_event(&mut self) -> Result<Option<XEvent>, Error> {
        if let Some(ev) = self.pending.pop_front() {
            return Ok(Some(ev));
        }
        Ok(self.source.poll_event()?)
    }

    fn peek_event(&mut self) -> Result<Option<&XEvent>, Error> {
        if self.pending.is_empty() {
            if let Some(ev) = self.source.poll_event()? {
                self.pending.push_back(ev);
            }
        }
        Ok(self.pending.front())
    }

    fn frame_extents(&mut self, window: XWindow) -> Option<[i32; 4]> {
        log_x11!(self.source.frame_extents(window)).flatten()
    }

    fn handle_event(&mut self, display: &mut Display, ev: XEvent) -> Result<Delivery, Error> {
        let delivery = match ev {
            XEvent::Configure {
                event,
                window,
                x,
                y,
                width,
                height,
                synthetic,
            } => {
                if event != window {
                    trace!("ignoring ConfigureNotify for child {:#x}", window);
                    return Ok(Delivery::Delivered);
                }
                // Real ConfigureNotify coordinates are relative to the parent.
                // Once a window manager has framed us that is the frame, so
                // only the synthetic notification carries a useful position.
                let framed = self.frames.contains_key(&window);
                let size = Size::new(u32::from(width), u32::from(height));
                display.reconcile(handle_of(window), |data| {
                    if framed && !synthetic {
                        data.on_resized(size, false)
                    } else {
                        data.on_geometry_changed(x.into(), y.into(), size.width, size.height)
                    }
                })
            }
            XEvent::Map { event, window } => {
                if event != window {
                    return Ok(Delivery::Delivered);
                }
                let extents = self.frame_extents(window);
                display.reconcile(handle_of(window), |data| {
                    let mut events = Events::new();
                    if let Some([l, r, t, b]) = extents {
                        events.extend(data.on_insets_probe(l, r, t, b));
                    }
                    events.extend(data.on_visibility(true));
                    events
                })
            }
            XEvent::Unmap { event, window } => {
                if event != window {
                    return Ok(Delivery::Delivered);
                }
                display.reconcile(handle_of(window), |data| data.on_visibility(false))
            }
            XEvent::Reparent {
                event,
                window,
                parent,
            } => {
                if event != window {
                    return Ok(Delivery::Delivered);
                }
                let extents = self.frame_extents(window);
                let to_root = parent == self.source.root();
                let to_ours = display.registry().lookup(handle_of(parent)).is_some();
                if to_root || to_ours {
                    self.frames.remove(&window);
                } else {
                    trace!("{:#x} framed by {:#x}", window, parent);
                    self.frames.insert(window, parent);
                }
                display.reconcile(handle_of(window), |data| {
                    let mut events = Events::new();
                    if to_root {
                        events.extend(data.on_reparent(None));
                    } else if to_ours {
                        events.extend(data.on_reparent(Some(handle_of(parent))));
                    }
                    if let Some([l, r, t, b]) = extents {
                        events.extend(data.on_insets_probe(l, r, t, b));
                    }
                    events
                })
            }
            XEvent::Destroy { event, window } => {
                if event != window {
                    return Ok(Delivery::Delivered);
                }
                self.frames.remove(&window);
                display.confirm_destroyed(handle_of(window))
            }
            XEvent::Focus {
                window,
                focused,
                mode,
            } => match mode {
                // Keyboard grabs (alt-tab switchers, menus) send these in
                // pairs around the grab; the window never really lost focus.
                FocusMode::Grab | FocusMode::Ungrab => {
                    trace!("ignoring focus {} during grab", focused);
                    Delivery::Delivered
                }
                FocusMode::Normal | FocusMode::WhileGrabbed => {
                    display.reconcile(handle_of(window), |data| data.on_focus(focused))
                }
            },
            XEvent::Key {
                window,
                pressed,
                keycode,
                time,
                state,
                char,
            } => {
                let repeat = if pressed {
                    self.repeat_press.take() == Some((window, keycode, time))
                } else {
                    // X reports auto-repeat as a release immediately followed
                    // by a press with the same timestamp.
                    let paired = matches!(
                        self.peek_event()?,
                        Some(XEvent::Key {
                            window: w,
                            pressed: true,
                            keycode: k,
                            time: t,
                            ..
                        }) if *w == window && *k == keycode && *t == time
                    );
                    if paired {
                        self.repeat_press = Some((window, keycode, time));
                    }
                    paired
                };
                let event = KeyEvent {
                    state: if pressed { KeyState::Down } else { KeyState::Up },
                    platform_code: u32::from(keycode),
                    code: code_from_keycode(keycode),
                    char,
                    mods: key_mods(state),
                    repeat,
                };
                display.reconcile(handle_of(window), |data| data.on_key(event))
            }
            XEvent::Button {
                window,
                pressed,
                button,
                x,
                y,
                state,
            } => {
                let pos = Point::new(x.into(), y.into());
                let mods = key_mods(state);
                match wheel_rotation(button, state) {
                    Some((rotation, horizontal)) => {
                        // Each notch is a press/release pair; count the press.
                        if !pressed {
                            return Ok(Delivery::Delivered);
                        }
                        let mods = if horizontal {
                            mods - Modifiers::SHIFT
                        } else {
                            mods
                        };
                        display.reconcile(handle_of(window), |data| {
                            data.on_pointer_wheel(rotation, horizontal, pos, mods)
                        })
                    }
                    None => {
                        let button = mouse_button(button);
                        display.reconcile(handle_of(window), |data| {
                            data.on_pointer_button(pressed, button, pos, mods)
                        })
                    }
                }
            }
            XEvent::Motion { window, x, y, state } => {
                let pos = Point::new(x.into(), y.into());
                let buttons_down = !mouse_buttons(state).is_empty();
                display.reconcile(handle_of(window), |data| {
                    // The release went to someone else (a grab broke, say).
                    if data.pointer().captured && !buttons_down {
                        debug!("{:?}: lost button release, dropping capture", data.handle());
                        data.on_capture_lost();
                    }
                    data.on_pointer_move(pos, key_mods(state))
                })
            }
            XEvent::Crossing {
                window,
                entered,
                x,
                y,
            } => {
                let pos = Point::new(x.into(), y.into());
                display.reconcile(handle_of(window), |data| {
                    data.on_pointer_crossing(entered, pos)
                })
            }
            XEvent::ClientMessage {
                window,
                type_,
                data0,
            } => {
                let atoms = *self.source.atoms();
                if type_ == atoms.wm_protocols && data0 == atoms.wm_delete_window {
                    display.reconcile(handle_of(window), |data| data.on_close_signal())
                } else {
                    trace!("ignoring client message {} on {:#x}", type_, window);
                    Delivery::Delivered
                }
            }
            XEvent::Property { window, atom } => {
                let atoms = *self.source.atoms();
                if atom == atoms.net_wm_state {
                    let state = match log_x11!(self.source.net_wm_state(window)) {
                        Some(state) => state,
                        None => return Ok(Delivery::Delivered),
                    };
                    display.reconcile(handle_of(window), |data| {
                        let mut events =
                            data.on_maximize_restore(state.maximized_horz, state.maximized_vert);
                        events.extend(data.on_fullscreen_toggle(state.fullscreen));
                        events.extend(data.on_minimized(state.hidden));
                        events
                    })
                } else if atom == atoms.net_frame_extents {
                    match self.frame_extents(window) {
                        Some([l, r, t, b]) => display
                            .reconcile(handle_of(window), |data| data.on_insets_probe(l, r, t, b)),
                        None => Delivery::Delivered,
                    }
                } else {
                    Delivery::Delivered
                }
            }
            XEvent::Expose {
                window,
                x,
                y,
                width,
                height,
            } => {
                let rect = Rect::new(x.into(), y.into(), width.into(), height.into());
                display.reconcile(handle_of(window), |data| data.on_repaint(rect))
            }
            XEvent::Touch {
                window,
                phase,
                detail,
                x,
                y,
            } => {
                let pos = Point::new(x.round() as i32, y.round() as i32);
                match phase {
                    TouchPhase::Begin => {
                        let id = u64::from(self.touches.begin(detail));
                        display.reconcile(handle_of(window), |data| {
                            data.on_touch_begin(id, pos, 1.0)
                        })
                    }
                    TouchPhase::Update => match self.touches.get(detail) {
                        Some(id) => display.reconcile(handle_of(window), |data| {
                            data.on_touch_update(u64::from(id), pos, 1.0)
                        }),
                        None => {
                            trace!("update for untracked touch {}", detail);
                            Delivery::Delivered
                        }
                    },
                    TouchPhase::End => match self.touches.end(detail) {
                        Some(id) => display
                            .reconcile(handle_of(window), |data| data.on_touch_end(u64::from(id))),
                        None => Delivery::Delivered,
                    },
                }
            }
            XEvent::Other => Delivery::Delivered,
        };
        Ok(delivery)
    }
}

impl<S: XEventSource> EventPump for X11Pump<S> {
    fn pump(&mut self, display: &mut Display) -> Result<PumpStatus, Error> {
        let mut status = PumpStatus::new();
        while status.processed < self.config.batch_limit {
            let ev = match self.next_event()? {
                Some(ev) => ev,
                None => break,
            };
            let delivery = self.handle_event(display, ev)?;
            if !status.record(delivery) {
                debug!("dispatch stopped after {} events", status.processed);
                break;
            }
        }
        if display.registry().is_empty() {
            self.touches.clear();
        }
        Ok(status)
    }
}
