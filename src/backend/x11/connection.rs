// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! An [`XEventSource`] on top of an `x11rb` connection.

use std::rc::Rc;

use anyhow::{anyhow, Context};
use tracing::info;
use x11rb::connection::Connection;
use x11rb::protocol::xinput;
use x11rb::protocol::xproto::{AtomEnum, ConnectionExt, NotifyMode};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

use super::{Atoms, FocusMode, NetWmState, TouchPhase, XEvent, XEventSource, XWindow};

// The high bit of response_type marks events sent with SendEvent.
const SYNTHETIC_BIT: u8 = 0x80;

pub struct XcbSource {
    connection: Rc<RustConnection>,
    screen_num: usize,
    root: XWindow,
    atoms: Atoms,
}

impl XcbSource {
    /// Connect to the display named by `$DISPLAY`.
    pub fn connect() -> anyhow::Result<XcbSource> {
        let (conn, screen_num) = x11rb::connect(None)?;
        XcbSource::from_connection(Rc::new(conn), screen_num)
    }

    pub fn from_connection(
        connection: Rc<RustConnection>,
        screen_num: usize,
    ) -> anyhow::Result<XcbSource> {
        let root = connection
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| anyhow!("invalid screen num: {}", screen_num))?
            .root;
        let mut values = [0u32; 10];
        for (value, name) in values.iter_mut().zip(Atoms::NAMES) {
            *value = connection
                .intern_atom(false, name.as_bytes())?
                .reply()
                .with_context(|| format!("failed to intern {}", name))?
                .atom;
        }
        info!("connected to X11 screen {}", screen_num);
        Ok(XcbSource {
            connection,
            screen_num,
            root,
            atoms: Atoms::from_interned(values),
        })
    }

    pub fn connection(&self) -> &Rc<RustConnection> {
        &self.connection
    }

    pub fn screen_num(&self) -> usize {
        self.screen_num
    }

    fn atom_list(&self, window: XWindow, property: u32) -> anyhow::Result<Vec<u32>> {
        let reply = self
            .connection
            .get_property(false, window, property, AtomEnum::ATOM, 0, 1024)?
            .reply()?;
        Ok(reply
            .value32()
            .map(|iter| iter.collect())
            .unwrap_or_default())
    }
}

fn focus_mode(mode: NotifyMode) -> FocusMode {
    match mode {
        NotifyMode::GRAB => FocusMode::Grab,
        NotifyMode::UNGRAB => FocusMode::Ungrab,
        NotifyMode::WHILE_GRABBED => FocusMode::WhileGrabbed,
        _ => FocusMode::Normal,
    }
}

fn fp1616(value: xinput::Fp1616) -> f64 {
    f64::from(value) / 65536.0
}

fn touch(ev: &xinput::TouchBeginEvent, phase: TouchPhase) -> XEvent {
    XEvent::Touch {
        window: ev.event,
        phase,
        detail: ev.detail,
        x: fp1616(ev.event_x),
        y: fp1616(ev.event_y),
    }
}

fn decode(ev: Event) -> XEvent {
    match ev {
        Event::ConfigureNotify(ev) => XEvent::Configure {
            event: ev.event,
            window: ev.window,
            x: ev.x,
            y: ev.y,
            width: ev.width,
            height: ev.height,
            synthetic: ev.response_type & SYNTHETIC_BIT != 0,
        },
        Event::MapNotify(ev) => XEvent::Map {
            event: ev.event,
            window: ev.window,
        },
        Event::UnmapNotify(ev) => XEvent::Unmap {
            event: ev.event,
            window: ev.window,
        },
        Event::ReparentNotify(ev) => XEvent::Reparent {
            event: ev.event,
            window: ev.window,
            parent: ev.parent,
        },
        Event::DestroyNotify(ev) => XEvent::Destroy {
            event: ev.event,
            window: ev.window,
        },
        Event::FocusIn(ev) => XEvent::Focus {
            window: ev.event,
            focused: true,
            mode: focus_mode(ev.mode),
        },
        Event::FocusOut(ev) => XEvent::Focus {
            window: ev.event,
            focused: false,
            mode: focus_mode(ev.mode),
        },
        // Text comes from the input method layer, not from here.
        Event::KeyPress(ev) => XEvent::Key {
            window: ev.event,
            pressed: true,
            keycode: ev.detail,
            time: ev.time,
            state: ev.state,
            char: None,
        },
        Event::KeyRelease(ev) => XEvent::Key {
            window: ev.event,
            pressed: false,
            keycode: ev.detail,
            time: ev.time,
            state: ev.state,
            char: None,
        },
        Event::ButtonPress(ev) => XEvent::Button {
            window: ev.event,
            pressed: true,
            button: ev.detail,
            x: ev.event_x,
            y: ev.event_y,
            state: ev.state,
        },
        Event::ButtonRelease(ev) => XEvent::Button {
            window: ev.event,
            pressed: false,
            button: ev.detail,
            x: ev.event_x,
            y: ev.event_y,
            state: ev.state,
        },
        Event::MotionNotify(ev) => XEvent::Motion {
            window: ev.event,
            x: ev.event_x,
            y: ev.event_y,
            state: ev.state,
        },
        Event::EnterNotify(ev) => XEvent::Crossing {
            window: ev.event,
            entered: true,
            x: ev.event_x,
            y: ev.event_y,
        },
        Event::LeaveNotify(ev) => XEvent::Crossing {
            window: ev.event,
            entered: false,
            x: ev.event_x,
            y: ev.event_y,
        },
        Event::ClientMessage(ev) => XEvent::ClientMessage {
            window: ev.window,
            type_: ev.type_,
            data0: ev.data.as_data32()[0],
        },
        Event::PropertyNotify(ev) => XEvent::Property {
            window: ev.window,
            atom: ev.atom,
        },
        Event::Expose(ev) => XEvent::Expose {
            window: ev.window,
            x: ev.x,
            y: ev.y,
            width: ev.width,
            height: ev.height,
        },
        Event::XinputTouchBegin(ev) => touch(&ev, TouchPhase::Begin),
        Event::XinputTouchUpdate(ev) => touch(&ev, TouchPhase::Update),
        Event::XinputTouchEnd(ev) => touch(&ev, TouchPhase::End),
        _ => XEvent::Other,
    }
}

impl XEventSource for XcbSource {
    fn poll_event(&mut self) -> anyhow::Result<Option<XEvent>> {
        Ok(self.connection.poll_for_event()?.map(decode))
    }

    fn atoms(&self) -> &Atoms {
        &self.atoms
    }

    fn root(&self) -> XWindow {
        self.root
    }

    fn net_wm_state(&mut self, window: XWindow) -> anyhow::Result<NetWmState> {
        let values = self.atom_list(window, self.atoms.net_wm_state)?;
        Ok(NetWmState::from_atoms(&values, &self.atoms))
    }

    fn frame_extents(&mut self, window: XWindow) -> anyhow::Result<Option<[i32; 4]>> {
        let reply = self
            .connection
            .get_property(
                false,
                window,
                self.atoms.net_frame_extents,
                AtomEnum::CARDINAL,
                0,
                4,
            )?
            .reply()?;
        let values: Vec<u32> = reply
            .value32()
            .map(|iter| iter.collect())
            .unwrap_or_default();
        match values[..] {
            [left, right, top, bottom] => Ok(Some([
                left as i32,
                right as i32,
                top as i32,
                bottom as i32,
            ])),
            _ => Ok(None),
        }
    }
}

impl std::fmt::Debug for XcbSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XcbSource")
            .field("screen_num", &self.screen_num)
            .field("root", &self.root)
            .finish()
    }
}
