// Copyright 2018 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;

use tracing::{debug, trace, warn};

use super::keycodes::{code_from_scancode, is_repeat, scan_code};
use super::message::*;
use super::{MessageSource, TouchPhase};
use crate::display::{Delivery, Display};
use crate::error::Error;
use crate::geometry::{Point, Size};
use crate::keyboard::{KeyEvent, KeyState};
use crate::mouse::MouseButton;
use crate::pump::{EventPump, PumpConfig, PumpStatus};
use crate::reconcile::Events;
use crate::state::UserData;
use crate::window::WindowHandle;

fn handle_of(hwnd: Hwnd) -> WindowHandle {
    WindowHandle::from_raw(hwnd as u64)
}

/// Drains a [`MessageSource`] into a [`Display`].
pub struct Win32Pump<S> {
    source: S,
    config: PumpConfig,
    /// Windows inside a modal move/size loop.
    sizing: HashSet<Hwnd>,
    /// Windows whose next `WM_LBUTTONUP` is the mouse emulation of a touch.
    swallow_lbutton_up: HashSet<Hwnd>,
}

impl<S: MessageSource> Win32Pump<S> {
    pub fn new(source: S) -> Win32Pump<S> {
        Win32Pump::with_config(source, PumpConfig::default())
    }

    pub fn with_config(source: S, config: PumpConfig) -> Win32Pump<S> {
        Win32Pump {
            source,
            config,
            sizing: HashSet::new(),
            swallow_lbutton_up: HashSet::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Run `op` and bring the platform capture in line with the result.
    fn reconcile_pointer<F>(&mut self, display: &mut Display, hwnd: Hwnd, op: F) -> Delivery
    where
        F: FnOnce(&mut UserData) -> Events,
    {
        let handle = handle_of(hwnd);
        let captured = |display: &Display| {
            display
                .window(handle)
                .map(|data| data.pointer().captured)
                .unwrap_or(false)
        };
        let before = captured(&*display);
        let delivery = display.reconcile(handle, op);
        match (before, captured(&*display)) {
            (false, true) => self.source.set_capture(hwnd),
            (true, false) => self.source.release_capture(),
            _ => (),
        }
        delivery
    }

    /// Drop the left button messages Windows synthesizes from touch input.
    ///
    /// Presses and releases arriving while contacts are down are emulated,
    /// as is the first release after the last contact lifts. If an emulated
    /// press got through before the touch message, the swallowed release
    /// still releases the button so capture does not stick.
    fn filter_touch_emulation(
        &mut self,
        display: &mut Display,
        hwnd: Hwnd,
        msg: &Message,
    ) -> Option<Delivery> {
        let handle = handle_of(hwnd);
        let (touching, left_down) = display
            .window(handle)
            .map(|data| {
                (
                    data.touch().active() > 0,
                    data.pointer().buttons.contains(MouseButton::Left),
                )
            })
            .unwrap_or((false, false));
        let release = msg.msg == WM_LBUTTONUP;
        let deferred = release && self.swallow_lbutton_up.remove(&hwnd);
        if !touching && !deferred {
            return None;
        }
        trace!("{:#x}: swallowing emulated button message", hwnd);
        if release && left_down {
            let (x, y) = msg.lparam_point();
            let mods = self.source.modifiers();
            return Some(self.reconcile_pointer(display, hwnd, |data| {
                data.on_pointer_button(false, MouseButton::Left, Point::new(x, y), mods)
            }));
        }
        Some(Delivery::Delivered)
    }

    /// Returns the delivery and whether the message was consumed.
    fn handle_message(&mut self, display: &mut Display, msg: Message) -> (Delivery, bool) {
        let hwnd = msg.hwnd;
        let handle = handle_of(hwnd);
        if msg.msg == WM_DESTROY {
            self.sizing.remove(&hwnd);
            self.swallow_lbutton_up.remove(&hwnd);
            return (display.confirm_destroyed(handle), false);
        }
        if display.window(handle).is_none() {
            trace!("message {:#06x} for foreign window {:#x}", msg.msg, hwnd);
            return (Delivery::UnknownHandle, false);
        }

        match msg.msg {
            WM_SIZE if msg.wparam == SIZE_MAXSHOW || msg.wparam == SIZE_MAXHIDE => {
                // Another window was maximized or restored; ours didn't change.
                trace!("{:#x}: ignoring WM_SIZE kind {}", hwnd, msg.wparam);
                (Delivery::Delivered, false)
            }
            WM_SIZE => {
                let (width, height) = msg.lparam_size();
                let size = Size::new(width, height);
                let live = self.sizing.contains(&hwnd);
                let insets = self.source.query_insets(hwnd);
                let delivery = display.reconcile(handle, |data| {
                    let mut events = Events::new();
                    match msg.wparam {
                        SIZE_MINIMIZED => events.extend(data.on_minimized(true)),
                        kind => {
                            let maximized = kind == SIZE_MAXIMIZED;
                            events.extend(data.on_minimized(false));
                            events.extend(data.on_maximize_restore(maximized, maximized));
                            events.extend(data.on_resized(size, live));
                            if let Some([l, r, t, b]) = insets {
                                events.extend(data.on_insets_probe(l, r, t, b));
                            }
                        }
                    }
                    events
                });
                (delivery, true)
            }
            WM_MOVE => {
                let (x, y) = msg.lparam_point();
                let delivery = display.reconcile(handle, |data| data.on_moved(Point::new(x, y)));
                (delivery, true)
            }
            WM_ENTERSIZEMOVE => {
                self.sizing.insert(hwnd);
                (Delivery::Delivered, false)
            }
            WM_EXITSIZEMOVE => {
                self.sizing.remove(&hwnd);
                (Delivery::Delivered, false)
            }
            WM_SHOWWINDOW => {
                let shown = msg.wparam != 0;
                (display.reconcile(handle, |data| data.on_visibility(shown)), false)
            }
            WM_SETFOCUS | WM_KILLFOCUS => {
                let focused = msg.msg == WM_SETFOCUS;
                let delivery = self.reconcile_pointer(display, hwnd, |data| data.on_focus(focused));
                (delivery, true)
            }
            WM_CLOSE => (display.reconcile(handle, |data| data.on_close_signal()), true),
            WM_PAINT => match self.source.update_rect(hwnd) {
                Some(rect) => (display.reconcile(handle, |data| data.on_repaint(rect)), false),
                None => (Delivery::Delivered, false),
            },
            WM_KEYDOWN | WM_SYSKEYDOWN | WM_KEYUP | WM_SYSKEYUP => {
                let pressed = matches!(msg.msg, WM_KEYDOWN | WM_SYSKEYDOWN);
                let (scancode, extended) = scan_code(&msg);
                let event = KeyEvent {
                    state: if pressed { KeyState::Down } else { KeyState::Up },
                    platform_code: msg.wparam as u32,
                    code: code_from_scancode(scancode, extended),
                    char: if pressed {
                        self.source.translate_char(&msg)
                    } else {
                        None
                    },
                    mods: self.source.modifiers(),
                    repeat: pressed && is_repeat(&msg),
                };
                let delivery = display.reconcile(handle, |data| data.on_key(event));
                // Alt+F4 and the system menu live in the default handling.
                let consumed = matches!(msg.msg, WM_KEYDOWN | WM_KEYUP);
                (delivery, consumed)
            }
            WM_MOUSEMOVE => {
                let (x, y) = msg.lparam_point();
                let pos = Point::new(x, y);
                let mods = self.source.modifiers();
                let entering = display
                    .window(handle)
                    .map(|data| !data.pointer().inside)
                    .unwrap_or(false);
                if entering {
                    self.source.track_mouse_leave(hwnd);
                }
                let delivery = display.reconcile(handle, |data| {
                    let mut events = Events::new();
                    if entering {
                        events.extend(data.on_pointer_crossing(true, pos));
                    }
                    events.extend(data.on_pointer_move(pos, mods));
                    events
                });
                (delivery, true)
            }
            WM_MOUSELEAVE => {
                let delivery =
                    display.reconcile(handle, |data| data.on_pointer_crossing(false, Point::ORIGIN));
                (delivery, true)
            }
            WM_LBUTTONDOWN | WM_LBUTTONUP | WM_RBUTTONDOWN | WM_RBUTTONUP | WM_MBUTTONDOWN
            | WM_MBUTTONUP | WM_XBUTTONDOWN | WM_XBUTTONUP => {
                if matches!(msg.msg, WM_LBUTTONDOWN | WM_LBUTTONUP) {
                    if let Some(delivery) = self.filter_touch_emulation(display, hwnd, &msg) {
                        return (delivery, true);
                    }
                }
                let button = match msg.msg {
                    WM_LBUTTONDOWN | WM_LBUTTONUP => MouseButton::Left,
                    WM_RBUTTONDOWN | WM_RBUTTONUP => MouseButton::Right,
                    WM_MBUTTONDOWN | WM_MBUTTONUP => MouseButton::Middle,
                    _ => match hiword(msg.wparam as u32) {
                        XBUTTON1 => MouseButton::X1,
                        XBUTTON2 => MouseButton::X2,
                        w => {
                            // Should never happen with current Windows
                            warn!("Received an unknown XBUTTON event ({})", w);
                            MouseButton::None
                        }
                    },
                };
                let pressed = matches!(
                    msg.msg,
                    WM_LBUTTONDOWN | WM_RBUTTONDOWN | WM_MBUTTONDOWN | WM_XBUTTONDOWN
                );
                let (x, y) = msg.lparam_point();
                let mods = self.source.modifiers();
                let delivery = self.reconcile_pointer(display, hwnd, |data| {
                    data.on_pointer_button(pressed, button, Point::new(x, y), mods)
                });
                (delivery, true)
            }
            WM_MOUSEWHEEL | WM_MOUSEHWHEEL => {
                let delta = hiword(msg.wparam as u32) as i16;
                let notches = f32::from(delta) / f32::from(WHEEL_DELTA);
                let horizontal = msg.msg == WM_MOUSEHWHEEL;
                // Vertical wheel deltas are positive away from the user.
                let rotation = if horizontal { notches } else { -notches };
                let (x, y) = msg.lparam_point();
                let pos = self.source.screen_to_client(hwnd, Point::new(x, y));
                let mods = self.source.modifiers();
                let delivery = display.reconcile(handle, |data| {
                    data.on_pointer_wheel(rotation, horizontal, pos, mods)
                });
                (delivery, true)
            }
            WM_CAPTURECHANGED => {
                if msg.lparam as Hwnd != hwnd {
                    display.reconcile(handle, |data| {
                        if data.pointer().captured {
                            debug!("{:?}: capture taken away", data.handle());
                        }
                        data.on_capture_lost();
                        Events::new()
                    });
                }
                (Delivery::Delivered, true)
            }
            WM_SETCURSOR => {
                if loword(msg.lparam as u32) != HTCLIENT {
                    return (Delivery::Delivered, false);
                }
                let hidden = display
                    .window(handle)
                    .map(|data| !data.pointer().visible)
                    .unwrap_or(false);
                self.source.set_cursor_hidden(hwnd, hidden);
                (Delivery::Delivered, hidden)
            }
            WM_TOUCH => {
                let inputs = self.source.touch_inputs(&msg);
                let mut all_lifted = false;
                let delivery = display.reconcile(handle, |data| {
                    let mut events = Events::new();
                    let mut lifted = false;
                    for input in &inputs {
                        let id = u64::from(input.id);
                        match input.phase {
                            TouchPhase::Down => {
                                events.extend(data.on_touch_begin(id, input.pos, 1.0))
                            }
                            TouchPhase::Move => {
                                events.extend(data.on_touch_update(id, input.pos, 1.0))
                            }
                            TouchPhase::Up => {
                                lifted = true;
                                events.extend(data.on_touch_end(id));
                            }
                        }
                    }
                    all_lifted = lifted && data.touch().active() == 0;
                    events
                });
                if all_lifted {
                    self.swallow_lbutton_up.insert(hwnd);
                }
                (delivery, true)
            }
            _ => (Delivery::Delivered, false),
        }
    }
}

impl<S: MessageSource> EventPump for Win32Pump<S> {
    fn pump(&mut self, display: &mut Display) -> Result<PumpStatus, Error> {
        let mut status = PumpStatus::new();
        while status.processed < self.config.batch_limit {
            let msg = match self.source.next_message() {
                Some(msg) => msg,
                None => break,
            };
            let (delivery, consumed) = self.handle_message(display, msg);
            if !consumed {
                self.source.default_handling(&msg);
            }
            if !status.record(delivery) {
                debug!("dispatch stopped after {} messages", status.processed);
                break;
            }
        }
        Ok(status)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::backend::windows::TouchInput;
    use crate::geometry::Rect;
    use crate::keyboard::Modifiers;
    use crate::test_util::Recorder;
    use crate::window::WindowBuilder;
    use crate::WindowEvent;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use test_log::test;

    const HWND: Hwnd = 0x1_0a20;

    #[derive(Default)]
    struct ScriptedSource {
        messages: VecDeque<Message>,
        defaulted: Vec<u32>,
        captured: Option<Hwnd>,
        tracked: Vec<Hwnd>,
        cursor_hidden: bool,
        touches: VecDeque<Vec<TouchInput>>,
    }

    impl ScriptedSource {
        fn new(messages: impl IntoIterator<Item = (u32, usize, isize)>) -> ScriptedSource {
            ScriptedSource {
                messages: messages
                    .into_iter()
                    .map(|(msg, w, l)| Message::new(HWND, msg, w, l))
                    .collect(),
                ..Default::default()
            }
        }
    }

    impl MessageSource for ScriptedSource {
        fn next_message(&mut self) -> Option<Message> {
            self.messages.pop_front()
        }
        fn default_handling(&mut self, msg: &Message) {
            self.defaulted.push(msg.msg);
        }
        fn set_capture(&mut self, hwnd: Hwnd) {
            self.captured = Some(hwnd);
        }
        fn release_capture(&mut self) {
            self.captured = None;
        }
        fn track_mouse_leave(&mut self, hwnd: Hwnd) {
            self.tracked.push(hwnd);
        }
        fn set_cursor_hidden(&mut self, _: Hwnd, hidden: bool) {
            self.cursor_hidden = hidden;
        }
        fn query_insets(&mut self, _: Hwnd) -> Option<[i32; 4]> {
            Some([8, 8, 31, 8])
        }
        fn screen_to_client(&mut self, _: Hwnd, pos: Point) -> Point {
            Point::new(pos.x - 100, pos.y - 100)
        }
        fn update_rect(&mut self, _: Hwnd) -> Option<Rect> {
            Some(Rect::new(0, 0, 10, 10))
        }
        fn touch_inputs(&mut self, _: &Message) -> Vec<TouchInput> {
            self.touches.pop_front().unwrap_or_default()
        }
        fn translate_char(&mut self, _: &Message) -> Option<char> {
            Some('x')
        }
        fn modifiers(&mut self) -> Modifiers {
            Modifiers::empty()
        }
    }

    fn live_window(display: &mut Display) -> Rc<RefCell<Recorder>> {
        let sink = Recorder::new();
        display
            .create_window(handle_of(HWND), &WindowBuilder::new(), &sink)
            .unwrap();
        display.reconcile(handle_of(HWND), |data| {
            let mut events = data.on_insets_probe(8, 8, 31, 8);
            events.extend(data.on_shown());
            events
        });
        sink.borrow_mut().clear();
        sink
    }

    #[test]
    fn creation_then_first_show() {
        let mut display = Display::new();
        let sink = Recorder::new();
        display
            .create_window(handle_of(HWND), &WindowBuilder::new(), &sink)
            .unwrap();
        let mut pump = Win32Pump::new(ScriptedSource::new([
            (WM_SIZE, SIZE_RESTORED, make_lparam(800, 600)),
            (WM_MOVE, 0, make_lparam(40, 30)),
            (WM_SHOWWINDOW, 1, 0),
        ]));
        pump.pump(&mut display).unwrap();
        assert_eq!(
            sink.borrow().events,
            vec![
                WindowEvent::Resize {
                    size: Size::new(800, 600),
                    during_live_resize: false
                },
                WindowEvent::Move(Point::new(40, 30)),
                WindowEvent::InsetsChanged(crate::Insets::new(8, 8, 31, 8).unwrap()),
                WindowEvent::FocusChanged(false),
                WindowEvent::VisibilityChanged(true),
            ]
        );
        assert_eq!(pump.source().defaulted, vec![WM_SHOWWINDOW]);
    }

    #[test]
    fn minimize_is_visibility() {
        let mut display = Display::new();
        let sink = live_window(&mut display);
        let mut pump = Win32Pump::new(ScriptedSource::new([
            (WM_SIZE, SIZE_RESTORED, make_lparam(800, 600)),
            (WM_SIZE, SIZE_MINIMIZED, 0),
            (WM_SIZE, SIZE_RESTORED, make_lparam(800, 600)),
            (WM_SIZE, SIZE_MAXIMIZED, make_lparam(1920, 1050)),
        ]));
        pump.pump(&mut display).unwrap();
        assert_eq!(
            sink.borrow().names(),
            vec!["resize", "visibility", "visibility", "maximized", "resize"]
        );
    }

    #[test]
    fn live_resize_is_flagged() {
        let mut display = Display::new();
        let sink = live_window(&mut display);
        let mut pump = Win32Pump::new(ScriptedSource::new([
            (WM_ENTERSIZEMOVE, 0, 0),
            (WM_SIZE, SIZE_RESTORED, make_lparam(700, 500)),
            (WM_EXITSIZEMOVE, 0, 0),
            (WM_SIZE, SIZE_RESTORED, make_lparam(710, 500)),
        ]));
        pump.pump(&mut display).unwrap();
        let live: Vec<bool> = sink
            .borrow()
            .events
            .iter()
            .filter_map(|ev| match ev {
                WindowEvent::Resize {
                    during_live_resize, ..
                } => Some(*during_live_resize),
                _ => None,
            })
            .collect();
        assert_eq!(live, vec![true, false]);
    }

    #[test]
    fn capture_follows_buttons() {
        let mut display = Display::new();
        let _sink = live_window(&mut display);
        let mut pump = Win32Pump::new(ScriptedSource::new([
            (WM_LBUTTONDOWN, 0, make_lparam(5, 5)),
            (WM_RBUTTONDOWN, 0, make_lparam(5, 5)),
            (WM_LBUTTONUP, 0, make_lparam(5, 5)),
        ]));
        pump.pump(&mut display).unwrap();
        assert_eq!(pump.source().captured, Some(HWND));

        pump.source_mut()
            .messages
            .push_back(Message::new(HWND, WM_RBUTTONUP, 0, make_lparam(5, 5)));
        pump.pump(&mut display).unwrap();
        assert_eq!(pump.source().captured, None);
    }

    #[test]
    fn capture_taken_away() {
        let mut display = Display::new();
        let _sink = live_window(&mut display);
        let mut pump = Win32Pump::new(ScriptedSource::new([
            (WM_LBUTTONDOWN, 0, make_lparam(5, 5)),
            (WM_CAPTURECHANGED, 0, 0x9999),
        ]));
        pump.pump(&mut display).unwrap();
        let data = display.window(handle_of(HWND)).unwrap();
        assert!(!data.pointer().captured);
        assert!(data.pointer().buttons.is_empty());
    }

    #[test]
    fn touch_swallows_emulated_release() {
        let mut display = Display::new();
        let sink = live_window(&mut display);
        let mut source = ScriptedSource::new([
            (WM_TOUCH, 1, 0),
            (WM_TOUCH, 1, 0),
            (WM_LBUTTONUP, 0, make_lparam(1, 1)),
            (WM_LBUTTONUP, 0, make_lparam(1, 1)),
        ]);
        let pos = Point::new(1, 1);
        source.touches.push_back(vec![TouchInput {
            id: 5,
            phase: TouchPhase::Down,
            pos,
        }]);
        source.touches.push_back(vec![TouchInput {
            id: 5,
            phase: TouchPhase::Up,
            pos,
        }]);
        let mut pump = Win32Pump::new(source);
        pump.pump(&mut display).unwrap();
        assert_eq!(sink.borrow().names(), vec!["touch", "touch", "pointer"]);
    }

    #[test]
    fn touch_tap_does_not_leave_capture() {
        let mut display = Display::new();
        let sink = live_window(&mut display);
        let mut source = ScriptedSource::new([
            (WM_TOUCH, 1, 0),
            (WM_LBUTTONDOWN, 0, make_lparam(1, 1)),
            (WM_TOUCH, 1, 0),
            (WM_LBUTTONUP, 0, make_lparam(1, 1)),
        ]);
        let pos = Point::new(1, 1);
        source.touches.push_back(vec![TouchInput {
            id: 9,
            phase: TouchPhase::Down,
            pos,
        }]);
        source.touches.push_back(vec![TouchInput {
            id: 9,
            phase: TouchPhase::Up,
            pos,
        }]);
        let mut pump = Win32Pump::new(source);
        pump.pump(&mut display).unwrap();
        assert_eq!(sink.borrow().names(), vec!["touch", "touch"]);
        assert_eq!(pump.source().captured, None);
        let data = display.window(handle_of(HWND)).unwrap();
        assert!(!data.pointer().captured);
        assert!(data.pointer().buttons.is_empty());
    }

    #[test]
    fn emulated_press_before_touch_is_released() {
        let mut display = Display::new();
        let sink = live_window(&mut display);
        let mut source = ScriptedSource::new([
            (WM_LBUTTONDOWN, 0, make_lparam(1, 1)),
            (WM_TOUCH, 1, 0),
            (WM_TOUCH, 1, 0),
            (WM_LBUTTONUP, 0, make_lparam(1, 1)),
        ]);
        let pos = Point::new(1, 1);
        source.touches.push_back(vec![TouchInput {
            id: 3,
            phase: TouchPhase::Down,
            pos,
        }]);
        source.touches.push_back(vec![TouchInput {
            id: 3,
            phase: TouchPhase::Up,
            pos,
        }]);
        let mut pump = Win32Pump::new(source);
        pump.pump(&mut display).unwrap();
        assert_eq!(
            sink.borrow().names(),
            vec!["pointer", "touch", "touch", "pointer"]
        );
        assert_eq!(pump.source().captured, None);
        assert!(!display.window(handle_of(HWND)).unwrap().pointer().captured);
    }

    #[test]
    fn restore_keeps_a_hidden_window_hidden() {
        let mut display = Display::new();
        let sink = live_window(&mut display);
        let mut pump = Win32Pump::new(ScriptedSource::new([
            (WM_SHOWWINDOW, 0, 0),
            (WM_SIZE, SIZE_RESTORED, make_lparam(500, 400)),
        ]));
        pump.pump(&mut display).unwrap();
        assert_eq!(sink.borrow().names(), vec!["visibility", "resize"]);
        let data = display.window(handle_of(HWND)).unwrap();
        assert!(!data.flags().contains(crate::WindowFlags::VISIBLE));
    }

    #[test]
    fn other_windows_maximizing_is_ignored() {
        let mut display = Display::new();
        let sink = live_window(&mut display);
        let mut pump = Win32Pump::new(ScriptedSource::new([
            (WM_SIZE, SIZE_MAXIMIZED, make_lparam(1920, 1050)),
            (WM_SIZE, SIZE_MAXHIDE, make_lparam(300, 200)),
            (WM_SIZE, SIZE_MAXSHOW, make_lparam(300, 200)),
        ]));
        pump.pump(&mut display).unwrap();
        assert_eq!(sink.borrow().names(), vec!["maximized", "resize"]);
        let data = display.window(handle_of(HWND)).unwrap();
        assert_eq!(data.geometry().size(), Size::new(1920, 1050));
        assert!(data.flags().contains(crate::WindowFlags::MAXIMIZED_HORZ));
        assert_eq!(pump.source().defaulted, vec![WM_SIZE, WM_SIZE]);
    }

    #[test]
    fn mouse_enter_and_leave() {
        let mut display = Display::new();
        let sink = live_window(&mut display);
        let mut pump = Win32Pump::new(ScriptedSource::new([
            (WM_MOUSEMOVE, 0, make_lparam(1, 2)),
            (WM_MOUSEMOVE, 0, make_lparam(3, 4)),
            (WM_MOUSELEAVE, 0, 0),
            (WM_MOUSEWHEEL, (120usize) << 16, make_lparam(110, 120)),
        ]));
        pump.pump(&mut display).unwrap();
        assert_eq!(pump.source().tracked, vec![HWND]);
        let events = &sink.borrow().events;
        assert_eq!(events.len(), 5);
        match &events[4] {
            WindowEvent::Pointer(p) => {
                assert_eq!(p.rotation, -1.0);
                assert_eq!(p.pos, Point::new(10, 20));
            }
            other => panic!("expected wheel, got {:?}", other),
        }
    }

    #[test]
    fn close_is_not_defaulted() {
        let mut display = Display::new();
        let sink = live_window(&mut display);
        let mut source = ScriptedSource::new([(WM_CLOSE, 0, 0), (WM_PAINT, 0, 0)]);
        source
            .messages
            .push_back(Message::new(0xdead, WM_CLOSE, 0, 0));
        let mut pump = Win32Pump::new(source);
        let status = pump.pump(&mut display).unwrap();
        assert_eq!(status.processed, 3);
        assert_eq!(sink.borrow().names(), vec!["destroy-requested", "repaint"]);
        // Only the paint and the foreign window's close reach the default.
        assert_eq!(pump.source().defaulted, vec![WM_PAINT, WM_CLOSE]);
    }

    #[test]
    fn hidden_pointer_hides_cursor() {
        let mut display = Display::new();
        let _sink = live_window(&mut display);
        display.reconcile(handle_of(HWND), |data| {
            data.set_pointer_visible(false);
            Events::new()
        });
        let mut pump = Win32Pump::new(ScriptedSource::new([(
            WM_SETCURSOR,
            HWND,
            make_lparam(HTCLIENT as i32, 0),
        )]));
        pump.pump(&mut display).unwrap();
        assert!(pump.source().cursor_hidden);
        assert!(pump.source().defaulted.is_empty());
    }

    #[test]
    fn key_repeat_bit() {
        let mut display = Display::new();
        let sink = live_window(&mut display);
        let lparam = (0x1E << 16) | 1;
        let mut pump = Win32Pump::new(ScriptedSource::new([
            (WM_KEYDOWN, 0x41, lparam),
            (WM_KEYDOWN, 0x41, lparam | (1 << 30)),
            (WM_KEYUP, 0x41, lparam | (1 << 30)),
        ]));
        pump.pump(&mut display).unwrap();
        let keys: Vec<(bool, bool, Option<char>)> = sink
            .borrow()
            .events
            .iter()
            .filter_map(|ev| match ev {
                WindowEvent::Key(k) => Some((k.is_pressed(), k.repeat, k.char)),
                _ => None,
            })
            .collect();
        assert_eq!(
            keys,
            vec![
                (true, false, Some('x')),
                (true, true, Some('x')),
                (false, false, None)
            ]
        );
    }

    #[test]
    fn destroy_frees_handle() {
        let mut display = Display::new();
        let sink = live_window(&mut display);
        let mut pump = Win32Pump::new(ScriptedSource::new([
            (WM_DESTROY, 0, 0),
            (WM_NCDESTROY, 0, 0),
            (WM_MOVE, 0, make_lparam(1, 1)),
        ]));
        pump.pump(&mut display).unwrap();
        assert_eq!(sink.borrow().names(), vec!["destroyed"]);
        assert!(display.registry().is_empty());
    }
}
