//! Delivery through a pump, end to end.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use native_shell::backend::kd::{
    KdEvent, KdEventKind, KdEventSource, KdPointerIndex, KdPump, KdWindowProperty,
};
use native_shell::{
    Display, EventPump, EventSink, PumpConfig, Size, WindowBuilder, WindowHandle,
};
use test_log::test;

#[derive(Default)]
struct Log {
    seen: Vec<&'static str>,
    refuse_resize: bool,
}

impl EventSink for Log {
    fn resized(&mut self, _: WindowHandle, _: Size, _: bool) -> bool {
        self.seen.push("resize");
        !self.refuse_resize
    }

    fn moved(&mut self, _: WindowHandle, _: native_shell::Point) -> bool {
        self.seen.push("move");
        true
    }

    fn focus_changed(&mut self, _: WindowHandle, _: bool) -> bool {
        self.seen.push("focus");
        true
    }

    fn visibility_changed(&mut self, _: WindowHandle, _: bool) -> bool {
        self.seen.push("visibility");
        true
    }

    fn destroy_requested(&mut self, _: WindowHandle) -> bool {
        self.seen.push("destroy-requested");
        true
    }

    fn pointer(&mut self, _: WindowHandle, _: &native_shell::PointerEvent) -> bool {
        self.seen.push("pointer");
        true
    }
}

struct Queue {
    events: VecDeque<KdEvent>,
    size: Size,
}

impl KdEventSource for Queue {
    fn wait_event(&mut self, _: Duration) -> anyhow::Result<Option<KdEvent>> {
        Ok(self.events.pop_front())
    }

    fn window_size(&mut self) -> anyhow::Result<Size> {
        Ok(self.size)
    }

    fn window_visible(&mut self) -> anyhow::Result<bool> {
        Ok(true)
    }

    fn window_focused(&mut self) -> anyhow::Result<bool> {
        Ok(false)
    }
}

fn setup(log: &Rc<RefCell<Log>>) -> (Display, KdPump<Queue>, u64) {
    let mut display = Display::new();
    let handle = WindowHandle::from_raw(0x5000);
    let key = display
        .create_window(handle, &WindowBuilder::new(), log)
        .unwrap();
    let mut pump = KdPump::new(Queue {
        events: VecDeque::new(),
        size: Size::new(800, 600),
    });
    pump.register(handle, key);
    (display, pump, key.to_raw())
}

#[test]
fn refusing_sink_aborts_the_batch() {
    let log = Rc::new(RefCell::new(Log {
        refuse_resize: true,
        ..Default::default()
    }));
    let (mut display, mut pump, userptr) = setup(&log);
    pump.source_mut().events.extend([
        KdEvent::new(
            userptr,
            KdEventKind::WindowPropertyChange(KdWindowProperty::Visibility),
        ),
        KdEvent::new(userptr, KdEventKind::WindowClose),
    ]);

    let status = pump.pump(&mut display).unwrap();
    assert!(!status.continue_dispatch);
    assert_eq!(status.processed, 1);
    assert_eq!(log.borrow().seen, vec!["resize"]);

    // The rest of the queue is still there for the next pump.
    log.borrow_mut().refuse_resize = false;
    let status = pump.pump(&mut display).unwrap();
    assert!(status.continue_dispatch);
    assert_eq!(log.borrow().seen, vec!["resize", "destroy-requested"]);
}

#[test]
fn severed_sink_does_not_stop_the_pump() {
    let log = Rc::new(RefCell::new(Log::default()));
    let (mut display, mut pump, userptr) = setup(&log);
    pump.source_mut().events.extend([
        KdEvent::new(
            userptr,
            KdEventKind::WindowPropertyChange(KdWindowProperty::Visibility),
        ),
        KdEvent::new(
            userptr,
            KdEventKind::Pointer {
                index: KdPointerIndex::X,
                value: 12,
            },
        ),
    ]);
    drop(log);

    let status = pump.pump(&mut display).unwrap();
    assert!(status.continue_dispatch);
    assert_eq!(status.processed, 2);
}

#[test]
fn batch_limit_leaves_the_rest_queued() {
    let log = Rc::new(RefCell::new(Log::default()));
    let mut display = Display::new();
    let handle = WindowHandle::from_raw(0x6000);
    let key = display
        .create_window(handle, &WindowBuilder::new(), &log)
        .unwrap();
    let source = Queue {
        events: (0..5)
            .map(|_| KdEvent::new(key.to_raw(), KdEventKind::WindowClose))
            .collect(),
        size: Size::new(1, 1),
    };
    let mut pump = KdPump::with_config(source, PumpConfig { batch_limit: 2 });
    pump.register(handle, key);

    assert_eq!(pump.pump(&mut display).unwrap().processed, 2);
    assert_eq!(pump.source().events.len(), 3);
    // Close signals during creation are not reported.
    assert!(log.borrow().seen.is_empty());
}
