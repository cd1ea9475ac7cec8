use shortcut_panel::dispatch::{self, GestureSink};
use shortcut_panel::gesture::{
    ClickState, GestureEvent, MockHookBackend, MouseButton, PointerEvent, PointerInput,
    PointerTap,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn at(base: Instant, ms: u64) -> Instant {
    base + Duration::from_millis(ms)
}

/// Sink that panics on demand, standing in for a fault inside the callback.
#[derive(Default)]
struct FaultySink {
    fail: AtomicBool,
}

impl GestureSink for FaultySink {
    fn post(&self, _event: GestureEvent) {
        if self.fail.load(Ordering::SeqCst) {
            panic!("sink failure");
        }
    }
}

#[test]
fn install_and_uninstall_are_idempotent() {
    let (backend, handle) = MockHookBackend::new();
    let (bridge, _rx) = dispatch::channel();
    let mut tap = PointerTap::new(Box::new(backend), Arc::new(bridge));

    tap.uninstall();
    assert_eq!(handle.uninstall_count(), 0);

    tap.install().unwrap();
    tap.install().unwrap();
    assert_eq!(handle.install_count(), 1);
    assert!(tap.is_installed());

    tap.uninstall();
    tap.uninstall();
    assert_eq!(handle.uninstall_count(), 1);
    assert!(!tap.is_installed());
}

#[test]
fn install_failure_is_reported() {
    let (backend, handle) = MockHookBackend::failing();
    let (bridge, _rx) = dispatch::channel();
    let mut tap = PointerTap::new(Box::new(backend), Arc::new(bridge));

    assert!(tap.install().is_err());
    assert!(!tap.is_installed());
    assert!(!handle.emit(PointerEvent::middle_down(Instant::now())));
    tap.uninstall();
}

#[test]
fn double_middle_click_reaches_receiver() {
    let (backend, handle) = MockHookBackend::new();
    let (bridge, rx) = dispatch::channel();
    let mut tap = PointerTap::new(Box::new(backend), Arc::new(bridge));
    tap.install().unwrap();

    let base = Instant::now();
    assert!(handle.emit(PointerEvent::middle_down(at(base, 0))));
    assert!(handle.emit(PointerEvent::middle_down(at(base, 250))));

    assert_eq!(rx.drain(), vec![GestureEvent]);
    assert_eq!(handle.forwarded_count(), 2);
}

#[test]
fn every_event_is_forwarded_and_others_ignored() {
    let (backend, handle) = MockHookBackend::new();
    let (bridge, rx) = dispatch::channel();
    let mut tap = PointerTap::new(Box::new(backend), Arc::new(bridge));
    tap.install().unwrap();

    let base = Instant::now();
    let events = [
        PointerEvent::new(0, PointerInput::ButtonDown(MouseButton::Left), at(base, 0)),
        PointerEvent::new(0, PointerInput::ButtonUp(MouseButton::Middle), at(base, 10)),
        PointerEvent::new(0, PointerInput::Move, at(base, 20)),
        PointerEvent::new(0, PointerInput::ButtonDown(MouseButton::Right), at(base, 30)),
        PointerEvent::new(0, PointerInput::Wheel, at(base, 40)),
        // Negative hook codes must not be interpreted.
        PointerEvent::new(-1, PointerInput::ButtonDown(MouseButton::Middle), at(base, 50)),
    ];
    for ev in events {
        assert!(handle.emit(ev));
    }

    assert_eq!(handle.forwarded_count(), events.len());
    assert_eq!(tap.click_state(), ClickState::default());
    assert!(rx.drain().is_empty());
}

#[test]
fn faulting_callback_forwards_and_keeps_state() {
    let (backend, handle) = MockHookBackend::new();
    let sink = Arc::new(FaultySink::default());
    let mut tap = PointerTap::new(Box::new(backend), sink.clone());
    tap.install().unwrap();

    let base = Instant::now();
    handle.emit(PointerEvent::middle_down(at(base, 0)));
    let before = tap.click_state();
    assert_eq!(before.click_count, 1);

    sink.fail.store(true, Ordering::SeqCst);
    assert!(handle.emit(PointerEvent::middle_down(at(base, 100))));

    assert_eq!(handle.forwarded_count(), 2);
    assert_eq!(tap.click_state(), before);
    assert_eq!(tap.take_faults(), 1);
    assert_eq!(tap.take_faults(), 0);

    // The tap keeps working once the fault clears.
    sink.fail.store(false, Ordering::SeqCst);
    handle.emit(PointerEvent::middle_down(at(base, 200)));
    assert_eq!(tap.click_state(), ClickState::default());
}

#[test]
fn gestures_arrive_in_emission_order() {
    let (backend, handle) = MockHookBackend::new();
    let (bridge, rx) = dispatch::channel();
    let mut tap = PointerTap::new(Box::new(backend), Arc::new(bridge));
    tap.install().unwrap();

    let base = Instant::now();
    for ms in [0, 100, 1000, 1100, 2000, 2100] {
        handle.emit(PointerEvent::middle_down(at(base, ms)));
    }
    assert_eq!(rx.drain().len(), 3);
}

#[test]
fn reinstall_starts_with_fresh_state() {
    let (backend, handle) = MockHookBackend::new();
    let (bridge, rx) = dispatch::channel();
    let mut tap = PointerTap::new(Box::new(backend), Arc::new(bridge));
    tap.install().unwrap();

    let base = Instant::now();
    handle.emit(PointerEvent::middle_down(at(base, 0)));
    tap.uninstall();
    tap.install().unwrap();
    handle.emit(PointerEvent::middle_down(at(base, 100)));

    assert!(rx.drain().is_empty());
    assert_eq!(handle.install_count(), 2);
}

#[test]
fn dropping_tap_uninstalls() {
    let (backend, handle) = MockHookBackend::new();
    let (bridge, _rx) = dispatch::channel();
    {
        let mut tap = PointerTap::new(Box::new(backend), Arc::new(bridge));
        tap.install().unwrap();
    }
    assert_eq!(handle.uninstall_count(), 1);
}

#[test]
fn failed_uninstall_keeps_hook_owned_for_retry() {
    let (backend, handle) = MockHookBackend::new();
    let (bridge, rx) = dispatch::channel();
    let mut tap = PointerTap::new(Box::new(backend), Arc::new(bridge));
    tap.install().unwrap();

    handle.set_fail_uninstall(true);
    tap.uninstall();
    assert!(tap.is_installed());
    assert_eq!(handle.uninstall_count(), 0);

    // The hook is still live and still feeding the detector.
    let base = Instant::now();
    handle.emit(PointerEvent::middle_down(at(base, 0)));
    handle.emit(PointerEvent::middle_down(at(base, 100)));
    assert_eq!(rx.drain().len(), 1);

    handle.set_fail_uninstall(false);
    tap.uninstall();
    assert!(!tap.is_installed());
    assert_eq!(handle.uninstall_count(), 1);
}
