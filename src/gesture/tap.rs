use crate::dispatch::GestureSink;
use crate::gesture::detector::{ClickState, GestureDetector, DOUBLE_CLICK_THRESHOLD};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    X,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerInput {
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    Move,
    Wheel,
    Other,
}

/// One event as seen by the low-level hook.
///
/// `code` is the hook code handed to the callback. Negative codes must be
/// passed along untouched.
#[derive(Debug, Clone, Copy)]
pub struct PointerEvent {
    pub code: i32,
    pub input: PointerInput,
    pub timestamp: Instant,
}

impl PointerEvent {
    pub fn new(code: i32, input: PointerInput, timestamp: Instant) -> Self {
        Self {
            code,
            input,
            timestamp,
        }
    }

    pub fn middle_down(timestamp: Instant) -> Self {
        Self::new(0, PointerInput::ButtonDown(MouseButton::Middle), timestamp)
    }

    fn is_trigger(&self) -> bool {
        self.code >= 0 && self.input == PointerInput::ButtonDown(MouseButton::Middle)
    }
}

/// Work done inside the hook callback.
///
/// Shared between the installing side and the backend's callback. Everything
/// reachable from [`TapHandler::handle`] is bounded: the detector lock is only
/// ever `try_lock`ed, and faults and contended presses are counted, not logged.
pub struct TapHandler {
    detector: Mutex<GestureDetector>,
    sink: Arc<dyn GestureSink>,
    faults: AtomicUsize,
    missed: AtomicUsize,
}

impl TapHandler {
    pub fn new(threshold: Duration, sink: Arc<dyn GestureSink>) -> Self {
        Self {
            detector: Mutex::new(GestureDetector::new(threshold)),
            sink,
            faults: AtomicUsize::new(0),
            missed: AtomicUsize::new(0),
        }
    }

    /// Observe `event`, then hand it to `next` exactly once.
    ///
    /// `next` stands for the "call the next hook" primitive; its return value
    /// is what the callback must return to the OS.
    pub fn handle<R>(&self, event: &PointerEvent, next: impl FnOnce() -> R) -> R {
        if event.is_trigger() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.observe(event.timestamp)));
            if outcome.is_err() {
                self.faults.fetch_add(1, Ordering::Relaxed);
            }
        }
        next()
    }

    fn observe(&self, now: Instant) {
        let mut detector = match self.detector.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                self.missed.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };
        // Work on a copy so a failing sink leaves the committed state untouched.
        let mut next = detector.clone();
        if let Some(event) = next.feed(now) {
            self.sink.post(event);
        }
        *detector = next;
    }

    fn lock_detector(&self) -> MutexGuard<'_, GestureDetector> {
        self.detector
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn click_state(&self) -> ClickState {
        self.lock_detector().state()
    }

    pub fn reset(&self) {
        self.lock_detector().reset();
    }

    /// Faults swallowed inside the callback since the last call.
    pub fn take_faults(&self) -> usize {
        self.faults.swap(0, Ordering::Relaxed)
    }

    /// Presses skipped because the detector was locked elsewhere.
    pub fn take_missed(&self) -> usize {
        self.missed.swap(0, Ordering::Relaxed)
    }
}

/// OS layer that owns the actual hook registration.
pub trait HookBackend: Send {
    fn install(&mut self, handler: Arc<TapHandler>) -> anyhow::Result<()>;
    fn uninstall(&mut self) -> anyhow::Result<()>;
    fn is_installed(&self) -> bool;
}

/// Global middle-button tap feeding a [`GestureDetector`].
pub struct PointerTap {
    backend: Box<dyn HookBackend>,
    handler: Arc<TapHandler>,
}

impl PointerTap {
    pub fn new(backend: Box<dyn HookBackend>, sink: Arc<dyn GestureSink>) -> Self {
        Self::with_threshold(backend, sink, DOUBLE_CLICK_THRESHOLD)
    }

    pub fn with_threshold(
        backend: Box<dyn HookBackend>,
        sink: Arc<dyn GestureSink>,
        threshold: Duration,
    ) -> Self {
        Self {
            backend,
            handler: Arc::new(TapHandler::new(threshold, sink)),
        }
    }

    /// Register the hook. A no-op when already installed.
    pub fn install(&mut self) -> anyhow::Result<()> {
        if self.backend.is_installed() {
            return Ok(());
        }
        self.handler.reset();
        self.backend.install(Arc::clone(&self.handler))?;
        tracing::info!("pointer tap installed");
        Ok(())
    }

    /// Remove the hook. Safe to call repeatedly or before [`install`](Self::install).
    pub fn uninstall(&mut self) {
        if !self.backend.is_installed() {
            return;
        }
        match self.backend.uninstall() {
            Ok(()) => tracing::info!("pointer tap removed"),
            Err(err) => tracing::error!(?err, "failed to remove pointer tap"),
        }
    }

    pub fn is_installed(&self) -> bool {
        self.backend.is_installed()
    }

    pub fn click_state(&self) -> ClickState {
        self.handler.click_state()
    }

    pub fn take_faults(&self) -> usize {
        self.handler.take_faults()
    }

    pub fn take_missed(&self) -> usize {
        self.handler.take_missed()
    }
}

impl Drop for PointerTap {
    fn drop(&mut self) {
        self.uninstall();
    }
}
