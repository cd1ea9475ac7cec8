use crate::gesture::GestureEvent;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError, TrySendError};
use std::sync::Arc;

/// Capacity of the queue between the hook thread and the UI thread.
pub const DISPATCH_CAPACITY: usize = 64;

/// Anything that can accept gestures produced on the hook thread.
///
/// Implementations are called from inside the low-level hook callback and
/// must neither block nor allocate.
pub trait GestureSink: Send + Sync {
    fn post(&self, event: GestureEvent);
}

/// Sending half of the hook → UI hand-off.
///
/// Backed by a bounded `sync_channel`, so `post` never allocates and uses
/// `try_send` so it never blocks. Events reach the UI in the order they were
/// posted.
pub struct DispatchBridge {
    tx: SyncSender<GestureEvent>,
    dropped: Arc<AtomicUsize>,
}

/// Receiving half, owned by the UI context.
pub struct GestureReceiver {
    rx: Receiver<GestureEvent>,
    dropped: Arc<AtomicUsize>,
}

/// Create a connected bridge/receiver pair.
pub fn channel() -> (DispatchBridge, GestureReceiver) {
    channel_with_capacity(DISPATCH_CAPACITY)
}

pub fn channel_with_capacity(capacity: usize) -> (DispatchBridge, GestureReceiver) {
    let (tx, rx) = mpsc::sync_channel(capacity);
    let dropped = Arc::new(AtomicUsize::new(0));
    (
        DispatchBridge {
            tx,
            dropped: Arc::clone(&dropped),
        },
        GestureReceiver { rx, dropped },
    )
}

impl GestureSink for DispatchBridge {
    fn post(&self, event: GestureEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
            // UI side is gone; nothing left to toggle.
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

impl GestureReceiver {
    /// Pull every pending gesture, oldest first.
    pub fn drain(&self) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(ev) => events.push(ev),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    /// Number of gestures discarded because the queue was full, since the last call.
    pub fn take_dropped(&self) -> usize {
        self.dropped.swap(0, Ordering::Relaxed)
    }
}
