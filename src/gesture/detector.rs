use std::time::{Duration, Instant};

/// Maximum gap between two middle-button presses that still counts as one gesture.
pub const DOUBLE_CLICK_THRESHOLD: Duration = Duration::from_millis(500);

/// Signal that the panel should toggle its visibility. Carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureEvent;

/// Click bookkeeping owned by a [`GestureDetector`].
///
/// `last_click` is `None` when no press is pending, which the detector treats
/// as "infinitely long ago".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickState {
    pub last_click: Option<Instant>,
    pub click_count: u32,
}

/// Recognises two presses within `threshold` of each other.
///
/// After a gesture fires the timer is reset to "never" instead of to the
/// firing press. The press that completed a gesture therefore cannot open a
/// new window: a third press right after it only arms the detector again.
#[derive(Debug, Clone)]
pub struct GestureDetector {
    state: ClickState,
    threshold: Duration,
}

impl Default for GestureDetector {
    fn default() -> Self {
        Self::new(DOUBLE_CLICK_THRESHOLD)
    }
}

impl GestureDetector {
    pub fn new(threshold: Duration) -> Self {
        Self {
            state: ClickState::default(),
            threshold,
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn state(&self) -> ClickState {
        self.state
    }

    /// Record a press at `now`, returning a gesture when it completes a pair.
    pub fn feed(&mut self, now: Instant) -> Option<GestureEvent> {
        let within = match self.state.last_click {
            // A timestamp earlier than the last press is treated as zero elapsed.
            Some(last) => now.saturating_duration_since(last) <= self.threshold,
            None => false,
        };

        if within {
            self.state.click_count += 1;
            if self.state.click_count >= 2 {
                self.state.click_count = 0;
                self.state.last_click = None;
                return Some(GestureEvent);
            }
        } else {
            self.state.click_count = 1;
        }

        self.state.last_click = Some(now);
        None
    }

    pub fn reset(&mut self) {
        self.state = ClickState::default();
    }
}
