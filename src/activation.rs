use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(500);

/// Recognizes two key-down events of the trigger key in quick succession.
///
/// Only the last two timestamps are kept. Activation fires when the second
/// press lands strictly inside the window after the first, and the buffer
/// is emptied so a third press starts over.
#[derive(Debug, Clone)]
pub struct DoubleTapDetector {
    presses: VecDeque<Instant>,
    window: Duration,
}

impl Default for DoubleTapDetector {
    fn default() -> Self {
        Self::new(DOUBLE_TAP_WINDOW)
    }
}

impl DoubleTapDetector {
    pub fn new(window: Duration) -> Self {
        Self {
            presses: VecDeque::with_capacity(2),
            window,
        }
    }

    /// Record a key-down; returns true when it completes a double tap.
    pub fn key_down(&mut self, at: Instant) -> bool {
        self.presses.push_back(at);
        if self.presses.len() > 2 {
            self.presses.pop_front();
        }

        if let (Some(&first), Some(&second)) = (self.presses.front(), self.presses.get(1)) {
            if second.saturating_duration_since(first) < self.window {
                self.presses.clear();
                return true;
            }
        }
        false
    }

    pub fn pending(&self) -> usize {
        self.presses.len()
    }

    pub fn reset(&mut self) {
        self.presses.clear();
    }
}
