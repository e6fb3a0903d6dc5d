//! Frame pacing: "Run this once on the next display refresh."
//!
//! Producers never touch observable state directly. They ask for a frame
//! through a [`FrameScheduler`], and the host loop delivers the scheduled
//! [`FrameToken`]s when the next tick fires:
//!
//! ```text
//! event ──▶ Flusher::request ──▶ FrameScheduler::schedule ──▶ token queued
//!                                                                  │
//! tick  ──▶ FrameQueue::drain_due ──▶ Session::on_frame(token) ◀───┘
//! ```

mod flusher;

pub use flusher::Flusher;

/// Handle for one scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameToken(u64);

impl FrameToken {
    /// Raw token value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A source of display-refresh callbacks.
pub trait FrameScheduler {
    /// Schedule one callback for the next refresh.
    fn schedule(&mut self) -> FrameToken;

    /// Cancel a scheduled callback. Unknown tokens are ignored.
    fn cancel(&mut self, token: FrameToken);
}

/// Tokens waiting for the next tick.
#[derive(Debug, Default)]
pub struct FrameQueue {
    /// Next token value to hand out.
    next: u64,
    /// Tokens scheduled since the last drain.
    queued: Vec<FrameToken>,
}

impl FrameQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every token due on this tick.
    pub fn drain_due(&mut self) -> Vec<FrameToken> {
        std::mem::take(&mut self.queued)
    }

    /// Number of tokens waiting.
    pub fn len(&self) -> usize {
        self.queued.len()
    }

    /// Whether nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }
}

impl FrameScheduler for FrameQueue {
    fn schedule(&mut self) -> FrameToken {
        let token = FrameToken(self.next);
        self.next = self.next.wrapping_add(1);
        self.queued.push(token);
        token
    }

    fn cancel(&mut self, token: FrameToken) {
        self.queued.retain(|queued| *queued != token);
    }
}
