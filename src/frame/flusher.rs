//! Flusher: A single-slot pending-frame token.
//!
//! At most one frame is outstanding at any time. Requests made while one is
//! pending collapse into it, and a delivered token only counts if it is the
//! one still pending, so a frame that was cancelled after the host already
//! drained it can never publish.

use super::{FrameScheduler, FrameToken};

/// Coalesces flush requests into one frame per tick.
#[derive(Debug, Default)]
pub struct Flusher {
    pending: Option<FrameToken>,
}

impl Flusher {
    /// Create a flusher with nothing pending.
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Ask for a publish on the next frame.
    ///
    /// Returns `true` when this call scheduled the frame, `false` when one
    /// was already pending.
    pub fn request(&mut self, frames: &mut dyn FrameScheduler) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(frames.schedule());
        true
    }

    /// Claim a delivered frame.
    ///
    /// Returns `true` if `token` is the pending frame; the slot is cleared.
    pub fn claim(&mut self, token: FrameToken) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Cancel the pending frame, if any.
    pub fn cancel(&mut self, frames: &mut dyn FrameScheduler) {
        if let Some(token) = self.pending.take() {
            frames.cancel(token);
        }
    }

    /// Whether a frame is outstanding.
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
