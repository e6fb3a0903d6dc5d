//! Session controller: Owns the single in-flight request.
//!
//! The controller is the only writer of the stream buffer and the only
//! publisher of observable state. It runs entirely on the app loop thread:
//! network messages, frame callbacks and user actions all arrive here in
//! the order the loop receives them.

use super::buffer::StreamBuffer;
use super::reasoning::Reasoning;
use super::sections::SectionResult;
use super::state::{SessionState, Step, Transition};
use super::view::View;
use crate::config::PromptLimits;
use crate::frame::{FrameScheduler, FrameToken, Flusher};
use crate::protocol::{EventDecoder, GenerateRequest, Section, StreamEvent};
use crate::transport::{NetworkEvent, RequestId, StreamMessage};
use tracing::{debug, info, trace, warn};

/// Shown when the service cannot be reached or the stream breaks.
pub const CONNECTION_FAILURE_MESSAGE: &str =
    "Failed to connect to the server. Make sure the generation service is running.";

/// Shown when the service reports an error without a message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// Shown when the body ends without `done` or `error`.
///
/// The request fails instead of staying in its loading state.
pub const INTERRUPTED_MESSAGE: &str = "The stream ended before the specs were complete.";

/// An accepted prompt, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Identifier for messages belonging to this request.
    pub id: RequestId,
    /// Body to send.
    pub request: GenerateRequest,
}

/// Request lifecycle plus every piece of observable state.
#[derive(Debug)]
pub struct Session {
    limits: PromptLimits,
    state: SessionState,
    /// Set atomically on `done`, cleared by the next submit.
    committed: Option<SectionResult>,
    /// Published section text.
    live: SectionResult,
    /// Published streaming-cursor section.
    streaming_section: Option<Section>,
    reasoning: Reasoning,
    buffer: StreamBuffer,
    flusher: Flusher,
    decoder: EventDecoder,
    in_flight: Option<RequestId>,
    last_request: u64,
    revision: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(PromptLimits::default())
    }
}

impl Session {
    /// Create an idle session.
    pub fn new(limits: PromptLimits) -> Self {
        Self {
            limits,
            state: SessionState::new(),
            committed: None,
            live: SectionResult::new(),
            streaming_section: None,
            reasoning: Reasoning::default(),
            buffer: StreamBuffer::new(),
            flusher: Flusher::new(),
            decoder: EventDecoder::new(),
            in_flight: None,
            last_request: 0,
            revision: 0,
        }
    }

    // =========================================================================
    // Request lifecycle
    // =========================================================================

    /// Start a new request.
    ///
    /// Returns `None` without touching any state when the prompt is out of
    /// bounds or a request is already in flight. On acceptance every piece of
    /// state from the previous request is discarded before the caller opens
    /// the stream.
    pub fn submit(&mut self, prompt: &str, frames: &mut dyn FrameScheduler) -> Option<Submission> {
        if let Some(current) = self.in_flight {
            debug!(request = %current, "submit ignored while a request is in flight");
            return None;
        }
        let query = self.limits.accept(prompt)?;

        self.flusher.cancel(frames);
        self.committed = None;
        self.live.clear();
        self.streaming_section = None;
        self.reasoning.reset();
        self.buffer.reset();
        self.decoder.reset();
        self.state.begin();

        self.last_request += 1;
        let id = RequestId(self.last_request);
        self.in_flight = Some(id);
        self.bump();

        info!(request = %id, chars = query.chars().count(), "submitting prompt");
        Some(Submission {
            id,
            request: GenerateRequest::new(query),
        })
    }

    /// Handle one message from the stream actor.
    ///
    /// Messages for any request other than the one in flight are dropped.
    pub fn handle_network(&mut self, event: NetworkEvent, frames: &mut dyn FrameScheduler) {
        if self.in_flight != Some(event.request) {
            trace!(request = %event.request, "dropping message for inactive request");
            return;
        }

        match event.message {
            StreamMessage::Chunk(bytes) => {
                for decoded in self.decoder.feed(&bytes) {
                    let terminal = decoded.is_terminal();
                    self.dispatch(decoded, frames);
                    if terminal {
                        break;
                    }
                }
            }
            StreamMessage::End => {
                debug!(
                    request = %event.request,
                    tail = self.decoder.pending_len(),
                    "generation stream closed"
                );
                if let Some(decoded) = self.decoder.finish() {
                    self.dispatch(decoded, frames);
                }
                if let Some(id) = self.in_flight {
                    warn!(request = %id, "stream ended without a terminal event");
                    self.fail(INTERRUPTED_MESSAGE, frames);
                }
            }
            StreamMessage::Failed(err) => {
                warn!(request = %event.request, error = %err, "generation stream failed");
                self.fail(CONNECTION_FAILURE_MESSAGE, frames);
            }
        }
    }

    /// Apply one decoded event.
    ///
    /// Ignored when no request is in flight.
    pub fn dispatch(&mut self, event: StreamEvent, frames: &mut dyn FrameScheduler) {
        if self.in_flight.is_none() {
            return;
        }

        match event {
            StreamEvent::Progress { step: Some(step) } => {
                let transition = self.state.advance(step);
                if matches!(transition, Transition::Repeat | Transition::Backward) {
                    debug!(?step, ?transition, "accepting out-of-order progress");
                }
                self.bump();
            }
            StreamEvent::Progress { step: None } => {}
            StreamEvent::Thinking { content } => {
                if !self.reasoning.is_active() {
                    self.reasoning.set_active(true);
                    self.bump();
                }
                self.buffer.push_thinking(content.as_deref().unwrap_or_default());
                self.flusher.request(frames);
            }
            StreamEvent::Delta { field, content } => {
                if self.reasoning.is_active() || !self.reasoning.is_collapsed() {
                    self.reasoning.yield_to_output();
                    self.bump();
                }
                self.buffer
                    .push_delta(field, content.as_deref().unwrap_or_default());
                self.flusher.request(frames);
            }
            StreamEvent::Done => self.finish(frames),
            StreamEvent::Error { message } => {
                let message = message.unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());
                self.fail(message, frames);
            }
            StreamEvent::Unknown => trace!("skipping unknown event type"),
        }
    }

    /// Publish buffered content for a delivered frame.
    ///
    /// Returns `true` if anything observable changed. Tokens that are not
    /// the pending frame are ignored.
    pub fn on_frame(&mut self, token: FrameToken) -> bool {
        if !self.flusher.claim(token) {
            trace!(token = token.get(), "ignoring stale frame");
            return false;
        }

        let mut changed = false;
        let latest = self.buffer.latest_section();
        if let Some(sections) = self.buffer.take_dirty_sections() {
            self.live.copy_from(sections);
            self.streaming_section = latest;
            if let Some(section) = latest {
                self.state.follow(section);
            }
            changed = true;
        }
        if let Some(text) = self.buffer.take_dirty_reasoning() {
            self.reasoning.publish(text);
            changed = true;
        }

        if changed {
            self.bump();
        }
        changed
    }

    /// Stop observing the current request.
    ///
    /// Cancels any pending frame so nothing is published after teardown.
    pub fn teardown(&mut self, frames: &mut dyn FrameScheduler) {
        self.flusher.cancel(frames);
        if let Some(id) = self.in_flight.take() {
            debug!(request = %id, "session torn down mid-stream");
        }
    }

    fn finish(&mut self, frames: &mut dyn FrameScheduler) {
        self.flusher.cancel(frames);

        self.live.copy_from(self.buffer.sections());
        self.committed = Some(self.buffer.sections().clone());
        self.reasoning.publish(self.buffer.reasoning());
        self.reasoning.set_active(false);
        self.buffer.mark_clean();
        self.buffer.clear_latest_section();
        self.streaming_section = None;
        self.state.complete();

        if let Some(id) = self.in_flight.take() {
            info!(request = %id, "specs complete");
        }
        self.bump();
    }

    fn fail(&mut self, message: impl Into<String>, frames: &mut dyn FrameScheduler) {
        self.flusher.cancel(frames);

        if self.buffer.is_dirty() {
            debug!("dropping unpublished content");
        }
        self.buffer.mark_clean();
        self.buffer.clear_latest_section();
        self.reasoning.set_active(false);
        self.streaming_section = None;
        self.state.fail(message);

        if let Some(id) = self.in_flight.take() {
            info!(request = %id, error = self.state.error_message(), "request failed");
        }
        self.bump();
    }

    const fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    // =========================================================================
    // User actions
    // =========================================================================

    /// The user picked a section tab.
    pub fn select_section(&mut self, section: Section) {
        self.state.select(section, self.in_flight.is_some());
        self.bump();
    }

    /// The user toggled the reasoning panel.
    pub fn toggle_reasoning(&mut self) {
        self.reasoning.toggle();
        self.bump();
    }

    // =========================================================================
    // Observable state
    // =========================================================================

    /// Derived state for a surface.
    pub fn view<'a>(&'a self, prompt: &'a str) -> View<'a> {
        View::new(self, prompt)
    }

    /// Current pipeline state.
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current step.
    pub const fn step(&self) -> Step {
        self.state.step()
    }

    /// Failure message, if the request failed.
    pub fn error_message(&self) -> Option<&str> {
        self.state.error_message()
    }

    /// Result of the last successful request.
    pub const fn committed(&self) -> Option<&SectionResult> {
        self.committed.as_ref()
    }

    /// Published section text.
    pub const fn live(&self) -> &SectionResult {
        &self.live
    }

    /// Published reasoning state.
    pub const fn reasoning(&self) -> &Reasoning {
        &self.reasoning
    }

    /// Section currently being written, as last published.
    pub const fn streaming_section(&self) -> Option<Section> {
        self.streaming_section
    }

    /// Request in flight, if any.
    pub const fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    /// Whether a request is in flight.
    pub const fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether a publish is scheduled.
    pub const fn flush_pending(&self) -> bool {
        self.flusher.is_pending()
    }

    /// Counter bumped by every observable change.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Prompt bounds in force.
    pub const fn limits(&self) -> &PromptLimits {
        &self.limits
    }
}
