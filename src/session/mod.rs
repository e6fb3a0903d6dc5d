//! Session: Request lifecycle, buffered streaming and published state.
//!
//! # Data Flow
//!
//! ```text
//! NetworkEvent ─▶ EventDecoder ─▶ Session::dispatch ─▶ StreamBuffer
//!                                                         │ (dirty)
//!                                        Flusher ◀────────┘
//!                                           │ frame token
//!                                           ▼
//!                                   Session::on_frame ─▶ live copy ─▶ View
//! ```
//!
//! `done` bypasses the frame path: it cancels the pending frame and
//! publishes the accumulators directly, so the committed result can never be
//! overwritten by a late tick.

mod buffer;
mod controller;
mod reasoning;
mod sections;
mod state;
mod view;

pub use buffer::StreamBuffer;
pub use controller::{
    Session, Submission, CONNECTION_FAILURE_MESSAGE, INTERRUPTED_MESSAGE, UNKNOWN_ERROR_MESSAGE,
};
pub use reasoning::Reasoning;
pub use sections::SectionResult;
pub use state::{SessionState, Step, StepStatus, Transition};
pub use view::{GaugeLevel, PromptGauge, View};
