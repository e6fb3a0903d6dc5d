//! # Architect
//!
//! A frame-paced streaming client for the agent spec generation service.
//!
//! The service streams three documents (requirements, design and tasks) plus
//! a free-text reasoning stream as line-delimited JSON events. Events arrive
//! far faster than a terminal can usefully redraw, so they are accumulated in
//! a [`StreamBuffer`](session::StreamBuffer) and published at most once per
//! display tick.
//!
//! ## Core Concepts
//!
//! - **Incremental decoding**: [`EventDecoder`](protocol::EventDecoder) is
//!   indifferent to where the network splits the byte stream
//! - **Two stores**: raw accumulators vs. published copies, bridged by a
//!   single-slot [`Flusher`](frame::Flusher)
//! - **One request in flight**: every message is tagged with a
//!   [`RequestId`](transport::RequestId); stale ones are dropped
//! - **Actor model**: input, ticker and stream threads feed one app loop
//!
//! ## Example
//!
//! ```rust,ignore
//! use architect::frame::FrameQueue;
//! use architect::session::Session;
//!
//! let mut frames = FrameQueue::new();
//! let mut session = Session::default();
//! let submission = session.submit("Build a PR review agent", &mut frames);
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod app;
pub mod config;
pub mod error;
pub mod frame;
pub mod logging;
pub mod protocol;
pub mod session;
pub mod surface;
pub mod transport;
pub mod widget;

// Re-exports for convenience
pub use app::{Action, App};
pub use config::{ClientConfig, PromptLimits};
pub use error::{Error, Result, TransportError};
pub use protocol::{EventDecoder, Section, StreamEvent};
pub use session::{Session, Step, View};
