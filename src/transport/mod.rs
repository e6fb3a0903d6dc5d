//! Transport: Opening the event stream and moving its bytes to the app loop.
//!
//! A [`Transport`] opens the response body for one [`GenerateRequest`].
//! A [`StreamActor`] owns that body on its own thread and forwards every
//! chunk as a [`NetworkEvent`], tagged with the [`RequestId`] it belongs to.

mod http;
mod stream_actor;

pub use http::HttpTransport;
pub use stream_actor::StreamActor;

#[cfg(test)]
pub(crate) use stream_actor::tests::{ScriptedBody, ScriptedTransport};

use crate::error::TransportError;
use crate::protocol::GenerateRequest;
use std::fmt;
use std::io::Read;

/// Identifier of one accepted submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub(crate) u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A readable response body.
pub type Body = Box<dyn Read + Send>;

/// Something that can open the generation stream.
pub trait Transport: Send + Sync {
    /// Send the request and return the response body.
    fn open(&self, request: &GenerateRequest) -> Result<Body, TransportError>;
}

/// What happened on the wire.
#[derive(Debug)]
pub enum StreamMessage {
    /// Raw bytes at arbitrary boundaries.
    Chunk(Vec<u8>),
    /// The body ended cleanly.
    End,
    /// Connecting or reading failed.
    Failed(TransportError),
}

/// A [`StreamMessage`] for a specific request.
#[derive(Debug)]
pub struct NetworkEvent {
    /// Request the message belongs to.
    pub request: RequestId,
    /// The message itself.
    pub message: StreamMessage,
}
