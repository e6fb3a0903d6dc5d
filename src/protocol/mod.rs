//! Protocol module: Wire types for the generation service.
//!
//! The service is driven by a single `POST` carrying a [`GenerateRequest`]
//! and answers with a line-delimited event stream. Every event line is the
//! literal [`EVENT_PREFIX`] followed by one JSON object whose `type` field
//! selects a [`StreamEvent`] variant.
//!
//! ```text
//! data: {"type":"progress","step":"retrieving"}
//! data: {"type":"thinking","content":"Let me "}
//! data: {"type":"delta","field":"requirements","content":"# Req"}
//! data: {"type":"done"}
//! ```

mod decoder;

pub use decoder::EventDecoder;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker that introduces an event payload on a stream line.
pub const EVENT_PREFIX: &str = "data: ";

/// Body of the generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest {
    /// The user's description of the agent to design.
    pub query: String,
}

impl GenerateRequest {
    /// Create a request for the given query.
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into() }
    }
}

/// One of the three fixed output sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// `requirements` section.
    #[default]
    Requirements,
    /// `design` section.
    Design,
    /// `tasks` section.
    Tasks,
}

impl Section {
    /// All sections in display order.
    pub const ALL: [Self; 3] = [Self::Requirements, Self::Design, Self::Tasks];

    /// Position of the section in [`Section::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::Requirements => 0,
            Self::Design => 1,
            Self::Tasks => 2,
        }
    }

    /// Wire name of the section.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requirements => "requirements",
            Self::Design => "design",
            Self::Tasks => "tasks",
        }
    }

    /// Human readable tab label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Requirements => "Requirements",
            Self::Design => "Design",
            Self::Tasks => "Tasks",
        }
    }

    /// The section after this one, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Requirements => Self::Design,
            Self::Design => Self::Tasks,
            Self::Tasks => Self::Requirements,
        }
    }

    /// The section before this one, wrapping around.
    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::Requirements => Self::Tasks,
            Self::Design => Self::Requirements,
            Self::Tasks => Self::Design,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline step reported by a `progress` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStep {
    /// Knowledge retrieval is running.
    Retrieving,
    /// The idea is being validated.
    Validating,
    /// Sections are being generated.
    Generating,
}

/// A decoded protocol event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// The service advanced its pipeline.
    Progress {
        /// New step. Absent steps are ignored by dispatch.
        #[serde(default)]
        step: Option<PipelineStep>,
    },
    /// A chunk of reasoning text.
    Thinking {
        /// Text to append.
        #[serde(default)]
        content: Option<String>,
    },
    /// A chunk of output for one section.
    Delta {
        /// Target section.
        field: Section,
        /// Text to append.
        #[serde(default)]
        content: Option<String>,
    },
    /// The stream completed successfully.
    Done,
    /// The service aborted the stream.
    Error {
        /// Message to surface, if the service supplied one.
        #[serde(default)]
        message: Option<String>,
    },
    /// Any `type` this client does not know. Dispatch skips it.
    #[serde(other)]
    Unknown,
}

impl StreamEvent {
    /// Whether this event ends the request.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error { .. })
    }
}
