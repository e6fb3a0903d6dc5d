//! Session state machine: Pipeline steps, failure tracking and section focus.
//!
//! # States
//!
//! ```text
//! Idle ──▶ Retrieving ──▶ Validating ──▶ Generating ──▶ Complete
//!               │              │              │
//!               └──────────────┴──────────────┴──────▶ Error
//! ```
//!
//! `Complete` and `Error` are terminal for the request that reached them.
//! Only a fresh [`SessionState::begin`] leaves them.

use crate::protocol::{PipelineStep, Section};

/// Position of a request in the generation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Step {
    /// No request has been made yet.
    #[default]
    Idle,
    /// Retrieving architecture knowledge.
    Retrieving,
    /// Validating the agent idea.
    Validating,
    /// Generating the sections.
    Generating,
    /// All sections committed.
    Complete,
    /// The request failed.
    Error,
}

impl Step {
    /// Steps shown in the progress indicator, in order.
    pub const PIPELINE: [Self; 4] = [
        Self::Retrieving,
        Self::Validating,
        Self::Generating,
        Self::Complete,
    ];

    /// Index within [`Step::PIPELINE`]; `None` for `Idle` and `Error`.
    pub const fn position(self) -> Option<usize> {
        match self {
            Self::Retrieving => Some(0),
            Self::Validating => Some(1),
            Self::Generating => Some(2),
            Self::Complete => Some(3),
            Self::Idle | Self::Error => None,
        }
    }

    /// Whether a request is working through the pipeline.
    pub const fn is_loading(self) -> bool {
        matches!(self, Self::Retrieving | Self::Validating | Self::Generating)
    }

    /// Whether the step ends a request.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }

    /// Progress indicator label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "Waiting for a description",
            Self::Retrieving => "Retrieving architecture knowledge",
            Self::Validating => "Validating agent idea",
            Self::Generating => "Generating spec files",
            Self::Complete => "Specs ready",
            Self::Error => "Failed",
        }
    }
}

impl From<PipelineStep> for Step {
    fn from(step: PipelineStep) -> Self {
        match step {
            PipelineStep::Retrieving => Self::Retrieving,
            PipelineStep::Validating => Self::Validating,
            PipelineStep::Generating => Self::Generating,
        }
    }
}

/// Display status of one pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepStatus {
    /// Not reached yet.
    Pending,
    /// Currently running.
    Active,
    /// Finished.
    Completed,
    /// Reached by a request that failed.
    Error,
}

/// How a `progress` event related to the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Moved further down the pipeline.
    Forward,
    /// Same step again.
    Repeat,
    /// Moved back to an earlier step.
    Backward,
    /// The state was terminal; nothing changed.
    Ignored,
}

/// Why a request failed.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Failure {
    message: String,
    /// Step that was current when the failure happened.
    during: Step,
}

/// The single source of truth for one request lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    step: Step,
    active_section: Section,
    user_overrode: bool,
    failure: Option<Failure>,
}

impl SessionState {
    /// Create an idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current step.
    pub const fn step(&self) -> Step {
        self.step
    }

    /// Section the user is looking at.
    pub const fn active_section(&self) -> Section {
        self.active_section
    }

    /// Whether the user picked a section during the current request.
    pub const fn user_overrode(&self) -> bool {
        self.user_overrode
    }

    /// Failure message; present iff the step is [`Step::Error`].
    pub fn error_message(&self) -> Option<&str> {
        self.failure.as_ref().map(|f| f.message.as_str())
    }

    /// Step that was running when the request failed.
    pub fn failed_during(&self) -> Option<Step> {
        self.failure.as_ref().map(|f| f.during)
    }

    /// Reset for a new request and enter [`Step::Retrieving`].
    pub fn begin(&mut self) {
        self.step = Step::Retrieving;
        self.active_section = Section::Requirements;
        self.user_overrode = false;
        self.failure = None;
    }

    /// Apply a `progress` step.
    ///
    /// The producer is trusted: repeats and backward moves are accepted and
    /// only reported through the returned [`Transition`]. Terminal states
    /// never change.
    pub fn advance(&mut self, to: PipelineStep) -> Transition {
        if self.step.is_terminal() {
            return Transition::Ignored;
        }

        let to = Step::from(to);
        let transition = match (self.step.position(), to.position()) {
            (Some(from), Some(next)) if next == from => Transition::Repeat,
            (Some(from), Some(next)) if next < from => Transition::Backward,
            _ => Transition::Forward,
        };
        self.step = to;
        transition
    }

    /// Enter [`Step::Complete`].
    pub fn complete(&mut self) {
        if self.step.is_terminal() {
            return;
        }
        self.step = Step::Complete;
    }

    /// Enter [`Step::Error`] with a message.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.step.is_terminal() {
            return;
        }
        self.failure = Some(Failure {
            message: message.into(),
            during: self.step,
        });
        self.step = Step::Error;
    }

    /// The user picked a section.
    ///
    /// While a request is in flight this also disables auto-follow for the
    /// rest of that request.
    pub fn select(&mut self, section: Section, in_flight: bool) {
        self.active_section = section;
        if in_flight {
            self.user_overrode = true;
        }
    }

    /// Follow the section being written unless the user took over.
    pub fn follow(&mut self, section: Section) {
        if !self.user_overrode {
            self.active_section = section;
        }
    }

    /// Display status of one pipeline step.
    pub fn status_of(&self, stage: Step) -> StepStatus {
        let Some(index) = stage.position() else {
            return StepStatus::Pending;
        };

        if self.step == Step::Error {
            return match self.failed_during().and_then(Step::position) {
                Some(failed) if index <= failed => StepStatus::Error,
                _ => StepStatus::Pending,
            };
        }

        match self.step.position() {
            Some(current) if index < current => StepStatus::Completed,
            Some(current) if index == current => StepStatus::Active,
            _ => StepStatus::Pending,
        }
    }

    /// Status of every step in [`Step::PIPELINE`].
    pub fn statuses(&self) -> [(Step, StepStatus); 4] {
        Step::PIPELINE.map(|stage| (stage, self.status_of(stage)))
    }
}
