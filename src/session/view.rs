//! Read model handed to surfaces.
//!
//! A [`View`] borrows everything a surface needs from the [`Session`] for a
//! single draw. Surfaces never see the stream buffer, only published state.

use super::controller::Session;
use super::reasoning::Reasoning;
use super::sections::SectionResult;
use super::state::{Step, StepStatus};
use crate::config::PromptLimits;
use crate::protocol::Section;
use crate::widget::ScrollState;
use std::fmt;

/// Severity of the prompt length gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeLevel {
    /// Comfortably within bounds.
    Normal,
    /// Approaching the maximum.
    Warning,
    /// Past the maximum.
    Over,
}

/// Prompt length feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptGauge {
    /// Characters in the trimmed prompt.
    pub chars: usize,
    /// Maximum accepted characters.
    pub max: usize,
    /// Minimum accepted characters.
    pub min: usize,
    /// Severity.
    pub level: GaugeLevel,
}

impl PromptGauge {
    /// Measure `prompt` against `limits`.
    pub fn measure(prompt: &str, limits: &PromptLimits) -> Self {
        let chars = prompt.trim().chars().count();
        let level = if chars > limits.max_chars {
            GaugeLevel::Over
        } else if chars > limits.warn_chars {
            GaugeLevel::Warning
        } else {
            GaugeLevel::Normal
        };

        Self {
            chars,
            max: limits.max_chars,
            min: limits.min_chars,
            level,
        }
    }

    /// Whether the prompt has some text but not enough.
    pub const fn below_minimum(&self) -> bool {
        self.chars > 0 && self.chars < self.min
    }
}

impl fmt::Display for PromptGauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} characters", self.chars, self.max)?;
        if self.below_minimum() {
            write!(f, " (minimum {})", self.min)?;
        }
        Ok(())
    }
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone)]
pub struct View<'a> {
    /// Current step.
    pub step: Step,
    /// Status of each pipeline stage.
    pub statuses: [(Step, StepStatus); 4],
    /// Failure message when the request failed.
    pub error: Option<&'a str>,
    /// Reasoning panel state.
    pub reasoning: &'a Reasoning,
    /// Whether the output panel is shown.
    pub shows_output: bool,
    /// Section tab that is selected.
    pub active_section: Section,
    /// Section currently receiving text.
    pub streaming_section: Option<Section>,
    /// All section texts: the committed copy once complete, else live.
    pub sections: &'a SectionResult,
    /// Text of the active section.
    pub document: &'a str,
    /// Whether to draw the streaming cursor after `document`.
    pub shows_cursor: bool,
    /// Window into `document`.
    pub document_scroll: ScrollState,
    /// Window into the expanded reasoning panel.
    pub reasoning_scroll: ScrollState,
    /// Prompt being edited.
    pub prompt: &'a str,
    /// Display column of the editing cursor, when the prompt has focus.
    pub prompt_cursor: Option<usize>,
    /// Prompt length feedback.
    pub gauge: PromptGauge,
    /// Whether submitting now would be accepted.
    pub can_submit: bool,
}

impl<'a> View<'a> {
    pub(crate) fn new(session: &'a Session, prompt: &'a str) -> Self {
        let state = session.state();
        let step = state.step();
        let active_section = state.active_section();
        let in_flight = session.is_in_flight();

        let streaming_section = if in_flight {
            session.streaming_section()
        } else {
            None
        };

        let sections = match (step, session.committed()) {
            (Step::Complete, Some(committed)) => committed,
            _ => session.live(),
        };

        let reasoning = session.reasoning();
        let shows_output = in_flight || step == Step::Complete;

        Self {
            step,
            statuses: state.statuses(),
            error: state.error_message(),
            reasoning,
            shows_output,
            active_section,
            streaming_section,
            sections,
            document: sections.get(active_section),
            shows_cursor: streaming_section == Some(active_section),
            document_scroll: ScrollState::pinned(),
            reasoning_scroll: ScrollState::pinned(),
            prompt,
            prompt_cursor: None,
            gauge: PromptGauge::measure(prompt, session.limits()),
            can_submit: !in_flight && session.limits().accept(prompt).is_some(),
        }
    }

    /// Place the editing cursor at display column `column`.
    #[must_use]
    pub fn with_prompt_cursor(mut self, column: usize) -> Self {
        self.prompt_cursor = Some(column);
        self
    }

    /// Use the app's scroll positions instead of following both tails.
    #[must_use]
    pub fn with_scroll(mut self, document: ScrollState, reasoning: ScrollState) -> Self {
        self.document_scroll = document;
        self.reasoning_scroll = reasoning;
        self
    }

    /// Whether a pipeline stage is running.
    pub const fn is_loading(&self) -> bool {
        self.step.is_loading()
    }

    /// Whether the reasoning panel is shown.
    pub fn shows_reasoning(&self) -> bool {
        !self.reasoning.is_empty()
    }

    /// Whether `section` is receiving text.
    pub fn is_streaming(&self, section: Section) -> bool {
        self.streaming_section == Some(section)
    }
}
