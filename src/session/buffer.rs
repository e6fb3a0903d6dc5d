//! Stream buffer: Fast accumulation cells between two display ticks.
//!
//! Every protocol event lands here first. The observable copies in the
//! session are only overwritten when a tick fires, so any number of events
//! between two ticks costs a single publish.

use super::sections::SectionResult;
use crate::protocol::Section;

/// Raw accumulators plus dirty marks for one request.
#[derive(Debug, Default)]
pub struct StreamBuffer {
    /// Section text received so far.
    sections: SectionResult,
    /// Reasoning text received so far.
    reasoning: String,
    /// Section targeted by the most recent delta.
    latest_section: Option<Section>,
    /// Sections changed since the last publish.
    sections_dirty: bool,
    /// Reasoning changed since the last publish.
    reasoning_dirty: bool,
}

impl StreamBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section chunk and remember it as the latest section.
    pub fn push_delta(&mut self, section: Section, text: &str) {
        self.latest_section = Some(section);
        self.sections.append(section, text);
        self.sections_dirty = true;
    }

    /// Append a reasoning chunk.
    pub fn push_thinking(&mut self, text: &str) {
        self.reasoning.push_str(text);
        self.reasoning_dirty = true;
    }

    /// Buffered section text.
    pub const fn sections(&self) -> &SectionResult {
        &self.sections
    }

    /// Buffered reasoning text.
    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    /// Section targeted by the most recent delta.
    pub const fn latest_section(&self) -> Option<Section> {
        self.latest_section
    }

    /// Forget the latest section marker.
    pub const fn clear_latest_section(&mut self) {
        self.latest_section = None;
    }

    /// Whether any accumulator group awaits a publish.
    pub const fn is_dirty(&self) -> bool {
        self.sections_dirty || self.reasoning_dirty
    }

    /// Consume the section dirty mark.
    ///
    /// Returns the buffered sections when they changed since the last call.
    pub fn take_dirty_sections(&mut self) -> Option<&SectionResult> {
        if !self.sections_dirty {
            return None;
        }
        self.sections_dirty = false;
        Some(&self.sections)
    }

    /// Consume the reasoning dirty mark.
    ///
    /// Returns the buffered reasoning when it changed since the last call.
    pub fn take_dirty_reasoning(&mut self) -> Option<&str> {
        if !self.reasoning_dirty {
            return None;
        }
        self.reasoning_dirty = false;
        Some(&self.reasoning)
    }

    /// Clear both dirty marks without publishing.
    pub const fn mark_clean(&mut self) {
        self.sections_dirty = false;
        self.reasoning_dirty = false;
    }

    /// Empty every accumulator and mark.
    pub fn reset(&mut self) {
        self.sections.clear();
        self.reasoning.clear();
        self.latest_section = None;
        self.mark_clean();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirty_groups_are_independent() {
        let mut buffer = StreamBuffer::new();
        buffer.push_thinking("hm");

        assert!(buffer.take_dirty_sections().is_none());
        assert_eq!(buffer.take_dirty_reasoning(), Some("hm"));
        assert!(buffer.take_dirty_reasoning().is_none());

        buffer.push_delta(Section::Design, "x");
        assert!(buffer.take_dirty_reasoning().is_none());
        assert_eq!(buffer.take_dirty_sections().unwrap().get(Section::Design), "x");
        assert!(!buffer.is_dirty());
    }

    #[test]
    fn test_latest_section_tracks_last_delta() {
        let mut buffer = StreamBuffer::new();
        buffer.push_delta(Section::Requirements, "a");
        buffer.push_delta(Section::Tasks, "b");
        assert_eq!(buffer.latest_section(), Some(Section::Tasks));

        buffer.clear_latest_section();
        assert_eq!(buffer.latest_section(), None);
    }

    #[test]
    fn test_reset() {
        let mut buffer = StreamBuffer::new();
        buffer.push_delta(Section::Requirements, "a");
        buffer.push_thinking("b");
        buffer.reset();

        assert!(buffer.sections().is_empty());
        assert!(buffer.reasoning().is_empty());
        assert!(!buffer.is_dirty());
        assert_eq!(buffer.latest_section(), None);
    }
}
