//! Transcript surface: Plain-text output for non-interactive runs.
//!
//! Pipeline progress goes to one writer (stderr in the binary) and the
//! finished sections to another (stdout), so the result can be piped.

use super::Surface;
use crate::session::{Step, View};
use std::io::{self, Write};

/// Writes step changes as they happen and the sections once complete.
pub struct TranscriptSurface<O: Write, P: Write> {
    out: O,
    progress: P,
    last_step: Step,
    reasoning_announced: bool,
}

impl<O: Write, P: Write> TranscriptSurface<O, P> {
    /// Create a transcript writing results to `out` and progress to `progress`.
    pub const fn new(out: O, progress: P) -> Self {
        Self {
            out,
            progress,
            last_step: Step::Idle,
            reasoning_announced: false,
        }
    }

    /// Give back both writers.
    pub fn into_inner(self) -> (O, P) {
        (self.out, self.progress)
    }

    fn write_sections(&mut self, view: &View<'_>) -> io::Result<()> {
        for (i, (section, text)) in view.sections.iter().enumerate() {
            if i > 0 {
                writeln!(self.out)?;
            }
            writeln!(self.out, "## {}.md", section.as_str())?;
            writeln!(self.out)?;
            write!(self.out, "{text}")?;
            if !text.ends_with('\n') {
                writeln!(self.out)?;
            }
        }
        self.out.flush()
    }
}

impl<O: Write, P: Write> Surface for TranscriptSurface<O, P> {
    fn present(&mut self, view: &View<'_>) -> io::Result<()> {
        if view.step == Step::Retrieving && self.last_step.is_terminal() {
            self.reasoning_announced = false;
        }

        if view.reasoning.is_active() && !self.reasoning_announced {
            self.reasoning_announced = true;
            writeln!(self.progress, "  {}", view.reasoning.label())?;
        }

        if view.step == self.last_step {
            return Ok(());
        }
        self.last_step = view.step;

        match view.step {
            Step::Idle => {}
            Step::Retrieving | Step::Validating | Step::Generating => {
                writeln!(self.progress, "\u{2022} {}", view.step.label())?;
            }
            Step::Complete => {
                writeln!(self.progress, "\u{2713} {}", view.step.label())?;
                self.write_sections(view)?;
            }
            Step::Error => {
                let message = view.error.unwrap_or_default();
                writeln!(self.progress, "\u{2717} {message}")?;
            }
        }
        self.progress.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameQueue;
    use crate::protocol::{PipelineStep, Section, StreamEvent};
    use crate::session::Session;

    const PROMPT: &str = "Build a PR review agent";

    fn text(bytes: &[u8]) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_transcript_of_complete_run() {
        let mut frames = FrameQueue::new();
        let mut session = Session::default();
        let mut surface = TranscriptSurface::new(Vec::new(), Vec::new());

        session.submit(PROMPT, &mut frames).unwrap();
        surface.present(&session.view(PROMPT)).unwrap();
        surface.present(&session.view(PROMPT)).unwrap();

        session.dispatch(
            StreamEvent::Progress {
                step: Some(PipelineStep::Generating),
            },
            &mut frames,
        );
        surface.present(&session.view(PROMPT)).unwrap();

        for (section, content) in [
            (Section::Requirements, "# Requirements\n"),
            (Section::Design, "# Design"),
            (Section::Tasks, "- [ ] one\n"),
        ] {
            session.dispatch(
                StreamEvent::Delta {
                    field: section,
                    content: Some(content.into()),
                },
                &mut frames,
            );
        }
        session.dispatch(StreamEvent::Done, &mut frames);
        surface.present(&session.view(PROMPT)).unwrap();

        let (out, progress) = surface.into_inner();
        assert_eq!(
            text(&progress),
            "\u{2022} Retrieving architecture knowledge\n\
             \u{2022} Generating spec files\n\
             \u{2713} Specs ready\n"
        );
        assert_eq!(
            text(&out),
            "## requirements.md\n\n# Requirements\n\n\
             ## design.md\n\n# Design\n\n\
             ## tasks.md\n\n- [ ] one\n"
        );
    }

    #[test]
    fn test_transcript_of_failed_run() {
        let mut frames = FrameQueue::new();
        let mut session = Session::default();
        let mut surface = TranscriptSurface::new(Vec::new(), Vec::new());

        session.submit(PROMPT, &mut frames).unwrap();
        session.dispatch(
            StreamEvent::Thinking {
                content: Some("hmm".into()),
            },
            &mut frames,
        );
        surface.present(&session.view(PROMPT)).unwrap();
        session.dispatch(
            StreamEvent::Error {
                message: Some("quota exceeded".into()),
            },
            &mut frames,
        );
        surface.present(&session.view(PROMPT)).unwrap();

        let (out, progress) = surface.into_inner();
        assert!(out.is_empty());
        assert_eq!(
            text(&progress),
            "  Thinking...\n\
             \u{2022} Retrieving architecture knowledge\n\
             \u{2717} quota exceeded\n"
        );
    }
}
