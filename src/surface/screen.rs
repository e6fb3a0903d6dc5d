//! Screen composition: A [`View`] laid out as styled rows.
//!
//! Composition is pure so the layout can be tested without a terminal.
//! [`super::TerminalSurface`] only turns the rows into escape sequences.
//!
//! # Layout
//!
//! ```text
//! Agent Architect  Spec generator for agent projects
//!
//! > Build a PR review agent▏
//!   23/800 characters
//!
//! ✓ Retrieving  ● Validating  ○ Generating  ○ Specs ready   (while loading)
//! ⚠ error message                                            (on failure)
//! ▼ Thinking...                                              (reasoning)
//! │ reasoning tail
//!  Requirements •  Design   Tasks                            (output)
//! ────────────────────────────────
//! document window▌                                          (scrollable)
//!
//! Enter generate · Tab section · PgUp/PgDn scroll · Ctrl+T reasoning · Esc quit
//! ```

use super::wrap::{slice_columns, wrap};
use crate::protocol::Section;
use crate::session::{GaugeLevel, StepStatus, View};
use crate::widget::{ScrollExtent, ScrollTarget};
use unicode_width::UnicodeWidthStr;

/// Reasoning lines shown when the panel is open.
const REASONING_ROWS: usize = 6;

const PROMPT_MARKER: &str = "> ";
const STREAM_CURSOR: &str = "\u{258c}";
const FOOTER: &str =
    "Enter generate \u{b7} Tab section \u{b7} PgUp/PgDn scroll \u{b7} Ctrl+T reasoning \u{b7} Esc quit";

/// Semantic color of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Body text.
    Plain,
    /// Secondary text.
    Dim,
    /// Headings and the active element.
    Accent,
    /// Completed steps.
    Success,
    /// Warnings.
    Warning,
    /// Errors.
    Danger,
}

/// A run of text in one tone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Color.
    pub tone: Tone,
    /// Text, free of control characters.
    pub text: String,
}

/// One screen row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    /// Spans left to right.
    pub spans: Vec<Span>,
}

impl Row {
    fn push(&mut self, tone: Tone, text: impl Into<String>) -> &mut Self {
        self.spans.push(Span {
            tone,
            text: text.into(),
        });
        self
    }

    fn single(tone: Tone, text: impl Into<String>) -> Self {
        let mut row = Self::default();
        row.push(tone, text);
        row
    }

    /// Text without styling.
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// A composed frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Screen {
    /// Rows top to bottom, never more than the height.
    pub rows: Vec<Row>,
    /// Where to park the terminal cursor, if it should be shown.
    pub cursor: Option<(u16, u16)>,
    /// Scroll range of the document, when it is shown.
    pub document_extent: Option<ScrollExtent>,
    /// Scroll range of the reasoning panel, when it is expanded.
    pub reasoning_extent: Option<ScrollExtent>,
}

impl Screen {
    /// Lay out `view` in a `width` by `height` area.
    pub fn compose(view: &View<'_>, width: u16, height: u16) -> Self {
        let width_cols = usize::from(width.max(1));
        let height_rows = usize::from(height);
        let mut rows = Vec::new();

        let mut title = Row::single(Tone::Accent, "Agent Architect");
        title.push(Tone::Dim, "  Spec generator for agent projects");
        rows.push(title);
        rows.push(Row::default());

        let cursor = prompt_rows(view, width_cols, &mut rows);
        rows.push(Row::default());

        if view.is_loading() {
            rows.push(progress_row(view));
        }

        if let Some(error) = view.error {
            for line in wrap(&format!("\u{26a0} {error}"), width_cols) {
                rows.push(Row::single(Tone::Danger, line));
            }
        }

        let reasoning_extent = if view.shows_reasoning() {
            reasoning_rows(view, width_cols, &mut rows)
        } else {
            None
        };

        // The footer keeps the last row.
        let body_end = height_rows.saturating_sub(1);

        let mut document_extent = None;
        if view.shows_output {
            rows.push(tab_row(view));
            rows.push(Row::single(Tone::Dim, "\u{2500}".repeat(width_cols)));
            let available = body_end.saturating_sub(rows.len());
            document_extent = document_rows(view, width_cols, available, &mut rows);
        }

        rows.truncate(body_end);
        while rows.len() < body_end {
            rows.push(Row::default());
        }
        if height_rows > 0 {
            rows.push(Row::single(Tone::Dim, FOOTER));
        }

        let cursor = cursor.filter(|&(_, y)| usize::from(y) < body_end);
        Self {
            rows,
            cursor,
            document_extent,
            reasoning_extent,
        }
    }

    /// Scroll range of `target` in this frame.
    pub const fn extent(&self, target: ScrollTarget) -> Option<ScrollExtent> {
        match target {
            ScrollTarget::Document => self.document_extent,
            ScrollTarget::Reasoning => self.reasoning_extent,
        }
    }
}

fn prompt_rows(view: &View<'_>, width: usize, rows: &mut Vec<Row>) -> Option<(u16, u16)> {
    let marker_width = PROMPT_MARKER.width();
    let room = width.saturating_sub(marker_width).max(1);

    let column = view.prompt_cursor.unwrap_or_else(|| view.prompt.width());
    let offset = (column + 1).saturating_sub(room);

    let mut row = Row::single(Tone::Accent, PROMPT_MARKER);
    if view.prompt.is_empty() {
        row.push(
            Tone::Dim,
            slice_columns("Describe your agent idea", 0, room),
        );
    } else {
        row.push(Tone::Plain, slice_columns(view.prompt, offset, room));
    }
    let y = rows.len();
    rows.push(row);

    let gauge_tone = match view.gauge.level {
        GaugeLevel::Normal => Tone::Dim,
        GaugeLevel::Warning => Tone::Warning,
        GaugeLevel::Over => Tone::Danger,
    };
    let mut gauge = Row::single(gauge_tone, format!("  {}", view.gauge));
    if view.is_loading() {
        gauge.push(Tone::Dim, "  Processing...");
    } else if view.can_submit {
        gauge.push(Tone::Accent, "  Enter to generate specs \u{2192}");
    }
    rows.push(gauge);

    let x = u16::try_from(marker_width + column - offset).ok()?;
    let y = u16::try_from(y).ok()?;
    view.prompt_cursor.map(|_| (x, y))
}

fn progress_row(view: &View<'_>) -> Row {
    let mut row = Row::default();
    for (i, (stage, status)) in view.statuses.iter().enumerate() {
        if i > 0 {
            row.push(Tone::Dim, "  ");
        }
        let (tone, icon) = match status {
            StepStatus::Completed => (Tone::Success, "\u{2713}"),
            StepStatus::Active => (Tone::Accent, "\u{25cf}"),
            StepStatus::Error => (Tone::Danger, "\u{2717}"),
            StepStatus::Pending => (Tone::Dim, "\u{25cb}"),
        };
        row.push(tone, format!("{icon} {}", stage.label()));
    }
    row
}

fn reasoning_rows(view: &View<'_>, width: usize, rows: &mut Vec<Row>) -> Option<ScrollExtent> {
    let reasoning = view.reasoning;
    let toggle = if reasoning.is_collapsed() {
        "\u{25b6}"
    } else {
        "\u{25bc}"
    };
    let tone = if reasoning.is_active() {
        Tone::Accent
    } else {
        Tone::Dim
    };
    rows.push(Row::single(tone, format!("{toggle} {}", reasoning.label())));

    if reasoning.is_collapsed() {
        return None;
    }

    let lines = wrap(reasoning.text(), width.saturating_sub(2));
    let extent = ScrollExtent::new(lines.len(), REASONING_ROWS);
    let top = view.reasoning_scroll.offset(extent);
    for line in lines.into_iter().skip(top).take(REASONING_ROWS) {
        let mut row = Row::single(Tone::Dim, "\u{2502} ");
        row.push(Tone::Dim, line);
        rows.push(row);
    }
    Some(extent)
}

fn tab_row(view: &View<'_>) -> Row {
    let mut row = Row::default();
    for section in Section::ALL {
        let tone = if section == view.active_section {
            Tone::Accent
        } else {
            Tone::Dim
        };
        let dot = if view.is_streaming(section) {
            " \u{2022}"
        } else {
            ""
        };
        if section == view.active_section {
            row.push(tone, format!("[{}{dot}]", section.label()));
        } else {
            row.push(tone, format!(" {}{dot} ", section.label()));
        }
        row.push(Tone::Dim, " ");
    }
    row
}

/// Append the window of the document that fits in `available` rows.
fn document_rows(
    view: &View<'_>,
    width: usize,
    available: usize,
    rows: &mut Vec<Row>,
) -> Option<ScrollExtent> {
    if available == 0 {
        return None;
    }

    let mut lines = wrap(view.document, width);
    if view.shows_cursor {
        let cursor_fits = lines
            .last()
            .is_some_and(|line| line.width() < width);
        if !cursor_fits {
            lines.push(String::new());
        }
    }

    let extent = ScrollExtent::new(lines.len(), available);
    let top = view.document_scroll.offset(extent);
    let last = lines.len().saturating_sub(1);
    for (i, line) in lines.into_iter().enumerate().skip(top).take(available) {
        let mut row = Row::single(Tone::Plain, line);
        if view.shows_cursor && i == last {
            row.push(Tone::Accent, STREAM_CURSOR);
        }
        rows.push(row);
    }
    Some(extent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameQueue;
    use crate::protocol::{PipelineStep, StreamEvent};
    use crate::session::Session;
    use crate::widget::ScrollState;

    const PROMPT: &str = "Build a PR review agent";

    fn texts(screen: &Screen) -> Vec<String> {
        screen.rows.iter().map(Row::plain_text).collect()
    }

    fn streaming_session(document: &str) -> Session {
        let mut frames = FrameQueue::new();
        let mut session = Session::default();
        session.submit(PROMPT, &mut frames).unwrap();
        session.dispatch(
            StreamEvent::Progress {
                step: Some(PipelineStep::Generating),
            },
            &mut frames,
        );
        session.dispatch(
            StreamEvent::Delta {
                field: Section::Requirements,
                content: Some(document.into()),
            },
            &mut frames,
        );
        for token in frames.drain_due() {
            session.on_frame(token);
        }
        session
    }

    #[test]
    fn test_idle_screen() {
        let session = Session::default();
        let view = session.view("").with_prompt_cursor(0);
        let screen = Screen::compose(&view, 80, 12);

        let rows = texts(&screen);
        assert_eq!(rows.len(), 12);
        assert!(rows[0].starts_with("Agent Architect"));
        assert_eq!(rows[2], "> Describe your agent idea");
        assert_eq!(rows[3], "  0/800 characters");
        assert_eq!(rows[11], FOOTER);
        assert_eq!(screen.cursor, Some((2, 2)));
    }

    #[test]
    fn test_gauge_row_tones() {
        let session = Session::default();
        let long = "x".repeat(750);
        let view = session.view(&long);
        let screen = Screen::compose(&view, 80, 12);
        assert_eq!(screen.rows[3].spans[0].tone, Tone::Warning);

        let short = session.view("short");
        let screen = Screen::compose(&short, 80, 12);
        assert_eq!(
            screen.rows[3].plain_text(),
            "  5/800 characters (minimum 10)"
        );
    }

    #[test]
    fn test_streaming_screen() {
        let session = streaming_session("# Requirements\nline two");
        let view = session.view(PROMPT);
        let rows = texts(&Screen::compose(&view, 80, 20));

        assert!(rows.iter().any(|r| r.contains("\u{2713} Retrieving architecture knowledge")));
        assert!(rows.iter().any(|r| r.contains("\u{25cf} Generating spec files")));
        assert!(rows.iter().any(|r| r.starts_with("[Requirements \u{2022}]")));
        assert!(rows.iter().any(|r| r == &format!("line two{STREAM_CURSOR}")));
        assert!(rows.iter().any(|r| r.contains("Processing...")));
    }

    #[test]
    fn test_document_keeps_tail_in_view() {
        let document: Vec<String> = (0..50).map(|i| format!("line {i}")).collect();
        let session = streaming_session(&document.join("\n"));
        let view = session.view(PROMPT);
        let screen = Screen::compose(&view, 80, 16);
        let rows = texts(&screen);

        assert_eq!(rows.len(), 16);
        assert_eq!(rows[14], format!("line 49{STREAM_CURSOR}"));
        assert!(!rows.iter().any(|r| r == "line 0"));
    }

    #[test]
    fn test_error_screen() {
        let mut frames = FrameQueue::new();
        let mut session = Session::default();
        session.submit(PROMPT, &mut frames).unwrap();
        session.dispatch(
            StreamEvent::Error {
                message: Some("quota exceeded".into()),
            },
            &mut frames,
        );

        let view = session.view(PROMPT);
        let screen = Screen::compose(&view, 80, 12);
        let error_row = screen
            .rows
            .iter()
            .find(|r| r.plain_text() == "\u{26a0} quota exceeded")
            .unwrap();
        assert_eq!(error_row.spans[0].tone, Tone::Danger);
        assert!(!texts(&screen).iter().any(|r| r.contains("Requirements")));
    }

    #[test]
    fn test_reasoning_panel() {
        let mut frames = FrameQueue::new();
        let mut session = Session::default();
        session.submit(PROMPT, &mut frames).unwrap();
        session.dispatch(
            StreamEvent::Thinking {
                content: Some("weighing options".into()),
            },
            &mut frames,
        );
        for token in frames.drain_due() {
            session.on_frame(token);
        }

        let rows = texts(&Screen::compose(&session.view(PROMPT), 80, 20));
        assert!(rows.contains(&"\u{25bc} Thinking...".to_string()));
        assert!(rows.contains(&"\u{2502} weighing options".to_string()));

        session.toggle_reasoning();
        let rows = texts(&Screen::compose(&session.view(PROMPT), 80, 20));
        assert!(rows.contains(&"\u{25b6} Thinking...".to_string()));
        assert!(!rows.iter().any(|r| r.contains("weighing options")));
    }

    #[test]
    fn test_long_prompt_scrolls_to_cursor() {
        let session = Session::default();
        let prompt = "abcdefghijklmnopqrstuvwxyz";
        let view = session.view(prompt).with_prompt_cursor(26);
        let screen = Screen::compose(&view, 12, 8);

        assert_eq!(screen.rows[2].plain_text(), "> rstuvwxyz");
        assert_eq!(screen.cursor, Some((11, 2)));
    }

    fn completed_session(lines: usize) -> Session {
        let document: Vec<String> = (0..lines).map(|i| format!("line {i}")).collect();
        let mut frames = FrameQueue::new();
        let mut session = Session::default();
        session.submit(PROMPT, &mut frames).unwrap();
        session.dispatch(
            StreamEvent::Delta {
                field: Section::Requirements,
                content: Some(document.join("\n")),
            },
            &mut frames,
        );
        session.dispatch(StreamEvent::Done, &mut frames);
        session
    }

    #[test]
    fn test_completed_document_scrolls_to_head() {
        let session = completed_session(100);

        let tail = Screen::compose(&session.view(PROMPT), 80, 24);
        assert!(!texts(&tail).iter().any(|r| r == "line 0"));
        let extent = tail.extent(ScrollTarget::Document).unwrap();

        let mut scroll = ScrollState::pinned();
        scroll.scroll_up(extent.max_top, extent);
        let view = session
            .view(PROMPT)
            .with_scroll(scroll, ScrollState::pinned());
        let rows = texts(&Screen::compose(&view, 80, 24));

        let first = rows.iter().position(|r| r == "line 0").unwrap();
        assert_eq!(rows[first + 1], "line 1");
        assert!(!rows.iter().any(|r| r == "line 99"));
    }

    #[test]
    fn test_document_extent_matches_window() {
        let session = completed_session(100);
        let screen = Screen::compose(&session.view(PROMPT), 80, 24);

        // Title, blank, prompt, gauge, blank, tabs and separator sit above;
        // the footer below.
        let extent = screen.extent(ScrollTarget::Document).unwrap();
        assert_eq!(extent.page, 16);
        assert_eq!(extent.max_top, 84);

        let view = session
            .view(PROMPT)
            .with_scroll(ScrollState::head(), ScrollState::pinned());
        let rows = texts(&Screen::compose(&view, 80, 24));
        assert_eq!(rows[7], "line 0");
        assert_eq!(rows[22], "line 15");
    }

    #[test]
    fn test_expanded_reasoning_scrolls() {
        let mut frames = FrameQueue::new();
        let mut session = Session::default();
        session.submit(PROMPT, &mut frames).unwrap();
        let thoughts: Vec<String> = (0..20).map(|i| format!("thought {i}")).collect();
        session.dispatch(
            StreamEvent::Thinking {
                content: Some(thoughts.join("\n")),
            },
            &mut frames,
        );
        session.dispatch(StreamEvent::Done, &mut frames);
        assert!(!session.reasoning().is_collapsed());

        let screen = Screen::compose(&session.view(PROMPT), 80, 24);
        let extent = screen.extent(ScrollTarget::Reasoning).unwrap();
        assert_eq!(extent, ScrollExtent::new(20, REASONING_ROWS));
        assert!(texts(&screen).contains(&"\u{2502} thought 19".to_string()));

        let view = session
            .view(PROMPT)
            .with_scroll(ScrollState::pinned(), ScrollState::head());
        let rows = texts(&Screen::compose(&view, 80, 24));
        assert!(rows.contains(&"\u{2502} thought 0".to_string()));
        assert!(!rows.contains(&"\u{2502} thought 19".to_string()));
    }

    #[test]
    fn test_collapsed_reasoning_has_no_extent() {
        let session = completed_session(3);
        let screen = Screen::compose(&session.view(PROMPT), 80, 24);
        assert_eq!(screen.extent(ScrollTarget::Reasoning), None);
        assert_eq!(
            screen.extent(ScrollTarget::Document),
            Some(ScrollExtent::new(3, 16))
        );
    }
}
