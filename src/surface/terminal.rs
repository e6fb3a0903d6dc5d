//! Terminal surface: Full-screen redraw into the alternate screen.

use super::output::{OutputBuffer, Rgb};
use super::screen::{Screen, Tone};
use super::wrap::slice_columns;
use super::Surface;
use crate::session::View;
use crate::widget::{ScrollExtent, ScrollTarget};
use crossterm::{
    cursor,
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Stdout, Write};
use tracing::debug;
use unicode_width::UnicodeWidthStr;

/// Raw mode and the alternate screen, restored on drop.
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    /// Switch the terminal into raw mode on the alternate screen.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup fails.
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = Self { _private: () };
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableBracketedPaste,
            cursor::Hide
        )?;
        debug!("terminal entered raw mode");
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(
            stdout,
            cursor::Show,
            DisableBracketedPaste,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

const fn palette(tone: Tone) -> Rgb {
    match tone {
        Tone::Plain => Rgb::new(230, 230, 230),
        Tone::Dim => Rgb::new(130, 130, 140),
        Tone::Accent => Rgb::new(120, 170, 255),
        Tone::Success => Rgb::new(110, 210, 140),
        Tone::Warning => Rgb::new(240, 190, 80),
        Tone::Danger => Rgb::new(240, 100, 100),
    }
}

/// Draws every [`View`] as a complete frame, flushed in one write.
pub struct TerminalSurface<W: Write = Stdout> {
    writer: W,
    out: OutputBuffer,
    width: u16,
    height: u16,
    /// Extents of the last drawn frame.
    extents: [Option<ScrollExtent>; 2],
    _guard: Option<TerminalGuard>,
}

impl TerminalSurface<Stdout> {
    /// Take over the terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal size cannot be read or setup fails.
    pub fn enter() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let guard = TerminalGuard::enter()?;
        Ok(Self {
            writer: io::stdout(),
            out: OutputBuffer::new(),
            width,
            height,
            extents: [None; 2],
            _guard: Some(guard),
        })
    }
}

impl<W: Write> TerminalSurface<W> {
    /// Draw into `writer` without touching terminal modes.
    pub fn new(writer: W, width: u16, height: u16) -> Self {
        Self {
            writer,
            out: OutputBuffer::new(),
            width,
            height,
            extents: [None; 2],
            _guard: None,
        }
    }

    /// Current size.
    pub const fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// The underlying writer.
    pub const fn writer(&self) -> &W {
        &self.writer
    }

    fn encode(&mut self, screen: &Screen) {
        self.out.clear();
        self.out.cursor_hide();

        for (y, row) in screen.rows.iter().enumerate() {
            let Ok(y) = u16::try_from(y) else { break };
            self.out.cursor_move(0, y);

            let mut remaining = usize::from(self.width);
            for span in &row.spans {
                if remaining == 0 {
                    break;
                }
                let text = slice_columns(&span.text, 0, remaining);
                remaining -= text.width();

                self.out.set_fg(palette(span.tone));
                if span.tone == Tone::Accent {
                    self.out.bold();
                }
                self.out.write_str(&text);
                self.out.reset_attrs();
            }
            self.out.clear_line_tail();
        }
        self.out.clear_screen_tail();

        if let Some((x, y)) = screen.cursor {
            self.out.cursor_move(x, y);
            self.out.cursor_show();
        }
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn present(&mut self, view: &View<'_>) -> io::Result<()> {
        let screen = Screen::compose(view, self.width, self.height);
        self.extents = [
            screen.extent(ScrollTarget::Document),
            screen.extent(ScrollTarget::Reasoning),
        ];
        self.encode(&screen);
        self.out.flush_to(&mut self.writer)
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    fn scroll_extent(&self, target: ScrollTarget) -> Option<ScrollExtent> {
        match target {
            ScrollTarget::Document => self.extents[0],
            ScrollTarget::Reasoning => self.extents[1],
        }
    }
}
