//! Surfaces: Where a [`View`] ends up.
//!
//! The app loop calls [`Surface::present`] whenever the session's revision
//! changed since the last draw, so at most once per display tick while
//! streaming.

mod output;
mod screen;
mod terminal;
mod transcript;
mod wrap;

pub use output::{OutputBuffer, Rgb};
pub use screen::{Row, Screen, Span, Tone};
pub use terminal::{TerminalGuard, TerminalSurface};
pub use transcript::TranscriptSurface;
pub use wrap::{slice_columns, wrap};

use crate::session::View;
use crate::widget::{ScrollExtent, ScrollTarget};
use std::io;

/// Something that can show the session.
pub trait Surface {
    /// Draw `view`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying device fails.
    fn present(&mut self, view: &View<'_>) -> io::Result<()>;

    /// The drawable area changed.
    fn resize(&mut self, _width: u16, _height: u16) {}

    /// Scroll range of `target` as of the last draw.
    ///
    /// `None` when the region was not drawn or the surface does not scroll.
    fn scroll_extent(&self, _target: ScrollTarget) -> Option<ScrollExtent> {
        None
    }
}
