//! Scroll state: Which slice of a tall text the surface should show.
//!
//! The offset is anchored to the top line, so text appended below does not
//! move a window the user scrolled. With no offset the window follows the
//! tail, which is what a streaming section wants.
//!
//! Line counts depend on the wrap width, which only the surface knows. The
//! surface reports a [`ScrollExtent`] after each draw and every movement is
//! clamped against it.

/// Scrollable range of one region, as laid out by the last draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollExtent {
    /// Largest top line that still fills the window.
    pub max_top: usize,
    /// Visible rows in the window.
    pub page: usize,
}

impl ScrollExtent {
    /// Extent for `lines` lines shown through `page` rows.
    pub const fn new(lines: usize, page: usize) -> Self {
        Self {
            max_top: lines.saturating_sub(page),
            page,
        }
    }
}

/// Scrollable regions of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    /// The active section.
    Document,
    /// The expanded reasoning panel.
    Reasoning,
}

/// Scroll position of one region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    /// First visible line; `None` follows the tail.
    top: Option<usize>,
}

impl ScrollState {
    /// Follow the tail.
    pub const fn pinned() -> Self {
        Self { top: None }
    }

    /// Start at the first line.
    pub const fn head() -> Self {
        Self { top: Some(0) }
    }

    /// First visible line within `extent`.
    pub fn offset(&self, extent: ScrollExtent) -> usize {
        self.top.map_or(extent.max_top, |top| top.min(extent.max_top))
    }

    /// Move the window up by `lines`.
    pub fn scroll_up(&mut self, lines: usize, extent: ScrollExtent) {
        self.top = Some(self.offset(extent).saturating_sub(lines));
    }

    /// Move the window down by `lines`. Reaching the end pins to the tail.
    pub fn scroll_down(&mut self, lines: usize, extent: ScrollExtent) {
        let next = self.offset(extent) + lines;
        self.top = (next < extent.max_top).then_some(next);
    }

    /// Follow the tail again.
    pub const fn scroll_to_bottom(&mut self) {
        self.top = None;
    }

    /// Jump to the first line.
    pub const fn scroll_to_top(&mut self) {
        self.top = Some(0);
    }
}
