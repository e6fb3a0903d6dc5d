//! Reasoning text: The model's thought stream, shown apart from the sections.

/// Observable reasoning panel state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reasoning {
    /// Published reasoning text.
    text: String,
    /// Reasoning chunks are arriving and no section output has started.
    active: bool,
    /// Whether the panel is folded away.
    collapsed: bool,
}

impl Reasoning {
    /// Published reasoning text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the service is currently reasoning.
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the panel is collapsed.
    pub const fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Whether there is anything to show.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Header label for the panel.
    pub const fn label(&self) -> &'static str {
        if self.active {
            "Thinking..."
        } else {
            "Thought process"
        }
    }

    /// Flip the collapsed flag.
    pub const fn toggle(&mut self) {
        self.collapsed = !self.collapsed;
    }

    pub(crate) const fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Output began: stop reasoning and fold the panel.
    pub(crate) const fn yield_to_output(&mut self) {
        self.active = false;
        self.collapsed = true;
    }

    pub(crate) fn publish(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }

    pub(crate) fn reset(&mut self) {
        self.text.clear();
        self.active = false;
        self.collapsed = false;
    }
}
