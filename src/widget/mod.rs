//! Widgets: Interactive state owned by the app loop.

mod prompt_input;
mod scroll;

pub use prompt_input::PromptEditor;
pub use scroll::{ScrollExtent, ScrollState, ScrollTarget};
