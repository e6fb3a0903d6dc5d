//! Actor Model: The threads that feed the app loop.
//!
//! Each actor owns one blocking source and forwards what it sees over a
//! crossbeam channel. All state lives on the app loop thread.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     InputEvent      ┌──────────────┐
//! │ Input Thread │ ─────────────────▶  │              │
//! └──────────────┘                     │              │
//! ┌──────────────┐        Tick         │   App Loop   │ ──▶ Surface
//! │Ticker Thread │ ─────────────────▶  │              │
//! └──────────────┘                     │              │
//! ┌──────────────┐    NetworkEvent     │              │
//! │Stream Thread │ ─────────────────▶  │              │
//! └──────────────┘                     └──────────────┘
//! ```
//!
//! The stream thread lives in [`crate::transport`].

mod input;
mod messages;
mod ticker;

pub use input::InputActor;
pub use messages::{InputEvent, KeyCode, KeyModifiers};
pub use ticker::{Tick, TickerActor};
