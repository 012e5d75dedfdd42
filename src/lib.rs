//! # rapstar-core
//!
//! Core typewriter playback and search highlighting library for lyrics viewers.
//!
//! This crate provides platform-agnostic data structures and logic for:
//! - Holding user text and its statistics
//! - Highlighting case-insensitive search matches over escaped text
//! - Playing text back as a cancellable character-by-character or
//!   line-by-line reveal (play, pause, stop, reset, live speed changes)
//! - Rendering frames to markup (with optional web support)
//!
//! ## Features
//!
//! - `serde` - Enable serialization/deserialization for data structures
//! - `toml` - Load [`PlaybackConfig`] from TOML
//! - `thread` - Run playback on a dedicated native thread
//! - `web` - Enable web/WASM timers and DOM rendering
//!
//! ## Example
//!
//! ```rust,ignore
//! use rapstar_core::{PlaybackEngine, PlaybackOptions, TextBuffer};
//!
//! let mut buffer = TextBuffer::new();
//! buffer.set_text(lyrics);
//!
//! let mut engine = PlaybackEngine::new();
//! engine.set_highlight_term("mic");
//! if let Some(task) = engine.play(&buffer, PlaybackOptions::per_line())?.into_task() {
//!     task.spawn(move |frame| shell.show(&frame));
//! }
//!
//! // Later, from the UI thread
//! engine.stop();
//! ```

mod buffer;
mod config;
mod frame;
pub mod highlight;
pub mod loader;
mod playback;
pub mod render;
mod task;
mod timer;

pub use buffer::{decode_lossy, TextBuffer, TextStats};
pub use config::PlaybackConfig;
pub use frame::Frame;
pub use highlight::{MarkedText, Span};
pub use playback::{
    PlayOutcome, PlaybackEngine, PlaybackError, PlaybackMode, PlaybackOptions, PlaybackSettings,
    PlaybackStatus, DEFAULT_CHAR_DELAY, DEFAULT_LINE_DELAY, MAX_CHARS_PER_TICK, MAX_CHAR_DELAY_MS,
    MAX_LINE_DELAY_MS, PAUSE_POLL_INTERVAL,
};
pub use render::RenderConfig;
pub use task::{PlaybackTask, Step};
pub use timer::{ThreadTimer, Timer, VirtualTimer};

#[cfg(feature = "web")]
pub use render::web::render_to_element;
#[cfg(feature = "web")]
pub use timer::WebTimer;
