//! # tonegrid
//!
//! A shareable piano-roll sequencer: place note blocks on a scrolling grid,
//! play them back as synthesized tones at a configurable tempo and time
//! signature, and pass compositions around as compact link strings.
//!
//! The editing model, timeline math, and codec live in the WASM-compatible
//! [`tonegrid_core`] crate; this crate is the native host around it.
//!
//! ## Modules
//!
//! - `audio`: the cpal tone engine, waveform sampler factories, and the
//!   playback scheduler thread that walks the grid in time order.
//! - `commands`: the REPL command registry; grid commands drive the core
//!   edit controller through synthetic pointer gestures.
//! - `repl`: the interactive shell, with live-reloading of watched link
//!   files.
//! - `session`: the shared context object tying the model, play-line, and
//!   wall clock together.

pub mod audio;
pub mod commands;
pub mod repl;
pub mod session;

// Re-export commonly used types for convenience
pub use crate::audio::{AudioPlayerHandle, PlaybackScheduler};
pub use crate::session::Session;
pub use tonegrid_core::{EditSession, Note, Pitch, Project, Timescale};
