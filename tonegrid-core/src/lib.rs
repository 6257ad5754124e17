//! # tonegrid-core
//!
//! WASM-compatible core of the tonegrid piano-roll sequencer: the editing
//! model, timeline math, playback planning, and the share-link codec,
//! without audio or platform dependencies. The native host in the `tonegrid`
//! crate adds cpal tone synthesis, the playback thread, and a REPL; a
//! browser host can drive the same model through the `wasm` feature.
//!
//! ## Features
//!
//! - **serde**: derive serialization on the public data types for host
//!   interop
//! - **wasm**: WASM bindings via wasm-bindgen (implies `serde`)
//!
//! ## Modules
//!
//! - `types`: pitches, grid-snapped note blocks, and tempo/timeline math
//! - `store`: the z-ordered note collection and its queries
//! - `editor`: the pointer-driven edit state machine
//! - `playback`: play passes, step planning, and the play-line cursor
//! - `link`: the shareable query-string codec
//! - `render`: per-frame drawable state extraction

pub mod editor;
pub mod link;
pub mod playback;
pub mod project;
pub mod render;
pub mod store;
pub mod types;
pub mod wasm;

// Re-export the types nearly every consumer needs
pub use editor::{EditEffect, EditSession, PointerButton};
pub use playback::{Onset, PlayLine, PlayPass, Step};
pub use project::{Project, DEFAULT_BPM};
pub use store::NoteStore;
pub use types::{Note, NoteId, Pitch, PitchRange, Timescale, CELL};
