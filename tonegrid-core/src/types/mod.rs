//! Core data types: pitches, note blocks, and timeline math.

pub mod note;
pub mod pitch;
pub mod time;

pub use note::{Note, NoteId};
pub use pitch::{Pitch, PitchRange};
pub use time::{Timescale, CELL};
