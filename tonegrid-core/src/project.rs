//! A composition plus its playback settings
//!
//! This is the unit the share link serializes: the note store together with
//! tempo, time signature, and loop flag. The pitch range is part of the grid
//! geometry rather than the shared state, but it travels here so every
//! consumer converts rows to pitches the same way.

use crate::store::NoteStore;
use crate::types::pitch::PitchRange;
use crate::types::time::Timescale;

/// Default tempo applied when a share link carries no `bpm` field.
pub const DEFAULT_BPM: u32 = 140;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Project {
    pub store: NoteStore,
    pub bpm: u32,
    pub timescale: Timescale,
    pub looping: bool,
    pub range: PitchRange,
}

impl Project {
    pub fn new() -> Self {
        Project::default()
    }

    /// Seconds covered by a pixel distance at the project's current tempo.
    pub fn pixels_to_seconds(&self, pixels: f64) -> f64 {
        self.timescale.pixels_to_seconds(self.bpm, pixels)
    }

    /// Seconds covered by a cell count at the project's current tempo.
    pub fn cells_to_seconds(&self, cells: f64) -> f64 {
        self.timescale.cells_to_seconds(self.bpm, cells)
    }
}

impl Default for Project {
    fn default() -> Self {
        Project {
            store: NoteStore::new(),
            bpm: DEFAULT_BPM,
            timescale: Timescale::default(),
            looping: false,
            range: PitchRange::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::time::CELL;

    #[test]
    fn test_defaults() {
        let p = Project::new();
        assert_eq!(p.bpm, 140);
        assert!(!p.looping);
        assert_eq!(p.timescale, Timescale::default());
        assert!(p.store.is_empty());
    }

    #[test]
    fn test_duration_delegates_to_timescale() {
        let mut p = Project::new();
        p.bpm = 120;
        assert_eq!(p.pixels_to_seconds(16.0 * CELL as f64), 2.0);
    }
}
