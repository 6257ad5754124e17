//! Chromatic pitch representation for the vertical grid axis
//!
//! Each grid row maps to one semitone. Frequencies come from the standard
//! 12-tone equal temperament table for octave 4 (A4 = 440 Hz), scaled by
//! powers of two for other octaves.

use anyhow::{anyhow, Result};
use std::fmt;
use std::str::FromStr;

use super::time::CELL;

/// A musical pitch: chromatic pitch class (0-11) plus octave.
/// 0=C, 1=C#, 2=D, 3=D#, 4=E, 5=F, 6=F#, 7=G, 8=G#, 9=A, 10=A#, 11=B
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pitch {
    pitch_class: u8,
    octave: i8,
}

/// 12-TET frequencies for the 4th octave (C4-B4), A4 = 440 Hz.
const BASE_OCTAVE_FREQUENCIES: [f32; 12] = [
    261.63, // C4
    277.18, // C#4
    293.66, // D4
    311.13, // D#4
    329.63, // E4
    349.23, // F4
    369.99, // F#4
    392.00, // G4
    415.30, // G#4
    440.00, // A4
    466.16, // A#4
    493.88, // B4
];

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

impl Pitch {
    /// Create a pitch from a chromatic pitch class and octave.
    pub fn new(pitch_class: u8, octave: i8) -> Result<Self> {
        if pitch_class > 11 {
            return Err(anyhow!("Pitch class must be 0-11, got {}", pitch_class));
        }
        Ok(Pitch {
            pitch_class,
            octave,
        })
    }

    pub fn pitch_class(&self) -> u8 {
        self.pitch_class
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    /// Frequency in Hz.
    pub fn frequency(&self) -> f32 {
        let base = BASE_OCTAVE_FREQUENCIES[self.pitch_class as usize];
        base * 2.0_f32.powi(self.octave as i32 - 4)
    }

    /// Transpose by a number of semitones.
    pub fn transpose(self, semitones: i32) -> Pitch {
        let absolute = self.pitch_class as i32 + semitones;
        Pitch {
            pitch_class: absolute.rem_euclid(12) as u8,
            octave: self.octave + absolute.div_euclid(12) as i8,
        }
    }

    /// Semitone distance from another pitch (positive when self is higher).
    pub fn semitones_from(&self, other: Pitch) -> i32 {
        (self.octave as i32 * 12 + self.pitch_class as i32)
            - (other.octave as i32 * 12 + other.pitch_class as i32)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", SHARP_NAMES[self.pitch_class as usize], self.octave)
    }
}

impl FromStr for Pitch {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut chars = s.char_indices().peekable();
        let letter = chars
            .next()
            .map(|(_, c)| c.to_ascii_uppercase())
            .ok_or_else(|| anyhow!("Empty pitch name"))?;

        let mut pitch_class: i32 = match letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return Err(anyhow!("Invalid pitch name: {}", s)),
        };

        let mut rest_start = 1;
        if let Some(&(idx, c)) = chars.peek() {
            if c == '#' {
                pitch_class += 1;
                chars.next();
                rest_start = idx + 1;
            } else if c == 'b' {
                pitch_class -= 1;
                chars.next();
                rest_start = idx + 1;
            }
        }

        let octave_part = &s[rest_start..];
        let octave = if octave_part.is_empty() {
            4
        } else {
            octave_part
                .parse::<i8>()
                .map_err(|_| anyhow!("Invalid octave: {}", octave_part))?
        };

        let absolute = pitch_class.rem_euclid(12) as u8;
        let octave = octave + pitch_class.div_euclid(12) as i8;
        Pitch::new(absolute, octave)
    }
}

/// The vertical band of the grid: a contiguous run of semitone rows.
///
/// Row 0 is the top of the grid and carries the highest pitch, matching the
/// screen coordinate system where y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PitchRange {
    lowest: Pitch,
    rows: u32,
}

impl PitchRange {
    pub fn new(lowest: Pitch, rows: u32) -> Self {
        PitchRange {
            lowest,
            rows: rows.max(1),
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Total band height in pixels.
    pub fn height_px(&self) -> i32 {
        self.rows as i32 * CELL
    }

    /// Pitch of a row counted from the top, if in range.
    pub fn pitch_at_row(&self, row: u32) -> Option<Pitch> {
        if row >= self.rows {
            return None;
        }
        Some(self.lowest.transpose((self.rows - 1 - row) as i32))
    }

    /// Pitch of the row containing a y pixel coordinate.
    pub fn pitch_at_y(&self, y: i32) -> Option<Pitch> {
        if y < 0 {
            return None;
        }
        self.pitch_at_row((y / CELL) as u32)
    }

    /// Top-row y coordinate for a pitch, if the pitch falls in the band.
    pub fn y_of_pitch(&self, pitch: Pitch) -> Option<i32> {
        let offset = pitch.semitones_from(self.lowest);
        if offset < 0 || offset >= self.rows as i32 {
            return None;
        }
        Some((self.rows as i32 - 1 - offset) * CELL)
    }
}

impl Default for PitchRange {
    /// Three octaves, C3 through B5.
    fn default() -> Self {
        PitchRange::new(Pitch::new(0, 3).expect("C3 is a valid pitch"), 36)
    }
}
