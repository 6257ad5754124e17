//! Timeline and tempo math
//!
//! Pure conversions between grid cells, pixels, and wall-clock seconds,
//! parameterized by tempo and time signature. Nothing here caches across
//! calls; callers must pass the tempo in effect at call time.

use anyhow::{anyhow, Result};
use num_rational::Ratio;
use num_traits::ToPrimitive;
use std::fmt;
use std::str::FromStr;

/// Pixel size of one grid cell, the quantum of both time and pitch snapping.
pub const CELL: i32 = 14;

/// Horizontal extent of the timeline content, in cells.
pub const CONTENT_CELLS: i32 = 256;

/// Default viewport width, in cells.
pub const VIEW_CELLS: i32 = 64;

/// Timeline content extent in pixels.
pub fn content_px() -> i32 {
    CELL * CONTENT_CELLS
}

/// Snap a pixel coordinate down to the nearest cell boundary.
///
/// Uses euclidean division so negative intermediates (drag offsets) still
/// round toward negative infinity, matching canvas `Math.floor` semantics.
pub fn snap_floor(px: i32) -> i32 {
    px.div_euclid(CELL) * CELL
}

/// A time signature: beats per bar over the note value of one beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timescale {
    pub beats_per_bar: u32,
    pub beat_unit: u32,
}

impl Timescale {
    /// Create a time signature; both parts must be positive.
    pub fn new(beats_per_bar: u32, beat_unit: u32) -> Result<Self> {
        if beats_per_bar == 0 || beat_unit == 0 {
            return Err(anyhow!(
                "Time signature parts must be positive, got {}/{}",
                beats_per_bar,
                beat_unit
            ));
        }
        Ok(Timescale {
            beats_per_bar,
            beat_unit,
        })
    }

    /// Wall-clock seconds covered by one grid cell at the given tempo.
    ///
    /// The ratio `beat_unit / (bpm * beats_per_bar * beat_unit) * 60` is
    /// reduced exactly before the single conversion to f64, so
    /// `cells_to_seconds` stays exactly linear in the cell count.
    pub fn seconds_per_cell(&self, bpm: u32) -> f64 {
        let bpm = bpm.max(1) as u64;
        let beats_per_bar = self.beats_per_bar.max(1) as u64;
        let beat_unit = self.beat_unit.max(1) as u64;
        let num = 60u64 * beat_unit;
        let den = bpm * beats_per_bar * beat_unit;
        Ratio::new(num, den).to_f64().unwrap_or(0.0)
    }

    /// Convert a (possibly fractional) cell count to seconds.
    pub fn cells_to_seconds(&self, bpm: u32, cells: f64) -> f64 {
        cells * self.seconds_per_cell(bpm)
    }

    /// Convert a pixel distance to seconds.
    pub fn pixels_to_seconds(&self, bpm: u32, pixels: f64) -> f64 {
        self.cells_to_seconds(bpm, pixels / CELL as f64)
    }

    /// Pixel width of one beat.
    pub fn beat_px(&self) -> i32 {
        CELL * self.beat_unit as i32
    }

    /// Pixel width of one bar.
    pub fn bar_px(&self) -> i32 {
        CELL * self.beat_unit as i32 * self.beats_per_bar as i32
    }

    /// Round an extent up to the next full-bar boundary.
    ///
    /// Exact multiples (including zero) are left unchanged; this is the loop
    /// boundary used when playback wraps at the end of the last bar.
    pub fn end_bar(&self, end_px: i32) -> i32 {
        let bar = self.bar_px();
        if end_px <= 0 {
            return 0;
        }
        let rem = end_px % bar;
        if rem == 0 {
            end_px
        } else {
            end_px - rem + bar
        }
    }
}

impl Default for Timescale {
    fn default() -> Self {
        Timescale {
            beats_per_bar: 4,
            beat_unit: 4,
        }
    }
}

impl fmt::Display for Timescale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats_per_bar, self.beat_unit)
    }
}

impl FromStr for Timescale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (num, den) = s
            .split_once('/')
            .ok_or_else(|| anyhow!("Expected N/D time signature, got '{}'", s))?;
        let beats_per_bar = num
            .trim()
            .parse::<u32>()
            .map_err(|_| anyhow!("Invalid beat count: {}", num))?;
        let beat_unit = den
            .trim()
            .parse::<u32>()
            .map_err(|_| anyhow!("Invalid beat unit: {}", den))?;
        Timescale::new(beats_per_bar, beat_unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_bar_duration() {
        // 16 cells = one bar at 4/4 (16 cells per bar convention).
        // At 120 BPM a bar is 4 beats * 0.5 s = 2 s exactly.
        let ts = Timescale::default();
        assert_eq!(ts.cells_to_seconds(120, 16.0), 2.0);
    }

    #[test]
    fn test_linearity() {
        let ts = Timescale::default();
        for c in 0..64 {
            let c = c as f64;
            assert_eq!(
                ts.cells_to_seconds(140, c),
                c * ts.cells_to_seconds(140, 1.0)
            );
        }
    }

    #[test]
    fn test_pixels_to_seconds() {
        let ts = Timescale::default();
        assert_eq!(
            ts.pixels_to_seconds(120, CELL as f64),
            ts.cells_to_seconds(120, 1.0)
        );
    }

    #[test]
    fn test_tempo_scaling() {
        let ts = Timescale::default();
        // Doubling the tempo halves every duration.
        let slow = ts.cells_to_seconds(60, 8.0);
        let fast = ts.cells_to_seconds(120, 8.0);
        assert_eq!(slow, fast * 2.0);
    }

    #[test]
    fn test_end_bar_rounding() {
        let ts = Timescale::default();
        let bar = ts.bar_px();
        assert_eq!(ts.end_bar(0), 0);
        assert_eq!(ts.end_bar(1), bar);
        assert_eq!(ts.end_bar(bar - CELL), bar);
        assert_eq!(ts.end_bar(bar), bar);
        assert_eq!(ts.end_bar(bar + 1), 2 * bar);
    }

    #[test]
    fn test_signature_parsing() {
        let ts: Timescale = "3/4".parse().unwrap();
        assert_eq!(ts.beats_per_bar, 3);
        assert_eq!(ts.beat_unit, 4);
        assert_eq!(format!("{}", ts), "3/4");

        assert!("0/4".parse::<Timescale>().is_err());
        assert!("4".parse::<Timescale>().is_err());
        assert!("a/b".parse::<Timescale>().is_err());
    }

    #[test]
    fn test_snap_floor_negative() {
        assert_eq!(snap_floor(-1), -CELL);
        assert_eq!(snap_floor(0), 0);
        assert_eq!(snap_floor(CELL + 3), CELL);
    }
}
