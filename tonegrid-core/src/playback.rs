//! Playback planning: passes, steps, and the play-line cursor
//!
//! The walk through a composition is pure: a pass fixes the end boundary and
//! the play-line interpolation window, and each step yields the tone onsets
//! at the current position plus how far to advance. The host (a timer thread
//! natively, the animation loop in a browser) supplies wall-clock timestamps
//! and realizes the waits; nothing here sleeps or owns a clock.

use crate::project::Project;
use crate::types::time::CELL;

/// One tone to fire: frequency in Hz, duration in seconds at the tempo in
/// effect when the step was planned.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Onset {
    pub frequency: f32,
    pub duration: f64,
}

/// The outcome of visiting one timeline position.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Tones starting exactly at the visited position.
    pub onsets: Vec<Onset>,
    /// Pixel distance to wait before the next step.
    pub wait_px: i32,
    /// The next position to visit.
    pub next_x: i32,
}

/// The visual cursor for one play pass: pixel bounds plus the wall-clock
/// window they interpolate over. Timestamps are host-supplied milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayLine {
    pub from: i32,
    pub to: i32,
    pub start_ms: f64,
    pub end_ms: f64,
}

impl PlayLine {
    /// Interpolated x position at `now_ms`, or `None` once the cursor has
    /// expired (fallen outside `[0, to]`).
    pub fn position(&self, now_ms: f64) -> Option<f64> {
        let span = self.end_ms - self.start_ms;
        if span <= 0.0 {
            return None;
        }
        let t = (now_ms - self.start_ms) / span;
        let x = self.from as f64 + (self.to - self.from) as f64 * t;
        if x < 0.0 || x > self.to as f64 {
            None
        } else {
            Some(x)
        }
    }
}

/// One run from the start of the timeline to a fixed end boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayPass {
    /// Pixel position past which the pass is over.
    pub end: i32,
    pub line: PlayLine,
}

impl PlayPass {
    /// Begin a pass over the project, or `None` when there is nothing to
    /// play. Loop mode extends the end to the next full-bar boundary so the
    /// wrap lands on the bar; otherwise the pass ends exactly at the last
    /// note's right edge.
    pub fn begin(project: &Project, now_ms: f64) -> Option<PlayPass> {
        let (_, last_end) = project.store.bounds()?;
        let end = if project.looping {
            project.timescale.end_bar(last_end)
        } else {
            last_end
        };
        Some(PlayPass {
            end,
            line: PlayLine {
                from: 0,
                to: end,
                start_ms: now_ms,
                end_ms: now_ms + project.pixels_to_seconds(end as f64) * 1000.0,
            },
        })
    }

    pub fn finished(&self, x: i32) -> bool {
        x > self.end
    }
}

/// Visit position `x`: collect every note starting there, then advance
/// straight to the next note start when one exists (identical onset timing
/// to stepping cell by cell, without the idle steps) or by one cell.
pub fn step(project: &Project, x: i32) -> Step {
    let onsets = project
        .store
        .iter()
        .filter(|n| n.x() == x)
        .map(|n| Onset {
            frequency: n.frequency(),
            duration: project.pixels_to_seconds(n.width() as f64),
        })
        .collect();

    let (wait_px, next_x) = match project.store.next_after(x) {
        Some(next) => (next.x() - x, next.x()),
        None => (CELL, x + CELL),
    };

    Step {
        onsets,
        wait_px,
        next_x,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_with(blocks: &[(i32, i32, i32)]) -> Project {
        let mut p = Project::new();
        for &(x, y, w) in blocks {
            let range = p.range;
            p.store.insert(x, y, w, &range);
        }
        p
    }

    #[test]
    fn test_begin_empty_store_is_none() {
        let p = Project::new();
        assert!(PlayPass::begin(&p, 0.0).is_none());
    }

    #[test]
    fn test_pass_end_non_loop() {
        let p = project_with(&[(0, 0, CELL), (4 * CELL, 0, 3 * CELL)]);
        let pass = PlayPass::begin(&p, 0.0).unwrap();
        assert_eq!(pass.end, 7 * CELL);
        assert_eq!(pass.line.to, 7 * CELL);
    }

    #[test]
    fn test_pass_end_loop_rounds_to_bar() {
        let mut p = project_with(&[(0, 0, 3 * CELL)]);
        p.looping = true;
        let pass = PlayPass::begin(&p, 0.0).unwrap();
        assert_eq!(pass.end, p.timescale.bar_px());

        // A note ending exactly on the bar keeps the exact boundary.
        let mut p = project_with(&[(0, 0, p.timescale.bar_px())]);
        p.looping = true;
        let pass = PlayPass::begin(&p, 0.0).unwrap();
        assert_eq!(pass.end, p.timescale.bar_px());
    }

    #[test]
    fn test_playline_window_matches_duration() {
        let mut p = project_with(&[(0, 0, 16 * CELL)]);
        p.bpm = 120;
        let pass = PlayPass::begin(&p, 1000.0).unwrap();
        // 16 cells at 120 BPM in 4/4 is exactly two seconds.
        assert_eq!(pass.line.start_ms, 1000.0);
        assert_eq!(pass.line.end_ms, 3000.0);
    }

    #[test]
    fn test_playline_interpolation_and_expiry() {
        let line = PlayLine {
            from: 0,
            to: 100,
            start_ms: 0.0,
            end_ms: 1000.0,
        };
        assert_eq!(line.position(0.0), Some(0.0));
        assert_eq!(line.position(500.0), Some(50.0));
        assert_eq!(line.position(1000.0), Some(100.0));
        assert!(line.position(1001.0).is_none());
        assert!(line.position(-10.0).is_none());
    }

    #[test]
    fn test_step_collects_simultaneous_onsets() {
        let p = project_with(&[(0, 0, CELL), (0, 2 * CELL, 2 * CELL), (5 * CELL, 0, CELL)]);
        let step = step(&p, 0);
        assert_eq!(step.onsets.len(), 2);
        // Durations follow note widths.
        assert_eq!(step.onsets[0].duration, p.pixels_to_seconds(CELL as f64));
        assert_eq!(
            step.onsets[1].duration,
            p.pixels_to_seconds(2.0 * CELL as f64)
        );
        // Gap-skip: advance straight to the next note start.
        assert_eq!(step.next_x, 5 * CELL);
        assert_eq!(step.wait_px, 5 * CELL);
    }

    #[test]
    fn test_step_past_last_note_advances_one_cell() {
        let p = project_with(&[(0, 0, CELL)]);
        let step = step(&p, 0);
        assert_eq!(step.next_x, CELL);
        assert_eq!(step.wait_px, CELL);
    }

    #[test]
    fn test_full_walk_visits_every_onset_once() {
        let p = project_with(&[(0, 0, CELL), (3 * CELL, 0, CELL), (6 * CELL, 0, 2 * CELL)]);
        let pass = PlayPass::begin(&p, 0.0).unwrap();
        let mut x = 0;
        let mut onsets = 0;
        while !pass.finished(x) {
            let s = step(&p, x);
            onsets += s.onsets.len();
            x = s.next_x;
        }
        assert_eq!(onsets, 3);
    }
}
