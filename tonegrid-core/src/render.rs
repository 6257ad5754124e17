//! Render frame extraction
//!
//! The core never draws; it hands the rendering collaborator everything a
//! frame needs: the visible note subset for the current scroll window, grid
//! line positions at cell/beat/bar periodicities, and the play-line cursor
//! position. All x coordinates in a frame are viewport-relative.

use crate::editor::EditSession;
use crate::playback::PlayLine;
use crate::types::time::CELL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineKind {
    Cell,
    Beat,
    Bar,
}

/// A vertical grid line at a viewport-relative x position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridLine {
    pub x: i32,
    pub kind: LineKind,
}

/// A note box in viewport coordinates, ready to draw.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    pub scroll_x: i32,
    pub viewport_px: i32,
    pub rows: u32,
    /// Visible notes in z-order, bottom first (draw in order).
    pub notes: Vec<NoteBox>,
    /// Grid lines, coarser kinds last so they draw on top.
    pub lines: Vec<GridLine>,
    /// Play-line x, viewport-relative; may fall outside the viewport.
    pub playline_x: Option<f64>,
}

/// Extract the drawable state for one frame. `now_ms` samples the play-line
/// cursor; pass whatever cursor the transport currently publishes.
pub fn frame(session: &EditSession, line: Option<&PlayLine>, now_ms: f64) -> Frame {
    let scroll = session.scroll_x();
    let viewport = session.viewport_px();
    let project = &session.project;

    let notes = project
        .store
        .iter()
        .filter(|n| n.right() >= scroll && n.x() <= scroll + viewport)
        .map(|n| NoteBox {
            x: n.x() - scroll,
            y: n.y(),
            width: n.width(),
            height: n.height(),
            name: n.pitch().to_string(),
        })
        .collect();

    let periods = [
        (LineKind::Cell, CELL),
        (LineKind::Beat, project.timescale.beat_px()),
        (LineKind::Bar, project.timescale.bar_px()),
    ];
    let mut lines = Vec::new();
    for (kind, period) in periods {
        // First content multiple of the period at or after the scroll edge.
        let mut cx = scroll.div_euclid(period) * period;
        if cx < scroll {
            cx += period;
        }
        while cx < scroll + viewport {
            lines.push(GridLine {
                x: cx - scroll,
                kind,
            });
            cx += period;
        }
    }

    Frame {
        scroll_x: scroll,
        viewport_px: viewport,
        rows: project.range.rows(),
        notes,
        lines,
        playline_x: line.and_then(|l| l.position(now_ms)).map(|x| x - scroll as f64),
    }
}
