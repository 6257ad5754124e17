//! Pointer-driven edit controller
//!
//! Interprets pointer input into create/move/resize/delete operations against
//! the note store, with grid snapping on every sample and ripple-shift
//! semantics on modified resizes. The controller is a small state machine:
//! `Idle`, dragging a note, resizing a note, or panning the canvas.
//!
//! Pointer coordinates are content coordinates (scroll already included).
//! Audible feedback is returned as [`EditEffect`] values; the controller
//! never touches audio.

use crate::project::Project;
use crate::types::note::NoteId;
use crate::types::time::{content_px, snap_floor, CELL, VIEW_CELLS};

/// Preview tones triggered while dragging last this long.
pub const PREVIEW_SECONDS: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Side effects an edit produced, for the host to realize.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EditEffect {
    /// Sound a short preview of the note's pitch.
    Preview { frequency: f32, duration: f64 },
}

/// Current pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    Idle,
    /// Moving a note; offsets keep the grab point fixed so the note does not
    /// jump under the cursor, and `prev` detects cell transitions.
    Note {
        id: NoteId,
        offset_x: i32,
        offset_y: i32,
        prev_x: i32,
        prev_y: i32,
    },
    /// Resizing a note by its right edge; `prev_width` feeds the ripple
    /// delta on modified resizes.
    Width { id: NoteId, prev_width: i32 },
    /// Panning; `grab_x` is the viewport-relative grab point.
    Canvas { grab_x: i32, prev_scroll: i32 },
}

/// One editing session: the project plus all transient interaction state.
///
/// Owns the scroll offset, the current drag, the ripple modifier, and the
/// width new notes inherit from the last completed edit.
#[derive(Debug, Clone)]
pub struct EditSession {
    pub project: Project,
    scroll_x: i32,
    viewport_px: i32,
    drag: Drag,
    ripple: bool,
    last_note_width: i32,
}

impl EditSession {
    pub fn new(project: Project) -> Self {
        let last_note_width = CELL * project.timescale.beat_unit as i32;
        EditSession {
            project,
            scroll_x: 0,
            viewport_px: CELL * VIEW_CELLS,
            drag: Drag::Idle,
            ripple: false,
            last_note_width,
        }
    }

    pub fn scroll_x(&self) -> i32 {
        self.scroll_x
    }

    pub fn viewport_px(&self) -> i32 {
        self.viewport_px
    }

    pub fn set_viewport_px(&mut self, px: i32) {
        self.viewport_px = px.max(CELL);
        self.scroll_x = self.clamp_scroll(self.scroll_x);
    }

    /// Width applied to freshly created notes.
    pub fn default_note_width(&self) -> i32 {
        self.last_note_width
    }

    /// Mirror of the Shift key: ripple-shift later notes on resize.
    pub fn set_ripple(&mut self, on: bool) {
        self.ripple = on;
    }

    pub fn is_idle(&self) -> bool {
        self.drag == Drag::Idle
    }

    fn clamp_scroll(&self, scroll: i32) -> i32 {
        scroll.clamp(0, (content_px() - self.viewport_px).max(0))
    }

    /// Scroll horizontally by a pixel delta (arrow keys, wheel).
    pub fn scroll_by(&mut self, dx: i32) {
        self.scroll_x = self.clamp_scroll(self.scroll_x + dx);
    }

    /// Snap the viewport to the play line when it leaves the visible window.
    pub fn follow_playline(&mut self, x: f64) {
        let x = x as i32;
        if x < self.scroll_x || x > self.scroll_x + self.viewport_px {
            self.scroll_x = self.clamp_scroll(x);
        }
    }

    /// Reset transient state after a bulk project replace (load/reset).
    pub fn reset_view(&mut self) {
        self.scroll_x = 0;
        self.drag = Drag::Idle;
        self.last_note_width = CELL * self.project.timescale.beat_unit as i32;
    }

    /// Pointer pressed at content coordinates `(x, y)`.
    pub fn pointer_down(&mut self, x: i32, y: i32, button: PointerButton) -> Vec<EditEffect> {
        let mut effects = Vec::new();
        match button {
            PointerButton::Primary if self.drag == Drag::Idle => {
                if let Some(id) = self.project.store.top_note_at(x, y) {
                    let note = self.project.store.get(id).expect("hit-tested note exists");
                    if (note.right() - x).abs() < CELL / 2 {
                        self.drag = Drag::Width {
                            id,
                            prev_width: note.width(),
                        };
                    } else {
                        // Round the grab offset up to the next cell multiple so
                        // the first snapped target is the note's own position.
                        self.drag = Drag::Note {
                            id,
                            offset_x: snap_floor(note.x() - x) + CELL,
                            offset_y: snap_floor(note.y() - y) + CELL,
                            prev_x: -1,
                            prev_y: -1,
                        };
                    }
                } else {
                    let width = self.last_note_width;
                    let id = self.project.store.insert(x, y, width, &self.project.range);
                    let note = self.project.store.get(id).expect("just inserted");
                    self.drag = Drag::Note {
                        id,
                        offset_x: note.x() - x,
                        offset_y: note.y() - y,
                        prev_x: -1,
                        prev_y: -1,
                    };
                }
                // The grab itself counts as a sample: snap and preview now.
                self.update_drag(x, y, &mut effects);
            }
            PointerButton::Secondary if self.drag == Drag::Idle => {
                if let Some(id) = self.project.store.top_note_at(x, y) {
                    self.project.store.remove(id);
                }
            }
            PointerButton::Middle if self.drag == Drag::Idle => {
                self.drag = Drag::Canvas {
                    grab_x: x - self.scroll_x,
                    prev_scroll: self.scroll_x,
                };
            }
            _ => {}
        }
        effects
    }

    /// Pointer moved to content coordinates `(x, y)`.
    pub fn pointer_move(&mut self, x: i32, y: i32) -> Vec<EditEffect> {
        let mut effects = Vec::new();
        self.update_drag(x, y, &mut effects);
        effects
    }

    /// Pointer released.
    pub fn pointer_up(&mut self, button: PointerButton) {
        match (button, self.drag) {
            (PointerButton::Primary, Drag::Note { id, .. })
            | (PointerButton::Primary, Drag::Width { id, .. }) => {
                if let Some(note) = self.project.store.get(id) {
                    self.last_note_width = note.width();
                }
                self.drag = Drag::Idle;
            }
            (PointerButton::Middle, Drag::Canvas { .. }) => {
                self.drag = Drag::Idle;
            }
            _ => {}
        }
    }

    fn update_drag(&mut self, x: i32, y: i32, effects: &mut Vec<EditEffect>) {
        match self.drag {
            Drag::Idle => {}
            Drag::Canvas { grab_x, prev_scroll } => {
                let viewport_x = x - self.scroll_x;
                self.scroll_x = self.clamp_scroll(prev_scroll - (viewport_x - grab_x));
            }
            Drag::Note {
                id,
                offset_x,
                offset_y,
                prev_x,
                prev_y,
            } => {
                let range = self.project.range;
                let Some(note) = self.project.store.get_mut(id) else {
                    self.drag = Drag::Idle;
                    return;
                };
                note.set_x(snap_floor(x + offset_x));
                note.set_y(snap_floor(y + offset_y), &range);
                let (nx, ny) = (note.x(), note.y());
                if nx != prev_x || ny != prev_y {
                    effects.push(EditEffect::Preview {
                        frequency: note.frequency(),
                        duration: PREVIEW_SECONDS,
                    });
                    self.project.store.bring_to_front(id);
                    self.drag = Drag::Note {
                        id,
                        offset_x,
                        offset_y,
                        prev_x: nx,
                        prev_y: ny,
                    };
                }
            }
            Drag::Width { id, prev_width } => {
                let Some(note) = self.project.store.get_mut(id) else {
                    self.drag = Drag::Idle;
                    return;
                };
                let target = (x.div_euclid(CELL) + 1) * CELL - note.x();
                note.set_width(target);
                let (width, anchor) = (note.width(), note.x());
                if width != prev_width {
                    if self.ripple {
                        let diff = width - prev_width;
                        let edge = anchor + prev_width;
                        let max_right = content_px();
                        let later: Vec<NoteId> = self
                            .project
                            .store
                            .iter()
                            .filter(|n| n.id() != id && n.x() >= edge)
                            .map(|n| n.id())
                            .collect();
                        for other in later {
                            if let Some(n) = self.project.store.get_mut(other) {
                                n.shift_x(diff, max_right);
                            }
                        }
                    }
                    self.project.store.bring_to_front(id);
                    self.drag = Drag::Width {
                        id,
                        prev_width: width,
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::time::content_px;

    fn session() -> EditSession {
        EditSession::new(Project::new())
    }

    fn preview_count(effects: &[EditEffect]) -> usize {
        effects
            .iter()
            .filter(|e| matches!(e, EditEffect::Preview { .. }))
            .count()
    }

    #[test]
    fn test_create_on_empty_grid() {
        let mut s = session();
        let effects = s.pointer_down(30, 17, PointerButton::Primary);
        s.pointer_up(PointerButton::Primary);

        assert_eq!(s.project.store.len(), 1);
        let note = s.project.store.iter().next().unwrap();
        assert_eq!(note.x() % CELL, 0);
        assert_eq!(note.y() % CELL, 0);
        assert_eq!(note.x(), 28);
        assert_eq!(note.y(), 14);
        assert_eq!(note.width(), s.default_note_width());
        // Creation plays an audible preview of the landed cell.
        assert_eq!(preview_count(&effects), 1);
    }

    #[test]
    fn test_drag_snaps_every_sample_and_previews_per_cell() {
        let mut s = session();
        s.pointer_down(3, 3, PointerButton::Primary);
        // Moves within the same cell produce no new preview.
        let effects = s.pointer_move(5, 5);
        assert_eq!(preview_count(&effects), 0);

        // Crossing into the next cell snaps and previews once.
        let effects = s.pointer_move(5 + CELL, 5);
        assert_eq!(preview_count(&effects), 1);
        let note = s.project.store.iter().next().unwrap();
        assert_eq!(note.x(), CELL);
        assert_eq!(note.y(), 0);
        s.pointer_up(PointerButton::Primary);
    }

    #[test]
    fn test_grab_offset_prevents_jump() {
        let mut s = session();
        // A two-cell note at x = 2 cells, grabbed in its second cell.
        let id = s.project.store.insert(2 * CELL, 0, 2 * CELL, &s.project.range);
        s.pointer_down(3 * CELL + 5, 5, PointerButton::Primary);
        let note = s.project.store.get(id).unwrap();
        assert_eq!(note.x(), 2 * CELL);

        // Small pointer travel inside the grab cell leaves it in place.
        s.pointer_move(3 * CELL + 9, 5);
        assert_eq!(s.project.store.get(id).unwrap().x(), 2 * CELL);

        // One full cell of travel moves it one cell.
        s.pointer_move(4 * CELL + 5, 5);
        assert_eq!(s.project.store.get(id).unwrap().x(), 3 * CELL);
        s.pointer_up(PointerButton::Primary);
    }

    #[test]
    fn test_drag_clamps_to_canvas() {
        let mut s = session();
        s.pointer_down(5, 5, PointerButton::Primary);
        s.pointer_move(-500, -500);
        let note = s.project.store.iter().next().unwrap();
        assert_eq!(note.x(), 0);
        assert_eq!(note.y(), 0);

        s.pointer_move(5, s.project.range.height_px() + 500);
        let note = s.project.store.iter().next().unwrap();
        assert_eq!(note.y(), s.project.range.height_px() - CELL);
        s.pointer_up(PointerButton::Primary);
    }

    #[test]
    fn test_resize_grows_and_sets_default_width() {
        let mut s = session();
        let id = s.project.store.insert(0, 0, 2 * CELL, &s.project.range);

        // Grab within half a cell of the right edge.
        s.pointer_down(2 * CELL - 2, 5, PointerButton::Primary);
        s.pointer_move(4 * CELL - 2, 5);
        assert_eq!(s.project.store.get(id).unwrap().width(), 4 * CELL);

        s.pointer_up(PointerButton::Primary);
        assert_eq!(s.default_note_width(), 4 * CELL);

        // Shrinking below one cell clamps.
        s.pointer_down(4 * CELL, 5, PointerButton::Primary);
        s.pointer_move(-50, 5);
        assert_eq!(s.project.store.get(id).unwrap().width(), CELL);
        s.pointer_up(PointerButton::Primary);
    }

    #[test]
    fn test_ripple_resize_shifts_later_notes() {
        let mut s = session();
        let a = s.project.store.insert(0, 0, 2 * CELL, &s.project.range);
        // b starts exactly at a's right edge, c is earlier and must not move.
        let b = s.project.store.insert(2 * CELL, 3 * CELL, CELL, &s.project.range);
        let c = s.project.store.insert(0, 5 * CELL, CELL, &s.project.range);

        s.set_ripple(true);
        s.pointer_down(2 * CELL, 2, PointerButton::Primary);
        s.pointer_move(4 * CELL - 2, 2);
        s.pointer_up(PointerButton::Primary);

        assert_eq!(s.project.store.get(a).unwrap().width(), 4 * CELL);
        assert_eq!(s.project.store.get(b).unwrap().x(), 4 * CELL);
        assert_eq!(s.project.store.get(c).unwrap().x(), 0);
    }

    #[test]
    fn test_ripple_shrink_pulls_notes_back() {
        let mut s = session();
        let a = s.project.store.insert(0, 0, 4 * CELL, &s.project.range);
        let b = s.project.store.insert(6 * CELL, 3 * CELL, CELL, &s.project.range);

        s.set_ripple(true);
        s.pointer_down(4 * CELL, 2, PointerButton::Primary);
        s.pointer_move(2 * CELL - 2, 2);
        s.pointer_up(PointerButton::Primary);

        assert_eq!(s.project.store.get(a).unwrap().width(), 2 * CELL);
        assert_eq!(s.project.store.get(b).unwrap().x(), 4 * CELL);
    }

    #[test]
    fn test_secondary_deletes_topmost_only() {
        let mut s = session();
        s.project.store.insert(0, 0, CELL, &s.project.range);
        let top = s.project.store.insert(0, 0, CELL, &s.project.range);

        s.pointer_down(5, 5, PointerButton::Secondary);
        assert_eq!(s.project.store.len(), 1);
        assert!(s.project.store.get(top).is_none());
    }

    #[test]
    fn test_canvas_pan_clamps() {
        let mut s = session();
        s.pointer_down(100, 50, PointerButton::Middle);
        // Dragging left pans right; dragging right clamps at zero.
        s.pointer_move(40, 50);
        assert_eq!(s.scroll_x(), 60);
        s.pointer_move(1000, 50);
        assert_eq!(s.scroll_x(), 0);
        s.pointer_up(PointerButton::Middle);

        s.scroll_by(content_px() * 2);
        assert_eq!(s.scroll_x(), content_px() - s.viewport_px());
    }

    #[test]
    fn test_follow_playline() {
        let mut s = session();
        s.follow_playline(50.0);
        assert_eq!(s.scroll_x(), 0); // already visible

        let far = (s.viewport_px() + 100) as f64;
        s.follow_playline(far);
        assert_eq!(s.scroll_x(), s.viewport_px() + 100);
    }

    #[test]
    fn test_grid_snap_invariant_after_edits() {
        let mut s = session();
        s.pointer_down(33, 29, PointerButton::Primary);
        s.pointer_move(101, 73);
        s.pointer_up(PointerButton::Primary);
        for note in s.project.store.iter() {
            assert_eq!(note.x() % CELL, 0);
            assert_eq!(note.y() % CELL, 0);
            assert_eq!(note.width() % CELL, 0);
        }
    }
}
