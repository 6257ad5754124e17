//! WASM bindings for tonegrid-core
//!
//! Exposes the editor session, playback planning, and the share-link codec
//! to a browser host. The host owns the canvas, the pointer events, and the
//! timer loop; it drives this wrapper and draws the frames it returns.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use crate::editor::{EditSession, PointerButton};
#[cfg(feature = "wasm")]
use crate::playback::{self, PlayPass};
#[cfg(feature = "wasm")]
use crate::project::Project;
#[cfg(feature = "wasm")]
use crate::render;
#[cfg(feature = "wasm")]
use crate::{link, types::time::CELL};

/// Map a DOM `MouseEvent.button` value onto a pointer button.
#[cfg(feature = "wasm")]
fn button_from_dom(button: u8) -> Option<PointerButton> {
    match button {
        0 => Some(PointerButton::Primary),
        1 => Some(PointerButton::Middle),
        2 => Some(PointerButton::Secondary),
        _ => None,
    }
}

/// A complete editor instance for a browser host.
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub struct GridEditor {
    session: EditSession,
    pass: Option<PlayPass>,
}

#[cfg(feature = "wasm")]
#[wasm_bindgen]
impl GridEditor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> GridEditor {
        GridEditor {
            session: EditSession::new(Project::new()),
            pass: None,
        }
    }

    /// Cell size in pixels, for the host's canvas sizing.
    pub fn cell_size(&self) -> i32 {
        CELL
    }

    pub fn pointer_down(&mut self, x: i32, y: i32, button: u8) -> Result<JsValue, JsValue> {
        let effects = match button_from_dom(button) {
            Some(b) => self.session.pointer_down(x, y, b),
            None => Vec::new(),
        };
        serde_wasm_bindgen::to_value(&effects).map_err(into_js)
    }

    pub fn pointer_move(&mut self, x: i32, y: i32) -> Result<JsValue, JsValue> {
        let effects = self.session.pointer_move(x, y);
        serde_wasm_bindgen::to_value(&effects).map_err(into_js)
    }

    pub fn pointer_up(&mut self, button: u8) {
        if let Some(b) = button_from_dom(button) {
            self.session.pointer_up(b);
        }
    }

    pub fn set_ripple(&mut self, on: bool) {
        self.session.set_ripple(on);
    }

    pub fn scroll_by(&mut self, dx: i32) {
        self.session.scroll_by(dx);
    }

    /// Begin a play pass, or return false when there is nothing to play.
    pub fn begin_pass(&mut self, now_ms: f64) -> bool {
        self.pass = PlayPass::begin(&self.session.project, now_ms);
        self.pass.is_some()
    }

    pub fn stop(&mut self) {
        self.pass = None;
    }

    pub fn is_playing(&self) -> bool {
        self.pass.is_some()
    }

    /// Plan the step at `x`: onsets to fire, the wait in milliseconds, the
    /// next position, and whether the pass is over afterwards.
    pub fn step(&mut self, x: i32) -> Result<JsValue, JsValue> {
        let Some(pass) = self.pass else {
            return serde_wasm_bindgen::to_value(&Option::<StepPlan>::None).map_err(into_js);
        };
        let step = playback::step(&self.session.project, x);
        let plan = StepPlan {
            onsets: step.onsets,
            wait_ms: self.session.project.pixels_to_seconds(step.wait_px as f64) * 1000.0,
            next_x: step.next_x,
            finished: pass.finished(step.next_x),
        };
        serde_wasm_bindgen::to_value(&Some(plan)).map_err(into_js)
    }

    /// Drawable state for one animation frame, following the play line when
    /// it scrolls out of view.
    pub fn frame(&mut self, now_ms: f64) -> Result<JsValue, JsValue> {
        let line = self.pass.map(|p| p.line);
        if let Some(x) = line.as_ref().and_then(|l| l.position(now_ms)) {
            self.session.follow_playline(x);
        }
        let frame = render::frame(&self.session, line.as_ref(), now_ms);
        serde_wasm_bindgen::to_value(&frame).map_err(into_js)
    }

    /// Current composition as a share-link query string.
    pub fn encode(&self) -> String {
        link::encode(&self.session.project)
    }

    /// Load a share link (bare query or full URL) into the editor.
    pub fn load(&mut self, query: &str) {
        link::apply(query, &mut self.session.project);
        self.session.reset_view();
        self.pass = None;
    }
}

#[cfg(feature = "wasm")]
impl Default for GridEditor {
    fn default() -> Self {
        Self::new()
    }
}

/// Step data handed to the host's timer loop.
#[cfg(feature = "wasm")]
#[derive(serde::Serialize)]
struct StepPlan {
    onsets: Vec<crate::playback::Onset>,
    wait_ms: f64,
    next_x: i32,
    finished: bool,
}

#[cfg(feature = "wasm")]
fn into_js(err: serde_wasm_bindgen::Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}
