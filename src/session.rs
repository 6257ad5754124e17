//! The editor session shared between the REPL and the playback scheduler
//!
//! One explicit context object owns the model: the edit session behind a
//! mutex, the published play-line cursor, the wall-clock epoch that turns
//! `Instant`s into the millisecond timestamps the core interpolates over,
//! and the last loaded share link for `reset`.

use std::sync::Mutex;
use std::time::Instant;

use tonegrid_core::{EditSession, PlayLine, Project};

pub struct Session {
    editor: Mutex<EditSession>,
    playline: Mutex<Option<PlayLine>>,
    last_loaded: Mutex<Option<String>>,
    epoch: Instant,
}

impl Session {
    pub fn new(project: Project) -> Self {
        Session {
            editor: Mutex::new(EditSession::new(project)),
            playline: Mutex::new(None),
            last_loaded: Mutex::new(None),
            epoch: Instant::now(),
        }
    }

    /// Milliseconds since the session started; the timestamp domain for
    /// play-line interpolation.
    pub fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    /// Run a closure with exclusive access to the edit session.
    pub fn with_editor<R>(&self, f: impl FnOnce(&mut EditSession) -> R) -> R {
        let mut editor = self.editor.lock().expect("editor lock poisoned");
        f(&mut editor)
    }

    /// The play-line cursor currently published by the scheduler, if any.
    pub fn playline(&self) -> Option<PlayLine> {
        *self.playline.lock().expect("playline lock poisoned")
    }

    pub fn set_playline(&self, line: Option<PlayLine>) {
        *self.playline.lock().expect("playline lock poisoned") = line;
    }

    /// Remember the query string behind the latest `load`, for `reset`.
    pub fn remember_link(&self, query: &str) {
        *self.last_loaded.lock().expect("link lock poisoned") = Some(query.to_string());
    }

    pub fn last_link(&self) -> Option<String> {
        self.last_loaded.lock().expect("link lock poisoned").clone()
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new(Project::default())
    }
}
