//! The playback scheduler
//!
//! A dedicated thread walks the composition in time order: at each step it
//! fires every tone starting at the current position, then sleeps until the
//! next onset, computed from the wall clock so per-step execution overhead
//! never accumulates into drift. Stop requests and stale wakeups are handled
//! with a command channel plus a generation counter checked at the top of
//! every step — a wakeup that observes a bumped generation discards itself
//! instead of resurrecting a stopped pass.
//!
//! The thread reads the shared session under short per-step locks and
//! tolerates concurrent edits: a note deleted mid-pass is simply not found
//! at its former position on the next step.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::audio::audio::AudioPlayerHandle;
use crate::audio::waveform::sine_wave;
use crate::session::Session;
use tonegrid_core::{playback, PlayPass};

#[derive(Debug)]
enum SchedulerCommand {
    /// Start when stopped, stop when playing.
    Toggle,
    Stop,
    Shutdown,
}

/// Handle to the playback thread.
pub struct PlaybackScheduler {
    command_tx: Sender<SchedulerCommand>,
    playing: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    _thread: JoinHandle<()>,
}

impl PlaybackScheduler {
    pub fn new(session: Arc<Session>, audio: Arc<AudioPlayerHandle>) -> Self {
        let (command_tx, command_rx) = unbounded();
        let playing = Arc::new(AtomicBool::new(false));
        let generation = Arc::new(AtomicU64::new(0));

        let thread = {
            let playing = playing.clone();
            let generation = generation.clone();
            thread::spawn(move || {
                SchedulerLoop::new(session, audio, command_rx, playing, generation).run();
            })
        };

        PlaybackScheduler {
            command_tx,
            playing,
            generation,
            _thread: thread,
        }
    }

    /// Toggle between playing and stopped.
    pub fn toggle(&self) {
        let _ = self.command_tx.send(SchedulerCommand::Toggle);
    }

    /// Stop playback. Bumping the generation first guarantees any sleeping
    /// step discards itself even before the command drains.
    pub fn stop(&self) {
        self.generation.fetch_add(1, Ordering::Relaxed);
        let _ = self.command_tx.send(SchedulerCommand::Stop);
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }
}

impl Drop for PlaybackScheduler {
    fn drop(&mut self) {
        self.generation.fetch_add(1, Ordering::Relaxed);
        let _ = self.command_tx.send(SchedulerCommand::Shutdown);
    }
}

struct SchedulerLoop {
    session: Arc<Session>,
    audio: Arc<AudioPlayerHandle>,
    command_rx: Receiver<SchedulerCommand>,
    playing: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    shutdown: bool,
}

impl SchedulerLoop {
    fn new(
        session: Arc<Session>,
        audio: Arc<AudioPlayerHandle>,
        command_rx: Receiver<SchedulerCommand>,
        playing: Arc<AtomicBool>,
        generation: Arc<AtomicU64>,
    ) -> Self {
        SchedulerLoop {
            session,
            audio,
            command_rx,
            playing,
            generation,
            shutdown: false,
        }
    }

    fn run(&mut self) {
        while !self.shutdown {
            match self.command_rx.recv() {
                Ok(SchedulerCommand::Toggle) => self.play_pass(),
                Ok(SchedulerCommand::Stop) => {}
                Ok(SchedulerCommand::Shutdown) | Err(_) => break,
            }
        }
        self.session.set_playline(None);
        self.playing.store(false, Ordering::Relaxed);
    }

    /// Run one full pass (restarting in place when loop mode is on) until
    /// the end boundary is crossed or a stop arrives.
    fn play_pass(&mut self) {
        let generation = self.generation.load(Ordering::Relaxed);

        let Some(mut pass) = self.begin_pass() else {
            // Empty store: stay stopped, no tones.
            return;
        };
        self.playing.store(true, Ordering::Relaxed);

        let mut x = 0;
        loop {
            let step_start = Instant::now();
            if self.generation.load(Ordering::Relaxed) != generation {
                break;
            }

            let (step, wait_secs) = self.session.with_editor(|editor| {
                let step = playback::step(&editor.project, x);
                let wait = editor.project.pixels_to_seconds(step.wait_px as f64);
                (step, wait)
            });

            for onset in &step.onsets {
                let sampler = sine_wave(onset.frequency, self.audio.sample_rate());
                if let Err(e) = self.audio.play_tone(Box::new(sampler), onset.duration) {
                    eprintln!("Tone playback failed: {}", e);
                }
            }

            if pass.finished(step.next_x) {
                let looping = self.session.with_editor(|editor| editor.project.looping);
                if looping {
                    // Wrap immediately; the boundary cell's wait already ran.
                    match self.begin_pass() {
                        Some(next) => {
                            pass = next;
                            x = 0;
                            continue;
                        }
                        None => break,
                    }
                }
                break;
            }
            x = step.next_x;

            // Deadline from the step's own start compensates for the time
            // spent planning and firing tones.
            let deadline = step_start + Duration::from_secs_f64(wait_secs);
            if !self.sleep_until(deadline, generation) {
                break;
            }
        }

        self.playing.store(false, Ordering::Relaxed);
        self.session.set_playline(None);
    }

    fn begin_pass(&self) -> Option<PlayPass> {
        let now_ms = self.session.now_ms();
        let pass = self
            .session
            .with_editor(|editor| PlayPass::begin(&editor.project, now_ms))?;
        self.session.set_playline(Some(pass.line));
        Some(pass)
    }

    /// Sleep in small increments until the deadline, aborting on any stop
    /// signal. Returns false when the pass should end.
    fn sleep_until(&mut self, deadline: Instant, generation: u64) -> bool {
        while Instant::now() < deadline {
            match self.command_rx.try_recv() {
                Ok(SchedulerCommand::Toggle) | Ok(SchedulerCommand::Stop) => return false,
                Ok(SchedulerCommand::Shutdown) => {
                    self.shutdown = true;
                    return false;
                }
                Err(_) => {}
            }
            if self.generation.load(Ordering::Relaxed) != generation {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonegrid_core::{PointerButton, Project, CELL};

    fn scheduler_with(session: Arc<Session>) -> Option<PlaybackScheduler> {
        match AudioPlayerHandle::new() {
            Ok(audio) => Some(PlaybackScheduler::new(session, Arc::new(audio))),
            Err(_) => {
                println!("Skipping scheduler test - no audio device");
                None
            }
        }
    }

    #[test]
    fn test_toggle_with_empty_store_stays_stopped() {
        let session = Arc::new(Session::new(Project::default()));
        let Some(scheduler) = scheduler_with(session.clone()) else {
            return;
        };

        scheduler.toggle();
        thread::sleep(Duration::from_millis(100));
        assert!(!scheduler.is_playing());
        assert!(session.playline().is_none());
    }

    #[test]
    fn test_pass_publishes_and_clears_playline() {
        let session = Arc::new(Session::new(Project::default()));
        session.with_editor(|editor| {
            // One short note near the origin; the pass is brief.
            editor.pointer_down(1, 1, PointerButton::Primary);
            editor.pointer_up(PointerButton::Primary);
            editor.project.bpm = 400;
        });
        let Some(scheduler) = scheduler_with(session.clone()) else {
            return;
        };

        scheduler.toggle();
        thread::sleep(Duration::from_millis(50));
        assert!(scheduler.is_playing());
        assert!(session.playline().is_some());

        scheduler.stop();
        thread::sleep(Duration::from_millis(100));
        assert!(!scheduler.is_playing());
        assert!(session.playline().is_none());
    }

    #[test]
    fn test_stop_while_stopped_is_harmless() {
        let session = Arc::new(Session::new(Project::default()));
        session.with_editor(|editor| {
            let range = editor.project.range;
            editor.project.store.insert(0, 0, CELL, &range);
        });
        let Some(scheduler) = scheduler_with(session) else {
            return;
        };
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_playing());
    }
}
