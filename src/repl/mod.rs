//! Interactive shell for the piano-roll editor
//!
//! A rustyline prompt runs on its own thread and feeds a select loop that
//! also listens for file-watcher events, so `watch`ed link files reload the
//! composition live — even mid-playback.

use crate::audio::audio::AudioPlayerHandle;
use crate::audio::scheduler::PlaybackScheduler;
use crate::commands::{create_registry, CommandContext, CommandResult};
use crate::repl::watcher::LinkWatcher;
use crate::session::Session;
use anyhow::Result;
use colored::*;
use crossbeam_channel::{unbounded, Receiver, Sender};
use notify::Event;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RustylineResult};
use std::sync::Arc;
use std::thread;
use tonegrid_core::Project;

pub mod watcher;

/// Types of events the REPL loop handles
enum ReplEvent {
    Input(Result<String, ReadlineError>),
}

/// Interactive editor session
pub struct Repl {
    editor: Option<DefaultEditor>,
    session: Arc<Session>,
    audio: Option<Arc<AudioPlayerHandle>>,
    scheduler: Option<Arc<PlaybackScheduler>>,

    // Event channels
    tx_input: Sender<ReplEvent>,
    rx_input: Receiver<ReplEvent>,
    tx_watcher: Sender<notify::Result<Event>>,
    rx_watcher: Receiver<notify::Result<Event>>,

    // File watcher
    watcher: Option<LinkWatcher>,
}

impl Repl {
    /// Create a new REPL instance
    pub fn new() -> RustylineResult<Self> {
        let editor = DefaultEditor::new()?;
        let session = Arc::new(Session::new(Project::default()));

        // Audio is optional: without a device the grid still edits and
        // shares, only playback and previews are disabled.
        let audio = match AudioPlayerHandle::new() {
            Ok(handle) => Some(Arc::new(handle)),
            Err(e) => {
                println!(
                    "{} {} (editing still works, playback is disabled)",
                    "⚠ No audio:".bright_yellow(),
                    e
                );
                None
            }
        };
        let scheduler = audio
            .as_ref()
            .map(|a| Arc::new(PlaybackScheduler::new(session.clone(), a.clone())));

        let (tx_input, rx_input) = unbounded();
        let (tx_watcher, rx_watcher) = unbounded();

        Ok(Repl {
            editor: Some(editor),
            session,
            audio,
            scheduler,
            tx_input,
            rx_input,
            tx_watcher,
            rx_watcher,
            watcher: None,
        })
    }

    /// Start the REPL loop
    pub fn run(&mut self) -> Result<()> {
        println!(
            "{} {}",
            "🎹".bright_yellow(),
            "tonegrid — a shareable piano-roll sequencer"
                .bright_cyan()
                .bold()
        );
        println!(
            "Place notes with {}, hear them with {}, share with {}.",
            "grid add 0 C4".cyan(),
            "play".cyan(),
            "share".cyan()
        );
        println!(
            "Type '{}' for more information, '{}' or {} to exit.\n",
            "help".bright_green(),
            "quit".bright_red(),
            "Ctrl+C".bright_red()
        );

        // Move editor to thread
        let mut editor = self.editor.take().expect("Repl editor missing");
        let tx_input = self.tx_input.clone();

        thread::spawn(move || loop {
            let prompt = format!("{} ", "tonegrid>".bright_magenta().bold());
            let readline = editor.readline(&prompt);

            match readline {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if !line.is_empty() {
                        let _ = editor.add_history_entry(&line);
                    }
                    if tx_input.send(ReplEvent::Input(Ok(line))).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    let _ = tx_input.send(ReplEvent::Input(Err(err)));
                    break;
                }
            }
        });

        // Create command registry and context
        let registry = create_registry();
        let mut ctx = CommandContext::new(
            self.session.clone(),
            self.audio.clone(),
            self.scheduler.clone(),
        );

        loop {
            crossbeam_channel::select! {
                recv(self.rx_input) -> msg => match msg {
                    Ok(ReplEvent::Input(res)) => {
                        match res {
                            Ok(line) => {
                                if line.is_empty() {
                                    continue;
                                }

                                match registry.execute(&line, &mut ctx) {
                                    CommandResult::Success => {
                                        // Command executed, no output needed
                                    }
                                    CommandResult::Message(msg) => {
                                        println!("{}", msg);
                                    }
                                    CommandResult::Exit => {
                                        println!("{} 🎹", "Goodbye!".bright_cyan());
                                        break;
                                    }
                                    CommandResult::Error(e) => {
                                        println!("{} {}", "Error:".bright_red().bold(), e.red());
                                    }
                                    CommandResult::Watch(path) => {
                                        self.watch_path(&path);
                                    }
                                    CommandResult::NotACommand => {
                                        println!(
                                            "{} Unknown command: {} (try '{}')",
                                            "Error:".bright_red().bold(),
                                            line.red(),
                                            "help".bright_green()
                                        );
                                    }
                                }
                            }
                            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                                println!("{} 🎹", "Goodbye!".bright_cyan());
                                break;
                            }
                            Err(err) => {
                                println!(
                                    "{} {}",
                                    "Error reading input:".bright_red().bold(),
                                    err.to_string().red()
                                );
                                break;
                            }
                        }
                    },
                    Err(_) => break, // Channel closed
                },

                recv(self.rx_watcher) -> msg => match msg {
                    Ok(Ok(event)) => {
                        use notify::EventKind;
                        if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                            for path in event.paths {
                                println!("{} Link file changed: {}", "⚡".bright_yellow(), path.display());
                                self.reload_link_file(&path);
                            }
                        }
                    },
                    Ok(Err(e)) => println!("{} Watch error: {}", "Error:".red(), e),
                    Err(_) => break, // Channel closed
                }
            }
        }

        Ok(())
    }

    /// Begin watching a link file, creating the watcher on first use.
    fn watch_path(&mut self, path: &str) {
        if self.watcher.is_none() {
            match LinkWatcher::new(self.tx_watcher.clone()) {
                Ok(w) => self.watcher = Some(w),
                Err(e) => {
                    println!("{} Failed to create watcher: {}", "Error:".red(), e);
                    return;
                }
            }
        }

        if let Some(w) = &mut self.watcher {
            if let Err(e) = w.watch(path) {
                println!("{} Failed to watch {}: {}", "Error:".red(), path, e);
            } else {
                println!(
                    "{} Watching {} for changes...",
                    "👀".bright_cyan(),
                    path.bright_green()
                );
            }
        }
    }

    /// Reload a composition from the first non-empty line of a link file.
    fn reload_link_file(&self, path: &std::path::Path) {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let Some(query) = contents.lines().map(str::trim).find(|l| !l.is_empty()) else {
                    println!("{} Link file is empty", "Error:".red());
                    return;
                };
                let count = self.session.with_editor(|ed| {
                    tonegrid_core::link::apply(query, &mut ed.project);
                    ed.reset_view();
                    ed.project.store.len()
                });
                self.session.remember_link(query);
                println!(
                    "{} Reloaded {} note(s)",
                    "✓".bright_green(),
                    count
                );
            }
            Err(e) => println!("{} Failed to read file: {}", "Error:".red(), e),
        }
    }
}

/// Convenience function to start the REPL
pub fn start() -> Result<()> {
    let mut repl = Repl::new().map_err(|e| anyhow::anyhow!("Failed to initialize REPL: {}", e))?;
    repl.run()
}
