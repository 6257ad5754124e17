//! Command registry for REPL commands
//!
//! Provides a clean, extensible pattern for handling REPL commands.

pub mod general;
pub mod grid;
pub mod playback;
pub mod share;

use crate::audio::audio::AudioPlayerHandle;
use crate::audio::scheduler::PlaybackScheduler;
use crate::audio::waveform::sine_wave;
use crate::session::Session;
use std::sync::Arc;
use tonegrid_core::EditEffect;

/// Result of executing a command
#[derive(Debug)]
pub enum CommandResult {
    /// Command executed successfully, continue REPL
    Success,
    /// Command executed, show this message
    Message(String),
    /// Exit the REPL
    Exit,
    /// Not a command
    NotACommand,
    /// Error occurred
    Error(String),
    /// Watch a file for changes
    Watch(String),
}

/// Context passed to command handlers
pub struct CommandContext {
    pub session: Arc<Session>,
    /// Absent when no output device could be opened; editing still works.
    pub audio: Option<Arc<AudioPlayerHandle>>,
    pub scheduler: Option<Arc<PlaybackScheduler>>,
}

impl CommandContext {
    pub fn new(
        session: Arc<Session>,
        audio: Option<Arc<AudioPlayerHandle>>,
        scheduler: Option<Arc<PlaybackScheduler>>,
    ) -> Self {
        Self {
            session,
            audio,
            scheduler,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler
            .as_ref()
            .map(|s| s.is_playing())
            .unwrap_or(false)
    }

    /// Realize edit effects: preview tones sound if audio is available.
    pub fn apply_effects(&self, effects: &[EditEffect]) {
        let Some(audio) = &self.audio else {
            return;
        };
        for effect in effects {
            match effect {
                EditEffect::Preview {
                    frequency,
                    duration,
                } => {
                    let sampler = sine_wave(*frequency, audio.sample_rate());
                    let _ = audio.play_tone(Box::new(sampler), *duration);
                }
            }
        }
    }
}

/// A command handler function
pub type CommandHandler = fn(&str, &mut CommandContext) -> CommandResult;

/// Registry of available commands
pub struct CommandRegistry {
    /// Commands indexed by their prefix (e.g., "grid add")
    /// Sorted by prefix length descending for longest-match-first lookup
    commands: Vec<(String, CommandHandler)>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Register a command with its prefix
    pub fn register(&mut self, prefix: &str, handler: CommandHandler) {
        self.commands.push((prefix.to_string(), handler));
        // Sort by prefix length descending for longest-match-first
        self.commands.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Execute a command, returning NotACommand if no match found
    pub fn execute(&self, input: &str, ctx: &mut CommandContext) -> CommandResult {
        for (prefix, handler) in &self.commands {
            if input == prefix || input.starts_with(&format!("{} ", prefix)) {
                let args = if input.len() > prefix.len() {
                    input[prefix.len()..].trim()
                } else {
                    ""
                };
                return handler(args, ctx);
            }
        }
        CommandResult::NotACommand
    }

    /// Get all registered command prefixes
    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.iter().map(|(p, _)| p.as_str()).collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a fully populated command registry with all built-in commands
pub fn create_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    // Grid editing commands (register specific prefixes first)
    registry.register("grid add", grid::cmd_grid_add);
    registry.register("grid rm", grid::cmd_grid_rm);
    registry.register("grid move", grid::cmd_grid_move);
    registry.register("grid resize", grid::cmd_grid_resize);
    registry.register("grid clear", grid::cmd_grid_clear);
    registry.register("grid show", grid::cmd_grid_show);
    registry.register("scroll", grid::cmd_scroll);

    // Playback
    registry.register("play", playback::cmd_play);
    registry.register("stop", playback::cmd_stop);

    // Share links
    registry.register("share", share::cmd_share);
    registry.register("load", share::cmd_load);
    registry.register("reset", share::cmd_reset);

    // General commands
    registry.register("tempo", general::cmd_tempo);
    registry.register("time", general::cmd_time);
    registry.register("loop", general::cmd_loop);
    registry.register("help", general::cmd_help);
    registry.register("quit", general::cmd_quit);
    registry.register("exit", general::cmd_quit);
    registry.register("watch", general::cmd_watch);

    registry
}
