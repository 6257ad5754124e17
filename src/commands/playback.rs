//! Playback commands (play, stop)

use crate::commands::{CommandContext, CommandResult};
use colored::*;

/// Handle `play` — toggles between playing and stopped, like the spacebar.
pub fn cmd_play(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let Some(scheduler) = ctx.scheduler.clone() else {
        return CommandResult::Error("Audio is unavailable; playback is disabled".to_string());
    };

    if scheduler.is_playing() {
        scheduler.stop();
        return CommandResult::Message(format!("{}", "⏹ Stopped".bright_yellow()));
    }

    let empty = ctx.session.with_editor(|ed| ed.project.store.is_empty());
    if empty {
        return CommandResult::Message("Nothing to play — add notes first".to_string());
    }

    scheduler.toggle();
    CommandResult::Message(format!(
        "{} (tempo and time signature are locked until stop)",
        "▶ Playing".bright_green()
    ))
}

/// Handle `stop`
pub fn cmd_stop(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let Some(scheduler) = ctx.scheduler.clone() else {
        return CommandResult::Error("Audio is unavailable; playback is disabled".to_string());
    };
    if !scheduler.is_playing() {
        return CommandResult::Message("Not playing".to_string());
    }
    scheduler.stop();
    CommandResult::Message(format!("{}", "⏹ Stopped".bright_yellow()))
}
