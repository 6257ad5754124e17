//! General REPL commands (help, quit, tempo, time, loop, watch)

use crate::commands::{CommandContext, CommandResult};
use colored::*;
use tonegrid_core::Timescale;

/// Guard for settings that stay locked while the scheduler is running, so
/// one pass plays with consistent duration math.
fn locked_while_playing(ctx: &CommandContext) -> Option<CommandResult> {
    if ctx.is_playing() {
        Some(CommandResult::Error(
            "Locked during playback — stop first".to_string(),
        ))
    } else {
        None
    }
}

/// Handle `help` command
pub fn cmd_help(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    print_help();
    CommandResult::Success
}

/// Handle `quit` or `exit` command
pub fn cmd_quit(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Exit
}

/// Handle `tempo [bpm]` command
pub fn cmd_tempo(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        let bpm = ctx.session.with_editor(|ed| ed.project.bpm);
        return CommandResult::Message(format!("Current tempo: {} BPM", bpm));
    }
    if let Some(locked) = locked_while_playing(ctx) {
        return locked;
    }

    match args.parse::<u32>() {
        Ok(bpm) if (1..=400).contains(&bpm) => {
            ctx.session.with_editor(|ed| ed.project.bpm = bpm);
            CommandResult::Message(
                format!("🎵 Tempo set to {} BPM", bpm)
                    .bright_green()
                    .to_string(),
            )
        }
        _ => CommandResult::Error("Invalid tempo. Use a value between 1-400 BPM".to_string()),
    }
}

/// Handle `time [N/D]` command
pub fn cmd_time(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        let ts = ctx.session.with_editor(|ed| ed.project.timescale);
        return CommandResult::Message(format!("Current time signature: {}", ts));
    }
    if let Some(locked) = locked_while_playing(ctx) {
        return locked;
    }

    match args.parse::<Timescale>() {
        Ok(ts) => {
            ctx.session.with_editor(|ed| ed.project.timescale = ts);
            CommandResult::Message(
                format!("🎵 Time signature set to {}", ts)
                    .bright_green()
                    .to_string(),
            )
        }
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `loop [on|off]` command
pub fn cmd_loop(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        let looping = ctx.session.with_editor(|ed| ed.project.looping);
        return CommandResult::Message(format!(
            "Loop is {}",
            if looping { "on" } else { "off" }
        ));
    }
    if let Some(locked) = locked_while_playing(ctx) {
        return locked;
    }

    match args {
        "on" => {
            ctx.session.with_editor(|ed| ed.project.looping = true);
            CommandResult::Message("🔁 Loop on — playback wraps at the bar".to_string())
        }
        "off" => {
            ctx.session.with_editor(|ed| ed.project.looping = false);
            CommandResult::Message("Loop off".to_string())
        }
        _ => CommandResult::Error("Usage: loop [on|off]".to_string()),
    }
}

/// Handle `watch [file]` command
pub fn cmd_watch(args: &str, _ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: watch <file>".to_string());
    }
    CommandResult::Watch(args.to_string())
}

/// Print help information
fn print_help() {
    println!("{}", "🎹 tonegrid Help".bold());
    println!("{}", "================".bold());
    println!();
    println!("{}", "Grid Editing:".green());
    println!(
        "  {}   - Place a note (width in cells, default: last used)",
        "grid add <cell> <pitch> [cells]".cyan()
    );
    println!(
        "  {}            - Delete the topmost note at a cell",
        "grid rm <cell> <pitch>".cyan()
    );
    println!(
        "  {} - Drag a note to a new cell/pitch",
        "grid move <cell> <pitch> <to-cell> [to-pitch]".cyan()
    );
    println!(
        "  {} - Drag a note's right edge; 'ripple'",
        "grid resize <cell> <pitch> <cells> [ripple]".cyan()
    );
    println!("                                    shifts all later notes by the same delta");
    println!("  {}                        - Remove every note", "grid clear".cyan());
    println!(
        "  {}                 - Draw the viewport as text",
        "grid show [cells]".cyan()
    );
    println!(
        "  {}                    - Pan the viewport (negative = left)",
        "scroll <cells>".cyan()
    );
    println!();
    println!("{}", "Pitches:".green());
    println!(
        "  Names like {}, {}, {} — the grid spans C3 up to B5.",
        "C4".cyan(),
        "F#3".cyan(),
        "Bb5".cyan()
    );
    println!();
    println!("{}", "Playback:".green());
    println!("  {}   - Start/stop playback (loops wrap at the bar)", "play".cyan());
    println!("  {}   - Stop playback", "stop".cyan());
    println!("  {}  - Show or set tempo (locked while playing)", "tempo [bpm]".cyan());
    println!("  {}  - Show or set the time signature", "time [N/D]".cyan());
    println!("  {} - Wrap playback at the last full bar", "loop [on|off]".cyan());
    println!();
    println!("{}", "Sharing:".green());
    println!("  {}          - Print the composition as a link query", "share".cyan());
    println!("  {}   - Load a link or query string", "load <link>".cyan());
    println!("  {}          - Re-apply the last loaded link", "reset".cyan());
    println!(
        "  {}   - Reload a link file whenever it changes",
        "watch <file>".cyan()
    );
    println!();
    println!("{}", "Other Commands:".green());
    println!("  {}           - Show this help", "help".bright_green());
    println!("  {}           - Exit the editor", "quit".bright_red());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use std::sync::Arc;

    fn context() -> CommandContext {
        CommandContext::new(Arc::new(Session::default()), None, None)
    }

    #[test]
    fn test_tempo_set_and_query() {
        let mut ctx = context();
        assert!(matches!(
            cmd_tempo("120", &mut ctx),
            CommandResult::Message(_)
        ));
        assert_eq!(ctx.session.with_editor(|ed| ed.project.bpm), 120);

        match cmd_tempo("", &mut ctx) {
            CommandResult::Message(m) => assert!(m.contains("120")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_tempo_rejects_out_of_range() {
        let mut ctx = context();
        assert!(matches!(cmd_tempo("0", &mut ctx), CommandResult::Error(_)));
        assert!(matches!(
            cmd_tempo("999", &mut ctx),
            CommandResult::Error(_)
        ));
        assert!(matches!(
            cmd_tempo("fast", &mut ctx),
            CommandResult::Error(_)
        ));
        assert_eq!(ctx.session.with_editor(|ed| ed.project.bpm), 140);
    }

    #[test]
    fn test_time_signature() {
        let mut ctx = context();
        assert!(matches!(
            cmd_time("3/4", &mut ctx),
            CommandResult::Message(_)
        ));
        let ts = ctx.session.with_editor(|ed| ed.project.timescale);
        assert_eq!(ts.beats_per_bar, 3);

        assert!(matches!(cmd_time("0/4", &mut ctx), CommandResult::Error(_)));
    }

    #[test]
    fn test_loop_toggle() {
        let mut ctx = context();
        cmd_loop("on", &mut ctx);
        assert!(ctx.session.with_editor(|ed| ed.project.looping));
        cmd_loop("off", &mut ctx);
        assert!(!ctx.session.with_editor(|ed| ed.project.looping));
        assert!(matches!(
            cmd_loop("maybe", &mut ctx),
            CommandResult::Error(_)
        ));
    }

    #[test]
    fn test_watch_requires_path() {
        let mut ctx = context();
        assert!(matches!(cmd_watch("", &mut ctx), CommandResult::Error(_)));
        assert!(matches!(
            cmd_watch("song.link", &mut ctx),
            CommandResult::Watch(_)
        ));
    }
}
