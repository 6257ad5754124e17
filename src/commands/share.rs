//! Share-link commands (share, load, reset)

use crate::commands::{CommandContext, CommandResult};
use colored::*;
use tonegrid_core::{link, Project};

/// Handle `share` — print the composition as a shareable query string.
pub fn cmd_share(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let query = ctx.session.with_editor(|ed| link::encode(&ed.project));
    CommandResult::Message(format!(
        "{}\n?{}",
        "🔗 Share link query (append to the editor URL):".bright_cyan(),
        query.bright_green()
    ))
}

/// Handle `load <link-or-query>`
pub fn cmd_load(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: load <link or query string>".to_string());
    }
    let (count, bpm) = ctx.session.with_editor(|ed| {
        link::apply(args, &mut ed.project);
        ed.reset_view();
        (ed.project.store.len(), ed.project.bpm)
    });
    ctx.session.remember_link(args);
    CommandResult::Message(format!(
        "{} {} note(s) at {} BPM",
        "📂 Loaded".bright_green(),
        count,
        bpm
    ))
}

/// Handle `reset` — restore the last loaded link, or clear everything.
pub fn cmd_reset(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    match ctx.session.last_link() {
        Some(query) => {
            let count = ctx.session.with_editor(|ed| {
                link::apply(&query, &mut ed.project);
                ed.reset_view();
                ed.project.store.len()
            });
            CommandResult::Message(format!("Restored last loaded link ({} note(s))", count))
        }
        None => {
            ctx.session.with_editor(|ed| {
                ed.project = Project::default();
                ed.reset_view();
            });
            CommandResult::Message("Reset to an empty grid".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::grid::cmd_grid_add;
    use crate::session::Session;
    use std::sync::Arc;
    use tonegrid_core::CELL;

    fn context() -> CommandContext {
        CommandContext::new(Arc::new(Session::default()), None, None)
    }

    #[test]
    fn test_share_load_round_trip() {
        let mut ctx = context();
        cmd_grid_add("0 C4 2", &mut ctx);
        cmd_grid_add("4 E4 1", &mut ctx);

        let query = ctx.session.with_editor(|ed| link::encode(&ed.project));
        let before = ctx.session.with_editor(|ed| ed.project.clone());

        // Wipe and reload from the link.
        let mut ctx2 = context();
        match cmd_load(&query, &mut ctx2) {
            CommandResult::Message(_) => {}
            other => panic!("load failed: {:?}", other),
        }
        let after = ctx2.session.with_editor(|ed| ed.project.clone());
        assert_eq!(before, after);
    }

    #[test]
    fn test_load_full_url() {
        let mut ctx = context();
        cmd_load(
            "https://example.com/?notes=0,0,2,8,4,1&bpm=120&loop=true&time=3/4",
            &mut ctx,
        );
        let (count, bpm, looping) = ctx
            .session
            .with_editor(|ed| (ed.project.store.len(), ed.project.bpm, ed.project.looping));
        assert_eq!(count, 2);
        assert_eq!(bpm, 120);
        assert!(looping);
    }

    #[test]
    fn test_reset_restores_last_load() {
        let mut ctx = context();
        cmd_load("notes=3,0,1&bpm=90&loop=false&time=4/4", &mut ctx);
        cmd_grid_add("10 C4 1", &mut ctx);
        assert_eq!(ctx.session.with_editor(|ed| ed.project.store.len()), 2);

        cmd_reset("", &mut ctx);
        let (count, x) = ctx.session.with_editor(|ed| {
            let n = ed.project.store.iter().next().unwrap();
            (ed.project.store.len(), n.x())
        });
        assert_eq!(count, 1);
        assert_eq!(x, 3 * CELL);
    }

    #[test]
    fn test_reset_without_load_clears() {
        let mut ctx = context();
        cmd_grid_add("0 C4 1", &mut ctx);
        cmd_reset("", &mut ctx);
        assert_eq!(ctx.session.with_editor(|ed| ed.project.store.len()), 0);
        assert_eq!(ctx.session.with_editor(|ed| ed.project.bpm), 140);
    }
}
