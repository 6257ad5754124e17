//! Grid editing commands
//!
//! These translate cell coordinates into synthetic pointer gestures routed
//! through the edit controller, so REPL edits obey the exact same snapping,
//! default-width, ripple, and preview semantics as pointer input.

use crate::commands::{CommandContext, CommandResult};
use colored::*;
use tonegrid_core::render::{self, LineKind};
use tonegrid_core::{Pitch, PointerButton, CELL};

/// Resolve a `<cell> <pitch>` argument pair into content pixel coordinates
/// just inside the addressed cell.
fn cell_args(
    ctx: &CommandContext,
    cell: &str,
    pitch: &str,
) -> Result<(i32, i32, Pitch), String> {
    let cell: i32 = cell
        .parse()
        .map_err(|_| format!("Invalid cell index: {}", cell))?;
    if cell < 0 {
        return Err(format!("Cell index must be >= 0, got {}", cell));
    }
    let pitch: Pitch = pitch.parse().map_err(|e| format!("{}", e))?;
    let y = ctx
        .session
        .with_editor(|ed| ed.project.range.y_of_pitch(pitch))
        .ok_or_else(|| format!("{} is outside the grid's pitch range", pitch))?;
    Ok((cell * CELL, y, pitch))
}

/// Handle `grid add <cell> <pitch> [cells]`
pub fn cmd_grid_add(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let parts: Vec<&str> = args.split_whitespace().collect();
    if parts.len() < 2 || parts.len() > 3 {
        return CommandResult::Error("Usage: grid add <cell> <pitch> [cells]".to_string());
    }
    let (px, py, pitch) = match cell_args(ctx, parts[0], parts[1]) {
        Ok(v) => v,
        Err(e) => return CommandResult::Error(e),
    };
    let cells: Option<i32> = match parts.get(2) {
        Some(c) => match c.parse() {
            Ok(n) if n >= 1 => Some(n),
            _ => return CommandResult::Error(format!("Invalid width in cells: {}", c)),
        },
        None => None,
    };

    let result = ctx.session.with_editor(|ed| {
        if ed.project.store.top_note_at(px + 1, py + 1).is_some() {
            return Err("A note already covers that cell; move it or pick another".to_string());
        }
        let mut effects = ed.pointer_down(px + 1, py + 1, PointerButton::Primary);
        ed.pointer_up(PointerButton::Primary);

        let created = ed
            .project
            .store
            .iter()
            .last()
            .expect("create gesture inserted a note");
        let (x, right) = (created.x(), created.right());

        if let Some(cells) = cells {
            // Second gesture: drag the right edge to the requested width.
            effects.extend(ed.pointer_down(right - 1, py + 1, PointerButton::Primary));
            effects.extend(ed.pointer_move(x + cells * CELL - 1, py + 1));
            ed.pointer_up(PointerButton::Primary);
        }
        let width = ed.default_note_width() / CELL;
        Ok((effects, x / CELL, width))
    });

    match result {
        Ok((effects, cell, width)) => {
            ctx.apply_effects(&effects);
            CommandResult::Message(format!(
                "{} {} at cell {} ({} {})",
                "♪ Added".bright_green(),
                pitch.to_string().cyan(),
                cell,
                width,
                if width == 1 { "cell" } else { "cells" }
            ))
        }
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `grid rm <cell> <pitch>`
pub fn cmd_grid_rm(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let parts: Vec<&str> = args.split_whitespace().collect();
    if parts.len() != 2 {
        return CommandResult::Error("Usage: grid rm <cell> <pitch>".to_string());
    }
    let (px, py, pitch) = match cell_args(ctx, parts[0], parts[1]) {
        Ok(v) => v,
        Err(e) => return CommandResult::Error(e),
    };

    let removed = ctx.session.with_editor(|ed| {
        let before = ed.project.store.len();
        ed.pointer_down(px + 1, py + 1, PointerButton::Secondary);
        ed.pointer_up(PointerButton::Secondary);
        ed.project.store.len() < before
    });

    if removed {
        CommandResult::Message(format!("{} {}", "✖ Removed".bright_red(), pitch))
    } else {
        CommandResult::Error(format!("No note at cell {} {}", parts[0], pitch))
    }
}

/// Handle `grid move <cell> <pitch> <to-cell> [to-pitch]`
pub fn cmd_grid_move(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let parts: Vec<&str> = args.split_whitespace().collect();
    if parts.len() < 3 || parts.len() > 4 {
        return CommandResult::Error(
            "Usage: grid move <cell> <pitch> <to-cell> [to-pitch]".to_string(),
        );
    }
    let (px, py, _) = match cell_args(ctx, parts[0], parts[1]) {
        Ok(v) => v,
        Err(e) => return CommandResult::Error(e),
    };
    let to_pitch = parts.get(3).copied().unwrap_or(parts[1]);
    let (tx, ty, pitch) = match cell_args(ctx, parts[2], to_pitch) {
        Ok(v) => v,
        Err(e) => return CommandResult::Error(e),
    };

    let result = ctx.session.with_editor(|ed| {
        if ed.project.store.top_note_at(px + 1, py + 1).is_none() {
            return Err(format!("No note at cell {} {}", parts[0], parts[1]));
        }
        let mut effects = ed.pointer_down(px + 1, py + 1, PointerButton::Primary);
        effects.extend(ed.pointer_move(tx + 1, ty + 1));
        ed.pointer_up(PointerButton::Primary);
        Ok(effects)
    });

    match result {
        Ok(effects) => {
            ctx.apply_effects(&effects);
            CommandResult::Message(format!(
                "{} to cell {} {}",
                "→ Moved".bright_green(),
                parts[2],
                pitch
            ))
        }
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `grid resize <cell> <pitch> <cells> [ripple]`
pub fn cmd_grid_resize(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let parts: Vec<&str> = args.split_whitespace().collect();
    if parts.len() < 3 || parts.len() > 4 {
        return CommandResult::Error(
            "Usage: grid resize <cell> <pitch> <cells> [ripple]".to_string(),
        );
    }
    let (px, py, _) = match cell_args(ctx, parts[0], parts[1]) {
        Ok(v) => v,
        Err(e) => return CommandResult::Error(e),
    };
    let cells: i32 = match parts[2].parse() {
        Ok(n) if n >= 1 => n,
        _ => return CommandResult::Error(format!("Invalid width in cells: {}", parts[2])),
    };
    let ripple = match parts.get(3) {
        Some(&"ripple") => true,
        Some(other) => {
            return CommandResult::Error(format!("Unknown modifier: {} (try 'ripple')", other))
        }
        None => false,
    };

    let result = ctx.session.with_editor(|ed| {
        let Some(id) = ed.project.store.top_note_at(px + 1, py + 1) else {
            return Err(format!("No note at cell {} {}", parts[0], parts[1]));
        };
        let note = ed.project.store.get(id).expect("hit-tested note exists");
        let (x, right) = (note.x(), note.right());

        ed.set_ripple(ripple);
        ed.pointer_down(right - 1, py + 1, PointerButton::Primary);
        ed.pointer_move(x + cells * CELL - 1, py + 1);
        ed.pointer_up(PointerButton::Primary);
        ed.set_ripple(false);
        Ok(())
    });

    match result {
        Ok(()) => CommandResult::Message(format!(
            "{} to {} {}{}",
            "↔ Resized".bright_green(),
            cells,
            if cells == 1 { "cell" } else { "cells" },
            if ripple { ", rippling later notes" } else { "" }
        )),
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `grid clear`
pub fn cmd_grid_clear(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let count = ctx.session.with_editor(|ed| {
        let count = ed.project.store.len();
        ed.project.store.clear();
        count
    });
    CommandResult::Message(format!("Cleared {} note(s)", count))
}

/// Handle `scroll <cells>` (negative scrolls left)
pub fn cmd_scroll(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let cells: i32 = match args.parse() {
        Ok(n) => n,
        Err(_) => return CommandResult::Error("Usage: scroll <cells>".to_string()),
    };
    let scroll = ctx.session.with_editor(|ed| {
        ed.scroll_by(cells * CELL);
        ed.scroll_x()
    });
    CommandResult::Message(format!("Viewport at cell {}", scroll / CELL))
}

/// Handle `grid show [cells]` — render the viewport as text.
pub fn cmd_grid_show(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let width_cells: i32 = match args.trim() {
        "" => 64,
        s => match s.parse() {
            Ok(n) if (8..=256).contains(&n) => n,
            _ => return CommandResult::Error("Usage: grid show [cells (8-256)]".to_string()),
        },
    };

    let now_ms = ctx.session.now_ms();
    let playline = ctx.session.playline();
    let (frame, header) = ctx.session.with_editor(|ed| {
        ed.set_viewport_px(width_cells * CELL);
        if let Some(x) = playline.as_ref().and_then(|l| l.position(now_ms)) {
            ed.follow_playline(x);
        }
        let frame = render::frame(ed, playline.as_ref(), now_ms);
        let header = format!(
            "{} BPM, {}, loop {}  |  {} note(s), viewing cells {}..{}",
            ed.project.bpm,
            ed.project.timescale,
            if ed.project.looping { "on" } else { "off" },
            ed.project.store.len(),
            ed.scroll_x() / CELL,
            (ed.scroll_x() + ed.viewport_px()) / CELL,
        );
        (frame, header)
    });

    let mut out = String::new();
    out.push_str(&format!("{}\n", header.bold()));

    // Mark each viewport cell with the coarsest grid line crossing it.
    let mut rulers = vec![' '; width_cells as usize];
    for line in &frame.lines {
        let cell = (line.x / CELL) as usize;
        if cell < rulers.len() {
            rulers[cell] = match line.kind {
                LineKind::Bar => '|',
                LineKind::Beat if rulers[cell] != '|' => ':',
                _ => rulers[cell],
            };
        }
    }

    let playline_cell = frame
        .playline_x
        .map(|x| (x / CELL as f64).floor() as i32)
        .filter(|c| (0..width_cells).contains(c));

    for row in 0..frame.rows {
        let name = ctx
            .session
            .with_editor(|ed| ed.project.range.pitch_at_row(row))
            .map(|p| p.to_string())
            .unwrap_or_default();
        let mut cells: Vec<String> = rulers
            .iter()
            .map(|&r| {
                if r == ' ' {
                    "·".dimmed().to_string()
                } else {
                    r.to_string().dimmed().to_string()
                }
            })
            .collect();

        for note in &frame.notes {
            if note.y / CELL == row as i32 {
                let from = (note.x / CELL).max(0);
                let to = ((note.x + note.width) / CELL).min(width_cells);
                for c in from..to {
                    cells[c as usize] = "█".bright_green().to_string();
                }
            }
        }

        if let Some(pc) = playline_cell {
            cells[pc as usize] = "▌".bright_red().to_string();
        }

        out.push_str(&format!("{} {}\n", format!("{:>4}", name).cyan(), cells.join("")));
    }

    if playline.is_some() {
        out.push_str(&format!("{}\n", "▶ playing".bright_yellow()));
    }
    CommandResult::Message(out)
}
