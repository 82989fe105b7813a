//! Console reporting for the event stream and run summary.

use std::path::Path;

use colored::Colorize;

use savelink_protocol::{GameEvent, GameResult, Operation, Settings};

pub fn banner(settings: &Settings, conf: &Path) {
    println!("using home dir:  {}", settings.home_dir.display().to_string().green());
    println!("using games dir: {}", settings.games_dir.display().to_string().blue());
    println!("using saves dir: {}", settings.saves_dir.display().to_string().blue());
    println!("using conf:      {}", conf.display().to_string().blue());
    if settings.dry_run {
        println!("dry run:         {}", "true".red());
    }
    println!();
}

pub fn print_event(event: &GameEvent) {
    match event {
        GameEvent::Start { game } => println!("{}", game.bold()),
        GameEvent::Op { op, .. } => println!("  {}", format_op(op)),
        GameEvent::Error { message, .. } => {
            println!("  {} {message}", "error:".red().bold())
        }
        GameEvent::End { .. } => {}
    }
}

pub fn print_shortcut_result(result: &GameResult) {
    match (&result.error, result.app_id) {
        (Some(message), _) => {
            println!("  {} {} {message}", result.game.bold(), "error:".red().bold())
        }
        (None, Some(app_id)) => {
            println!("  {} {} ({app_id})", result.game.bold(), "synced".green())
        }
        (None, None) => {
            for op in &result.ops {
                println!("  {} {}", result.game.bold(), format_op(op));
            }
        }
    }
}

pub fn summary(link_results: &[GameResult], errors: usize) {
    let changed = link_results
        .iter()
        .filter(|r| {
            r.ops
                .iter()
                .any(|op| !matches!(op, Operation::Noop { .. }))
        })
        .count();
    println!();
    if errors == 0 {
        println!(
            "{} {} games processed, {changed} changed",
            "done:".green().bold(),
            link_results.len()
        );
    } else {
        println!(
            "{} {} games processed, {changed} changed, {errors} errors",
            "done:".red().bold(),
            link_results.len()
        );
    }
}

fn format_op(op: &Operation) -> String {
    match op {
        Operation::Delete { path, reason } => {
            format!("{} {} ({reason})", "delete".red(), path.display())
        }
        Operation::Move { from, to } => {
            format!("{} {} -> {}", "move".yellow(), from.display(), to.display())
        }
        Operation::Link { from, to } => {
            format!("{} {} -> {}", "link".cyan(), to.display(), from.display())
        }
        Operation::Create { path } => format!("{} {}", "create".green(), path.display()),
        Operation::Noop { reason } => format!("{} ({reason})", "noop".dimmed()),
    }
}
