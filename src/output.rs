// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal output helpers shared by the CLI commands.

use colored::Colorize;
use serde::Serialize;
use std::io::IsTerminal;

/// Colors are used when stdout is a terminal and `NO_COLOR` is unset.
pub fn use_colors() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

/// Print `value` as JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T, compact: bool) -> serde_json::Result<()> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", text);
    Ok(())
}

pub fn colorize_match(text: &str, color: bool) -> String {
    if color {
        text.black().on_yellow().bold().to_string()
    } else {
        text.to_string()
    }
}

pub fn colorize_repo(text: &str, color: bool) -> String {
    if color {
        text.cyan().bold().to_string()
    } else {
        text.to_string()
    }
}

pub fn colorize_path(text: &str, color: bool) -> String {
    if color {
        text.magenta().to_string()
    } else {
        text.to_string()
    }
}

pub fn colorize_heading(text: &str, color: bool) -> String {
    if color {
        text.bold().underline().to_string()
    } else {
        text.to_string()
    }
}

pub fn colorize_dim(text: &str, color: bool) -> String {
    if color {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_mode_leaves_text_untouched() {
        assert_eq!(colorize_match("needle", false), "needle");
        assert_eq!(colorize_repo("o/r", false), "o/r");
        assert_eq!(colorize_dim("search?q=x", false), "search?q=x");
    }

    #[test]
    fn color_mode_wraps_in_escape_codes() {
        colored::control::set_override(true);
        let painted = colorize_match("needle", true);
        colored::control::unset_override();
        assert!(painted.contains("needle"));
        assert_ne!(painted, "needle");
    }
}
