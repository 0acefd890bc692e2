// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use rollup_core::TrackerStatus;
use std::io::IsTerminal;

pub mod codes {
    /// Section headers: pastel cyan / steel blue
    pub const HEADER: u8 = 74;
    /// Commands and literals: light grey
    pub const LITERAL: u8 = 250;
    /// Descriptions and context: medium grey
    pub const CONTEXT: u8 = 245;
    /// Muted / secondary text: darker grey
    pub const MUTED: u8 = 240;
    pub const SUCCESS: u8 = 108;
    pub const FAILURE: u8 = 167;
    pub const ACTIVE: u8 = 179;
}

/// Determine if color output should be enabled.
///
/// Priority: `NO_COLOR=1` disables, then `COLOR=1` forces, then the TTY check.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Build clap `Styles` using the project palette.
pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    Styles::styled()
        .header(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::HEADER)))))
        .literal(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::LITERAL)))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::CONTEXT)))))
}

fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

/// Format text with the header color (steel blue).
pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

/// Format text with the muted color (dark grey).
pub fn muted(text: &str) -> String {
    paint(codes::MUTED, text)
}

/// Color for a status label.
pub fn status_code(status: TrackerStatus) -> u8 {
    match status {
        TrackerStatus::NotStarted => codes::CONTEXT,
        TrackerStatus::InProgress => codes::ACTIVE,
        TrackerStatus::Succeeded => codes::SUCCESS,
        TrackerStatus::Canceled => codes::MUTED,
        TrackerStatus::Failed => codes::FAILURE,
    }
}

/// Format a status label in its status color.
pub fn status(status: TrackerStatus) -> String {
    paint(status_code(status), &status.to_string())
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
