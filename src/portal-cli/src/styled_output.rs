//! Styled terminal output.
//!
//! Messages go to stderr with an icon and, when stderr is a terminal and
//! `NO_COLOR` is not set, a color.

use std::io::{IsTerminal, Write};

/// Check if colors should be disabled based on NO_COLOR env var.
fn colors_disabled() -> bool {
    std::env::var("NO_COLOR")
        .map(|v| !v.is_empty() && v != "0" && v.to_lowercase() != "false")
        .unwrap_or(false)
}

mod palette {
    pub const SUCCESS: &str = "\x1b[38;2;0;245;212m";
    pub const ERROR: &str = "\x1b[38;2;255;107;107m";
    pub const INFO: &str = "\x1b[38;2;72;202;228m";
    pub const BOLD: &str = "\x1b[1m";
    pub const RESET: &str = "\x1b[0m";
}

/// Message type for styled output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Success,
    Error,
    Info,
}

impl MessageType {
    fn icon(&self) -> &'static str {
        match self {
            MessageType::Success => "[OK]",
            MessageType::Error => "[ERROR]",
            MessageType::Info => "[INFO]",
        }
    }

    fn color(&self) -> &'static str {
        match self {
            MessageType::Success => palette::SUCCESS,
            MessageType::Error => palette::ERROR,
            MessageType::Info => palette::INFO,
        }
    }
}

/// Format a message with its icon, colored if requested.
pub fn styled(msg_type: MessageType, message: &str, use_colors: bool) -> String {
    if use_colors {
        format!(
            "{}{}{} {}{}",
            msg_type.color(),
            palette::BOLD,
            msg_type.icon(),
            message,
            palette::RESET
        )
    } else {
        format!("{} {}", msg_type.icon(), message)
    }
}

/// Whether stderr output should be colored.
pub fn stderr_colors() -> bool {
    !colors_disabled() && std::io::stderr().is_terminal()
}

fn print_styled(msg_type: MessageType, message: &str) {
    let line = styled(msg_type, message, stderr_colors());
    let _ = writeln!(std::io::stderr(), "{line}");
}

pub fn print_success(message: &str) {
    print_styled(MessageType::Success, message);
}

pub fn print_error(message: &str) {
    print_styled(MessageType::Error, message);
}

pub fn print_info(message: &str) {
    print_styled(MessageType::Info, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styled_plain() {
        assert_eq!(styled(MessageType::Success, "done", false), "[OK] done");
        assert_eq!(styled(MessageType::Error, "boom", false), "[ERROR] boom");
    }

    #[test]
    fn test_styled_colored_resets() {
        let line = styled(MessageType::Info, "hello", true);
        assert!(line.starts_with(palette::INFO));
        assert!(line.ends_with(palette::RESET));
        assert!(line.contains("[INFO] hello"));
    }
}
