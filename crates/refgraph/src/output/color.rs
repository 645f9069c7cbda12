//! Color and styling helpers for operator output.
//!
//! Semantic Color Theme:
//!   - Success: green   (run completed, image rendered)
//!   - Warning: yellow  (possible truncation)
//!   - Error:   red     (failed queries, render failures)
//!   - Info:    cyan    (progress, counts)
//!   - Muted:   dimmed  (secondary details)

use colored::Colorize;

use super::OutputConfig;
use crate::context::Level;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Apply dimmed style to text.
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

/// Icon shown in front of a message, with ASCII fallback support.
pub(crate) fn level_icon(level: Level, config: &OutputConfig) -> &'static str {
    if config.use_ascii {
        match level {
            Level::Progress => "..",
            Level::Info => "-",
            Level::Warn => "!",
            Level::Error => "x",
            Level::Success => "+",
        }
    } else {
        match level {
            Level::Progress => "…",
            Level::Info => "•",
            Level::Warn => "⚠",
            Level::Error => "✗",
            Level::Success => "✓",
        }
    }
}

/// Format one operator message: colored icon followed by the text.
pub(crate) fn format_message(level: Level, message: &str, config: &OutputConfig) -> String {
    let icon = level_icon(level, config);
    let icon = match level {
        Level::Progress | Level::Info => info(icon, config),
        Level::Warn => warning(icon, config),
        Level::Error => error(icon, config),
        Level::Success => success(icon, config),
    };
    let text = match level {
        Level::Warn => warning(message, config),
        Level::Error => error(message, config),
        Level::Progress | Level::Info | Level::Success => message.to_string(),
    };
    format!("{icon} {text}")
}
