//! # Terminal Output
//!
//! Styling helpers for the `iproj` command-line tool. Colour is decided
//! once from the `--color` flag and the usual environment conventions
//! (`NO_COLOR`, `CLICOLOR`, `CLICOLOR_FORCE`, `TERM=dumb`), then applied
//! through `console`.

use std::env;
use std::fmt::Display;

use console::{style, StyledObject};


/// Value of the `--color` flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Parse a flag value; anything unrecognised is `Auto`.
    pub fn from_flag(flag: &str) -> Self {
        match flag.to_ascii_lowercase().as_str() {
            "always" => ColorChoice::Always,
            "never" => ColorChoice::Never,
            _ => ColorChoice::Auto,
        }
    }
}

/// Resolved styling decision for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Output {
    pub use_color: bool,
}

impl Output {
    pub fn new(choice: ColorChoice) -> Self {
        let use_color = match choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => detect_color_support(),
        };
        Self { use_color }
    }

    /// Apply the decision to `console` for stdout and stderr.
    pub fn install(self) -> Self {
        console::set_colors_enabled(self.use_color);
        console::set_colors_enabled_stderr(self.use_color);
        self
    }

    /// Status marker: a symbol with colour, bracketed text without.
    pub fn marker(&self, status: Status) -> String {
        let (symbol, plain) = match status {
            Status::Ok => ("✔", "[OK]"),
            Status::Warning => ("⚠", "[WARN]"),
            Status::Error => ("✘", "[ERR]"),
        };
        if !self.use_color {
            return plain.to_string();
        }
        let styled = style(symbol);
        match status {
            Status::Ok => styled.green(),
            Status::Warning => styled.yellow(),
            Status::Error => styled.red(),
        }
        .to_string()
    }
}

/// Outcome shown by [`Output::marker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warning,
    Error,
}

fn detect_color_support() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
        return false;
    }
    if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
        return true;
    }
    if env::var("TERM").is_ok_and(|v| v == "dumb") {
        return false;
    }
    console::Term::stdout().features().colors_supported()
}

/// Colour a job log message by severity: 30 and above red, 20 and above
/// yellow, the rest dim.
pub fn severity<D: Display>(value: D, severity: u32) -> StyledObject<D> {
    let styled = style(value);
    match severity {
        30.. => styled.red(),
        20..=29 => styled.yellow(),
        _ => styled.dim(),
    }
}

/// A variable value for display; unset names are shown distinctly from
/// names set to an empty value.
pub fn variable_value(value: Option<&str>) -> String {
    match value {
        Some("") => style("(empty)").dim().to_string(),
        Some(value) => value.to_string(),
        None => style("(not set)").red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_flag() {
        assert_eq!(ColorChoice::from_flag("ALWAYS"), ColorChoice::Always);
        assert_eq!(ColorChoice::from_flag("never"), ColorChoice::Never);
        assert_eq!(ColorChoice::from_flag("sometimes"), ColorChoice::Auto);
        assert!(Output::new(ColorChoice::Always).use_color);
        assert!(!Output::new(ColorChoice::Never).use_color);
    }

    #[test]
    fn test_plain_markers() {
        let out = Output::new(ColorChoice::Never);
        assert_eq!(out.marker(Status::Ok), "[OK]");
        assert_eq!(out.marker(Status::Warning), "[WARN]");
        assert_eq!(out.marker(Status::Error), "[ERR]");
    }

    #[test]
    fn test_colored_marker_contains_symbol() {
        let out = Output::new(ColorChoice::Always);
        assert!(out.marker(Status::Error).contains('✘'));
    }
}
