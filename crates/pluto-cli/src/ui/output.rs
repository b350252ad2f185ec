//! Terminal output for commands and the install engine.
//!
//! Lines are written whole, so concurrent install tasks never interleave
//! within a line.

use crossterm::style::{Color, Stylize};
use pluto_core::Reporter;
use pluto_schema::ReverseMapKey;
use std::io::IsTerminal;

use super::theme::Theme;

/// Whether styled output should be written: stdout is a terminal and
/// `NO_COLOR` is unset or empty.
pub fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none_or(|v| v.is_empty()) && std::io::stdout().is_terminal()
}

#[derive(Debug, Clone)]
pub struct Output {
    theme: Theme,
    color: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            color: color_enabled(),
        }
    }
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    /// An `Output` that never writes escape sequences.
    pub fn plain() -> Self {
        Self {
            color: false,
            ..Self::default()
        }
    }

    /// `text` in `color`, or as is when styling is off.
    pub fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    /// `text` in bold `color`, or as is when styling is off.
    pub fn paint_bold(&self, text: &str, color: Color) -> String {
        if self.color {
            text.bold().with(color).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn section(&self, title: &str) {
        println!();
        println!("{}", self.paint_bold(title, self.theme.info));
    }

    pub fn info(&self, msg: &str) {
        println!("  {} {msg}", self.paint("[i]", self.theme.secondary));
    }

    pub fn success(&self, msg: &str) {
        println!("  {} {msg}", self.paint("[✓]", self.theme.success));
    }

    pub fn warning(&self, msg: &str) {
        println!("  {} {msg}", self.paint("[!]", self.theme.warning));
    }

    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", self.paint("[X]", self.theme.error));
    }

    /// Format a package identity the same way everywhere.
    pub fn key(&self, key: &str) -> String {
        self.paint(key, self.theme.package_name)
    }

    pub fn summary(&self, count: usize, action: &str, elapsed_secs: f64) {
        let noun = if count == 1 { "package" } else { "packages" };
        println!();
        println!(
            "  {} {count} {noun} {action} {}",
            self.paint("[✓]", self.theme.success),
            self.paint(&format!("in {elapsed_secs:.1}s"), self.theme.secondary)
        );
    }

    /// Ask a yes/no question on stdin. Anything but `y` is a no.
    pub fn confirm(&self, question: &str) -> std::io::Result<bool> {
        use std::io::Write;
        print!("  {} {question} (y/N) ", self.paint("[?]", self.theme.warning));
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        Ok(input.trim().eq_ignore_ascii_case("y"))
    }
}

impl Reporter for Output {
    fn section(&self, title: &str) {
        Output::section(self, title);
    }
    fn info(&self, msg: &str) {
        Output::info(self, msg);
    }
    fn success(&self, msg: &str) {
        Output::success(self, msg);
    }
    fn warning(&self, msg: &str) {
        Output::warning(self, msg);
    }
    fn error(&self, msg: &str) {
        Output::error(self, msg);
    }
    fn cache_hit(&self, key: &ReverseMapKey) {
        self.info(&format!("Found {} in the module cache", self.key(key.as_str())));
    }
    fn cached(&self, key: &ReverseMapKey, _revision: &str) {
        self.info(&format!("Cached {}", self.key(key.as_str())));
    }
    fn installed(&self, key: &ReverseMapKey, revision: &str) {
        let short = revision.get(..8).unwrap_or(revision);
        self.success(&format!(
            "Added {} {}",
            self.key(key.as_str()),
            self.paint(short, self.theme.secondary)
        ));
    }
    fn removed(&self, key: &ReverseMapKey) {
        self.success(&format!("Removed {}", self.key(key.as_str())));
    }
    fn summary(&self, count: usize, action: &str, elapsed_secs: f64) {
        Output::summary(self, count, action, elapsed_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_output_has_no_escapes() {
        let output = Output::plain();
        assert_eq!(output.key("ui@v1.0"), "ui@v1.0");
        assert_eq!(output.paint_bold("Installing", Color::Blue), "Installing");
    }
}
