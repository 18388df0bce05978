//! Terminal output for the `tasker-server` binary.
//!
//! Every status line is a marker followed by a message. With colors the
//! marker is a glyph; without them it is a bracketed tag, so logs captured
//! from a plain terminal stay greppable.

use owo_colors::OwoColorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Done,
    Note,
    Caution,
    Failure,
    Wrote,
    Kept,
}

impl Mark {
    fn tag(self) -> &'static str {
        match self {
            Mark::Done => "[OK]",
            Mark::Note => "[INFO]",
            Mark::Caution => "[WARN]",
            Mark::Failure => "[ERROR]",
            Mark::Wrote => "[CREATED]",
            Mark::Kept => "[SKIPPED]",
        }
    }

    fn glyph(self) -> String {
        match self {
            Mark::Done | Mark::Wrote => "✓".green().bold().to_string(),
            Mark::Note => "•".blue().to_string(),
            Mark::Caution => "⚠".yellow().bold().to_string(),
            Mark::Failure => "✗".red().bold().to_string(),
            Mark::Kept => "○".yellow().to_string(),
        }
    }
}

/// Writes status lines, with or without ANSI colors.
pub struct Output {
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self { colored: true }
    }

    pub fn no_color() -> Self {
        Self { colored: false }
    }

    fn line(&self, mark: Mark, message: &str) -> String {
        if self.colored {
            format!("  {} {}", mark.glyph(), message)
        } else {
            format!("  {} {}", mark.tag(), message)
        }
    }

    fn paint(&self, text: &str, style: fn(&str) -> String) -> String {
        if self.colored {
            style(text)
        } else {
            text.to_string()
        }
    }

    pub fn banner(&self) {
        let name = self.paint("tasker", |s| s.bright_cyan().bold().to_string());
        let version = self.paint(
            &format!("v{}", env!("CARGO_PKG_VERSION")),
            |s| s.dimmed().to_string(),
        );
        println!("\n   {} {}\n", name, version);
    }

    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    pub fn success(&self, message: &str) {
        let message = self.paint(message, |s| s.green().to_string());
        println!("{}", self.line(Mark::Done, &message));
    }

    pub fn info(&self, message: &str) {
        println!("{}", self.line(Mark::Note, message));
    }

    pub fn warning(&self, message: &str) {
        let message = self.paint(message, |s| s.yellow().to_string());
        println!("{}", self.line(Mark::Caution, &message));
    }

    /// Written to stderr.
    pub fn error(&self, message: &str) {
        let message = self.paint(message, |s| s.red().to_string());
        eprintln!("{}", self.line(Mark::Failure, &message));
    }

    /// A file that was written, e.g. `created("config", "tasker.toml")`.
    pub fn created(&self, kind: &str, path: &str) {
        let kind = self.paint(kind, |s| s.dimmed().to_string());
        let path = self.paint(path, |s| s.bright_white().to_string());
        println!("{}", self.line(Mark::Wrote, &format!("{} {}", kind, path)));
    }

    /// A file that was left alone, with the reason.
    pub fn skipped(&self, path: &str, reason: &str) {
        let path = self.paint(path, |s| s.dimmed().to_string());
        let reason = self.paint(&format!("({})", reason), |s| s.yellow().to_string());
        println!("{}", self.line(Mark::Kept, &format!("{} {}", path, reason)));
    }

    pub fn kv(&self, key: &str, value: &str) {
        let key = self.paint(key, |s| s.dimmed().to_string());
        let value = self.paint(value, |s| s.bright_white().to_string());
        println!("    {}: {}", key, value);
    }

    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {}", message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// A shell command the user may want to run next.
    pub fn command(&self, cmd: &str) {
        let cmd = self.paint(&format!("$ {}", cmd), |s| s.bright_cyan().to_string());
        println!("     {}", cmd);
    }

    pub fn newline(&self) {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_lines_use_tags() {
        let output = Output::no_color();

        assert_eq!(output.line(Mark::Done, "ready"), "  [OK] ready");
        assert_eq!(
            output.line(Mark::Kept, "tasker.toml (exists)"),
            "  [SKIPPED] tasker.toml (exists)"
        );
        assert_eq!(output.paint("plain", |s| s.red().to_string()), "plain");
    }

    #[test]
    fn test_colored_lines_carry_escape_codes() {
        let output = Output::new();

        let line = output.line(Mark::Failure, "boom");
        assert!(line.contains('✗'));
        assert!(!line.contains("[ERROR]"));
        assert!(line.contains('\u{1b}'));
    }

    #[test]
    fn test_every_printer_runs_in_both_modes() {
        for output in [Output::no_color(), Output::new()] {
            output.banner();
            output.header("Init");
            output.success("done");
            output.info("note");
            output.warning("careful");
            output.error("failed");
            output.created("config", "tasker.toml");
            output.skipped(".env.example", "already exists");
            output.kv("listen", "127.0.0.1:3000");
            output.hint("set JWT_SECRET");
            output.command("tasker-server");
            output.newline();
        }
    }
}
