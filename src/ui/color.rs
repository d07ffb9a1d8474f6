//! ANSI colour styling.

const RESET: &str = "\x1b[0m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const RED: &str = "\x1b[31m";
const BLUE_UNDERLINE: &str = "\x1b[4;34m";
const GREEN: &str = "\x1b[32m";

/// Applies colours to message fragments, or leaves them plain when colour
/// is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Palette {
    /// Creates a palette; `enabled = false` yields plain text.
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn paint(self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("{code}{text}{RESET}")
        } else {
            text.to_owned()
        }
    }

    /// Warning emphasis.
    #[must_use]
    pub fn warning(self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    /// Primary emphasis, used for commands and versions.
    #[must_use]
    pub fn primary(self, text: &str) -> String {
        self.paint(CYAN, text)
    }

    /// Error emphasis.
    #[must_use]
    pub fn error(self, text: &str) -> String {
        self.paint(RED, text)
    }

    /// Hyperlink emphasis.
    #[must_use]
    pub fn link(self, text: &str) -> String {
        self.paint(BLUE_UNDERLINE, text)
    }

    /// Success emphasis.
    #[must_use]
    pub fn success(self, text: &str) -> String {
        self.paint(GREEN, text)
    }
}

/// Removes ANSI escape sequences (CSI and OSC) from `text`.
#[must_use]
pub fn strip_color(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(current) = chars.next() {
        if current != '\x1b' {
            result.push(current);
            continue;
        }

        match chars.peek() {
            Some('[') => {
                chars.next();
                for terminator in chars.by_ref() {
                    if terminator.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
            Some(']') => {
                chars.next();
                while let Some(next) = chars.next() {
                    if next == '\x07' {
                        break;
                    }
                    if next == '\x1b' && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    result
}

/// Prefixes every line of `text` with `prefix`.
#[must_use]
pub fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
