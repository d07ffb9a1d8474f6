//! The console output sink.

use std::io::Write;

use super::color::Palette;
use crate::error::CommandError;

const ISSUES_URL: &str = "https://github.com/infracost/infracost/issues";

/// A progress indicator shown while a command works.
///
/// The spinner is drawn as a single status line on the diagnostic stream and
/// settles into a success or failure mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spinner {
    message: String,
}

impl Spinner {
    /// The message the spinner displays.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Owns the process output streams, the colour toggle and the active
/// spinner.
///
/// Command output goes to the `out` stream; every diagnostic (warnings,
/// errors, the update notice) goes to `err`. Both are injectable so tests
/// can capture them.
pub struct Console {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
    palette: Palette,
    spinner: Option<Spinner>,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("palette", &self.palette)
            .field("spinner", &self.spinner)
            .finish_non_exhaustive()
    }
}

impl Console {
    /// Creates a console writing to the given streams with colour enabled.
    pub fn new(out: impl Write + Send + 'static, err: impl Write + Send + 'static) -> Self {
        Self {
            out: Box::new(out),
            err: Box::new(err),
            palette: Palette::default(),
            spinner: None,
        }
    }

    /// Creates a console on the process stdout and stderr.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(std::io::stdout(), std::io::stderr())
    }

    /// The active palette.
    #[must_use]
    pub const fn palette(&self) -> Palette {
        self.palette
    }

    /// Enables or disables colour output.
    pub const fn set_color(&mut self, enabled: bool) {
        self.palette = Palette::new(enabled);
    }

    /// Writes a line of command output.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Output`] if the stream cannot be written.
    pub fn println(&mut self, text: &str) -> Result<(), CommandError> {
        writeln!(self.out, "{text}")?;
        self.out.flush()?;
        Ok(())
    }

    /// Writes a line to the diagnostic stream.
    ///
    /// Diagnostics are best-effort: a failed write is logged and dropped.
    pub fn eprintln(&mut self, text: &str) {
        let result = writeln!(self.err, "{text}").and_then(|()| self.err.flush());
        if let Err(error) = result {
            tracing::debug!(%error, "failed to write diagnostic output");
        }
    }

    /// Writes text to the diagnostic stream without a trailing newline.
    pub fn eprint(&mut self, text: &str) {
        let result = write!(self.err, "{text}").and_then(|()| self.err.flush());
        if let Err(error) = result {
            tracing::debug!(%error, "failed to write diagnostic output");
        }
    }

    /// Starts a spinner with `message`, replacing any active one.
    pub fn start_spinner(&mut self, message: &str) {
        self.eprintln(&format!("{message}..."));
        self.spinner = Some(Spinner {
            message: message.to_owned(),
        });
    }

    /// Marks the active spinner as done.
    pub fn succeed_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            let mark = self.palette.success("✔");
            self.eprintln(&format!("{mark} {}", spinner.message));
        }
    }

    /// Marks the active spinner as failed, followed by a blank line.
    ///
    /// Does nothing when no spinner is active.
    pub fn fail_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            let mark = self.palette.error("✖");
            self.eprintln(&format!("{mark} {}", spinner.message));
            self.eprintln("");
        }
    }

    /// The active spinner, if any.
    #[must_use]
    pub const fn spinner(&self) -> Option<&Spinner> {
        self.spinner.as_ref()
    }

    /// Prints an error message.
    pub fn print_error(&mut self, message: &str) {
        let label = self.palette.error("Error:");
        self.eprintln(&format!("{label} {message}"));
    }

    /// Prints the diagnostic for an unrecoverable fault.
    pub fn print_unexpected_error(&mut self, fault: &str, stack: &str) {
        let label = self.palette.error("Error:");
        let link = self.palette.link(ISSUES_URL);
        self.eprintln(&format!(
            "\n{label} An unexpected error occurred\n\n{fault}\n{stack}\n\
             If this issue persists please create an issue at {link}"
        ));
    }
}
