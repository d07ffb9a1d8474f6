//! Terminal presentation: colour styling and the console output sink.
//!
//! Rendering of cost tables lives elsewhere; this module only covers the
//! messages printed around a command (warnings, errors, the update notice)
//! and the progress spinner.

mod color;
mod console;

pub use color::{Palette, indent, strip_color};
pub use console::{Console, Spinner};
