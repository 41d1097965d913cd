//! Terminal clipboard via the OSC 52 escape sequence
//!
//! The terminal emulator owns the clipboard; we only ask it to set the
//! content. Works over SSH and inside the alternate screen.

use std::io::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use eyre::{Context, Result};
use tracing::debug;

/// Build the escape sequence that sets the clipboard to `text`
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}

/// Ask the terminal behind `out` to copy `text`
pub fn copy_to<W: Write>(out: &mut W, text: &str) -> Result<()> {
    debug!(text_len = text.len(), "copy_to: called");
    out.write_all(osc52_sequence(text).as_bytes())
        .context("Failed to write clipboard sequence")?;
    out.flush().context("Failed to flush clipboard sequence")
}

/// Copy `text` through stdout
pub fn copy(text: &str) -> Result<()> {
    copy_to(&mut std::io::stdout(), text)
}
