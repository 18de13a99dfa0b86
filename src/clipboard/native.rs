//! In-process clipboard access through the `arboard` crate.
//!
//! On X11 and Wayland the selection is owned by this process, so the copied
//! text disappears when it exits unless a clipboard manager takes it over.
//! The default chain therefore tries the external helpers first on Linux.

use arboard::Clipboard;

use super::ClipboardMechanism;
use crate::error::MechanismError;

/// Cross-platform clipboard without external processes.
///
/// Initialisation fails in headless sessions (no display server, CI); that is
/// reported as `Unavailable` so the chain falls through to the helpers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeClipboard;

impl ClipboardMechanism for NativeClipboard {
    fn name(&self) -> &str {
        "arboard"
    }

    fn try_copy(&self, text: &str) -> Result<(), MechanismError> {
        let mut ctx = Clipboard::new()
            .map_err(|e| MechanismError::unavailable(format!("clipboard init: {}", e)))?;
        ctx.set_text(text.to_owned())
            .map_err(|e| MechanismError::execution_failure(format!("clipboard set: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clipboard_copy_no_panic() {
        // Headless CI usually has no clipboard; only the absence of a panic matters.
        let _ = NativeClipboard.try_copy("test");
    }
}
