//! Clipboard delivery through a fallback chain.
//!
//! A `ClipboardDispatcher` owns an ordered list of mechanisms, assembled once
//! at startup. `copy` tries them left to right and stops at the first success,
//! so at most one mechanism actually writes the clipboard per call. A mechanism
//! that does not exist on this platform simply fails with
//! `MechanismError::Unavailable` and the chain moves on.
//!
//! Default order: the in-process `arboard` library, then the external helpers
//! CopyQ, xclip, wl-clipboard, PowerShell and pbcopy. On Linux the CopyQ,
//! xclip and wl-clipboard helpers go first, because arboard's selection is
//! lost when the process exits while the helpers leave an owner behind.

mod command;
mod native;

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{ClipboardError, MechanismError};

pub use command::CommandClipboard;
pub use native::NativeClipboard;

/// How long an external helper may run before it is killed.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Selector keys of the built-in mechanisms, in default priority order.
#[cfg(not(target_os = "linux"))]
pub const MECHANISM_KEYS: [&str; 6] = [
    "arboard",
    "copyq",
    "xclip",
    "wl-copy",
    "powershell",
    "pbcopy",
];

/// Selector keys of the built-in mechanisms, in default priority order.
#[cfg(target_os = "linux")]
pub const MECHANISM_KEYS: [&str; 6] = [
    "copyq",
    "xclip",
    "wl-copy",
    "arboard",
    "powershell",
    "pbcopy",
];

/// One way of placing text on the system clipboard.
pub trait ClipboardMechanism {
    /// Human-readable name used in diagnostics.
    fn name(&self) -> &str;

    /// Write `text` to the clipboard.
    fn try_copy(&self, text: &str) -> Result<(), MechanismError>;
}

/// Build the built-in mechanism for a selector key.
pub fn mechanism_for(key: &str, timeout: Option<Duration>) -> Option<Box<dyn ClipboardMechanism>> {
    let helper = match key {
        "arboard" => return Some(Box::new(NativeClipboard)),
        "copyq" => CommandClipboard::new("CopyQ", "copyq", &["copy", "-"]),
        "xclip" => CommandClipboard::new("xclip", "xclip", &["-selection", "clipboard"]),
        "wl-copy" => CommandClipboard::new("wl-clipboard", "wl-copy", &[]),
        "powershell" => CommandClipboard::new(
            "PowerShell",
            "powershell.exe",
            &["-command", "$input | Set-Clipboard"],
        ),
        "pbcopy" => CommandClipboard::new("pbcopy", "pbcopy", &[]),
        _ => return None,
    };
    Some(Box::new(helper.with_timeout(timeout)))
}

/// Every built-in mechanism in default order.
pub fn default_mechanisms(timeout: Option<Duration>) -> Vec<Box<dyn ClipboardMechanism>> {
    MECHANISM_KEYS
        .iter()
        .filter_map(|key| mechanism_for(key, timeout))
        .collect()
}

/// Walks the mechanism list until one of them succeeds.
pub struct ClipboardDispatcher {
    mechanisms: Vec<Box<dyn ClipboardMechanism>>,
}

impl ClipboardDispatcher {
    pub fn new(mechanisms: Vec<Box<dyn ClipboardMechanism>>) -> Self {
        Self { mechanisms }
    }

    /// The full default chain with `timeout` applied to external helpers.
    pub fn with_defaults(timeout: Option<Duration>) -> Self {
        Self::new(default_mechanisms(timeout))
    }

    /// A chain made of the named built-in mechanisms, in the given order.
    ///
    /// # Errors
    /// `ClipboardError::UnknownMechanism` for the first key that is not in
    /// `MECHANISM_KEYS`.
    pub fn from_names<S: AsRef<str>>(
        names: &[S],
        timeout: Option<Duration>,
    ) -> Result<Self, ClipboardError> {
        let mechanisms = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                mechanism_for(name, timeout)
                    .ok_or_else(|| ClipboardError::UnknownMechanism(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(mechanisms))
    }

    /// Names of the configured mechanisms, in order.
    pub fn names(&self) -> Vec<&str> {
        self.mechanisms.iter().map(|m| m.name()).collect()
    }

    /// Copy `text` with the first mechanism that works and return its name.
    ///
    /// With `verbose` set, every failed attempt is logged as a warning with its
    /// kind and cause; otherwise attempts are only visible at debug level.
    ///
    /// # Errors
    /// `ClipboardError::AllMechanismsFailed` when no mechanism succeeded,
    /// including the case of an empty list. The per-mechanism causes are kept
    /// in attempt order.
    pub fn copy(&self, text: &str, verbose: bool) -> Result<&str, ClipboardError> {
        let mut failures = Vec::new();
        for mechanism in &self.mechanisms {
            let name = mechanism.name();
            match mechanism.try_copy(text) {
                Ok(()) => {
                    if verbose {
                        info!(mechanism = name, "copied to clipboard");
                    }
                    return Ok(name);
                }
                Err(e) => {
                    if verbose {
                        warn!(mechanism = name, kind = e.kind(), error = %e, "clipboard method failed");
                    } else {
                        debug!(mechanism = name, kind = e.kind(), error = %e, "clipboard method failed");
                    }
                    failures.push((name.to_string(), e));
                }
            }
        }
        Err(ClipboardError::AllMechanismsFailed { failures })
    }
}

impl Default for ClipboardDispatcher {
    fn default() -> Self {
        Self::with_defaults(Some(DEFAULT_TIMEOUT))
    }
}
