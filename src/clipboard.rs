/*!
 * Clipboard support for promptpack
 *
 * Copies rendered output to the system clipboard by piping it into the
 * first usable clipboard command for the current platform.
 */

use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;

/// Error type for clipboard operations
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// Failed to execute the clipboard command
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// No suitable clipboard mechanism was found
    #[error("No suitable clipboard mechanism found")]
    NoClipboardFound,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for clipboard operations
pub type Result<T> = std::result::Result<T, ClipboardError>;

/// A clipboard command this module knows how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    /// tmux paste buffer, preferred inside a tmux session
    Tmux,
    /// Wayland clipboard
    WlCopy,
    /// X11 clipboard via xsel
    Xsel,
    /// X11 clipboard via xclip
    Xclip,
    /// macOS clipboard
    Pbcopy,
    /// Windows clipboard, also reachable from WSL
    ClipExe,
    /// Termux clipboard on Android
    Termux,
}

impl Backend {
    fn command(self) -> (&'static str, &'static [&'static str]) {
        match self {
            Backend::Tmux => ("tmux", &["load-buffer", "-w", "-"]),
            Backend::WlCopy => ("wl-copy", &[]),
            Backend::Xsel => ("xsel", &["-b", "-i"]),
            Backend::Xclip => ("xclip", &["-selection", "clipboard", "-in"]),
            Backend::Pbcopy => ("pbcopy", &[]),
            Backend::ClipExe => ("clip.exe", &[]),
            Backend::Termux => ("termux-clipboard-set", &[]),
        }
    }

    /// Backends worth trying on this platform, in preference order
    fn candidates() -> Vec<Backend> {
        let mut candidates = Vec::new();

        if env::var("TMUX").is_ok() {
            candidates.push(Backend::Tmux);
        }

        if cfg!(target_os = "macos") {
            candidates.push(Backend::Pbcopy);
        } else if cfg!(target_os = "windows") {
            candidates.push(Backend::ClipExe);
        } else if cfg!(target_os = "android") {
            candidates.push(Backend::Termux);
        } else {
            candidates.push(Backend::WlCopy);
            candidates.push(Backend::Xsel);
            candidates.push(Backend::Xclip);
            // Inside WSL the Windows clipboard is reachable too.
            if env::var("WSL_DISTRO_NAME").is_ok() {
                candidates.push(Backend::ClipExe);
            }
        }

        candidates
    }
}

/// Copy text to the system clipboard.
///
/// Detects the first available clipboard command for this platform and
/// pipes the text into it.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let backend = detect_backend().ok_or(ClipboardError::NoClipboardFound)?;
    let (cmd, args) = backend.command();

    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|e| ClipboardError::CommandFailed(format!("Failed to spawn {}: {}", cmd, e)))?;

    // Scoped so stdin closes before waiting.
    {
        let stdin = child.stdin.as_mut().ok_or_else(|| {
            ClipboardError::CommandFailed(format!("Failed to open stdin for {}", cmd))
        })?;
        stdin.write_all(text.as_bytes())?;
    }

    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(ClipboardError::CommandFailed(format!(
            "{} exited with status: {}",
            cmd, status
        )))
    }
}

/// Check if a command exists on the system
pub fn command_exists(command: &str) -> bool {
    if let Ok(paths) = env::var("PATH") {
        for path in env::split_paths(&paths) {
            if Path::new(&path).join(command).exists() {
                return true;
            }
        }
    }
    false
}

fn detect_backend() -> Option<Backend> {
    Backend::candidates()
        .into_iter()
        .find(|backend| command_exists(backend.command().0))
}
