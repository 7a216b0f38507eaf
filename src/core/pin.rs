//! Per-directory pin files (`.opa-version`, `.regal-version`).

use crate::core::error::Result;
use crate::core::tool::Tool;
use std::fs;
use std::path::{Path, PathBuf};

/// A pin file found on disk together with its token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    pub path: PathBuf,
    pub version: String,
}

/// Nearest pin for `tool` at `start` or any of its ancestors.
///
/// The walk stops at the first pin file with a non-empty token. Unreadable or
/// empty pin files are skipped so an outer pin can still apply.
pub fn find_pin(start: &Path, tool: Tool) -> Option<Pin> {
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    let filename = tool.pin_filename();

    let mut current = Some(start.as_path());
    while let Some(dir) = current {
        let candidate = dir.join(filename);
        if candidate.is_file() {
            match read_pin(&candidate) {
                Ok(Some(version)) => {
                    log::debug!("Found {} pin {version} at {}", tool.name(), candidate.display());
                    return Some(Pin {
                        path: candidate,
                        version,
                    });
                }
                Ok(None) => log::debug!("Ignoring empty pin file {}", candidate.display()),
                Err(e) => log::warn!("Could not read pin file {}: {e}", candidate.display()),
            }
        }
        current = dir.parent();
    }
    None
}

/// Trimmed token from a pin file, `None` when the file is blank
pub fn read_pin(path: &Path) -> Result<Option<String>> {
    let content = fs::read_to_string(path)?;
    let token = content.split_whitespace().next().map(str::to_string);
    Ok(token)
}

/// Write `version` as the pin for `tool` in `dir`
pub fn write_pin(dir: &Path, tool: Tool, version: &str) -> Result<PathBuf> {
    let path = dir.join(tool.pin_filename());
    fs::write(&path, format!("{}\n", version.trim()))?;
    Ok(path)
}
