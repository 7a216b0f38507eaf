//! Persisted global state: per-tool default versions and the installed-version cache.
//!
//! This module owns `state.json` under the opavm root.
//!
//! # Public API
//! - [`GlobalState`]: The serialised record
//! - [`StateStore`]: Read and atomic read-modify-write access to the record
//!
//! # Persistence Strategy
//! - **Tolerant reads**: A missing or corrupt file reads as empty state
//! - **Exclusive writers**: Every mutation holds a lock on `state.lock`
//! - **Atomic replace**: Writes go to a temp file that is fsynced and renamed over the original

use crate::core::dirs::Layout;
use crate::core::error::{OpavmError, Result};
use crate::core::tool::Tool;
use fs4::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalState {
    /// Pre-multi-tool default, read as the OPA default when `global_defaults` has none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_default: Option<String>,
    #[serde(default)]
    pub global_defaults: BTreeMap<String, String>,
    #[serde(default)]
    pub installed: BTreeMap<String, BTreeSet<String>>,
}

impl GlobalState {
    pub fn default_for(&self, tool: Tool) -> Option<&str> {
        self.global_defaults
            .get(tool.name())
            .map(String::as_str)
            .or_else(|| {
                if tool.is_primary() {
                    self.global_default.as_deref()
                } else {
                    None
                }
            })
            .filter(|version| !version.trim().is_empty())
    }

    pub fn set_default_for(&mut self, tool: Tool, version: &str) {
        if tool.is_primary() {
            self.global_default = None;
        }
        self.global_defaults
            .insert(tool.name().to_string(), version.to_string());
    }

    pub fn installed_for(&self, tool: Tool) -> BTreeSet<String> {
        self.installed.get(tool.name()).cloned().unwrap_or_default()
    }
}

/// Access to `state.json`. Values are loaded per call; nothing is cached in memory.
#[derive(Debug, Clone)]
pub struct StateStore {
    root: PathBuf,
    path: PathBuf,
    lock_path: PathBuf,
}

impl StateStore {
    pub fn new(layout: &Layout) -> Self {
        Self {
            root: layout.root().to_path_buf(),
            path: layout.state_path(),
            lock_path: layout.state_lock_path(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state. Never fails: absent or malformed files read as empty.
    pub fn load(&self) -> GlobalState {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return GlobalState::default(),
            Err(e) => {
                log::warn!(
                    "Could not read state file '{}', treating as empty: {e}",
                    self.path.display()
                );
                return GlobalState::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                log::warn!(
                    "State file '{}' is corrupt, treating as empty: {e}",
                    self.path.display()
                );
                GlobalState::default()
            }
        }
    }

    pub fn get_default(&self, tool: Tool) -> Option<String> {
        self.load().default_for(tool).map(str::to_string)
    }

    pub fn set_default(&self, tool: Tool, version: &str) -> Result<()> {
        log::debug!("Setting {} global default to {version}", tool.name());
        self.update(|state| state.set_default_for(tool, version))
    }

    /// Cached enumeration of installed versions; directory presence stays canonical
    pub fn list_installed(&self, tool: Tool) -> BTreeSet<String> {
        self.load().installed_for(tool)
    }

    pub fn record_install(&self, tool: Tool, version: &str) -> Result<()> {
        self.update(|state| {
            state
                .installed
                .entry(tool.name().to_string())
                .or_default()
                .insert(version.to_string());
        })
    }

    pub fn remove(&self, tool: Tool, version: &str) -> Result<()> {
        self.update(|state| {
            if let Some(versions) = state.installed.get_mut(tool.name()) {
                versions.remove(version);
                if versions.is_empty() {
                    state.installed.remove(tool.name());
                }
            }
        })
    }

    /// Replace the cached installed set for `tool` with what is on disk
    pub fn sync_installed(&self, tool: Tool, on_disk: &BTreeSet<String>) -> Result<()> {
        self.update(|state| {
            if on_disk.is_empty() {
                state.installed.remove(tool.name());
            } else {
                state
                    .installed
                    .insert(tool.name().to_string(), on_disk.clone());
            }
        })
    }

    /// Read-modify-write under the state lock
    fn update<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut GlobalState),
    {
        let _lock = self.acquire_lock()?;
        let mut state = self.load();
        mutate(&mut state);
        self.write_atomic(&state)
    }

    fn acquire_lock(&self) -> Result<File> {
        fs::create_dir_all(&self.root)
            .map_err(|e| OpavmError::state_write_failed(&self.root, e))?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|e| OpavmError::state_write_failed(&self.lock_path, e))?;
        file.lock_exclusive()
            .map_err(|e| OpavmError::state_write_failed(&self.lock_path, e))?;
        Ok(file)
    }

    fn write_atomic(&self, state: &GlobalState) -> Result<()> {
        let mut tmp = tempfile::Builder::new()
            .prefix("state.")
            .suffix(".tmp")
            .tempfile_in(&self.root)
            .map_err(|e| OpavmError::state_write_failed(&self.path, e))?;

        let json = serde_json::to_string_pretty(state)?;
        tmp.write_all(json.as_bytes())
            .and_then(|_| tmp.write_all(b"\n"))
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| OpavmError::state_write_failed(&self.path, e))?;

        tmp.persist(&self.path)
            .map_err(|e| OpavmError::state_write_failed(&self.path, e.error))?;

        log::debug!("Wrote state file {}", self.path.display());
        Ok(())
    }
}
