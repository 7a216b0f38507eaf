//! Version resolution: nearest pin file, then global default.
//!
//! [`VersionResolver`] is the only place that decides which version is active.
//! `current`, `which`, `exec` and the shims all go through it.

use crate::core::dirs::Layout;
use crate::core::error::{OpavmError, Result};
use crate::core::pin::find_pin;
use crate::core::platform::Platform;
use crate::core::state::StateStore;
use crate::core::tool::Tool;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a resolved version came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionSource {
    Pinned(PathBuf),
    GlobalDefault,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionSource::Pinned(path) => write!(f, "pinned via {}", path.display()),
            ResolutionSource::GlobalDefault => f.write_str("global default"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub tool: Tool,
    pub version: String,
    pub source: ResolutionSource,
}

/// A version binary present on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledVersion {
    pub tool: Tool,
    pub version: String,
    pub binary: PathBuf,
    pub platform: Platform,
}

pub struct VersionResolver {
    layout: Layout,
    state: StateStore,
    platform: Platform,
}

impl VersionResolver {
    pub fn new(layout: Layout, platform: Platform) -> Self {
        let state = StateStore::new(&layout);
        Self {
            layout,
            state,
            platform,
        }
    }

    /// Active version of `tool` for `start_dir`
    pub fn resolve(&self, tool: Tool, start_dir: &Path) -> Result<Resolution> {
        if let Some(pin) = find_pin(start_dir, tool) {
            return Ok(Resolution {
                tool,
                version: pin.version,
                source: ResolutionSource::Pinned(pin.path),
            });
        }

        if let Some(version) = self.state.get_default(tool) {
            log::debug!("Using {} global default {version}", tool.name());
            return Ok(Resolution {
                tool,
                version,
                source: ResolutionSource::GlobalDefault,
            });
        }

        Err(OpavmError::no_version_configured(tool))
    }

    /// Resolve and locate the installed binary.
    /// A configured version that is missing on disk is `VersionNotInstalled`.
    pub fn resolve_binary(
        &self,
        tool: Tool,
        start_dir: &Path,
    ) -> Result<(Resolution, InstalledVersion)> {
        let resolution = self.resolve(tool, start_dir)?;
        let installed = self
            .locate(tool, &resolution.version)
            .ok_or_else(|| OpavmError::version_not_installed(tool, &resolution.version))?;
        Ok((resolution, installed))
    }

    /// The installed binary for `version`, if its directory holds one
    pub fn locate(&self, tool: Tool, version: &str) -> Option<InstalledVersion> {
        locate_binary(&self.layout, self.platform, tool, version)
    }
}

/// Binary lookup shared with the installer. Accepts both the native and the
/// `.exe`-suffixed filename so a version directory copied across hosts still resolves.
pub fn locate_binary(
    layout: &Layout,
    platform: Platform,
    tool: Tool,
    version: &str,
) -> Option<InstalledVersion> {
    if version.is_empty() || version.starts_with('.') || version.contains(['/', '\\']) {
        return None;
    }
    let dir = layout.version_dir(tool, version);
    let preferred = platform.binary_filename(tool);
    let alternate = if preferred.ends_with(".exe") {
        tool.binary_base().to_string()
    } else {
        format!("{}.exe", tool.binary_base())
    };

    [preferred, alternate]
        .into_iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
        .map(|binary| InstalledVersion {
            tool,
            version: version.to_string(),
            binary,
            platform,
        })
}
