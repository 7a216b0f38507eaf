use crate::core::error::{OpavmError, Result};
use crate::core::tool::Tool;
use std::path::{Path, PathBuf};

pub const HOME_ENV: &str = "OPAVM_HOME";

/// Root directory: `$OPAVM_HOME`, falling back to `~/.opavm`
pub fn get_root_directory() -> Result<PathBuf> {
    match std::env::var_os(HOME_ENV) {
        Some(value) if !value.is_empty() => Ok(PathBuf::from(value)),
        _ => dirs::home_dir()
            .map(|home| home.join(".opavm"))
            .ok_or(OpavmError::HomeDirectoryNotFound),
    }
}

/// On-disk layout rooted at the opavm home directory.
///
/// ```text
/// <root>/state.json
/// <root>/state.lock
/// <root>/shims/<tool>
/// <root>/versions/<version>/opa
/// <root>/tools/<tool>/versions/<version>/<tool>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn versions_dir(&self, tool: Tool) -> PathBuf {
        if tool.is_primary() {
            self.root.join("versions")
        } else {
            self.root.join("tools").join(tool.name()).join("versions")
        }
    }

    pub fn version_dir(&self, tool: Tool, version: &str) -> PathBuf {
        self.versions_dir(tool).join(version)
    }

    pub fn shims_dir(&self) -> PathBuf {
        self.root.join("shims")
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.join("state.json")
    }

    pub fn state_lock_path(&self) -> PathBuf {
        self.root.join("state.lock")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_tool_lives_under_versions() {
        let layout = Layout::new("/home/u/.opavm");
        assert_eq!(
            layout.version_dir(Tool::Opa, "0.61.0"),
            PathBuf::from("/home/u/.opavm/versions/0.61.0")
        );
    }

    #[test]
    fn test_secondary_tool_lives_under_tools() {
        let layout = Layout::new("/home/u/.opavm");
        assert_eq!(
            layout.version_dir(Tool::Regal, "0.38.1"),
            PathBuf::from("/home/u/.opavm/tools/regal/versions/0.38.1")
        );
    }

    #[test]
    fn test_fixed_paths() {
        let layout = Layout::new("/r");
        assert_eq!(layout.state_path(), PathBuf::from("/r/state.json"));
        assert_eq!(layout.state_lock_path(), PathBuf::from("/r/state.lock"));
        assert_eq!(layout.shims_dir(), PathBuf::from("/r/shims"));
    }
}
