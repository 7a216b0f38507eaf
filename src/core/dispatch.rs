//! Hand-off from a shim (or `opavm exec`) to the resolved tool binary.
//!
//! There is no `PATH` lookup here: if the resolver fails, the
//! invocation fails.

use crate::core::dirs::Layout;
use crate::core::error::{OpavmError, Result};
use crate::core::platform::Platform;
use crate::core::resolver::{InstalledVersion, VersionResolver};
use crate::core::tool::Tool;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

pub struct ShimDispatcher {
    resolver: VersionResolver,
}

impl ShimDispatcher {
    pub fn new(layout: Layout, platform: Platform) -> Self {
        Self {
            resolver: VersionResolver::new(layout, platform),
        }
    }

    /// Resolve the active version for `cwd` and locate its binary
    pub fn locate(&self, tool: Tool, cwd: &Path) -> Result<InstalledVersion> {
        let (resolution, installed) = self.resolver.resolve_binary(tool, cwd)?;
        log::debug!(
            "Dispatching {} {} ({}) -> {}",
            tool.name(),
            resolution.version,
            resolution.source,
            installed.binary.display()
        );
        Ok(installed)
    }

    /// Transfer control to the resolved binary. On Unix the process image is
    /// replaced and this only returns on failure; elsewhere the child's exit
    /// code is returned.
    pub fn dispatch(&self, tool: Tool, cwd: &Path, args: Vec<OsString>) -> Result<i32> {
        let installed = self.locate(tool, cwd)?;
        exec_binary(&installed.binary, args)
    }
}

#[cfg(unix)]
fn exec_binary(binary: &Path, args: Vec<OsString>) -> Result<i32> {
    use std::os::unix::process::CommandExt;
    let error = Command::new(binary).args(args).exec();
    Err(OpavmError::exec_failed(binary, error))
}

#[cfg(not(unix))]
fn exec_binary(binary: &Path, args: Vec<OsString>) -> Result<i32> {
    let status = Command::new(binary)
        .args(args)
        .status()
        .map_err(|e| OpavmError::exec_failed(binary, e))?;
    // Killed by a signal: no exit code to forward.
    Ok(status.code().unwrap_or(1))
}
