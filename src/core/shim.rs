//! Shim files placed on `PATH` in place of the managed tools.
//!
//! On Unix a shim is a symlink named after the tool pointing at the `opavm`
//! executable itself; `main` recognises the tool from `argv[0]` and dispatches.
//! Windows gets a `.cmd` wrapper that calls `opavm exec`.

use crate::core::dirs::Layout;
use crate::core::error::Result;
use crate::core::tool::Tool;
use std::fs;
use std::path::{Path, PathBuf};

/// Path of the shim for `tool` on this host
pub fn shim_path(layout: &Layout, tool: Tool) -> PathBuf {
    let dir = layout.shims_dir();
    if cfg!(windows) {
        dir.join(format!("{}.cmd", tool.name()))
    } else {
        dir.join(tool.name())
    }
}

/// Create the shim for `tool` unless one already exists. Returns its path.
pub fn ensure_shim(layout: &Layout, tool: Tool) -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    ensure_shim_for(layout, tool, &exe)
}

/// Like [`ensure_shim`], with an explicit `opavm` executable to dispatch through
pub fn ensure_shim_for(layout: &Layout, tool: Tool, opavm_exe: &Path) -> Result<PathBuf> {
    let path = shim_path(layout, tool);
    // symlink_metadata so a dangling symlink still counts as present
    if fs::symlink_metadata(&path).is_ok() {
        log::debug!("Shim {} already present", path.display());
        return Ok(path);
    }
    fs::create_dir_all(layout.shims_dir())?;
    write_shim(&path, tool, opavm_exe)?;
    log::debug!("Created shim {} -> {}", path.display(), opavm_exe.display());
    Ok(path)
}

#[cfg(unix)]
fn write_shim(path: &Path, _tool: Tool, opavm_exe: &Path) -> Result<()> {
    std::os::unix::fs::symlink(opavm_exe, path)?;
    Ok(())
}

#[cfg(not(unix))]
fn write_shim(path: &Path, tool: Tool, opavm_exe: &Path) -> Result<()> {
    fs::write(path, windows_shim_script(tool, opavm_exe))?;
    Ok(())
}

/// Batch wrapper forwarding every argument to `opavm exec`
pub fn windows_shim_script(tool: Tool, opavm_exe: &Path) -> String {
    format!(
        "@echo off\r\n\"{}\" exec --tool {} -- %*\r\nexit /b %ERRORLEVEL%\r\n",
        opavm_exe.display(),
        tool.name()
    )
}

/// Shell snippet that puts the shims directory first on `PATH`
pub fn path_instruction(layout: &Layout) -> String {
    let dir = layout.shims_dir();
    if cfg!(windows) {
        format!("set PATH={};%PATH%", dir.display())
    } else {
        format!("export PATH=\"{}:$PATH\"", dir.display())
    }
}

/// Whether the shims directory is already on the current `PATH`
pub fn shims_on_path(layout: &Layout) -> bool {
    let shims = layout.shims_dir();
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).any(|entry| entry == shims))
        .unwrap_or(false)
}
