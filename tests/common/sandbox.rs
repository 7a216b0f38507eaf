//! Isolated opavm home and working directory for a single test
//!
//! Every sandbox owns a temporary directory holding both the opavm root
//! (`home/`) and a project tree (`work/`), so tests never touch the real
//! `~/.opavm` and never share state.

#![allow(dead_code)]

use assert_cmd::prelude::*;
use opavm::core::{error::Result, Layout, Platform, StateStore, Tool};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Environment variables that would leak the developer's setup into a test
const SCRUBBED_ENV: [&str; 5] = [
    "OPAVM_GITHUB_TOKEN",
    "GITHUB_TOKEN",
    "OPAVM_GITHUB_REPO",
    "OPAVM_REGAL_GITHUB_REPO",
    "RUST_LOG",
];

/// Test sandbox. The TempDir must be kept alive for the duration of the test.
pub struct TestSandbox {
    pub temp_dir: TempDir,
    pub home: PathBuf,
    pub work: PathBuf,
}

impl TestSandbox {
    pub fn layout(&self) -> Layout {
        Layout::new(&self.home)
    }

    pub fn state(&self) -> StateStore {
        StateStore::new(&self.layout())
    }

    /// `opavm` with `OPAVM_HOME` pointing into the sandbox, run from `work/`
    pub fn opavm(&self) -> assert_cmd::Command {
        let mut cmd = Command::cargo_bin("opavm").expect("opavm binary is built");
        self.configure(&mut cmd);
        assert_cmd::Command::from_std(cmd)
    }

    /// Apply the sandbox environment to an arbitrary command (used for shims)
    pub fn configure(&self, cmd: &mut Command) {
        for var in SCRUBBED_ENV {
            cmd.env_remove(var);
        }
        cmd.env("OPAVM_HOME", &self.home)
            .env("NO_COLOR", "1")
            .current_dir(&self.work);
    }

    /// Create `work/<relative>` and return its path
    pub fn work_dir(&self, relative: &str) -> Result<PathBuf> {
        let dir = self.work.join(relative);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Place a fake executable for `tool`/`version` where the resolver looks.
    /// The fake prints its identity and arguments; `fail` as first argument exits 3.
    pub fn install_fake(&self, tool: Tool, version: &str) -> Result<PathBuf> {
        let platform = Platform::current()?;
        let dir = self.layout().version_dir(tool, version);
        fs::create_dir_all(&dir)?;
        let binary = dir.join(platform.binary_filename(tool));
        fs::write(&binary, fake_binary_script(tool, version))?;
        make_executable(&binary)?;
        self.state().record_install(tool, version)?;
        Ok(binary)
    }

    pub fn set_default(&self, tool: Tool, version: &str) -> Result<()> {
        self.state().set_default(tool, version)
    }

    pub fn pin(&self, dir: &Path, tool: Tool, version: &str) -> Result<PathBuf> {
        let path = dir.join(tool.pin_filename());
        fs::write(&path, format!("{version}\n"))?;
        Ok(path)
    }
}

pub fn fake_binary_script(tool: Tool, version: &str) -> String {
    format!(
        concat!(
            "#!/bin/sh\n",
            "echo \"fake-{} {}: $*\"\n",
            "if [ \"$1\" = \"fail\" ]; then exit 3; fi\n",
            "exit 0\n",
        ),
        tool.name(),
        version
    )
}

#[cfg(unix)]
pub fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Sets up an empty sandbox: no state file, no installed versions
pub fn setup_sandbox() -> Result<TestSandbox> {
    let temp_dir = TempDir::new()?;
    let home = temp_dir.path().join("home");
    let work = temp_dir.path().join("work");
    fs::create_dir_all(&work)?;
    Ok(TestSandbox {
        temp_dir,
        home,
        work,
    })
}
