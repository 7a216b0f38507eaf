//! Predefined sandbox scenarios
//!
//! Provides sandboxes with versions installed, defaults set and projects
//! pinned, so individual tests only state what they check.

#![allow(dead_code)]

use super::sandbox::*;
use opavm::core::{error::Result, Tool};
use std::path::PathBuf;

/// Scenario: opa 0.61.0 and 0.63.0 installed, 0.63.0 is the global default,
/// `work/repo` pins 0.61.0 and `work/other` has no pin
pub struct PinnedProject {
    pub sandbox: TestSandbox,
    pub repo: PathBuf,
    pub deep: PathBuf,
    pub other: PathBuf,
}

pub fn create_pinned_project() -> Result<PinnedProject> {
    let sandbox = setup_sandbox()?;
    sandbox.install_fake(Tool::Opa, "0.61.0")?;
    sandbox.install_fake(Tool::Opa, "0.63.0")?;
    sandbox.set_default(Tool::Opa, "0.63.0")?;

    let repo = sandbox.work_dir("repo")?;
    sandbox.pin(&repo, Tool::Opa, "0.61.0")?;
    let deep = sandbox.work_dir("repo/sub/deep")?;
    let other = sandbox.work_dir("other")?;

    Ok(PinnedProject {
        sandbox,
        repo,
        deep,
        other,
    })
}

/// Scenario: both tools installed and defaulted, nothing pinned
pub fn create_two_tool_sandbox() -> Result<TestSandbox> {
    let sandbox = setup_sandbox()?;
    sandbox.install_fake(Tool::Opa, "0.62.1")?;
    sandbox.install_fake(Tool::Regal, "0.38.1")?;
    sandbox.set_default(Tool::Opa, "0.62.1")?;
    sandbox.set_default(Tool::Regal, "0.38.1")?;
    Ok(sandbox)
}
