//! Identity of the tools opavm manages.
//!
//! Each [`Tool`] carries its canonical name, the pin file that fixes its version
//! for a directory tree, the GitHub repository its releases come from and the
//! environment variable that overrides that repository.

use crate::core::error::{OpavmError, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A managed tool. Defined at process start, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tool {
    #[default]
    Opa,
    Regal,
}

impl Tool {
    pub const ALL: [Tool; 2] = [Tool::Opa, Tool::Regal];

    /// Canonical lowercase name, also the key used in the state file
    pub fn name(self) -> &'static str {
        match self {
            Tool::Opa => "opa",
            Tool::Regal => "regal",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Tool::Opa => "OPA",
            Tool::Regal => "Regal",
        }
    }

    /// Executable name without platform extension
    pub fn binary_base(self) -> &'static str {
        self.name()
    }

    pub fn default_repo(self) -> &'static str {
        match self {
            Tool::Opa => "open-policy-agent/opa",
            Tool::Regal => "StyraInc/regal",
        }
    }

    pub fn pin_filename(self) -> &'static str {
        match self {
            Tool::Opa => ".opa-version",
            Tool::Regal => ".regal-version",
        }
    }

    /// Environment variable that replaces [`Tool::default_repo`]
    pub fn repo_env_var(self) -> &'static str {
        match self {
            Tool::Opa => "OPAVM_GITHUB_REPO",
            Tool::Regal => "OPAVM_REGAL_GITHUB_REPO",
        }
    }

    /// OPA is the primary tool and lives directly under `versions/`
    pub fn is_primary(self) -> bool {
        matches!(self, Tool::Opa)
    }

    pub fn supported_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|tool| tool.name()).collect()
    }

    /// Recognise a shim invocation from `argv[0]` (`opa`, `/x/shims/regal`, `opa.exe`)
    pub fn from_invocation(argv0: &str) -> Option<Tool> {
        let stem = Path::new(argv0).file_stem()?.to_str()?;
        Self::ALL.into_iter().find(|tool| tool.name() == stem)
    }

    pub fn install_command(self, version: &str) -> String {
        if self.is_primary() {
            format!("opavm install {version}")
        } else {
            format!("opavm install {} {version}", self.name())
        }
    }

    pub fn use_command(self, version: &str) -> String {
        self.with_tool_flag(format!("opavm use {version}"))
    }

    pub fn pin_command(self, version: &str) -> String {
        self.with_tool_flag(format!("opavm pin {version}"))
    }

    fn with_tool_flag(self, command: String) -> String {
        if self.is_primary() {
            command
        } else {
            format!("{command} --tool {}", self.name())
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Tool {
    type Err = OpavmError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|tool| tool.name() == normalized)
            .ok_or_else(|| OpavmError::unknown_tool(s.trim()))
    }
}
