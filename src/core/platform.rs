//! Host platform detection and release asset naming.

use crate::core::error::{OpavmError, Result};
use crate::core::tool::Tool;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Darwin,
    Linux,
    Windows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Amd64,
    Arm64,
}

/// Operating system and CPU architecture a binary is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Os {
    pub fn as_str(self) -> &'static str {
        match self {
            Os::Darwin => "darwin",
            Os::Linux => "linux",
            Os::Windows => "windows",
        }
    }

    fn regal_token(self) -> &'static str {
        match self {
            Os::Darwin => "Darwin",
            Os::Linux => "Linux",
            Os::Windows => "Windows",
        }
    }
}

impl Arch {
    pub fn as_str(self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
        }
    }

    fn regal_token(self) -> &'static str {
        match self {
            Arch::Amd64 => "x86_64",
            Arch::Arm64 => "arm64",
        }
    }
}

impl Platform {
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Platform of the running process
    pub fn current() -> Result<Self> {
        Self::from_parts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Normalise OS and architecture names as reported by Rust or `uname`
    pub fn from_parts(os_name: &str, machine: &str) -> Result<Self> {
        let os = match os_name.to_lowercase().as_str() {
            "macos" | "darwin" => Os::Darwin,
            "linux" => Os::Linux,
            "windows" => Os::Windows,
            other => {
                return Err(OpavmError::unsupported_platform(
                    format!("Unsupported OS: {other}."),
                    "opavm supports macOS, Linux, and Windows.",
                ))
            }
        };

        let arch = match machine.to_lowercase().as_str() {
            "x86_64" | "amd64" => Arch::Amd64,
            "aarch64" | "arm64" => Arch::Arm64,
            other => {
                return Err(OpavmError::unsupported_platform(
                    format!("Unsupported architecture: {other}."),
                    "Use amd64 or arm64 hardware.",
                ))
            }
        };

        if os == Os::Windows && arch != Arch::Amd64 {
            return Err(OpavmError::unsupported_platform(
                format!("Unsupported architecture: {machine}."),
                "Windows support currently requires amd64.",
            ));
        }

        Ok(Self { os, arch })
    }

    fn exe_suffix(self) -> &'static str {
        if self.os == Os::Windows {
            ".exe"
        } else {
            ""
        }
    }

    /// File name of the tool executable inside a version directory
    pub fn binary_filename(self, tool: Tool) -> String {
        format!("{}{}", tool.binary_base(), self.exe_suffix())
    }

    /// Release asset names for `tool` on this platform, most preferred first
    pub fn asset_candidates(self, tool: Tool) -> Vec<String> {
        match tool {
            Tool::Opa => {
                let mut candidates = vec![format!(
                    "opa_{}_{}{}",
                    self.os.as_str(),
                    self.arch.as_str(),
                    self.exe_suffix()
                )];
                // Older arm64 releases only ship static builds.
                if self.arch == Arch::Arm64 && self.os != Os::Windows {
                    candidates.push(format!("opa_{}_arm64_static", self.os.as_str()));
                }
                candidates
            }
            Tool::Regal => vec![format!(
                "regal_{}_{}{}",
                self.os.regal_token(),
                self.arch.regal_token(),
                self.exe_suffix()
            )],
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os.as_str(), self.arch.as_str())
    }
}
