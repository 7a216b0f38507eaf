//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`OpavmError`] which covers every failure mode of the
//! resolution and installation pipeline. It uses `thiserror` for ergonomic error
//! definitions and provides constructors that build the remediation text, so
//! call sites never have to format hints themselves.
//!
//! # Public API
//! - [`OpavmError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, OpavmError>`
//!
//! # Error Categories
//! - **Resolution**: No version configured, version not installed
//! - **Upstream**: Release or asset not found, ambiguous assets
//! - **Integrity**: Checksum mismatch, corrupt install
//! - **Network**: Proxy, connectivity, timeouts, rate limits, authorization
//! - **Local**: I/O, state writes, serialization

use crate::core::tool::Tool;
use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for opavm
#[derive(Error, Debug)]
pub enum OpavmError {
    // Tool and platform errors
    #[error("Unknown tool '{name}'. Supported tools: {supported}")]
    UnknownTool { name: String, supported: String },

    #[error("{detail} {hint}")]
    UnsupportedPlatform { detail: String, hint: String },

    // Resolution errors
    #[error(
        "No version configured for {tool}: no {pin_file} file was found in this directory or any parent, \
         and no global default is set. Run: {use_command} to set a global default, \
         or create {pin_file} (Run: {pin_command}) to pin this project."
    )]
    NoVersionConfigured {
        tool: Tool,
        pin_file: &'static str,
        use_command: String,
        pin_command: String,
    },

    #[error("{tool} {version} is not installed. Run: {install_command}")]
    VersionNotInstalled {
        tool: Tool,
        version: String,
        install_command: String,
    },

    // Upstream errors
    #[error("Release {tag} was not found in {repo}. Check the version tag and repository access.")]
    ReleaseNotFound { repo: String, tag: String },

    #[error(
        "No {tool} {version} asset found for {platform} (expected one of: {expected}). \
         Pick another version or open an issue for this platform."
    )]
    AssetNotFound {
        tool: Tool,
        version: String,
        platform: String,
        expected: String,
    },

    #[error(
        "Ambiguous {tool} {version} assets for {platform}: {matches}. \
         Pick another version or open an issue for this platform."
    )]
    AmbiguousAsset {
        tool: Tool,
        version: String,
        platform: String,
        matches: String,
    },

    // Integrity errors
    #[error("Checksum verification failed for {asset}: expected {expected}, got {actual}.")]
    ChecksumMismatch {
        asset: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid checksum file for {asset}: no SHA-256 value found.")]
    InvalidChecksumFile { asset: String },

    #[error("Installed {tool} {version} binary failed verification ({detail}). Run install again.")]
    CorruptInstall {
        tool: Tool,
        version: String,
        detail: String,
    },

    // Network errors
    #[error(
        "Proxy error while fetching {url}. Check HTTP_PROXY/HTTPS_PROXY or corporate proxy settings."
    )]
    ProxyFailure { url: String },

    #[error(
        "Network connection failed while fetching {url}. Check internet connectivity, DNS, firewall, or VPN."
    )]
    ConnectionFailed { url: String },

    #[error("Request to {url} timed out. Check network connectivity and retry.")]
    Timeout { url: String },

    #[error("GitHub API rate limit exceeded. Set OPAVM_GITHUB_TOKEN or retry after the rate limit resets.")]
    RateLimited,

    #[error("GitHub request to {repo} was unauthorized. Check OPAVM_GITHUB_TOKEN and repository access.")]
    Unauthorized { repo: String },

    #[error("Request to {url} failed: HTTP {status}.")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid response from {url}: {detail}")]
    InvalidResponse { url: String, detail: String },

    // Input errors
    #[error("Invalid repository value '{value}'. Use format: owner/repo (example: {example}).")]
    InvalidRepository { value: String, example: &'static str },

    #[error("Limit must be at least 1. Try: opavm releases --limit 10")]
    InvalidLimit,

    #[error("Invalid install arguments. With --tool, use: opavm install <version> --tool <opa|regal>")]
    InvalidInstallArgs,

    // Local errors
    #[error("Failed to execute {binary}: {source}")]
    ExecFailed {
        binary: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write state file '{path}': {source}")]
    StateWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not determine the home directory. Set OPAVM_HOME.")]
    HomeDirectoryNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using OpavmError
pub type Result<T> = std::result::Result<T, OpavmError>;

impl OpavmError {
    /// Create an unknown tool error listing the supported tools
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool {
            name: name.into(),
            supported: Tool::supported_names().join(", "),
        }
    }

    /// Create an unsupported platform error
    pub fn unsupported_platform(detail: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::UnsupportedPlatform {
            detail: detail.into(),
            hint: hint.into(),
        }
    }

    /// Create the error for "no pin file and no global default"
    pub fn no_version_configured(tool: Tool) -> Self {
        Self::NoVersionConfigured {
            tool,
            pin_file: tool.pin_filename(),
            use_command: tool.use_command("<version>"),
            pin_command: tool.pin_command("<version>"),
        }
    }

    /// Create a version not installed error with the matching install command
    pub fn version_not_installed(tool: Tool, version: impl Into<String>) -> Self {
        let version = version.into();
        Self::VersionNotInstalled {
            tool,
            install_command: tool.install_command(&version),
            version,
        }
    }

    /// Create a release not found error
    pub fn release_not_found(repo: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::ReleaseNotFound {
            repo: repo.into(),
            tag: tag.into(),
        }
    }

    /// Create an asset not found error
    pub fn asset_not_found(
        tool: Tool,
        version: impl Into<String>,
        platform: impl Into<String>,
        expected: &[String],
    ) -> Self {
        Self::AssetNotFound {
            tool,
            version: version.into(),
            platform: platform.into(),
            expected: expected.join(", "),
        }
    }

    /// Create an ambiguous asset error
    pub fn ambiguous_asset(
        tool: Tool,
        version: impl Into<String>,
        platform: impl Into<String>,
        matches: &[String],
    ) -> Self {
        Self::AmbiguousAsset {
            tool,
            version: version.into(),
            platform: platform.into(),
            matches: matches.join(", "),
        }
    }

    /// Create a checksum mismatch error
    pub fn checksum_mismatch(
        asset: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ChecksumMismatch {
            asset: asset.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a corrupt install error
    pub fn corrupt_install(
        tool: Tool,
        version: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::CorruptInstall {
            tool,
            version: version.into(),
            detail: detail.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidResponse {
            url: url.into(),
            detail: detail.into(),
        }
    }

    /// Create an exec failed error
    pub fn exec_failed(binary: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ExecFailed {
            binary: binary.into(),
            source,
        }
    }

    /// Create a state write failed error
    pub fn state_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StateWriteFailed {
            path: path.into(),
            source,
        }
    }
}
