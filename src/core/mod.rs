//! Core functionality for opavm.
//!
//! This module provides version resolution, persisted state, the upstream
//! release catalog, the install pipeline and shim dispatch.

pub mod catalog;
pub mod command_init;
pub mod config;
pub mod dirs;
pub mod dispatch;
pub mod download;
pub mod error;
pub mod github;
pub mod installer;
pub mod output;
pub mod pin;
pub mod platform;
pub mod resolver;
pub mod shim;
pub mod state;
pub mod tool;

// === Error handling ===
// Core error type and result alias used throughout the application
pub use error::{OpavmError, Result};

// === Tools and platforms ===
pub use platform::{Arch, Os, Platform};
pub use tool::Tool;

// === Configuration ===
// Environment-derived settings and the on-disk layout under the root directory
pub use config::{Config, Repository};
pub use dirs::Layout;

// === Resolution ===
// Nearest pin file, then global default
pub use pin::{find_pin, read_pin, write_pin, Pin};
pub use resolver::{InstalledVersion, Resolution, ResolutionSource, VersionResolver};

// === State management ===
pub use state::{GlobalState, StateStore};

// === Releases ===
// GitHub transport behind the ReleaseSource seam
pub use catalog::ReleaseCatalog;
pub use github::{Asset, GitHubSource, Release, ReleaseSource, ReleaseTag};

// === Installation ===
pub use installer::{InstallOutcome, InstallStage, Installer};

// === Shims and dispatch ===
pub use dispatch::ShimDispatcher;
pub use shim::{ensure_shim, path_instruction};

// === Command initialization ===
// Shared setup for the CLI commands
pub use command_init::CommandContext;

// === Output formatting ===
pub use output::{print_error, print_hint, print_info, print_section_header, print_success};
