//! Centralized initialization for CLI commands.
//!
//! Every command starts the same way: read the environment into a [`Config`],
//! detect the running [`Platform`] and note the working directory. This module
//! does that once and hands out the components built on top of it.
//!
//! # Initialization Steps
//! 1. **Configuration**: `OPAVM_HOME`, token and repository overrides
//! 2. **Platform detection**: fails early on unsupported OS/CPU combinations
//! 3. **Working directory**: starting point for pin file lookup

use crate::core::config::Config;
use crate::core::dirs::Layout;
use crate::core::dispatch::ShimDispatcher;
use crate::core::error::Result;
use crate::core::github::GitHubSource;
use crate::core::installer::Installer;
use crate::core::output::print_install_stage;
use crate::core::platform::Platform;
use crate::core::resolver::VersionResolver;
use crate::core::state::StateStore;
use std::env;
use std::path::PathBuf;

/// Initialized context shared by the command implementations
pub struct CommandContext {
    pub config: Config,
    pub platform: Platform,
    pub cwd: PathBuf,
}

impl CommandContext {
    pub fn initialize() -> Result<Self> {
        let config = Config::from_env()?;
        let platform = Platform::current()?;
        let cwd = env::current_dir()?;
        log::debug!("Initialized command context for {platform} in {}", cwd.display());
        Ok(Self {
            config,
            platform,
            cwd,
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.config.layout
    }

    pub fn state(&self) -> StateStore {
        StateStore::new(self.layout())
    }

    pub fn resolver(&self) -> VersionResolver {
        VersionResolver::new(self.layout().clone(), self.platform)
    }

    pub fn dispatcher(&self) -> ShimDispatcher {
        ShimDispatcher::new(self.layout().clone(), self.platform)
    }

    /// Installer backed by GitHub, printing progress to stderr
    pub fn installer(&self) -> Result<Installer<GitHubSource>> {
        let source = GitHubSource::new(self.config.github_token.clone())?;
        Ok(Installer::new(source, self.config.clone(), self.platform)
            .with_reporter(print_install_stage))
    }
}
