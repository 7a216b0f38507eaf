//! Process configuration read from the environment at command start.

use crate::core::dirs::{get_root_directory, Layout};
use crate::core::error::{OpavmError, Result};
use crate::core::tool::Tool;
use std::collections::HashMap;
use std::fmt;

pub const TOKEN_ENV: &str = "OPAVM_GITHUB_TOKEN";
const FALLBACK_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// A GitHub `owner/repo` identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    owner: String,
    name: String,
}

impl Repository {
    /// Validate an `owner/repo` value; `example` is shown in the error hint
    pub fn parse(value: &str, example: &'static str) -> Result<Self> {
        let normalized = value.trim();
        let invalid = || OpavmError::InvalidRepository {
            value: value.to_string(),
            example,
        };
        let (owner, name) = normalized.split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub layout: Layout,
    pub github_token: Option<String>,
    repo_overrides: HashMap<Tool, String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let layout = Layout::new(get_root_directory()?);
        let github_token = [TOKEN_ENV, FALLBACK_TOKEN_ENV]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|token| token.trim().to_string())
            .find(|token| !token.is_empty());

        let repo_overrides = Tool::ALL
            .iter()
            .filter_map(|tool| {
                std::env::var(tool.repo_env_var())
                    .ok()
                    .filter(|value| !value.trim().is_empty())
                    .map(|value| (*tool, value))
            })
            .collect();

        log::debug!(
            "Loaded config: root={}, token={}",
            layout.root().display(),
            if github_token.is_some() { "set" } else { "unset" }
        );

        Ok(Self {
            layout,
            github_token,
            repo_overrides,
        })
    }

    /// Configuration rooted at `layout` with no token and no overrides
    pub fn with_layout(layout: Layout) -> Self {
        Self {
            layout,
            github_token: None,
            repo_overrides: HashMap::new(),
        }
    }

    pub fn with_repo_override(mut self, tool: Tool, repo: impl Into<String>) -> Self {
        self.repo_overrides.insert(tool, repo.into());
        self
    }

    /// Upstream repository for `tool`, honouring the override variable.
    /// Fails on a malformed override before anything touches the network.
    pub fn repository(&self, tool: Tool) -> Result<Repository> {
        let value = self
            .repo_overrides
            .get(&tool)
            .map(String::as_str)
            .unwrap_or_else(|| tool.default_repo());
        Repository::parse(value, tool.default_repo())
    }
}
