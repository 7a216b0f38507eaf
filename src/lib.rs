//! opavm - a per-project version manager for OPA and Regal.
//!
//! Projects pin a tool version with a `.opa-version` / `.regal-version` file;
//! outside a pinned project a global default applies. Shims placed on `PATH`
//! resolve the active version on every invocation and hand off to it.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module:
//! - Version resolution ([`VersionResolver`])
//! - Persisted global state ([`StateStore`])
//! - Release lookup and installation ([`ReleaseCatalog`], [`Installer`])
//! - Shim dispatch ([`ShimDispatcher`])
//! - Error handling and result types

pub mod commands;
pub mod core;

// Re-export the core public API for external users
pub use core::{
    Config,
    // Releases and installation
    GitHubSource,
    InstallOutcome,
    InstalledVersion,
    Installer,
    Layout,
    // Error handling
    OpavmError,
    Platform,
    ReleaseCatalog,
    ReleaseSource,
    // Resolution
    Resolution,
    ResolutionSource,
    Result,
    ShimDispatcher,
    StateStore,
    Tool,
    VersionResolver,
};
