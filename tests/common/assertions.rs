//! Common assertion helpers for test output validation
//!
//! Provides predicates for the user-facing messages opavm prints, so tests
//! do not repeat message fragments.

#![allow(dead_code)]

use predicates::prelude::*;

/// Error text for a tool with neither a pin file nor a global default
pub fn no_version_configured(pin_file: &str) -> impl Predicate<str> {
    predicates::str::contains("No version configured")
        .and(predicates::str::contains(format!("no {pin_file} file was found")))
        .and(predicates::str::contains("no global default is set"))
}

/// Error text for a configured version that is missing on disk
pub fn not_installed(version: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("{version} is not installed"))
        .and(predicates::str::contains("opavm install"))
}

pub fn resolved_from_pin(version: &str) -> impl Predicate<str> {
    predicates::str::starts_with(format!("{version} (pinned via"))
}

pub fn resolved_from_default(version: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("{version} (global default)"))
}

/// Output printed by the fake tool binaries
pub fn ran_fake(tool: &str, version: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("fake-{tool} {version}:"))
}
