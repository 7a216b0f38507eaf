//! Output formatting for the CLI commands.
//!
//! Errors and progress go to stderr so that stdout carries only what scripts
//! consume (`opavm which`, `opavm current`, `opavm list`).
//!
//! # Colors
//! - Errors: red prefix
//! - Success: green check mark
//! - Hints and progress: bright_black (muted)

use crate::core::installer::InstallStage;
use crate::core::tool::Tool;
use colored::*;

/// Prints an error to stderr
///
/// # Format
/// ```text
/// ✕ Error: <message>
/// ```
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✕ Error:".red(), message);
}

/// Prints a success line
///
/// # Format
/// ```text
/// ✓ <message>
/// ```
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_info(message: &str) {
    println!("{message}");
}

/// Prints a muted hint line to stderr
pub fn print_hint(message: &str) {
    eprintln!("{}", message.bright_black());
}

pub fn print_section_header(header: &str) {
    println!("{}:", header.bold());
}

/// Progress line for an install stage, `None` for stages with nothing to say
pub fn stage_message(tool: Tool, stage: InstallStage) -> Option<String> {
    match stage {
        InstallStage::Resolving => Some(format!("Resolving {tool} release...")),
        InstallStage::Downloading => Some(format!("Downloading {tool}...")),
        InstallStage::VerifyingChecksum => Some("Verifying checksum...".to_string()),
        InstallStage::SmokeTesting => Some(format!("Checking {tool} binary...")),
        InstallStage::AlreadyInstalled | InstallStage::Done => None,
    }
}

/// Reporter for [`crate::core::installer::Installer::with_reporter`]
pub fn print_install_stage(tool: Tool, stage: InstallStage) {
    if let Some(message) = stage_message(tool, stage) {
        print_hint(&message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printers_do_not_panic() {
        print_error("Test error message");
        print_success("Installed OPA 0.61.0");
        print_info("0.61.0");
        print_hint("export PATH=...");
        print_section_header("Installed OPA versions");
    }

    #[test]
    fn test_stage_messages() {
        assert_eq!(
            stage_message(Tool::Regal, InstallStage::Downloading).unwrap(),
            "Downloading Regal..."
        );
        assert!(stage_message(Tool::Opa, InstallStage::Done).is_none());
    }
}
