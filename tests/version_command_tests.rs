#![cfg(unix)]

use assert_cmd::prelude::*;
use predicates::prelude::*;

mod common;
use common::{assertions, fixtures::*, sandbox::*};
use opavm::core::Tool;

#[cfg(test)]
mod version_command_tests {
    use super::*;

    #[test]
    fn test_use_sets_global_default() -> anyhow::Result<()> {
        let sandbox = setup_sandbox()?;
        sandbox.install_fake(Tool::Opa, "0.62.1")?;

        sandbox
            .opavm()
            .args(["use", "v0.62.1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Global default for OPA set to 0.62.1"));

        assert_eq!(sandbox.state().get_default(Tool::Opa).as_deref(), Some("0.62.1"));
        Ok(())
    }

    #[test]
    fn test_use_requires_installed_version() -> anyhow::Result<()> {
        let sandbox = setup_sandbox()?;

        sandbox
            .opavm()
            .args(["use", "0.62.1"])
            .assert()
            .failure()
            .code(1)
            .stderr(assertions::not_installed("0.62.1"));

        assert!(sandbox.state().get_default(Tool::Opa).is_none());
        Ok(())
    }

    #[test]
    fn test_use_for_regal_leaves_opa_default_alone() -> anyhow::Result<()> {
        let sandbox = create_two_tool_sandbox()?;
        sandbox.install_fake(Tool::Regal, "0.39.0")?;

        sandbox
            .opavm()
            .args(["use", "0.39.0", "--tool", "regal"])
            .assert()
            .success();

        assert_eq!(sandbox.state().get_default(Tool::Regal).as_deref(), Some("0.39.0"));
        assert_eq!(sandbox.state().get_default(Tool::Opa).as_deref(), Some("0.62.1"));
        Ok(())
    }

    #[test]
    fn test_list_marks_global_default() -> anyhow::Result<()> {
        let project = create_pinned_project()?;

        project
            .sandbox
            .opavm()
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("* 0.63.0 (global default)"))
            .stdout(predicate::str::contains("  0.61.0"));

        Ok(())
    }

    #[test]
    fn test_list_sorts_newest_first() -> anyhow::Result<()> {
        let sandbox = setup_sandbox()?;
        for version in ["0.9.0", "0.61.0", "0.10.2"] {
            sandbox.install_fake(Tool::Opa, version)?;
        }

        let output = sandbox.opavm().arg("list").output()?;
        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout)?;
        let listed: Vec<&str> = stdout
            .lines()
            .skip(1)
            .map(|line| line.trim_start_matches(['*', ' ']))
            .collect();
        assert_eq!(listed, vec!["0.61.0", "0.10.2", "0.9.0"]);
        Ok(())
    }

    #[test]
    fn test_list_empty_suggests_install() -> anyhow::Result<()> {
        let sandbox = setup_sandbox()?;

        sandbox
            .opavm()
            .args(["list", "--tool", "regal"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No installed Regal versions"))
            .stdout(predicate::str::contains("opavm install regal latest"));

        Ok(())
    }

    #[test]
    fn test_uninstall_removes_version() -> anyhow::Result<()> {
        let sandbox = create_two_tool_sandbox()?;
        let binary = sandbox.install_fake(Tool::Regal, "0.37.0")?;

        sandbox
            .opavm()
            .args(["uninstall", "0.37.0", "--tool", "regal"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Uninstalled Regal 0.37.0"));

        assert!(!binary.exists());
        assert!(!sandbox.state().list_installed(Tool::Regal).contains("0.37.0"));
        assert!(sandbox.state().list_installed(Tool::Regal).contains("0.38.1"));
        Ok(())
    }

    #[test]
    fn test_uninstall_missing_version_fails() -> anyhow::Result<()> {
        let sandbox = setup_sandbox()?;

        sandbox
            .opavm()
            .args(["uninstall", "0.1.0"])
            .assert()
            .failure()
            .code(1)
            .stderr(assertions::not_installed("0.1.0"));

        Ok(())
    }

    #[test]
    fn test_uninstalling_default_then_resolving_reports_missing() -> anyhow::Result<()> {
        let sandbox = create_two_tool_sandbox()?;

        sandbox
            .opavm()
            .args(["uninstall", "0.62.1"])
            .assert()
            .success()
            .stderr(predicate::str::contains("was the global default"));

        sandbox
            .opavm()
            .arg("which")
            .assert()
            .failure()
            .stderr(assertions::not_installed("0.62.1"));

        Ok(())
    }

    #[test]
    fn test_pin_installed_version_writes_pin_file() -> anyhow::Result<()> {
        let sandbox = setup_sandbox()?;
        sandbox.install_fake(Tool::Opa, "0.61.0")?;

        sandbox
            .opavm()
            .args(["pin", "v0.61.0"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Pinned OPA 0.61.0"));

        let content = std::fs::read_to_string(sandbox.work.join(".opa-version"))?;
        assert_eq!(content, "0.61.0\n");

        sandbox
            .opavm()
            .arg("current")
            .assert()
            .success()
            .stdout(assertions::resolved_from_pin("0.61.0"));

        Ok(())
    }

    #[test]
    fn test_pin_missing_version_declined_without_input() -> anyhow::Result<()> {
        let sandbox = setup_sandbox()?;

        sandbox
            .opavm()
            .args(["pin", "0.61.0", "--tool", "regal"])
            .write_stdin("")
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Install now?"))
            .stderr(assertions::not_installed("0.61.0"));

        assert!(!sandbox.work.join(".regal-version").exists());
        Ok(())
    }

    #[test]
    fn test_install_rejects_tool_flag_with_two_positionals() -> anyhow::Result<()> {
        let sandbox = setup_sandbox()?;

        sandbox
            .opavm()
            .args(["install", "regal", "0.38.1", "--tool", "regal"])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Invalid install arguments"));

        Ok(())
    }

    #[test]
    fn test_releases_rejects_zero_limit() -> anyhow::Result<()> {
        let sandbox = setup_sandbox()?;

        sandbox
            .opavm()
            .args(["releases", "--limit", "0"])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Limit must be at least 1"));

        Ok(())
    }

    #[test]
    fn test_invalid_repository_override_fails_before_network() -> anyhow::Result<()> {
        let sandbox = setup_sandbox()?;

        sandbox
            .opavm()
            .env("OPAVM_REGAL_GITHUB_REPO", "not-a-repo")
            .args(["releases", "--tool", "regal"])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Invalid repository value 'not-a-repo'"))
            .stderr(predicate::str::contains("StyraInc/regal"));

        Ok(())
    }
}
