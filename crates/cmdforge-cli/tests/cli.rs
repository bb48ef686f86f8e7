//! Black-box tests over the compiled binary: exercise the parts
//! of the CLI surface that don't require a live LLM provider.

use std::path::Path;

use anyhow::Result;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

fn cmdforge_cmd(config_home: &Path) -> Result<assert_cmd::Command> {
    let mut cmd = assert_cmd::Command::cargo_bin("cmdforge")?;
    cmd.env("XDG_CONFIG_HOME", config_home);
    Ok(cmd)
}

#[test]
fn help_exits_successfully() -> Result<()> {
    let home = TempDir::new()?;
    cmdforge_cmd(home.path())?.arg("--help").assert().success().stdout(predicate::str::contains("generate"));
    Ok(())
}

#[test]
fn version_subcommand_prints_the_crate_version() -> Result<()> {
    let home = TempDir::new()?;
    cmdforge_cmd(home.path())?
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn config_reset_then_show_round_trips() -> Result<()> {
    let home = TempDir::new()?;
    cmdforge_cmd(home.path())?.args(["config", "reset"]).assert().success();
    cmdforge_cmd(home.path())?
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"default_provider\""));
    Ok(())
}

#[test]
fn config_setup_is_an_explicit_stub() -> Result<()> {
    let home = TempDir::new()?;
    cmdforge_cmd(home.path())?
        .args(["config", "setup"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not implemented in this build"));
    Ok(())
}

#[test]
fn session_is_an_explicit_stub() -> Result<()> {
    let home = TempDir::new()?;
    cmdforge_cmd(home.path())?
        .arg("session")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not implemented in this build"));
    Ok(())
}

#[test]
fn update_check_is_an_explicit_stub() -> Result<()> {
    let home = TempDir::new()?;
    cmdforge_cmd(home.path())?
        .args(["update", "check"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not implemented in this build"));
    Ok(())
}

#[test]
fn completion_generates_a_nonempty_script() -> Result<()> {
    let home = TempDir::new()?;
    cmdforge_cmd(home.path())?
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cmdforge"));
    Ok(())
}

#[test]
fn no_request_and_no_subcommand_is_a_usage_error() -> Result<()> {
    let home = TempDir::new()?;
    cmdforge_cmd(home.path())?.assert().failure();
    Ok(())
}
